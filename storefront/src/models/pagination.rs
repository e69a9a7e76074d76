// storefront/src/models/pagination.rs

use serde::Serialize;

/// A validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: u32,
  pub limit: u32,
}

impl PageRequest {
  pub const DEFAULT_PRODUCT_LIMIT: u32 = 20;
  pub const DEFAULT_IMPORT_REQUEST_LIMIT: u32 = 20;
  pub const DEFAULT_ORDER_LIMIT: u32 = 10;

  pub fn new(page: u32, limit: u32) -> Self {
    Self {
      page: page.max(1),
      limit: limit.max(1),
    }
  }

  pub fn offset(&self) -> i64 {
    (i64::from(self.page) - 1) * i64::from(self.limit)
  }

  pub fn limit_i64(&self) -> i64 {
    i64::from(self.limit)
  }
}

/// One slice of a listing plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: i64,
}

impl<T> Page<T> {
  pub fn pagination(&self, request: PageRequest) -> Pagination {
    Pagination::new(request, self.total)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
  pub page: u32,
  pub limit: u32,
  pub total: i64,
  pub pages: i64,
}

impl Pagination {
  pub fn new(request: PageRequest, total: i64) -> Self {
    let limit = i64::from(request.limit);
    Self {
      page: request.page,
      limit: request.limit,
      total,
      pages: (total + limit - 1) / limit,
    }
  }
}
