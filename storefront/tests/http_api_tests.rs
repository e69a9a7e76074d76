// tests/http_api_tests.rs
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use common::*;
use storefront::services::order_service::{self, CreateOrderInput};
use storefront::services::{auth_service, import_request_service};
use storefront::web::configure_app_routes;

macro_rules! init_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

const BOUNDARY: &str = "----storefront-test-boundary";

fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
  let mut body = Vec::new();
  for (name, value) in fields {
    body.extend_from_slice(
      format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
        BOUNDARY, name, value
      )
      .as_bytes(),
    );
  }
  if let Some((file_name, content_type, bytes)) = image {
    body.extend_from_slice(
      format!(
        "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
        BOUNDARY, file_name, content_type
      )
      .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
  body
}

fn multipart_content_type() -> String {
  format!("multipart/form-data; boundary={}", BOUNDARY)
}

#[actix_web::test]
async fn health_reports_ok() {
  let t = test_app();
  let app = init_app!(t.state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "OK");
  assert!(body["uptime"].is_number());
}

#[actix_web::test]
async fn login_issues_token_for_seeded_admin() {
  let t = test_app();
  auth_service::seed_admin(t.store.as_ref(), "admin@example.com", "s3cret-pass")
    .await
    .unwrap();
  let app = init_app!(t.state);

  let req = test::TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({"email": "  Admin@Example.com ", "password": "s3cret-pass"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["user"]["email"], "admin@example.com");
  assert_eq!(body["user"]["role"], "ADMIN");
  let token = body["token"].as_str().unwrap().to_string();

  let req = test::TestRequest::get()
    .uri("/api/orders")
    .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["pagination"]["limit"], 10);
  assert_eq!(body["pagination"]["pages"], 0);

  let req = test::TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({"email": "admin@example.com", "password": "wrong-pass"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn sixth_login_attempt_in_window_is_rate_limited() {
  let t = test_app();
  let app = init_app!(t.state);

  for attempt in 1..=6 {
    let req = test::TestRequest::post()
      .uri("/api/auth/login")
      .set_json(json!({"email": "nobody@example.com", "password": "whatever"}))
      .to_request();
    let resp = test::call_service(&app, req).await;
    let expected = if attempt <= 5 {
      StatusCode::UNAUTHORIZED
    } else {
      StatusCode::TOO_MANY_REQUESTS
    };
    assert_eq!(resp.status(), expected, "attempt {}", attempt);
  }
}

#[actix_web::test]
async fn login_validation_errors_list_fields() {
  let t = test_app();
  let app = init_app!(t.state);

  let req = test::TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({"email": "not-an-email", "password": "123"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn admin_routes_require_valid_admin_token() {
  let t = test_app();
  let customer = bearer(&t.state, &customer_identity());
  let app = init_app!(t.state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/orders").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Access token required");

  let req = test::TestRequest::get()
    .uri("/api/import-requests/admin")
    .insert_header((header::AUTHORIZATION, "Bearer not.a.token"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Invalid or expired token");

  let req = test::TestRequest::get()
    .uri("/api/products/admin/all")
    .insert_header((header::AUTHORIZATION, customer))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Admin access required");
}

#[actix_web::test]
async fn order_endpoint_reports_stock_problems() {
  let t = test_app();
  let product = insert_product(t.store.as_ref(), new_product("Brake Pad", 1)).await;
  let app = init_app!(t.state);

  let order = |quantity: i64| {
    test::TestRequest::post()
      .uri("/api/orders")
      .set_json(json!({
        "productId": product.id,
        "productName": "Brake Pad",
        "customerName": "Dana Lee",
        "address": "12 Harbour Rd",
        "phone": "+1 555 010 0100",
        "quantity": quantity
      }))
      .to_request()
  };

  let resp = test::call_service(&app, order(3)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Only 1 items available in stock");

  let resp = test::call_service(&app, order(1)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Order created successfully");
  assert_eq!(body["order"]["status"], "PENDING");
  assert_eq!(body["order"]["productId"], json!(product.id));

  let resp = test::call_service(&app, order(1)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Product out of stock");
}

#[actix_web::test]
async fn malformed_json_is_a_validation_error() {
  let t = test_app();
  let app = init_app!(t.state);

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header((header::CONTENT_TYPE, "application/json"))
    .set_payload("{\"productId\": ")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn order_status_is_validated_before_lookup() {
  let t = test_app();
  let admin = bearer(&t.state, &admin_identity());
  let app = init_app!(t.state);

  let req = test::TestRequest::patch()
    .uri(&format!("/api/orders/{}/status", uuid::Uuid::new_v4()))
    .insert_header((header::AUTHORIZATION, admin.clone()))
    .set_json(json!({"status": "SHIPPED"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::patch()
    .uri(&format!("/api/orders/{}/status", uuid::Uuid::new_v4()))
    .insert_header((header::AUTHORIZATION, admin))
    .set_json(json!({"status": "COMPLETED"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unknown_order_status_leaves_existing_order_untouched() {
  let t = test_app();
  let admin = bearer(&t.state, &admin_identity());
  let product = insert_product(t.store.as_ref(), new_product("Brake Pad", 3)).await;
  let order = order_service::create_order(
    t.store.as_ref(),
    CreateOrderInput {
      product_id: Some(product.id.to_string()),
      product_name: Some("Brake Pad".to_string()),
      customer_name: Some("Dana Lee".to_string()),
      address: Some("12 Harbour Rd".to_string()),
      phone: Some("+1 555 010 0100".to_string()),
      quantity: Some(1),
    },
  )
  .await
  .unwrap();
  let app = init_app!(t.state);

  let get_order = || {
    test::TestRequest::get()
      .uri(&format!("/api/orders/{}", order.id))
      .insert_header((header::AUTHORIZATION, admin.clone()))
      .to_request()
  };
  let before: Value = test::read_body_json(test::call_service(&app, get_order()).await).await;

  let req = test::TestRequest::patch()
    .uri(&format!("/api/orders/{}/status", order.id))
    .insert_header((header::AUTHORIZATION, admin.clone()))
    .set_json(json!({"status": "SHIPPED"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = test::call_service(&app, get_order()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let after: Value = test::read_body_json(resp).await;
  assert_eq!(after["status"], "PENDING");
  assert_eq!(after["status"], before["status"]);
  assert_eq!(after["updatedAt"], before["updatedAt"]);
}

#[actix_web::test]
async fn unknown_import_request_status_leaves_existing_request_untouched() {
  let t = test_app();
  let admin = bearer(&t.state, &admin_identity());
  let request = import_request_service::create_import_request(t.store.as_ref(), new_import_request("Alternator"))
    .await
    .unwrap();
  let app = init_app!(t.state);

  let get_request = || {
    test::TestRequest::get()
      .uri(&format!("/api/import-requests/admin/{}", request.id))
      .insert_header((header::AUTHORIZATION, admin.clone()))
      .to_request()
  };
  let before: Value = test::read_body_json(test::call_service(&app, get_request()).await).await;

  let req = test::TestRequest::put()
    .uri(&format!("/api/import-requests/admin/{}/status", request.id))
    .insert_header((header::AUTHORIZATION, admin.clone()))
    .set_json(json!({"status": "SHIPPED"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = test::call_service(&app, get_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let after: Value = test::read_body_json(resp).await;
  assert_eq!(after["status"], "PENDING");
  assert_eq!(after["status"], before["status"]);
  assert_eq!(after["updatedAt"], before["updatedAt"]);
}

#[actix_web::test]
async fn admin_creates_product_from_multipart_form() {
  let t = test_app();
  let admin = bearer(&t.state, &admin_identity());
  let app = init_app!(t.state);

  let body = multipart_body(
    &[
      ("name", "Front Brake Pad"),
      ("partNumber", "BP-100"),
      ("quantity", "4"),
      ("price", "19.99"),
      ("category", "Brakes"),
    ],
    Some(("pad.png", "image/png", b"\x89PNG fake")),
  );
  let req = test::TestRequest::post()
    .uri("/api/products/admin")
    .insert_header((header::AUTHORIZATION, admin))
    .insert_header((header::CONTENT_TYPE, multipart_content_type()))
    .set_payload(body)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  assert_eq!(created["name"], "Front Brake Pad");
  assert_eq!(created["quantity"], 4);
  assert_eq!(created["partNumber"], "BP-100");
  let image = created["image"].as_str().unwrap();
  assert!(image.starts_with("/uploads/image-"));
  assert!(t.assets.contains(image));

  let id = created["id"].as_str().unwrap();
  let resp = test::call_service(
    &app,
    test::TestRequest::get().uri(&format!("/api/products/{}", id)).to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/products/categories").to_request()).await;
  let categories: Value = test::read_body_json(resp).await;
  assert_eq!(categories, json!(["Brakes"]));
}

#[actix_web::test]
async fn non_image_and_oversized_uploads_are_rejected() {
  let t = test_app();
  let admin = bearer(&t.state, &admin_identity());
  let app = init_app!(t.state);
  let fields = [("name", "Mirror"), ("partNumber", "MR-1")];

  let text_file = multipart_body(&fields, Some(("notes.txt", "text/plain", b"hello")));
  let req = test::TestRequest::post()
    .uri("/api/products/admin")
    .insert_header((header::AUTHORIZATION, admin.clone()))
    .insert_header((header::CONTENT_TYPE, multipart_content_type()))
    .set_payload(text_file)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let big = vec![0u8; 4096];
  let oversized = multipart_body(&fields, Some(("big.png", "image/png", &big)));
  let req = test::TestRequest::post()
    .uri("/api/products/admin")
    .insert_header((header::AUTHORIZATION, admin))
    .insert_header((header::CONTENT_TYPE, multipart_content_type()))
    .set_payload(oversized)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  assert_eq!(t.assets.stored_count(), 0);
}

#[actix_web::test]
async fn svg_uploads_are_rejected() {
  let t = test_app();
  let admin = bearer(&t.state, &admin_identity());
  let app = init_app!(t.state);
  let fields = [("name", "Badge"), ("partNumber", "BG-1")];
  let svg: &[u8] = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><script>alert(1)</script></svg>";

  for (file_name, content_type) in [("badge.svg", "image/svg+xml"), ("badge.svg", "image/png"), ("badge.png", "image/svg+xml")] {
    let req = test::TestRequest::post()
      .uri("/api/products/admin")
      .insert_header((header::AUTHORIZATION, admin.clone()))
      .insert_header((header::CONTENT_TYPE, multipart_content_type()))
      .set_payload(multipart_body(&fields, Some((file_name, content_type, svg))))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{} as {}", file_name, content_type);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Only image files are allowed");
  }
  assert_eq!(t.assets.stored_count(), 0);
}

#[actix_web::test]
async fn import_request_submission_and_admin_listing() {
  let t = test_app();
  let admin = bearer(&t.state, &admin_identity());
  let app = init_app!(t.state);

  let req = test::TestRequest::post()
    .uri("/api/import-requests")
    .set_json(json!({
      "customerName": "Sam Carter",
      "email": "sam@example.com",
      "carMake": "Toyota",
      "carModel": "Corolla",
      "carYear": "2012",
      "partName": "Alternator",
      "quantity": 2
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Import request submitted successfully");
  assert_eq!(body["request"]["carYear"], 2012);
  assert_eq!(body["request"]["status"], "PENDING");
  let id = body["request"]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::put()
    .uri(&format!("/api/import-requests/admin/{}/status", id))
    .insert_header((header::AUTHORIZATION, admin.clone()))
    .set_json(json!({"status": "PROCESSING"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "PROCESSING");

  let req = test::TestRequest::get()
    .uri("/api/import-requests/admin?status=PROCESSING&q=corolla")
    .insert_header((header::AUTHORIZATION, admin))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["requests"].as_array().unwrap().len(), 1);
  assert_eq!(body["pagination"]["total"], 1);
}
