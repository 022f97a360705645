mod common;

use actix_web::{test, App};

use common::TestContext;

#[actix_web::test]
async fn test_index_greeting() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "Hello from plantNet Server..");
}

#[actix_web::test]
async fn test_health_check_reports_backend() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}
