mod common;

use actix_web::{http::StatusCode, test, App};
use serde_json::{json, Value};

use common::{plant_payload, TestContext};
use plantnet::db::{parse_object_id, PlantNetStore};

#[actix_web::test]
async fn test_add_and_fetch_plant() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/plants")
        .cookie(ctx.session_cookie("grower@plantnet.dev"))
        .set_json(plant_payload("Monstera", 4))
        .to_request();
    let ack: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ack["acknowledged"], true);
    let id = ack["insertedId"].as_str().expect("inserted id").to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/plants/{id}"))
        .to_request();
    let plant: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(plant["_id"], id.as_str());
    assert_eq!(plant["name"], "Monstera");
    assert_eq!(plant["quantity"], 4);
    assert_eq!(plant["description"], "Thrives in indirect light");
    assert_eq!(plant["seller"]["email"], "grower@plantnet.dev");
}

#[actix_web::test]
async fn test_list_plants() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;

    for name in ["Monstera", "Pothos", "Calathea"] {
        let req = test::TestRequest::post()
            .uri("/plants")
            .cookie(ctx.session_cookie("grower@plantnet.dev"))
            .set_json(plant_payload(name, 1))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get().uri("/plants").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"Pothos"));
}

#[actix_web::test]
async fn test_unknown_plant_is_null() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri("/plants/665f1c2e9b1e8a3d4c5b6a79")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.is_null());
}

#[actix_web::test]
async fn test_malformed_plant_id_is_a_bad_request() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/plants/not-an-id").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_plant_without_required_fields_is_rejected() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/plants")
        .cookie(ctx.session_cookie("grower@plantnet.dev"))
        .set_json(json!({ "name": "Nameless price" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.store.list_plants().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_increase_quantity_adds_exact_delta() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;
    let cookie = ctx.session_cookie("grower@plantnet.dev");

    let req = test::TestRequest::post()
        .uri("/plants")
        .cookie(cookie.clone())
        .set_json(plant_payload("Monstera", 10))
        .to_request();
    let ack: Value = test::call_and_read_body_json(&app, req).await;
    let id = ack["insertedId"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/plants/quantity/{id}"))
        .cookie(cookie)
        .set_json(json!({ "quantityToUpdate": 5, "status": "increase" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matchedCount"], 1);

    let plant = ctx
        .store
        .find_plant(&parse_object_id(&id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plant.quantity, 15);
}

#[actix_web::test]
async fn test_decrease_quantity_goes_below_zero() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;
    let cookie = ctx.session_cookie("ivy@plantnet.dev");

    let req = test::TestRequest::post()
        .uri("/plants")
        .cookie(cookie.clone())
        .set_json(plant_payload("Monstera", 2))
        .to_request();
    let ack: Value = test::call_and_read_body_json(&app, req).await;
    let id = ack["insertedId"].as_str().unwrap().to_string();

    // No status at all means decrease.
    let req = test::TestRequest::patch()
        .uri(&format!("/plants/quantity/{id}"))
        .cookie(cookie)
        .set_json(json!({ "quantityToUpdate": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let plant = ctx
        .store
        .find_plant(&parse_object_id(&id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plant.quantity, -3);
}

#[actix_web::test]
async fn test_quantity_update_requires_session() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/plants")
        .cookie(ctx.session_cookie("grower@plantnet.dev"))
        .set_json(plant_payload("Monstera", 10))
        .to_request();
    let ack: Value = test::call_and_read_body_json(&app, req).await;
    let id = ack["insertedId"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/plants/quantity/{id}"))
        .set_json(json!({ "quantityToUpdate": 5, "status": "increase" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unauthorized access");

    let plant = ctx
        .store
        .find_plant(&parse_object_id(&id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plant.quantity, 10);
}
