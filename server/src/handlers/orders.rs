use actix_web::{delete, get, middleware::from_fn, patch, post, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::views;
use crate::{
    auth_token::SessionClaims,
    db::{
        models::{Customer, Order, OrderStatus},
        parse_object_id, PlantNetStore,
    },
    error::Result,
    middleware::auth_middleware,
};

#[derive(Debug, Deserialize)]
pub struct NewOrderRequest {
    #[serde(alias = "customar")]
    pub customer: Customer,
    #[serde(rename = "plantId")]
    pub plant_id: String,
    pub quantity: i64,
    pub price: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl NewOrderRequest {
    fn into_order(self) -> Result<Order> {
        // Rejected here so the stored reference can always be joined.
        parse_object_id(&self.plant_id)?;

        let mut details = self.details;
        details.remove("_id");
        details.remove("createdAt");

        Ok(Order {
            id: None,
            customer: self.customer,
            plant_id: self.plant_id,
            quantity: self.quantity,
            price: self.price,
            status: self.status,
            seller: self.seller,
            created_at: Some(Utc::now()),
            details,
        })
    }
}

#[post("/order", wrap = "from_fn(auth_middleware)")]
pub async fn place_order(
    req: web::Json<NewOrderRequest>,
    store: web::Data<dyn PlantNetStore>,
    session: web::ReqData<SessionClaims>,
) -> Result<HttpResponse> {
    let order = req.into_inner().into_order()?;
    let plant_id = order.plant_id.clone();

    let ack = store.insert_order(order).await?;
    log::info!(
        "{} placed order {} for plant {}",
        session.email,
        ack.inserted_id,
        plant_id
    );

    Ok(HttpResponse::Ok().json(ack))
}

#[get("/customar-order/{email}", wrap = "from_fn(auth_middleware)")]
pub async fn customer_orders(
    email: web::Path<String>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let orders = store.customer_orders(&email).await?;
    log::debug!("Found {} orders for customer {}", orders.len(), email);

    Ok(HttpResponse::Ok().json(views(orders)))
}

#[get("/seller-orders/{email}", wrap = "from_fn(auth_middleware)")]
pub async fn seller_orders(
    email: web::Path<String>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let orders = store.seller_orders(&email).await?;
    Ok(HttpResponse::Ok().json(views(orders)))
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
}

#[patch("/orders/{id}", wrap = "from_fn(auth_middleware)")]
pub async fn update_order_status(
    id: web::Path<String>,
    req: web::Json<OrderStatusRequest>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let id = parse_object_id(&id)?;
    let ack = store.update_order_status(&id, req.status).await?;
    log::info!("Order {} is now {}", id.to_hex(), req.status.as_str());

    Ok(HttpResponse::Ok().json(ack))
}

#[delete("/orders/{id}", wrap = "from_fn(auth_middleware)")]
pub async fn delete_order(
    id: web::Path<String>,
    store: web::Data<dyn PlantNetStore>,
    session: web::ReqData<SessionClaims>,
) -> Result<HttpResponse> {
    let id = parse_object_id(&id)?;
    let ack = store.delete_order(&id).await.map_err(|err| {
        log::warn!("{} could not cancel order {}: {}", session.email, id.to_hex(), err);
        err
    })?;
    log::info!("{} cancelled order {}", session.email, id.to_hex());

    Ok(HttpResponse::Ok().json(ack))
}
