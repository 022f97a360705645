use actix_web::{get, middleware::from_fn, patch, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{views, RecordView};
use crate::{
    auth_token::SessionClaims,
    db::{
        models::{Plant, QuantityAdjustment, QuantityDirection, Seller},
        parse_object_id, PlantNetStore,
    },
    error::Result,
    middleware::auth_middleware,
};

#[derive(Debug, Deserialize)]
pub struct NewPlantRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub seller: Option<Seller>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl From<NewPlantRequest> for Plant {
    fn from(req: NewPlantRequest) -> Self {
        let mut details = req.details;
        details.remove("_id");

        Plant {
            id: None,
            name: req.name,
            category: req.category,
            image: req.image,
            price: req.price,
            quantity: req.quantity,
            seller: req.seller,
            details,
        }
    }
}

#[post("/plants", wrap = "from_fn(auth_middleware)")]
pub async fn add_plant(
    req: web::Json<NewPlantRequest>,
    store: web::Data<dyn PlantNetStore>,
    session: web::ReqData<SessionClaims>,
) -> Result<HttpResponse> {
    let plant = Plant::from(req.into_inner());
    let name = plant.name.clone();

    let ack = store.insert_plant(plant).await?;
    log::info!(
        "{} listed plant '{}' ({})",
        session.email,
        name,
        ack.inserted_id
    );

    Ok(HttpResponse::Ok().json(ack))
}

#[get("/plants/{id}")]
pub async fn get_plant(
    id: web::Path<String>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let id = parse_object_id(&id)?;
    let plant = store.find_plant(&id).await?;

    // Unknown ids answer `null`, not 404.
    Ok(HttpResponse::Ok().json(plant.map(RecordView::from)))
}

#[get("/plants")]
pub async fn list_plants(store: web::Data<dyn PlantNetStore>) -> Result<HttpResponse> {
    let plants = store.list_plants().await?;
    Ok(HttpResponse::Ok().json(views(plants)))
}

#[derive(Debug, Deserialize)]
pub struct QuantityUpdateRequest {
    #[serde(rename = "quantityToUpdate")]
    pub quantity_to_update: i64,
    #[serde(default)]
    pub status: Option<String>,
}

impl QuantityUpdateRequest {
    fn adjustment(&self) -> QuantityAdjustment {
        QuantityAdjustment {
            amount: self.quantity_to_update,
            direction: QuantityDirection::from_status(self.status.as_deref()),
        }
    }
}

#[patch("/plants/quantity/{id}", wrap = "from_fn(auth_middleware)")]
pub async fn update_plant_quantity(
    id: web::Path<String>,
    req: web::Json<QuantityUpdateRequest>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let id = parse_object_id(&id)?;
    let adjustment = req.adjustment();

    let ack = store.adjust_plant_quantity(&id, adjustment).await?;
    log::info!(
        "Adjusted quantity of plant {} by {}",
        id.to_hex(),
        adjustment.signed_delta()
    );

    Ok(HttpResponse::Ok().json(ack))
}
