pub mod auth;
pub mod health;
pub mod orders;
pub mod plants;
pub mod users;

use actix_web::web;
use mongodb::bson::{self, Bson};
use serde::{Serialize, Serializer};
use serde_json::Value;

pub use auth::{issue_token, logout};
pub use health::{health_check, index};
pub use orders::{customer_orders, delete_order, place_order, seller_orders, update_order_status};
pub use plants::{add_plant, get_plant, list_plants, update_plant_quantity};
pub use users::{list_users, request_role_change, save_user, update_user_role, user_role};

/// Registers every route. Guarded routes carry the auth middleware on
/// their own resource, so public and guarded handlers may share a path.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(health_check)
        // Session
        .service(issue_token)
        .service(logout)
        // Users
        .service(user_role)
        .service(update_user_role)
        .service(save_user)
        .service(request_role_change)
        .service(list_users)
        // Plants
        .service(list_plants)
        .service(add_plant)
        .service(update_plant_quantity)
        .service(get_plant)
        // Orders
        .service(place_order)
        .service(customer_orders)
        .service(seller_orders)
        .service(update_order_status)
        .service(delete_order);
}

/// JSON shape of a stored record: ObjectIds render as hex strings and
/// dates as RFC 3339 strings.
#[derive(Debug)]
pub struct RecordView<T>(pub T);

impl<T> From<T> for RecordView<T> {
    fn from(record: T) -> Self {
        Self(record)
    }
}

impl<T: Serialize> Serialize for RecordView<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let document = bson::to_bson(&self.0).map_err(serde::ser::Error::custom)?;
        api_value(document).serialize(serializer)
    }
}

fn api_value(value: Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(date) => match date.try_to_rfc3339_string() {
            Ok(rendered) => Value::String(rendered),
            Err(_) => Value::from(date.timestamp_millis()),
        },
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, api_value(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(api_value).collect()),
        other => other.into_relaxed_extjson(),
    }
}

pub fn views<T>(records: Vec<T>) -> Vec<RecordView<T>> {
    records.into_iter().map(RecordView::from).collect()
}
