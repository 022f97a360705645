use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_REQUESTED: &str = "Requested";

/// Timestamps are written as BSON dates. Reads accept a BSON date or an
/// RFC 3339 string.
mod bson_date {
    use chrono::{DateTime, Utc};
    use mongodb::bson::{self, Bson};
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        bson::DateTime::from_millis(value.timestamp_millis()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        from_bson(Bson::deserialize(deserializer)?)
    }

    fn from_bson<E: Error>(value: Bson) -> Result<DateTime<Utc>, E> {
        match value {
            Bson::DateTime(date) => DateTime::from_timestamp_millis(date.timestamp_millis())
                .ok_or_else(|| E::custom("date out of range")),
            Bson::String(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|date| date.with_timezone(&Utc))
                .map_err(E::custom),
            other => Err(E::custom(format!("expected a date, found {other}"))),
        }
    }

    pub mod optional {
        use super::*;

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Bson::deserialize(deserializer)? {
                Bson::Null => Ok(None),
                other => from_bson(other).map(Some),
            }
        }
    }
}

/// Keys owned by the server on a user document; never copied from a
/// client-supplied profile.
const RESERVED_USER_KEYS: &[&str] = &["_id", "email", "role", "status", "timestamp"];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Seller,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(with = "bson_date")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    /// A first-time sign-in: always a customer, whatever the profile claims.
    pub fn new_customer(email: String, mut profile: Map<String, Value>) -> Self {
        for key in RESERVED_USER_KEYS {
            profile.remove(*key);
        }

        Self {
            id: None,
            email,
            role: Role::Customer,
            status: None,
            timestamp: Utc::now(),
            profile,
        }
    }

    pub fn has_pending_request(&self) -> bool {
        self.status.as_deref() == Some(STATUS_REQUESTED)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Seller {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<Seller>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub email: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(alias = "customar")]
    pub customer: Customer,
    #[serde(rename = "plantId")]
    pub plant_id: String,
    pub quantity: i64,
    pub price: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(
        rename = "createdAt",
        default,
        skip_serializing_if = "Option::is_none",
        with = "bson_date::optional"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Order {
    pub fn plant_object_id(&self) -> Option<ObjectId> {
        ObjectId::parse_str(&self.plant_id).ok()
    }
}

/// An order with name/image/category copied from its plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub name: String,
    pub image: String,
    pub category: String,
}

impl EnrichedOrder {
    pub fn new(mut order: Order, plant: &Plant) -> Self {
        for key in ["name", "image", "category", "plants"] {
            order.details.remove(key);
        }

        Self {
            order,
            name: plant.name.clone(),
            image: plant.image.clone(),
            category: plant.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityDirection {
    Increase,
    Decrease,
}

impl QuantityDirection {
    /// Anything other than `"increase"` decreases stock.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some("increase") => QuantityDirection::Increase,
            _ => QuantityDirection::Decrease,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityAdjustment {
    pub amount: i64,
    pub direction: QuantityDirection,
}

impl QuantityAdjustment {
    pub fn signed_delta(&self) -> i64 {
        match self.direction {
            QuantityDirection::Increase => self.amount,
            QuantityDirection::Decrease => self.amount.saturating_neg(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertAck {
    pub fn new(id: ObjectId) -> Self {
        Self {
            acknowledged: true,
            inserted_id: id.to_hex(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateAck {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}
