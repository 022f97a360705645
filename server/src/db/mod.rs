pub mod memory;
pub mod models;
pub mod repository;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::{PlantNetError, Result};
use models::{
    DeleteAck, EnrichedOrder, InsertAck, Order, OrderStatus, Plant, QuantityAdjustment, Role,
    UpdateAck, User,
};

pub use memory::MemoryStore;
pub use repository::MongoStore;

pub const DELIVERED_ORDER_MESSAGE: &str = "Can't remove the product, This item already delivered!";
pub const ALREADY_REQUESTED_MESSAGE: &str = "You have already requested, please wait!";

/// Data access for the users, plants and orders collections.
///
/// Implementations must apply the guarded writes (`delete_order`,
/// `request_role_change`) as a single conditional operation, so concurrent
/// requests cannot both pass the precondition.
#[async_trait]
pub trait PlantNetStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;

    /// Returns the stored user for `user.email`, inserting `user` first if
    /// there is none. An existing record is never modified.
    async fn upsert_user(&self, user: User) -> Result<User>;

    async fn find_user(&self, email: &str) -> Result<Option<User>>;

    async fn user_role(&self, email: &str) -> Result<Option<Role>> {
        Ok(self.find_user(email).await?.map(|user| user.role))
    }

    /// Marks the user as `Requested`. Fails with `BadRequest` when the user
    /// does not exist or already has a pending request.
    async fn request_role_change(&self, email: &str) -> Result<UpdateAck>;

    /// Sets the role and clears any pending request.
    async fn update_user_role(&self, email: &str, role: Role) -> Result<UpdateAck>;

    async fn list_users_except(&self, email: &str) -> Result<Vec<User>>;

    async fn insert_plant(&self, plant: Plant) -> Result<InsertAck>;

    async fn find_plant(&self, id: &ObjectId) -> Result<Option<Plant>>;

    async fn list_plants(&self) -> Result<Vec<Plant>>;

    /// Applies the signed delta to the stored quantity. There is no floor.
    async fn adjust_plant_quantity(
        &self,
        id: &ObjectId,
        adjustment: QuantityAdjustment,
    ) -> Result<UpdateAck>;

    async fn insert_order(&self, order: Order) -> Result<InsertAck>;

    async fn find_order(&self, id: &ObjectId) -> Result<Option<Order>>;

    /// Orders placed by `email`, joined with their plants. Orders whose
    /// plant cannot be resolved are left out.
    async fn customer_orders(&self, email: &str) -> Result<Vec<EnrichedOrder>>;

    /// Orders addressed to the seller `email`, joined like `customer_orders`.
    async fn seller_orders(&self, email: &str) -> Result<Vec<EnrichedOrder>>;

    async fn update_order_status(&self, id: &ObjectId, status: OrderStatus) -> Result<UpdateAck>;

    /// Deletes the order unless it was delivered (`Conflict`). A missing
    /// order yields `NotFound`.
    async fn delete_order(&self, id: &ObjectId) -> Result<DeleteAck>;

    async fn close(&self);
}

pub fn parse_object_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| PlantNetError::InvalidId(raw.to_string()))
}

pub(crate) fn delivered_conflict() -> PlantNetError {
    PlantNetError::Conflict(DELIVERED_ORDER_MESSAGE.to_string())
}

pub(crate) fn already_requested() -> PlantNetError {
    PlantNetError::BadRequest(ALREADY_REQUESTED_MESSAGE.to_string())
}

pub(crate) fn order_not_found(id: &ObjectId) -> PlantNetError {
    PlantNetError::NotFound(format!("Order {} not found", id.to_hex()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn parse_malformed_object_id() {
        assert!(matches!(
            parse_object_id("not-an-id"),
            Err(PlantNetError::InvalidId(raw)) if raw == "not-an-id"
        ));
    }
}
