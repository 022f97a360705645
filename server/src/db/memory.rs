use async_trait::async_trait;
use dashmap::DashMap;
use mongodb::bson::oid::ObjectId;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use super::models::{
    DeleteAck, EnrichedOrder, InsertAck, Order, OrderStatus, Plant, QuantityAdjustment, Role,
    UpdateAck, User, STATUS_REQUESTED,
};
use super::{already_requested, delivered_conflict, order_not_found, PlantNetStore};
use crate::error::Result;

/// In-process store with the same semantics as `MongoStore`. Guarded writes
/// run under the shard lock of the affected entry.
#[derive(Clone, Default)]
pub struct MemoryStore {
    // email -> user
    users: Arc<DashMap<String, User>>,
    plants: Arc<DashMap<ObjectId, Plant>>,
    orders: Arc<DashMap<ObjectId, Order>>,
    closed: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn enriched<F>(&self, predicate: F) -> Vec<EnrichedOrder>
    where
        F: Fn(&Order) -> bool,
    {
        let mut matched: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_by_id(&mut matched, |order| order.id);

        matched
            .into_iter()
            .filter_map(|order| {
                let plant_id = order.plant_object_id()?;
                let plant = self.plants.get(&plant_id)?;
                Some(EnrichedOrder::new(order, plant.value()))
            })
            .collect()
    }
}

/// ObjectIds grow with creation time, so this approximates insertion order.
fn sort_by_id<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> Option<ObjectId>,
{
    items.sort_by_key(|item| key(item).map(|id| id.bytes()));
}

#[async_trait]
impl PlantNetStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert_user(&self, mut user: User) -> Result<User> {
        let stored = self
            .users
            .entry(user.email.clone())
            .or_insert_with(|| {
                user.id = Some(ObjectId::new());
                log::debug!("Inserted user {}", user.email);
                user
            });
        Ok(stored.value().clone())
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.get(email).map(|user| user.value().clone()))
    }

    async fn request_role_change(&self, email: &str) -> Result<UpdateAck> {
        let mut user = self.users.get_mut(email).ok_or_else(already_requested)?;
        if user.has_pending_request() {
            return Err(already_requested());
        }

        user.status = Some(STATUS_REQUESTED.to_string());
        Ok(UpdateAck::new(1, 1))
    }

    async fn update_user_role(&self, email: &str, role: Role) -> Result<UpdateAck> {
        match self.users.get_mut(email) {
            Some(mut user) => {
                let modified = user.role != role || user.status.is_some();
                user.role = role;
                user.status = None;
                Ok(UpdateAck::new(1, u64::from(modified)))
            }
            None => Ok(UpdateAck::new(0, 0)),
        }
    }

    async fn list_users_except(&self, email: &str) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.key() != email)
            .map(|entry| entry.value().clone())
            .collect();
        sort_by_id(&mut users, |user| user.id);
        Ok(users)
    }

    async fn insert_plant(&self, mut plant: Plant) -> Result<InsertAck> {
        let id = ObjectId::new();
        plant.id = Some(id);
        self.plants.insert(id, plant);
        Ok(InsertAck::new(id))
    }

    async fn find_plant(&self, id: &ObjectId) -> Result<Option<Plant>> {
        Ok(self.plants.get(id).map(|plant| plant.value().clone()))
    }

    async fn list_plants(&self) -> Result<Vec<Plant>> {
        let mut plants: Vec<Plant> = self
            .plants
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_by_id(&mut plants, |plant| plant.id);
        Ok(plants)
    }

    async fn adjust_plant_quantity(
        &self,
        id: &ObjectId,
        adjustment: QuantityAdjustment,
    ) -> Result<UpdateAck> {
        match self.plants.get_mut(id) {
            Some(mut plant) => {
                let delta = adjustment.signed_delta();
                plant.quantity = plant.quantity.saturating_add(delta);
                Ok(UpdateAck::new(1, u64::from(delta != 0)))
            }
            None => Ok(UpdateAck::new(0, 0)),
        }
    }

    async fn insert_order(&self, mut order: Order) -> Result<InsertAck> {
        let id = ObjectId::new();
        order.id = Some(id);
        self.orders.insert(id, order);
        Ok(InsertAck::new(id))
    }

    async fn find_order(&self, id: &ObjectId) -> Result<Option<Order>> {
        Ok(self.orders.get(id).map(|order| order.value().clone()))
    }

    async fn customer_orders(&self, email: &str) -> Result<Vec<EnrichedOrder>> {
        Ok(self.enriched(|order| order.customer.email == email))
    }

    async fn seller_orders(&self, email: &str) -> Result<Vec<EnrichedOrder>> {
        Ok(self.enriched(|order| order.seller.as_deref() == Some(email)))
    }

    async fn update_order_status(&self, id: &ObjectId, status: OrderStatus) -> Result<UpdateAck> {
        match self.orders.get_mut(id) {
            Some(mut order) => {
                let modified = order.status != status;
                order.status = status;
                Ok(UpdateAck::new(1, u64::from(modified)))
            }
            None => Ok(UpdateAck::new(0, 0)),
        }
    }

    async fn delete_order(&self, id: &ObjectId) -> Result<DeleteAck> {
        let removed = self
            .orders
            .remove_if(id, |_, order| order.status != OrderStatus::Delivered);

        if removed.is_some() {
            return Ok(DeleteAck::new(1));
        }

        if self.orders.contains_key(id) {
            Err(delivered_conflict())
        } else {
            Err(order_not_found(id))
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        log::info!(
            "Memory store closed ({} users, {} plants, {} orders)",
            self.users.len(),
            self.plants.len(),
            self.orders.len()
        );
    }
}
