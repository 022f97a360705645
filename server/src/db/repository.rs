use async_trait::async_trait;
use futures_util::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, Database, IndexModel,
};

use super::models::{
    DeleteAck, EnrichedOrder, InsertAck, Order, OrderStatus, Plant, QuantityAdjustment, Role,
    UpdateAck, User, STATUS_REQUESTED,
};
use super::{already_requested, delivered_conflict, order_not_found, PlantNetStore};
use crate::error::{PlantNetError, Result};

const USERS: &str = "users";
const PLANTS: &str = "plants";
const ORDERS: &str = "orders";

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, database_name: &str) -> Self {
        Self {
            db: client.database(database_name),
            client,
        }
    }

    pub async fn connect(uri: &str, database_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(client, database_name))
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn plants(&self) -> Collection<Plant> {
        self.db.collection(PLANTS)
    }

    fn orders(&self) -> Collection<Order> {
        self.db.collection(ORDERS)
    }

    pub async fn init_indexes(&self) -> Result<()> {
        // Create unique index on user email
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users().create_index(email_index).await?;

        let customer_index = IndexModel::builder()
            .keys(doc! { "customer.email": 1 })
            .build();
        self.orders().create_index(customer_index).await?;

        let seller_index = IndexModel::builder().keys(doc! { "seller": 1 }).build();
        self.orders().create_index(seller_index).await?;

        log::info!("Database indexes created successfully");
        Ok(())
    }

    async fn enriched_orders(&self, filter: Document) -> Result<Vec<EnrichedOrder>> {
        let mut cursor = self.orders().aggregate(enrichment_pipeline(filter)).await?;

        let mut orders = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            orders.push(mongodb::bson::from_document(document)?);
        }

        Ok(orders)
    }
}

/// Joins each matched order with its plant and copies the plant's display
/// fields onto the order. `plantId` is stored as a hex string, so it is
/// converted before the lookup; unconvertible ids join nothing and the
/// order is dropped by `$unwind`.
fn enrichment_pipeline(filter: Document) -> Vec<Document> {
    vec![
        doc! { "$match": filter },
        doc! {
            "$addFields": {
                "plantObjectId": {
                    "$convert": {
                        "input": "$plantId",
                        "to": "objectId",
                        "onError": null,
                        "onNull": null,
                    }
                }
            }
        },
        doc! {
            "$lookup": {
                "from": PLANTS,
                "localField": "plantObjectId",
                "foreignField": "_id",
                "as": "plants",
            }
        },
        doc! { "$unwind": "$plants" },
        doc! {
            "$addFields": {
                "name": "$plants.name",
                "image": "$plants.image",
                "category": "$plants.category",
            }
        },
        doc! { "$project": { "plants": 0, "plantObjectId": 0 } },
    ]
}

fn inserted_id(result: mongodb::results::InsertOneResult) -> Result<InsertAck> {
    result
        .inserted_id
        .as_object_id()
        .map(InsertAck::new)
        .ok_or_else(|| PlantNetError::Internal("insert returned a non-ObjectId id".to_string()))
}

#[async_trait]
impl PlantNetStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn upsert_user(&self, user: User) -> Result<User> {
        let mut on_insert = mongodb::bson::to_document(&user)?;
        on_insert.remove("_id");

        let stored = self
            .users()
            .find_one_and_update(
                doc! { "email": user.email.as_str() },
                doc! { "$setOnInsert": on_insert },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        stored.ok_or_else(|| {
            PlantNetError::Internal(format!("upsert for {} returned no document", user.email))
        })
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>> {
        let user = self.users().find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn request_role_change(&self, email: &str) -> Result<UpdateAck> {
        let result = self
            .users()
            .update_one(
                doc! { "email": email, "status": { "$ne": STATUS_REQUESTED } },
                doc! { "$set": { "status": STATUS_REQUESTED } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(already_requested());
        }

        Ok(UpdateAck::new(result.matched_count, result.modified_count))
    }

    async fn update_user_role(&self, email: &str, role: Role) -> Result<UpdateAck> {
        let role = mongodb::bson::to_bson(&role)?;
        let result = self
            .users()
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "role": role }, "$unset": { "status": "" } },
            )
            .await?;

        Ok(UpdateAck::new(result.matched_count, result.modified_count))
    }

    async fn list_users_except(&self, email: &str) -> Result<Vec<User>> {
        let cursor = self
            .users()
            .find(doc! { "email": { "$ne": email } })
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn insert_plant(&self, plant: Plant) -> Result<InsertAck> {
        let result = self.plants().insert_one(&plant).await?;
        inserted_id(result)
    }

    async fn find_plant(&self, id: &ObjectId) -> Result<Option<Plant>> {
        let plant = self.plants().find_one(doc! { "_id": id }).await?;
        Ok(plant)
    }

    async fn list_plants(&self) -> Result<Vec<Plant>> {
        let cursor = self.plants().find(doc! {}).await?;
        let plants: Vec<Plant> = cursor.try_collect().await?;
        Ok(plants)
    }

    async fn adjust_plant_quantity(
        &self,
        id: &ObjectId,
        adjustment: QuantityAdjustment,
    ) -> Result<UpdateAck> {
        let result = self
            .plants()
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "quantity": adjustment.signed_delta() } },
            )
            .await?;

        Ok(UpdateAck::new(result.matched_count, result.modified_count))
    }

    async fn insert_order(&self, order: Order) -> Result<InsertAck> {
        let result = self.orders().insert_one(&order).await?;
        inserted_id(result)
    }

    async fn find_order(&self, id: &ObjectId) -> Result<Option<Order>> {
        let order = self.orders().find_one(doc! { "_id": id }).await?;
        Ok(order)
    }

    async fn customer_orders(&self, email: &str) -> Result<Vec<EnrichedOrder>> {
        self.enriched_orders(doc! { "customer.email": email }).await
    }

    async fn seller_orders(&self, email: &str) -> Result<Vec<EnrichedOrder>> {
        self.enriched_orders(doc! { "seller": email }).await
    }

    async fn update_order_status(&self, id: &ObjectId, status: OrderStatus) -> Result<UpdateAck> {
        let result = self
            .orders()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await?;

        Ok(UpdateAck::new(result.matched_count, result.modified_count))
    }

    async fn delete_order(&self, id: &ObjectId) -> Result<DeleteAck> {
        let result = self
            .orders()
            .delete_one(doc! {
                "_id": id,
                "status": { "$ne": OrderStatus::Delivered.as_str() },
            })
            .await?;

        if result.deleted_count > 0 {
            return Ok(DeleteAck::new(result.deleted_count));
        }

        // Nothing deleted: either it was delivered or it never existed.
        match self.find_order(id).await? {
            Some(_) => Err(delivered_conflict()),
            None => Err(order_not_found(id)),
        }
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        log::info!("MongoDB client shut down");
    }
}
