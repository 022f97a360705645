use actix_web::{get, middleware::from_fn, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{views, RecordView};
use crate::{
    auth_token::SessionClaims,
    db::{
        models::{Role, User},
        PlantNetStore,
    },
    error::Result,
    middleware::auth_middleware,
};

/// Profile posted on sign-in. Anything besides the typed fields is kept.
#[derive(Debug, Deserialize)]
pub struct UserProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfileRequest {
    fn into_profile(self) -> Map<String, Value> {
        let mut profile = self.extra;
        if let Some(name) = self.name {
            profile.insert("name".to_string(), Value::String(name));
        }
        if let Some(image) = self.image {
            profile.insert("image".to_string(), Value::String(image));
        }
        profile
    }
}

#[post("/users/{email}")]
pub async fn save_user(
    email: web::Path<String>,
    profile: web::Json<UserProfileRequest>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let email = email.into_inner();
    let user = User::new_customer(email, profile.into_inner().into_profile());

    let stored = store.upsert_user(user).await?;
    log::info!("Signed in user {} ({:?})", stored.email, stored.role);

    Ok(HttpResponse::Ok().json(RecordView::from(stored)))
}

#[patch("/users/{email}", wrap = "from_fn(auth_middleware)")]
pub async fn request_role_change(
    email: web::Path<String>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let ack = store.request_role_change(&email).await?;
    log::info!("Role change requested by {}", email);

    Ok(HttpResponse::Ok().json(ack))
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[get("/users/role/{email}")]
pub async fn user_role(
    email: web::Path<String>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let role = store.user_role(&email).await?;
    Ok(HttpResponse::Ok().json(RoleResponse { role }))
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

#[patch("/users/role/{email}", wrap = "from_fn(auth_middleware)")]
pub async fn update_user_role(
    email: web::Path<String>,
    req: web::Json<RoleUpdateRequest>,
    store: web::Data<dyn PlantNetStore>,
    session: web::ReqData<SessionClaims>,
) -> Result<HttpResponse> {
    let ack = store.update_user_role(&email, req.role).await?;
    log::info!(
        "{} set role of {} to {:?} (matched: {})",
        session.email,
        email,
        req.role,
        ack.matched_count
    );

    Ok(HttpResponse::Ok().json(ack))
}

#[get("/all-users/{email}", wrap = "from_fn(auth_middleware)")]
pub async fn list_users(
    email: web::Path<String>,
    store: web::Data<dyn PlantNetStore>,
) -> Result<HttpResponse> {
    let users = store.list_users_except(&email).await?;
    Ok(HttpResponse::Ok().json(views(users)))
}
