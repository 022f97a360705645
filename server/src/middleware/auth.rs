use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, HttpMessage,
};

use crate::auth_token::{now_secs, AuthTokenService, SessionClaims};
use crate::error::PlantNetError;

pub const TOKEN_COOKIE: &str = "token";

/// Rejects the request with 401 unless the `token` cookie carries a valid
/// session token. On success the decoded `SessionClaims` are stored in the
/// request extensions for `web::ReqData`.
pub async fn auth_middleware<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error>
where
    B: MessageBody + 'static,
{
    match authenticate(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        // The rejection is rendered here so the handler never runs.
        Err(err) => Ok(req.error_response(err).map_into_right_body()),
    }
}

fn authenticate(req: &ServiceRequest) -> Result<SessionClaims, PlantNetError> {
    // Extract token from cookie
    let token = req
        .cookie(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(PlantNetError::Unauthorized)?;

    let tokens = req
        .app_data::<web::Data<AuthTokenService>>()
        .ok_or_else(|| PlantNetError::Internal("Token service not available".to_string()))?;

    tokens.verify(&token, now_secs()).map_err(|err| {
        log::warn!("Rejected session token for {}: {}", req.path(), err);
        PlantNetError::Unauthorized
    })
}
