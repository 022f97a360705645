use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    get, post, web, HttpResponse,
};
use serde::Serialize;

use crate::{
    auth_token::{now_secs, AuthTokenService, SessionIdentity},
    config::AppConfig,
    error::{PlantNetError, Result},
    middleware::TOKEN_COOKIE,
};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
}

fn same_site(production: bool) -> SameSite {
    if production {
        SameSite::None
    } else {
        SameSite::Strict
    }
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, max_age: std::time::Duration, production: bool) -> Cookie<'static> {
    let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);

    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(same_site(production))
        .max_age(Duration::seconds(max_age))
        .finish()
}

/// Cookie instructing the client to drop its session token. The token
/// itself stays valid until it expires.
pub fn removal_cookie(production: bool) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(same_site(production))
        .max_age(Duration::seconds(0))
        .finish()
}

#[post("/jwt")]
pub async fn issue_token(
    identity: web::Json<SessionIdentity>,
    tokens: web::Data<AuthTokenService>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse> {
    let identity = identity.into_inner();
    let email = identity.email.clone();

    let token = tokens
        .issue(identity, now_secs())
        .map_err(|err| PlantNetError::Internal(format!("Failed to issue auth token: {err}")))?;

    log::info!("Issued session token for {}", email);

    let cookie = session_cookie(token, tokens.ttl(), config.is_production());
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(SessionResponse { success: true }))
}

#[get("/logout")]
pub async fn logout(config: web::Data<AppConfig>) -> Result<HttpResponse> {
    log::debug!("Clearing session cookie");

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(config.is_production()))
        .json(SessionResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_cookie_is_cross_site() {
        let cookie = session_cookie(
            "abc".to_string(),
            std::time::Duration::from_secs(60),
            true,
        );
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(60)));
    }

    #[test]
    fn development_cookie_is_strict() {
        let cookie = session_cookie(
            "abc".to_string(),
            std::time::Duration::from_secs(60),
            false,
        );
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie(false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(0)));
        assert_eq!(cookie.path(), Some("/"));
    }
}
