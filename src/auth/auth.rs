use crate::auth::gate::{self, Operation};
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppResult;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

/// Caller identity, if any. Extraction never fails: a missing, malformed or
/// expired token just yields an anonymous session, and the access gate
/// decides where to send it.
pub struct Session {
    pub user: Option<AuthUser>,
}

impl Session {
    pub fn authorize(&self, op: Operation) -> AppResult<&AuthUser> {
        gate::authorize(self.user.as_ref(), op)
    }
}

fn user_from_request(req: &HttpRequest) -> Option<AuthUser> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))?;

    let config = req.app_data::<Data<Config>>()?;

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            return None;
        }
    };

    let role = Role::from_name(&claims.role)?;

    Some(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
    })
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Session {
            user: user_from_request(req),
        }))
    }
}
