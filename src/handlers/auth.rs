use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::identity::{Identity, Role};
use crate::errors::AppError;

/// Headers set by the upstream authentication proxy. This service trusts them
/// blindly; token verification happens before the request reaches us.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

fn identity_from(req: &HttpRequest) -> Result<Identity, AppError> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    let user_id = header(USER_ID_HEADER)
        .and_then(|v| Uuid::parse_str(&v).ok())
        .ok_or(AppError::Forbidden)?;
    let role = header(USER_ROLE_HEADER)
        .and_then(|v| v.parse::<Role>().ok())
        .ok_or(AppError::Forbidden)?;
    let email = header(USER_EMAIL_HEADER).unwrap_or_default();

    Ok(Identity {
        user_id,
        email,
        role,
    })
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Identity, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from(req))
    }
}
