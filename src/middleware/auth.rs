use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Header the identity gateway sets after authenticating the caller.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's user id, trusted as supplied by the identity gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

pub fn user_id_from_request(req: &HttpRequest) -> AppResult<Uuid> {
    let header = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or(AppError::Unauthorized)?;
    let value = header.to_str().map_err(|_| AppError::Unauthorized)?;
    Uuid::parse_str(value.trim()).map_err(|_| AppError::Unauthorized)
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<AppResult<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(user_id_from_request(req).map(AuthenticatedUser))
    }
}
