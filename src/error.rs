// ⚠️  Error Taxonomy - one variant per failure class, one HTTP status each
//
// Everything the core can refuse to do is expressed here. The API layer maps
// each variant to exactly one status code; nothing is swallowed on the way up
// and internal detail never leaks into a response body.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or missing input (400)
    #[error("{0}")]
    Validation(String),

    /// Unknown email or wrong password - deliberately indistinguishable (401)
    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// Missing, expired, or tampered credential token (401)
    #[error("Authentication failed. Please log in again.")]
    Unauthenticated,

    /// Valid identity, wrong role for the action (403)
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist (404)
    #[error("{0} not found")]
    NotFound(String),

    /// Uniqueness violation (409)
    #[error("{0}")]
    Conflict(String),

    /// Approval state machine precondition violated (409)
    #[error("{0}")]
    InvalidTransition(String),

    /// Store failure or other unexpected fault (500, logged, not exposed)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// The single HTTP-equivalent status for this failure class.
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Validation(_) => 400,
            GatewayError::InvalidCredentials => 401,
            GatewayError::Unauthenticated => 401,
            GatewayError::Forbidden(_) => 403,
            GatewayError::NotFound(_) => 404,
            GatewayError::Conflict(_) => 409,
            GatewayError::InvalidTransition(_) => 409,
            GatewayError::Internal(_) => 500,
        }
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => GatewayError::NotFound("record".to_string()),
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                GatewayError::Conflict("unique constraint violated".to_string())
            }
            other => GatewayError::Internal(other.into()),
        }
    }
}
