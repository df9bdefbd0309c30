pub mod benefit_handlers;
pub mod company_handlers;
pub mod connection_handlers;
pub mod employee_handlers;
pub mod job_handlers;
pub mod system_handlers;

pub use benefit_handlers::*;
pub use company_handlers::*;
pub use connection_handlers::*;
pub use employee_handlers::*;
pub use job_handlers::*;
pub use system_handlers::*;

use rocket::http::Status;
use tracing::error;

use crate::store::{ConnectionRecord, ConnectionStore};
use crate::web::types::{ApiError, StandardErrorResponse};

/// The active connection, or the message to show instead of its data.
pub(crate) async fn active_connection(
    connections: &ConnectionStore,
) -> Result<ConnectionRecord, String> {
    match connections.active().await {
        Ok(Some(connection)) => Ok(connection),
        Ok(None) => Err(crate::store::NO_TOKEN_MESSAGE.to_string()),
        Err(e) => {
            error!("Failed to read connections: {:#}", e);
            Err(crate::error::UNEXPECTED_ERROR.to_string())
        }
    }
}

pub(crate) async fn active_token(connections: &ConnectionStore) -> Result<String, String> {
    active_connection(connections)
        .await
        .map(|connection| connection.access_token)
}

pub(crate) fn no_connection_error(message: String) -> ApiError {
    StandardErrorResponse::new(
        message,
        "NO_CONNECTION",
        vec!["Connect a provider first".to_string()],
    )
    .with_status(Status::InternalServerError)
}
