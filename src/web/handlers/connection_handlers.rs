// src/web/handlers/connection_handlers.rs
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::State;
use std::collections::HashMap;
use tracing::{error, info, warn};

use crate::core::config_manager::AppConfig;
use crate::core::finch_client::{CONNECT_PRODUCTS, REAUTH_PRODUCTS};
use crate::core::FinchClient;
use crate::store::connections::pick_active;
use crate::store::ConnectionStore;
use crate::template_processor::Page;
use crate::web::pages::{self, ConnectionSummary};
use crate::web::types::{IntrospectionData, JsonResult, StandardErrorResponse};

const CUSTOMER_NAME: &str = "x";
const UNKNOWN_COMPANY: &str = "Unknown Company";

pub async fn home_handler(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    let rows = match connections.all().await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to read connections: {:#}", e);
            return pages::error_page("Connections unavailable", "Could not read stored connections.");
        }
    };
    let active_id = pick_active(&rows).map(|row| row.connection_id.clone());

    let mut summaries = Vec::with_capacity(rows.len());
    for row in &rows {
        let (company_name, status) = match finch.company(&row.access_token).await {
            Ok(company) => (
                company
                    .legal_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
                "Active".to_string(),
            ),
            Err(e) => {
                warn!("Company lookup failed for {}: {}", row.connection_id, e);
                (UNKNOWN_COMPANY.to_string(), "Error".to_string())
            }
        };

        summaries.push(ConnectionSummary {
            connection_id: row.connection_id.clone(),
            provider_id: row.provider_id.clone().unwrap_or_default(),
            company_name,
            status,
            is_active: row.active || active_id.as_deref() == Some(row.connection_id.as_str()),
            has_payroll: row.has_payroll(),
            products: row.products.clone(),
        });
    }

    let mut vars = HashMap::new();
    vars.insert("rows", pages::connections_table(&summaries));
    pages::render(Page::Index, "Connections", vars)
}

pub async fn select_provider_handler(
    connection_id: &str,
    connections: &State<ConnectionStore>,
) -> Redirect {
    match connections.set_active(connection_id).await {
        Ok(true) => Redirect::to("/directory"),
        Ok(false) => {
            warn!("Unknown connection selected: {}", connection_id);
            Redirect::to("/")
        }
        Err(e) => {
            error!("Failed to activate {}: {:#}", connection_id, e);
            Redirect::to("/")
        }
    }
}

pub async fn connect_handler(
    config: &State<AppConfig>,
    finch: &State<FinchClient>,
) -> Result<Redirect, (Status, RawHtml<String>)> {
    let credentials = config.credentials().map_err(|e| {
        error!("{}", e);
        (
            Status::InternalServerError,
            pages::error_page("Connect unavailable", "Client credentials are not configured."),
        )
    })?;

    let customer_id = uuid::Uuid::new_v4().to_string();
    match finch
        .create_session(credentials, &customer_id, CUSTOMER_NAME, &CONNECT_PRODUCTS)
        .await
    {
        Ok(session) => {
            info!("Connect session created for customer {}", customer_id);
            Ok(Redirect::to(session.connect_url))
        }
        Err(e) => {
            error!("Failed to create connect session: {}", e);
            Err((
                Status::BadGateway,
                pages::error_page("Connect unavailable", "Could not start a connect session."),
            ))
        }
    }
}

/// Re-run Connect for an existing connection with the payroll products added.
pub async fn reauth_handler(
    connection_id: &str,
    config: &State<AppConfig>,
    finch: &State<FinchClient>,
) -> Redirect {
    let credentials = match config.credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Reauth error: {}", e);
            return Redirect::to("/");
        }
    };

    match finch
        .reauthenticate_session(credentials, connection_id, &REAUTH_PRODUCTS)
        .await
    {
        Ok(session) => Redirect::to(session.connect_url),
        Err(e) => {
            error!("Reauth error: {}", e);
            Redirect::to("/")
        }
    }
}

pub async fn authorize_handler(
    code: Option<&str>,
    config: &State<AppConfig>,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> Result<Redirect, (Status, RawHtml<String>)> {
    let Some(code) = code.filter(|c| !c.is_empty()) else {
        return Err((
            Status::BadRequest,
            pages::error_page("Authorization failed", "No authorization code was provided."),
        ));
    };

    let credentials = config.credentials().map_err(|e| {
        error!("{}", e);
        (
            Status::InternalServerError,
            pages::error_page("Authorization failed", "Client credentials are not configured."),
        )
    })?;

    let token = finch.exchange_code(credentials, code).await.map_err(|e| {
        error!("Token exchange failed: {}", e);
        (
            Status::BadGateway,
            pages::error_page("Authorization failed", "Could not exchange the authorization code."),
        )
    })?;

    connections.upsert(&token).await.map_err(|e| {
        error!("Failed to store token for {}: {:#}", token.connection_id, e);
        (
            Status::InternalServerError,
            pages::error_page("Authorization failed", "Could not store the access token."),
        )
    })?;

    Ok(Redirect::to("/directory"))
}

/// Log and return what the vendor knows about the active connection.
pub async fn introspect_handler(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> JsonResult<IntrospectionData> {
    let access_token = connections.access_token().await.map_err(|e| {
        StandardErrorResponse::new(
            format!("Error introspecting connection: {}", e),
            "NO_CONNECTION",
            vec!["Connect a provider first".to_string()],
        )
        .with_status(Status::InternalServerError)
    })?;

    match finch.introspect(&access_token).await {
        Ok(introspection) => {
            let connection_status = introspection
                .connection_status
                .as_ref()
                .and_then(|s| s.status.clone());

            info!("Connection introspection");
            info!("Connection ID: {:?}", introspection.connection_id);
            info!("Provider ID: {:?}", introspection.provider_id);
            info!("Current Products: {:?}", introspection.products);
            info!(
                "Connection Status: {}",
                connection_status.as_deref().unwrap_or("Unknown")
            );
            info!("Full Introspection: {:?}", introspection);

            Ok(Json(IntrospectionData {
                connection_id: introspection.connection_id,
                provider_id: introspection.provider_id,
                products: introspection.products,
                connection_status,
                message: "Connection details logged to server console".to_string(),
            }))
        }
        Err(e) => {
            let message = format!("Error introspecting connection: {}", e);
            error!("INTROSPECT ERROR: {}", message);
            Err(StandardErrorResponse::new(
                message,
                "INTROSPECT_ERROR",
                vec!["Reconnect the provider if the token was revoked".to_string()],
            )
            .with_status(Status::InternalServerError))
        }
    }
}
