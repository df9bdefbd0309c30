// src/web/handlers/benefit_handlers.rs
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::State;
use std::collections::HashMap;
use tracing::error;

use crate::core::FinchClient;
use crate::error::DataKind;
use crate::store::ConnectionStore;
use crate::template_processor::Page;
use crate::types::hris::BenefitEnrollment;
use crate::utils::is_safe_id;
use crate::web::handlers::{active_token, company_handlers::split, no_connection_error};
use crate::web::pages;
use crate::web::types::{ApiResult, DataResponse, StandardErrorResponse};

pub async fn benefits_handler(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    let result = match active_token(connections).await {
        Ok(token) => finch.benefits(&token).await.map_err(|e| {
            error!("{}", e);
            e.user_message(DataKind::Benefits)
        }),
        Err(message) => Err(message),
    };

    let (benefits, benefits_error) = split(result);
    let mut vars = HashMap::new();
    vars.insert(
        "benefits",
        pages::benefits_table(
            benefits.as_deref().unwrap_or_default(),
            benefits_error.as_deref(),
        ),
    );
    pages::render(Page::Benefits, "Benefits", vars)
}

/// Individuals enrolled in one company benefit.
pub async fn benefit_enrollments_handler(
    benefit_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> ApiResult<Vec<BenefitEnrollment>> {
    if !is_safe_id(benefit_id) {
        return Err(StandardErrorResponse::new(
            format!("Invalid benefit id: {}", benefit_id),
            "BAD_REQUEST",
            vec!["Use the benefit id shown on the benefits page".to_string()],
        )
        .with_status(Status::BadRequest));
    }

    let token = active_token(connections)
        .await
        .map_err(no_connection_error)?;

    match finch.benefit_enrollments(&token, benefit_id).await {
        Ok(enrollments) => Ok(Json(DataResponse::success(
            format!("{} enrolled individual(s)", enrollments.len()),
            enrollments,
        ))),
        Err(e) => {
            error!("{}", e);
            let status = if e.is_api() {
                Status::BadRequest
            } else {
                Status::InternalServerError
            };
            Err(StandardErrorResponse::new(
                e.user_message(DataKind::Benefits),
                "BENEFITS_ERROR",
                vec!["Re-authenticate the connection with benefits access".to_string()],
            )
            .with_status(status))
        }
    }
}
