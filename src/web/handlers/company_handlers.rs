// src/web/handlers/company_handlers.rs
use rocket::response::content::RawHtml;
use rocket::State;
use std::collections::HashMap;
use tracing::error;

use crate::core::FinchClient;
use crate::error::DataKind;
use crate::store::ConnectionStore;
use crate::template_processor::Page;
use crate::types::hris::{Company, DirectoryEntry};
use crate::web::handlers::active_token;
use crate::web::pages;

/// Company record, or the message to show in its place.
pub async fn load_company(finch: &FinchClient, access_token: &str) -> Result<Company, String> {
    finch.company(access_token).await.map_err(|e| {
        error!("{}", e);
        e.user_message(DataKind::Company)
    })
}

pub async fn company_handler(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    let result = match active_token(connections).await {
        Ok(token) => load_company(finch, &token).await,
        Err(message) => Err(message),
    };

    let (company, error_message) = split(result);
    let mut vars = HashMap::new();
    vars.insert(
        "company",
        pages::company_section(company.as_ref(), error_message.as_deref()),
    );
    pages::render(Page::Company, "Company", vars)
}

pub async fn directory_handler(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    let (directory, company) = match active_token(connections).await {
        Ok(token) => {
            let directory: Result<Vec<DirectoryEntry>, String> =
                finch.directory(&token).await.map_err(|e| {
                    error!("{}", e);
                    e.user_message(DataKind::Directory)
                });
            let company = load_company(finch, &token).await;
            (directory, company)
        }
        Err(message) => (Err(message.clone()), Err(message)),
    };

    let (individuals, directory_error) = split(directory);
    let (company, company_error) = split(company);

    let mut vars = HashMap::new();
    vars.insert(
        "directory",
        pages::directory_table(
            individuals.as_deref().unwrap_or_default(),
            directory_error.as_deref(),
        ),
    );
    vars.insert(
        "company",
        pages::company_section(company.as_ref(), company_error.as_deref()),
    );
    pages::render(Page::Directory, "Directory", vars)
}

pub(crate) fn split<T>(result: Result<T, String>) -> (Option<T>, Option<String>) {
    match result {
        Ok(value) => (Some(value), None),
        Err(message) => (None, Some(message)),
    }
}
