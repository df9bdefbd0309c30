// src/web/mod.rs

pub mod handlers;
pub mod pages;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{catchers, get, post, routes, Build, Rocket, State};
use tracing::info;

use crate::core::config_manager::AppConfig;
use crate::core::FinchClient;
use crate::store::{ConnectionStore, JobStore};
use crate::types::hris::BenefitEnrollment;

// ===== Connections =====

#[get("/")]
pub async fn home(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    handlers::home_handler(finch, connections).await
}

#[get("/select_provider/<connection_id>")]
pub async fn select_provider(
    connection_id: &str,
    connections: &State<ConnectionStore>,
) -> Redirect {
    handlers::select_provider_handler(connection_id, connections).await
}

#[get("/connect")]
pub async fn connect(
    config: &State<AppConfig>,
    finch: &State<FinchClient>,
) -> Result<Redirect, (Status, RawHtml<String>)> {
    handlers::connect_handler(config, finch).await
}

#[get("/reauth/<connection_id>")]
pub async fn reauth(
    connection_id: &str,
    config: &State<AppConfig>,
    finch: &State<FinchClient>,
) -> Redirect {
    handlers::reauth_handler(connection_id, config, finch).await
}

#[get("/authorize?<code>")]
pub async fn authorize(
    code: Option<&str>,
    config: &State<AppConfig>,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> Result<Redirect, (Status, RawHtml<String>)> {
    handlers::authorize_handler(code, config, finch, connections).await
}

#[get("/introspect")]
pub async fn introspect(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> JsonResult<IntrospectionData> {
    handlers::introspect_handler(finch, connections).await
}

// ===== Organization =====

#[get("/company")]
pub async fn company(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    handlers::company_handler(finch, connections).await
}

#[get("/directory")]
pub async fn directory(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    handlers::directory_handler(finch, connections).await
}

#[get("/employee/<employee_id>")]
pub async fn employee_page(
    employee_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    handlers::employee_page_handler(employee_id, finch, connections).await
}

#[get("/api/employee/<employee_id>")]
pub async fn employee_detail(
    employee_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> JsonResult<EmployeeData> {
    handlers::employee_api_handler(employee_id, finch, connections).await
}

#[get("/api/employee/<employee_id>/payments")]
pub async fn employee_payments(
    employee_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> JsonResult<EmployeePayments> {
    handlers::employee_payments_handler(employee_id, finch, connections).await
}

// ===== Benefits =====

#[get("/benefits")]
pub async fn benefits(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    handlers::benefits_handler(finch, connections).await
}

#[get("/api/benefits/<benefit_id>/individuals")]
pub async fn benefit_enrollments(
    benefit_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> ApiResult<Vec<BenefitEnrollment>> {
    handlers::benefit_enrollments_handler(benefit_id, finch, connections).await
}

// ===== Jobs =====

#[get("/jobs")]
pub async fn jobs(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
    job_store: &State<JobStore>,
) -> RawHtml<String> {
    handlers::jobs_handler(finch, connections, job_store).await
}

#[post("/jobs")]
pub async fn create_job(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
    job_store: &State<JobStore>,
) -> Result<Redirect, (Status, RawHtml<String>)> {
    handlers::create_job_handler(finch, connections, job_store).await
}

#[get("/api/jobs/<job_id>")]
pub async fn job_status(
    job_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
    job_store: &State<JobStore>,
) -> ApiResult<JobStatusData> {
    handlers::job_status_handler(job_id, finch, connections, job_store).await
}

// ===== System =====

#[get("/health")]
pub async fn health(
    config: &State<ServerConfig>,
    connections: &State<ConnectionStore>,
) -> &'static str {
    handlers::health_handler(config, connections).await
}

#[rocket::catch(404)]
pub fn not_found() -> RawHtml<String> {
    pages::error_page("Not found", "This page does not exist.")
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR",
        vec![
            "Try again in a few moments".to_string(),
            "Check the server log for details".to_string(),
        ],
    ))
}

/// Assemble the application with its state. The caller picks the Rocket
/// configuration (port, address) through `figment`.
pub fn build_rocket(config: AppConfig, figment: rocket::figment::Figment) -> Result<Rocket<Build>> {
    let finch = FinchClient::new(&config.finch)?;
    let connections = ConnectionStore::new(config.tokens_path());
    let job_store = JobStore::new(config.jobs_path());
    let server_config = ServerConfig {
        data_dir: config.data_dir.clone(),
        environment: config.environment.clone(),
    };

    Ok(rocket::custom(figment)
        .manage(config)
        .manage(server_config)
        .manage(finch)
        .manage(connections)
        .manage(job_store)
        .register("/", catchers![not_found, internal_error])
        .mount(
            "/",
            routes![
                home,
                select_provider,
                connect,
                reauth,
                authorize,
                introspect,
                company,
                directory,
                employee_page,
                employee_detail,
                employee_payments,
                benefits,
                benefit_enrollments,
                jobs,
                create_job,
                job_status,
                health,
            ],
        ))
}

pub async fn start_web_server(config: AppConfig) -> Result<()> {
    config.ensure_directories().await?;

    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    info!("Starting HRIS Connect on http://0.0.0.0:{}", config.port);
    info!("Finch API: {}", config.finch.api_base_url);
    info!("Tokens file: {}", config.tokens_path().display());
    info!("Jobs file: {}", config.jobs_path().display());

    let _rocket = build_rocket(config, figment)?
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {}", e))?;

    Ok(())
}
