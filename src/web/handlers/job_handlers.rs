// src/web/handlers/job_handlers.rs
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::State;
use std::collections::HashMap;
use tracing::{error, info, warn};

use crate::core::finch_client::SYNC_JOB_TYPE;
use crate::core::FinchClient;
use crate::error::DataKind;
use crate::store::{ConnectionStore, JobRecord, JobStore};
use crate::template_processor::Page;
use crate::utils::is_safe_id;
use crate::web::handlers::{active_connection, no_connection_error};
use crate::web::pages;
use crate::web::types::{ApiResult, DataResponse, JobStatusData, StandardErrorResponse};

/// Jobs of the active connection, with unfinished ones refreshed from the API.
pub async fn jobs_handler(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
    jobs: &State<JobStore>,
) -> RawHtml<String> {
    let connection = match active_connection(connections).await {
        Ok(connection) => connection,
        Err(message) => return render_jobs(&[], Some(&message)),
    };

    let stored = match jobs.for_connection(&connection.connection_id).await {
        Ok(stored) => stored,
        Err(e) => {
            error!("Failed to read jobs: {:#}", e);
            return render_jobs(&[], Some("Could not read stored jobs."));
        }
    };

    let mut refresh_error = None;
    for job in stored.iter().filter(|job| !job.is_finished()) {
        match finch.job(&connection.access_token, &job.job_id).await {
            Ok(remote) => {
                if let Err(e) = jobs.update_status(&job.job_id, &remote.status).await {
                    error!("Failed to update job {}: {:#}", job.job_id, e);
                }
            }
            Err(e) => {
                warn!("Could not refresh job {}: {}", job.job_id, e);
                refresh_error = Some(e.user_message(DataKind::Jobs));
            }
        }
    }

    let current = jobs
        .for_connection(&connection.connection_id)
        .await
        .unwrap_or(stored);
    render_jobs(&current, refresh_error.as_deref())
}

fn render_jobs(jobs: &[JobRecord], error: Option<&str>) -> RawHtml<String> {
    let mut vars = HashMap::new();
    vars.insert("jobs", pages::jobs_table(jobs, error));
    pages::render(Page::Jobs, "Jobs", vars)
}

/// Request a full data sync for the active connection and record the job.
pub async fn create_job_handler(
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
    jobs: &State<JobStore>,
) -> Result<Redirect, (Status, RawHtml<String>)> {
    let connection = active_connection(connections)
        .await
        .map_err(|message| (Status::BadRequest, pages::error_page("Sync failed", &message)))?;

    let created = finch
        .create_sync_job(&connection.access_token)
        .await
        .map_err(|e| {
            error!("Failed to create sync job: {}", e);
            let status = if e.is_api() {
                Status::BadRequest
            } else {
                Status::BadGateway
            };
            (status, pages::error_page("Sync failed", &e.user_message(DataKind::Jobs)))
        })?;

    info!(
        "Sync job {} created ({:?} refreshes remaining)",
        created.job_id, created.remaining_refreshes
    );

    let record = JobRecord::new(
        created.job_id,
        connection.connection_id,
        SYNC_JOB_TYPE.to_string(),
        created.job_url,
    );
    jobs.record(&record).await.map_err(|e| {
        error!("Failed to record job {}: {:#}", record.job_id, e);
        (
            Status::InternalServerError,
            pages::error_page("Sync failed", "The job was created but could not be recorded."),
        )
    })?;

    Ok(Redirect::to("/jobs"))
}

pub async fn job_status_handler(
    job_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
    jobs: &State<JobStore>,
) -> ApiResult<JobStatusData> {
    if !is_safe_id(job_id) {
        return Err(StandardErrorResponse::new(
            format!("Invalid job id: {}", job_id),
            "BAD_REQUEST",
            vec!["Use a job id listed on the jobs page".to_string()],
        )
        .with_status(Status::BadRequest));
    }

    let connection = active_connection(connections)
        .await
        .map_err(no_connection_error)?;

    let remote = finch
        .job(&connection.access_token, job_id)
        .await
        .map_err(|e| {
            error!("{}", e);
            let status = match e.status() {
                Some(404) => Status::NotFound,
                Some(_) => Status::BadRequest,
                None => Status::InternalServerError,
            };
            StandardErrorResponse::new(
                e.user_message(DataKind::Jobs),
                "JOB_ERROR",
                vec!["Check that the job belongs to the active connection".to_string()],
            )
            .with_status(status)
        })?;

    let recorded = jobs.update_status(job_id, &remote.status).await.map_err(|e| {
        error!("Failed to update job {}: {:#}", job_id, e);
        StandardErrorResponse::new(
            "Could not update the stored job".to_string(),
            "STORAGE_ERROR",
            vec!["Check that the data directory is writable".to_string()],
        )
        .with_status(Status::InternalServerError)
    })?;

    Ok(Json(DataResponse::success(
        format!("Job {} is {}", remote.job_id, remote.status),
        JobStatusData {
            job_id: remote.job_id,
            status: remote.status,
            job_type: remote.job_type,
            started_at: remote.started_at,
            completed_at: remote.completed_at,
            recorded,
        },
    )))
}
