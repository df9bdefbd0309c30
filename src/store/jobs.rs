// src/store/jobs.rs
//! Background sync jobs requested through the app, kept in `jobs.csv`

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::FsOps;

pub const JOB_HEADER: [&str; 7] = [
    "job_id",
    "connection_id",
    "job_type",
    "status",
    "job_url",
    "created_at",
    "updated_at",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub connection_id: String,
    pub job_type: String,
    pub status: String,
    #[serde(default)]
    pub job_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(job_id: String, connection_id: String, job_type: String, job_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            connection_id,
            job_type,
            status: "pending".to_string(),
            job_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Jobs in these states will not change any more.
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status.as_str(),
            "complete" | "reauth_error" | "permissions_error" | "error"
        )
    }
}

pub struct JobStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JobStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn all(&self) -> Result<Vec<JobRecord>> {
        let _guard = self.lock.lock().await;
        self.read_rows().await
    }

    /// Jobs of one connection, newest first.
    pub async fn for_connection(&self, connection_id: &str) -> Result<Vec<JobRecord>> {
        let mut jobs: Vec<JobRecord> = self
            .all()
            .await?
            .into_iter()
            .filter(|job| job.connection_id == connection_id)
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    /// Append one job, writing the header when the file is new.
    pub async fn record(&self, job: &JobRecord) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if FsOps::is_empty_or_missing(&self.path).await {
            writer.write_record(JOB_HEADER)?;
        }
        writer.serialize(job)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e))?;
        FsOps::append(&self.path, &bytes)
            .await
            .with_context(|| format!("Failed to record job {}", job.job_id))?;

        info!("Recorded job {} for {}", job.job_id, job.connection_id);
        Ok(())
    }

    /// Overwrite the status of a stored job. Returns whether the job exists.
    pub async fn update_status(&self, job_id: &str, status: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut rows = self.read_rows().await?;

        let Some(job) = rows.iter_mut().find(|job| job.job_id == job_id) else {
            return Ok(false);
        };
        if job.status == status {
            return Ok(true);
        }

        debug!("Job {} moved from {} to {}", job_id, job.status, status);
        job.status = status.to_string();
        job.updated_at = Utc::now();
        self.write_rows(&rows).await?;
        Ok(true)
    }

    async fn read_rows(&self) -> Result<Vec<JobRecord>> {
        let Some(bytes) = FsOps::read_optional(&self.path).await? else {
            return Ok(Vec::new());
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        reader
            .deserialize()
            .collect::<Result<Vec<JobRecord>, _>>()
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    async fn write_rows(&self, rows: &[JobRecord]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(JOB_HEADER)?;
        for row in rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e))?;
        FsOps::write_atomic(&self.path, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> (tempfile::TempDir, JobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("jobs.csv"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let (_dir, store) = store();
        let mut older = JobRecord::new(
            "job_1".to_string(),
            "conn_1".to_string(),
            "data_sync_all".to_string(),
            None,
        );
        older.created_at = older.created_at - Duration::minutes(5);
        let newer = JobRecord::new(
            "job_2".to_string(),
            "conn_1".to_string(),
            "data_sync_all".to_string(),
            Some("https://api.example/jobs/automated/job_2".to_string()),
        );
        let other = JobRecord::new(
            "job_3".to_string(),
            "conn_2".to_string(),
            "data_sync_all".to_string(),
            None,
        );

        store.record(&older).await.unwrap();
        store.record(&newer).await.unwrap();
        store.record(&other).await.unwrap();

        let content = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert_eq!(content.lines().next().unwrap(), JOB_HEADER.join(","));
        assert_eq!(content.lines().count(), 4);

        let jobs = store.for_connection("conn_1").await.unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["job_2", "job_1"]);
        assert_eq!(jobs[0].job_url, newer.job_url);
        assert_eq!(jobs[0].status, "pending");
    }

    #[tokio::test]
    async fn test_update_status() {
        let (_dir, store) = store();
        let job = JobRecord::new(
            "job_1".to_string(),
            "conn_1".to_string(),
            "data_sync_all".to_string(),
            None,
        );
        store.record(&job).await.unwrap();

        assert!(store.update_status("job_1", "complete").await.unwrap());
        assert!(!store.update_status("job_missing", "complete").await.unwrap());

        let stored = &store.all().await.unwrap()[0];
        assert_eq!(stored.status, "complete");
        assert!(stored.is_finished());
        assert!(stored.updated_at >= job.updated_at);
    }
}
