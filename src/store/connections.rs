// src/store/connections.rs
//! Provider connections and their access tokens, kept in `tokens.csv`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

use crate::core::FsOps;
use crate::store::csv_fields::{pipe_list, title_bool};
use crate::types::response::AccessTokenResponse;

pub const CONNECTION_HEADER: [&str; 11] = [
    "access_token",
    "token_type",
    "connection_id",
    "customer_id",
    "account_id",
    "client_type",
    "company_id",
    "connection_type",
    "products",
    "provider_id",
    "active",
];

pub const NO_TOKEN_MESSAGE: &str = "No token data found in file.";

const PAYROLL_PRODUCTS: [&str; 2] = ["payment", "pay_statement"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub connection_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub client_type: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub connection_type: Option<String>,
    #[serde(default, with = "pipe_list")]
    pub products: Vec<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default, with = "title_bool")]
    pub active: bool,
}

impl ConnectionRecord {
    pub fn from_token(token: &AccessTokenResponse) -> Self {
        Self {
            access_token: token.access_token.clone(),
            token_type: token.token_type.clone(),
            connection_id: token.connection_id.clone(),
            customer_id: token.customer_id.clone(),
            account_id: token.account_id.clone(),
            client_type: token.client_type.clone(),
            company_id: token.company_id.clone(),
            connection_type: token.connection_type.clone(),
            products: token.products.clone(),
            provider_id: token.provider_id.clone(),
            active: true,
        }
    }

    pub fn has_product(&self, product: &str) -> bool {
        self.products.iter().any(|p| p == product)
    }

    /// Whether the connection was granted the payroll scopes.
    pub fn has_payroll(&self) -> bool {
        PAYROLL_PRODUCTS.iter().all(|p| self.has_product(p))
    }
}

/// The row flagged active, else the most recently added row.
pub fn pick_active(rows: &[ConnectionRecord]) -> Option<&ConnectionRecord> {
    rows.iter().find(|row| row.active).or_else(|| rows.last())
}

pub struct ConnectionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ConnectionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored connection in file order. A missing file is empty.
    pub async fn all(&self) -> Result<Vec<ConnectionRecord>> {
        let _guard = self.lock.lock().await;
        self.read_rows().await
    }

    pub async fn active(&self) -> Result<Option<ConnectionRecord>> {
        let rows = self.all().await?;
        Ok(pick_active(&rows).cloned())
    }

    /// Token of the active connection.
    pub async fn access_token(&self) -> Result<String> {
        self.active()
            .await?
            .map(|row| row.access_token)
            .ok_or_else(|| anyhow::anyhow!(NO_TOKEN_MESSAGE))
    }

    /// Flag `connection_id` as the only active connection. Returns `false`
    /// and leaves the file alone when that id is not stored.
    pub async fn set_active(&self, connection_id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut rows = self.read_rows().await?;

        if !rows.iter().any(|row| row.connection_id == connection_id) {
            return Ok(false);
        }

        for row in rows.iter_mut() {
            row.active = row.connection_id == connection_id;
        }
        self.write_rows(&rows).await?;
        info!("Active connection set to {}", connection_id);
        Ok(true)
    }

    /// Store a freshly exchanged token. An existing row for the same
    /// connection keeps its identity fields and gets the new token, token
    /// type and products. The stored connection becomes the only active one.
    /// Returns `true` when the connection was new.
    pub async fn upsert(&self, token: &AccessTokenResponse) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut rows = self.read_rows().await?;

        let existing = rows
            .iter()
            .position(|row| row.connection_id == token.connection_id);

        for row in rows.iter_mut() {
            row.active = false;
        }

        let is_new = match existing {
            Some(index) => {
                info!("Updating existing connection: {}", token.connection_id);
                let row = &mut rows[index];
                row.access_token = token.access_token.clone();
                row.token_type = token.token_type.clone();
                row.products = token.products.clone();
                row.active = true;
                false
            }
            None => {
                info!("Adding new connection: {}", token.connection_id);
                rows.push(ConnectionRecord::from_token(token));
                true
            }
        };

        self.write_rows(&rows).await?;
        Ok(is_new)
    }

    /// Delete a connection. Returns whether a row was removed.
    pub async fn remove(&self, connection_id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut rows = self.read_rows().await?;
        let before = rows.len();
        rows.retain(|row| row.connection_id != connection_id);

        if rows.len() == before {
            return Ok(false);
        }
        self.write_rows(&rows).await?;
        info!("Removed connection: {}", connection_id);
        Ok(true)
    }

    async fn read_rows(&self) -> Result<Vec<ConnectionRecord>> {
        let Some(bytes) = FsOps::read_optional(&self.path).await? else {
            return Ok(Vec::new());
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        reader
            .deserialize()
            .collect::<Result<Vec<ConnectionRecord>, _>>()
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    async fn write_rows(&self, rows: &[ConnectionRecord]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CONNECTION_HEADER)?;
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

    fn token(connection_id: &str, access_token: &str, products: &[&str]) -> AccessTokenResponse {
        AccessTokenResponse {
            access_token: access_token.to_string(),
            token_type: Some("bearer".to_string()),
            connection_id: connection_id.to_string(),
            customer_id: Some("cust".to_string()),
            account_id: Some("acct".to_string()),
            client_type: Some("sandbox".to_string()),
            company_id: Some("comp".to_string()),
            connection_type: Some("provider".to_string()),
            products: products.iter().map(|p| p.to_string()).collect(),
            provider_id: Some("gusto".to_string()),
        }
    }

    fn store() -> (tempfile::TempDir, ConnectionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConnectionStore::new(dir.path().join("tokens.csv"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.all().await.unwrap().is_empty());
        assert!(store.active().await.unwrap().is_none());
        assert_eq!(
            store.access_token().await.unwrap_err().to_string(),
            NO_TOKEN_MESSAGE
        );
        assert!(!store.set_active("conn_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_new_connections_take_over_active_flag() {
        let (_dir, store) = store();
        assert!(store
            .upsert(&token("conn_1", "tok_1", &["company"]))
            .await
            .unwrap());
        assert!(store
            .upsert(&token("conn_2", "tok_2", &["company"]))
            .await
            .unwrap());

        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].active);
        assert!(rows[1].active);
        assert_eq!(store.access_token().await.unwrap(), "tok_2");
    }

    #[tokio::test]
    async fn test_reauthentication_updates_in_place() {
        let (_dir, store) = store();
        store
            .upsert(&token("conn_1", "tok_1", &["company"]))
            .await
            .unwrap();
        store
            .upsert(&token("conn_2", "tok_2", &["company"]))
            .await
            .unwrap();

        let is_new = store
            .upsert(&token(
                "conn_1",
                "tok_1b",
                &["company", "payment", "pay_statement"],
            ))
            .await
            .unwrap();
        assert!(!is_new);

        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].access_token, "tok_1b");
        assert!(rows[0].active);
        assert!(rows[0].has_payroll());
        assert!(!rows[1].active);
    }

    #[tokio::test]
    async fn test_set_active() {
        let (_dir, store) = store();
        store.upsert(&token("conn_1", "tok_1", &[])).await.unwrap();
        store.upsert(&token("conn_2", "tok_2", &[])).await.unwrap();

        assert!(store.set_active("conn_1").await.unwrap());
        assert_eq!(store.access_token().await.unwrap(), "tok_1");

        let before = tokio::fs::read(store.path()).await.unwrap();
        assert!(!store.set_active("conn_unknown").await.unwrap());
        assert_eq!(tokio::fs::read(store.path()).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_reads_files_written_by_earlier_versions() {
        let (_dir, store) = store();
        tokio::fs::write(
            store.path(),
            "access_token,token_type,connection_id,customer_id,account_id,client_type,company_id,connection_type,products,provider_id\n\
             tok_a,bearer,conn_a,,acct,sandbox,comp,provider,company|directory,gusto\n\
             tok_b,bearer,conn_b,,acct,sandbox,comp,provider,,adp\n",
        )
        .await
        .unwrap();

        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].products, vec!["company", "directory"]);
        assert!(rows[1].products.is_empty());
        assert_eq!(rows[0].customer_id, None);
        // no row is flagged, so the last one wins
        assert_eq!(store.access_token().await.unwrap(), "tok_b");
    }

    #[tokio::test]
    async fn test_written_file_layout() {
        let (_dir, store) = store();
        store
            .upsert(&token("conn_1", "tok_1", &["company", "directory"]))
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(store.path()).await.unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), CONNECTION_HEADER.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "tok_1,bearer,conn_1,cust,acct,sandbox,comp,provider,company|directory,gusto,True"
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let (_dir, store) = store();
        store.upsert(&token("conn_1", "tok_1", &[])).await.unwrap();
        assert!(store.remove("conn_1").await.unwrap());
        assert!(!store.remove("conn_1").await.unwrap());
        assert!(store.all().await.unwrap().is_empty());
        assert_eq!(
            tokio::fs::read_to_string(store.path()).await.unwrap().trim_end(),
            CONNECTION_HEADER.join(",")
        );
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_every_row() {
        let (_dir, store) = store();
        let (ta, tb, tc) = (
            token("conn_a", "tok_a", &[]),
            token("conn_b", "tok_b", &[]),
            token("conn_c", "tok_c", &[]),
        );
        let (a, b, c) = tokio::join!(store.upsert(&ta), store.upsert(&tb), store.upsert(&tc),);
        assert!(a.unwrap() && b.unwrap() && c.unwrap());

        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().filter(|row| row.active).count(), 1);
    }
}
