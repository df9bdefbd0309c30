// src/types/response.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ===== Connect / auth =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectSession {
    pub session_id: Option<String>,
    pub connect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub connection_id: String,
    pub customer_id: Option<String>,
    pub account_id: Option<String>,
    pub client_type: Option<String>,
    pub company_id: Option<String>,
    pub connection_type: Option<String>,
    #[serde(default)]
    pub products: Vec<String>,
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub status: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Introspection {
    pub connection_id: Option<String>,
    pub provider_id: Option<String>,
    pub customer_id: Option<String>,
    pub company_id: Option<String>,
    pub client_type: Option<String>,
    pub connection_type: Option<String>,
    #[serde(default)]
    pub products: Vec<String>,
    pub connection_status: Option<ConnectionStatus>,
}

// ===== Batch endpoints =====

#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub responses: Vec<BatchItem>,
}

/// One entry of a batch response. `body` holds the record on `code == 200`
/// and an error object otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    pub individual_id: Option<String>,
    pub payment_id: Option<String>,
    pub code: Option<u16>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub name: Option<String>,
}

// ===== Jobs =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: String,
    pub job_url: Option<String>,
    pub allowed_refreshes: Option<u32>,
    pub remaining_refreshes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatedJob {
    pub job_id: String,
    pub job_url: Option<String>,
    pub status: String,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub created_at: Option<String>,
    pub scheduled_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}
