// src/web/types.rs

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use std::path::PathBuf;

use crate::types::hris::{Employment, Individual, PayPeriod, PayStatement};

pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub environment: String,
}

// ===== Response envelopes =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

pub type ApiError = status::Custom<Json<StandardErrorResponse>>;
pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;
/// Bare JSON body on success, error envelope otherwise.
pub type JsonResult<T> = Result<Json<T>, ApiError>;

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: &str, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code: error_code.to_string(),
            suggestions,
        }
    }

    pub fn with_status(self, status: Status) -> ApiError {
        status::Custom(status, Json(self))
    }
}

// ===== API payloads =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct IntrospectionData {
    pub connection_id: Option<String>,
    pub provider_id: Option<String>,
    pub products: Vec<String>,
    pub connection_status: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct EmployeeData {
    pub individual: Option<Individual>,
    pub employment: Option<Employment>,
    pub individual_error: Option<String>,
    pub employment_error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PaymentEntry {
    pub payment_id: String,
    pub pay_date: Option<String>,
    pub pay_period: Option<PayPeriod>,
    pub pay_statement: Option<PayStatement>,
    pub pay_statement_error: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct EmployeePayments {
    pub employee_id: String,
    pub payments: Vec<PaymentEntry>,
    pub date_range: String,
    pub total_payments: usize,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct JobStatusData {
    pub job_id: String,
    pub status: String,
    pub job_type: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub recorded: bool,
}
