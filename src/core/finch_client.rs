// src/core/finch_client.rs
//! HTTP client for the Finch HR integration API

use anyhow::Context;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config_manager::{ClientCredentials, FinchSettings};
use crate::error::FinchError;
use crate::types::hris::{
    Benefit, BenefitEnrollment, Company, DirectoryEntry, DirectoryPage, Employment, Individual,
    PayStatementBatch, Payment,
};
use crate::types::response::{
    AccessTokenResponse, AutomatedJob, BatchItem, BatchResponse, ConnectSession, Introspection,
    JobCreated, VendorErrorBody,
};

const API_VERSION_HEADER: &str = "Finch-API-Version";

const SESSIONS_ENDPOINT: &str = "/connect/sessions";
const REAUTH_ENDPOINT: &str = "/connect/sessions/reauthenticate";
const TOKEN_ENDPOINT: &str = "/auth/token";
const INTROSPECT_ENDPOINT: &str = "/introspect";
const COMPANY_ENDPOINT: &str = "/employer/company";
const DIRECTORY_ENDPOINT: &str = "/employer/directory";
const INDIVIDUAL_ENDPOINT: &str = "/employer/individual";
const EMPLOYMENT_ENDPOINT: &str = "/employer/employment";
const PAYMENT_ENDPOINT: &str = "/employer/payment";
const PAY_STATEMENT_ENDPOINT: &str = "/employer/pay-statement";
const BENEFITS_ENDPOINT: &str = "/employer/benefits";
const JOBS_ENDPOINT: &str = "/jobs/automated";

const DIRECTORY_PAGE_SIZE: u64 = 100;
const LOGGED_BODY_LIMIT: usize = 200;

/// Products requested on a first connection.
pub const CONNECT_PRODUCTS: [&str; 5] = [
    "company",
    "directory",
    "individual",
    "employment",
    "benefits",
];

/// Products requested when re-authenticating for payroll access.
pub const REAUTH_PRODUCTS: [&str; 7] = [
    "company",
    "directory",
    "individual",
    "employment",
    "benefits",
    "payment",
    "pay_statement",
];

pub const SYNC_JOB_TYPE: &str = "data_sync_all";

#[derive(Clone)]
pub struct FinchClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
}

impl FinchClient {
    pub fn new(settings: &FinchSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.clone(),
            api_version: settings.api_version.clone(),
        })
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header(API_VERSION_HEADER, &self.api_version)
    }

    fn authorized(&self, method: Method, endpoint: &str, access_token: &str) -> RequestBuilder {
        self.request(method, endpoint).bearer_auth(access_token)
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, FinchError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = api_error(status.as_u16(), &body);
            warn!("{}", err);
            return Err(err);
        }

        serde_json::from_str(&body)
            .map_err(|e| FinchError::Decode(format!("{} (body: {})", e, truncate(&body))))
    }

    // ===== Connect =====

    /// Start a Connect session for a new customer.
    pub async fn create_session(
        &self,
        credentials: &ClientCredentials,
        customer_id: &str,
        customer_name: &str,
        products: &[&str],
    ) -> Result<ConnectSession, FinchError> {
        let payload = json!({
            "customer_id": customer_id,
            "customer_name": customer_name,
            "products": products,
            "redirect_uri": credentials.redirect_uri,
        });

        self.send(
            self.request(Method::POST, SESSIONS_ENDPOINT)
                .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
                .json(&payload),
        )
        .await
    }

    /// Start a Connect session that re-grants an existing connection with
    /// a new product list.
    pub async fn reauthenticate_session(
        &self,
        credentials: &ClientCredentials,
        connection_id: &str,
        products: &[&str],
    ) -> Result<ConnectSession, FinchError> {
        let payload = json!({
            "connection_id": connection_id,
            "products": products,
            "redirect_uri": credentials.redirect_uri,
        });

        self.send(
            self.request(Method::POST, REAUTH_ENDPOINT)
                .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
                .json(&payload),
        )
        .await
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
    ) -> Result<AccessTokenResponse, FinchError> {
        let payload = json!({
            "client_id": credentials.client_id,
            "client_secret": credentials.client_secret,
            "code": code,
            "redirect_uri": credentials.redirect_uri,
        });

        self.send(self.request(Method::POST, TOKEN_ENDPOINT).json(&payload))
            .await
    }

    pub async fn introspect(&self, access_token: &str) -> Result<Introspection, FinchError> {
        self.send(self.authorized(Method::GET, INTROSPECT_ENDPOINT, access_token))
            .await
    }

    // ===== Organization =====

    pub async fn company(&self, access_token: &str) -> Result<Company, FinchError> {
        self.send(self.authorized(Method::GET, COMPANY_ENDPOINT, access_token))
            .await
    }

    /// Every individual in the directory, following pagination.
    pub async fn directory(&self, access_token: &str) -> Result<Vec<DirectoryEntry>, FinchError> {
        let mut individuals = Vec::new();

        loop {
            let offset = individuals.len() as u64;
            let page: DirectoryPage = self
                .send(
                    self.authorized(Method::GET, DIRECTORY_ENDPOINT, access_token)
                        .query(&[("limit", DIRECTORY_PAGE_SIZE), ("offset", offset)]),
                )
                .await?;

            let fetched = page.individuals.len();
            individuals.extend(page.individuals);

            let total = page
                .paging
                .and_then(|paging| paging.count)
                .unwrap_or(individuals.len() as u64);
            if fetched == 0 || individuals.len() as u64 >= total {
                break;
            }
        }

        Ok(individuals)
    }

    pub async fn individual(
        &self,
        access_token: &str,
        individual_id: &str,
    ) -> Result<Individual, FinchError> {
        let payload = json!({ "requests": [{ "individual_id": individual_id }] });
        let batch: BatchResponse = self
            .send(
                self.authorized(Method::POST, INDIVIDUAL_ENDPOINT, access_token)
                    .json(&payload),
            )
            .await?;
        first_body(batch)
    }

    pub async fn employment(
        &self,
        access_token: &str,
        individual_id: &str,
    ) -> Result<Employment, FinchError> {
        let payload = json!({ "requests": [{ "individual_id": individual_id }] });
        let batch: BatchResponse = self
            .send(
                self.authorized(Method::POST, EMPLOYMENT_ENDPOINT, access_token)
                    .json(&payload),
            )
            .await?;
        first_body(batch)
    }

    // ===== Payroll =====

    /// Payments with a pay date between `start_date` and `end_date`
    /// (`YYYY-MM-DD`, inclusive).
    pub async fn payments(
        &self,
        access_token: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Payment>, FinchError> {
        self.send(
            self.authorized(Method::GET, PAYMENT_ENDPOINT, access_token)
                .query(&[("start_date", start_date), ("end_date", end_date)]),
        )
        .await
    }

    pub async fn pay_statements(
        &self,
        access_token: &str,
        payment_id: &str,
    ) -> Result<PayStatementBatch, FinchError> {
        let payload = json!({ "requests": [{ "payment_id": payment_id }] });
        let batch: BatchResponse = self
            .send(
                self.authorized(Method::POST, PAY_STATEMENT_ENDPOINT, access_token)
                    .json(&payload),
            )
            .await?;

        // no entry or an empty body means the payment has no statements
        match batch.responses.into_iter().next() {
            Some(item) if item.code.unwrap_or(200) != 200 => item_body(item),
            Some(BatchItem {
                body: Some(body), ..
            }) if !body.is_null() => {
                serde_json::from_value(body).map_err(|e| FinchError::Decode(e.to_string()))
            }
            _ => Ok(PayStatementBatch::default()),
        }
    }

    // ===== Benefits =====

    pub async fn benefits(&self, access_token: &str) -> Result<Vec<Benefit>, FinchError> {
        self.send(self.authorized(Method::GET, BENEFITS_ENDPOINT, access_token))
            .await
    }

    pub async fn benefit_enrollments(
        &self,
        access_token: &str,
        benefit_id: &str,
    ) -> Result<Vec<BenefitEnrollment>, FinchError> {
        let endpoint = format!("{}/{}/individuals", BENEFITS_ENDPOINT, benefit_id);
        self.send(self.authorized(Method::GET, &endpoint, access_token))
            .await
    }

    // ===== Jobs =====

    pub async fn create_sync_job(&self, access_token: &str) -> Result<JobCreated, FinchError> {
        self.send(
            self.authorized(Method::POST, JOBS_ENDPOINT, access_token)
                .json(&json!({ "type": SYNC_JOB_TYPE })),
        )
        .await
    }

    pub async fn job(&self, access_token: &str, job_id: &str) -> Result<AutomatedJob, FinchError> {
        let endpoint = format!("{}/{}", JOBS_ENDPOINT, job_id);
        self.send(self.authorized(Method::GET, &endpoint, access_token))
            .await
    }
}

fn api_error(status: u16, body: &str) -> FinchError {
    let message = serde_json::from_str::<VendorErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.name))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "no response body".to_string()
            } else {
                truncate(body)
            }
        });
    FinchError::Api { status, message }
}

/// Decode the body of the first batch entry.
fn first_body<T: DeserializeOwned>(batch: BatchResponse) -> Result<T, FinchError> {
    let item = batch
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| FinchError::Decode("empty batch response".to_string()))?;
    item_body(item)
}

/// Body of one batch entry. A non-200 entry code becomes an API error
/// carrying that code.
fn item_body<T: DeserializeOwned>(item: BatchItem) -> Result<T, FinchError> {
    let code = item.code.unwrap_or(200);
    let body = item.body.unwrap_or(serde_json::Value::Null);

    if code != 200 {
        let message = serde_json::from_value::<VendorErrorBody>(body.clone())
            .ok()
            .and_then(|parsed| parsed.message.or(parsed.name))
            .unwrap_or_else(|| body.to_string());
        return Err(FinchError::Api {
            status: code,
            message,
        });
    }

    serde_json::from_value(body).map_err(|e| FinchError::Decode(e.to_string()))
}

fn truncate(body: &str) -> String {
    if body.len() <= LOGGED_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = LOGGED_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
