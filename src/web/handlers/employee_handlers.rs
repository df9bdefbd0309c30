// src/web/handlers/employee_handlers.rs
use chrono::{Duration, Local, NaiveDate};
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::State;
use std::collections::HashMap;
use tracing::{error, info};

use crate::core::FinchClient;
use crate::error::{DataKind, FinchError};
use crate::store::ConnectionStore;
use crate::template_processor::{escape_html, Page};
use crate::types::hris::{Payment, PayStatementBatch};
use crate::web::handlers::{active_token, company_handlers::split, no_connection_error};
use crate::web::pages;
use crate::web::types::{
    ApiError, EmployeeData, EmployeePayments, JsonResult, PaymentEntry, StandardErrorResponse,
};

pub const PAYMENT_WINDOW_DAYS: i64 = 90;
const NO_PAY_STATEMENT: &str = "No pay statement found for this employee";

/// Individual and employment records of one employee, each with its own
/// error so one unsupported family does not hide the other.
pub async fn load_employee(finch: &FinchClient, access_token: &str, employee_id: &str) -> EmployeeData {
    let (employment, employment_error) = split(
        finch
            .employment(access_token, employee_id)
            .await
            .map_err(|e| {
                error!("{}", e);
                e.user_message(DataKind::Employment)
            }),
    );

    let (individual, individual_error) = split(
        finch
            .individual(access_token, employee_id)
            .await
            .map_err(|e| {
                error!("{}", e);
                e.user_message(DataKind::Individual)
            }),
    );

    EmployeeData {
        individual,
        employment,
        individual_error,
        employment_error,
    }
}

pub async fn employee_page_handler(
    employee_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> RawHtml<String> {
    let data = match active_token(connections).await {
        Ok(token) => load_employee(finch, &token, employee_id).await,
        Err(message) => EmployeeData {
            individual: None,
            employment: None,
            individual_error: Some(message.clone()),
            employment_error: Some(message),
        },
    };

    let name = data
        .individual
        .as_ref()
        .map(|i| i.display_name())
        .unwrap_or_else(|| "Employee".to_string());

    let mut vars = HashMap::new();
    vars.insert("name", escape_html(&name));
    vars.insert("employee_id", escape_html(employee_id));
    vars.insert(
        "individual",
        pages::individual_section(data.individual.as_ref(), data.individual_error.as_deref()),
    );
    vars.insert(
        "employment",
        pages::employment_section(data.employment.as_ref(), data.employment_error.as_deref()),
    );
    pages::render(Page::Employee, &name, vars)
}

pub async fn employee_api_handler(
    employee_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> JsonResult<EmployeeData> {
    let token = active_token(connections)
        .await
        .map_err(no_connection_error)?;
    Ok(Json(load_employee(finch, &token, employee_id).await))
}

/// `(start, end)` of the payment window ending on `today`, as `YYYY-MM-DD`.
pub fn payment_window(today: NaiveDate) -> (String, String) {
    let start = today - Duration::days(PAYMENT_WINDOW_DAYS);
    (
        start.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

/// Pair a payment with the employee's pay statement out of `statements`.
pub fn payment_entry(
    payment: &Payment,
    statements: Result<PayStatementBatch, FinchError>,
    employee_id: &str,
) -> PaymentEntry {
    let mut entry = PaymentEntry {
        payment_id: payment.id.clone(),
        pay_date: payment.pay_date.clone(),
        pay_period: payment.pay_period.clone(),
        pay_statement: None,
        pay_statement_error: None,
    };

    match statements {
        Ok(batch) => {
            entry.pay_statement = batch
                .pay_statements
                .into_iter()
                .find(|statement| statement.individual_id.as_deref() == Some(employee_id));
            if entry.pay_statement.is_none() {
                entry.pay_statement_error = Some(NO_PAY_STATEMENT.to_string());
            }
        }
        Err(e) => {
            entry.pay_statement_error = Some(format!("Error fetching pay statement: {}", e));
        }
    }

    entry
}

/// Most recent pay date first; payments without a date go last.
pub fn sort_newest_first(entries: &mut [PaymentEntry]) {
    entries.sort_by(|a, b| {
        b.pay_date
            .as_deref()
            .unwrap_or("")
            .cmp(a.pay_date.as_deref().unwrap_or(""))
    });
}

pub async fn employee_payments_handler(
    employee_id: &str,
    finch: &State<FinchClient>,
    connections: &State<ConnectionStore>,
) -> JsonResult<EmployeePayments> {
    let token = active_token(connections)
        .await
        .map_err(no_connection_error)?;
    let (start_date, end_date) = payment_window(Local::now().date_naive());

    let payments = finch
        .payments(&token, &start_date, &end_date)
        .await
        .map_err(payments_error)?;

    let mut entries = Vec::new();
    for payment in payments.iter().filter(|p| p.includes(employee_id)) {
        let statements = finch.pay_statements(&token, &payment.id).await;
        entries.push(payment_entry(payment, statements, employee_id));
    }
    sort_newest_first(&mut entries);

    info!(
        "Found {} payment(s) for {} between {} and {}",
        entries.len(),
        employee_id,
        start_date,
        end_date
    );

    Ok(Json(EmployeePayments {
        employee_id: employee_id.to_string(),
        total_payments: entries.len(),
        payments: entries,
        date_range: format!("{} to {}", start_date, end_date),
    }))
}

/// Listing failures are vendor failures: 400, with the unsupported message
/// on 501.
fn payments_error(e: FinchError) -> ApiError {
    error!("Payment listing failed: {}", e);
    if e.is_unsupported() {
        StandardErrorResponse::new(
            format!("{} data unsupported for this provider", DataKind::Payment.title()),
            "PAYMENT_UNSUPPORTED",
            vec!["This provider does not expose payroll data".to_string()],
        )
        .with_status(Status::BadRequest)
    } else {
        StandardErrorResponse::new(
            format!("API Error: {}", e),
            "FINCH_API_ERROR",
            vec!["Re-authenticate the connection with payroll access".to_string()],
        )
        .with_status(Status::BadRequest)
    }
}
