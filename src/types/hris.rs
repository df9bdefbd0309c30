// src/types/hris.rs
//! HR records as returned by the integration API. Fields the pages do not
//! use are kept in `extra` so the JSON routes pass them through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Option<String>,
    pub legal_name: Option<String>,
    pub entity: Option<Entity>,
    pub ein: Option<String>,
    pub primary_email: Option<String>,
    pub primary_phone_number: Option<String>,
    #[serde(default)]
    pub departments: Option<Vec<Option<Department>>>,
    #[serde(default)]
    pub locations: Option<Vec<Option<Location>>>,
    #[serde(default)]
    pub accounts: Option<Vec<Option<BankAccount>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub name: Option<String>,
    pub parent: Option<DepartmentRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl Location {
    /// Single-line postal form, skipping missing parts.
    pub fn one_line(&self) -> String {
        [
            &self.line1,
            &self.line2,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub account_type: Option<String>,
    pub institution_name: Option<String>,
    pub routing_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerRef {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub manager: Option<ManagerRef>,
    pub department: Option<DepartmentRef>,
    pub is_active: Option<bool>,
}

impl DirectoryEntry {
    pub fn display_name(&self) -> String {
        full_name(&self.first_name, &self.middle_name, &self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging {
    pub count: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryPage {
    #[serde(default)]
    pub individuals: Vec<DirectoryEntry>,
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactEntry {
    pub data: Option<String>,
    #[serde(rename = "type")]
    pub contact_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    #[serde(default)]
    pub emails: Option<Vec<ContactEntry>>,
    #[serde(default)]
    pub phone_numbers: Option<Vec<Option<ContactEntry>>>,
    pub residence: Option<Location>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Individual {
    pub fn display_name(&self) -> String {
        full_name(&self.first_name, &self.middle_name, &self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentKind {
    #[serde(rename = "type")]
    pub employment_type: Option<String>,
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub unit: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub effective_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employment {
    pub id: Option<String>,
    pub title: Option<String>,
    pub manager: Option<ManagerRef>,
    pub department: Option<DepartmentRef>,
    pub employment: Option<EmploymentKind>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_active: Option<bool>,
    pub location: Option<Location>,
    pub income: Option<Income>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Money {
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

impl Money {
    /// Amounts are integer cents.
    pub fn display(&self) -> String {
        match self.amount {
            Some(cents) => format!(
                "{:.2} {}",
                cents as f64 / 100.0,
                self.currency.as_deref().unwrap_or("").to_uppercase()
            )
            .trim_end()
            .to_string(),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriod {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub pay_date: Option<String>,
    pub debit_date: Option<String>,
    pub pay_period: Option<PayPeriod>,
    #[serde(default)]
    pub individual_ids: Option<Vec<String>>,
    pub gross_pay: Option<Money>,
    pub net_pay: Option<Money>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payment {
    pub fn includes(&self, individual_id: &str) -> bool {
        self.individual_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| id == individual_id))
    }
}

/// One earnings, tax, deduction or contribution line of a pay statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayLine {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub line_type: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayStatement {
    pub individual_id: Option<String>,
    #[serde(rename = "type")]
    pub statement_type: Option<String>,
    pub payment_method: Option<String>,
    pub total_hours: Option<f64>,
    pub gross_pay: Option<Money>,
    pub net_pay: Option<Money>,
    #[serde(default)]
    pub earnings: Option<Vec<Option<PayLine>>>,
    #[serde(default)]
    pub taxes: Option<Vec<Option<PayLine>>>,
    #[serde(default)]
    pub employee_deductions: Option<Vec<Option<PayLine>>>,
    #[serde(default)]
    pub employer_contributions: Option<Vec<Option<PayLine>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayStatementBatch {
    #[serde(default)]
    pub pay_statements: Vec<PayStatement>,
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benefit {
    pub benefit_id: String,
    #[serde(rename = "type")]
    pub benefit_type: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitEnrollment {
    pub individual_id: String,
    pub code: Option<u16>,
    pub body: Option<Value>,
}

fn full_name(first: &Option<String>, middle: &Option<String>, last: &Option<String>) -> String {
    let name = [first, middle, last]
        .iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        "Unnamed".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_entry_name() {
        let entry: DirectoryEntry = serde_json::from_value(serde_json::json!({
            "id": "ind_1",
            "first_name": "Ada",
            "middle_name": null,
            "last_name": "Lovelace",
            "manager": null,
            "department": {"name": "Engineering"},
            "is_active": true
        }))
        .unwrap();
        assert_eq!(entry.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let employment: Employment = serde_json::from_value(serde_json::json!({
            "id": "ind_1",
            "title": "Engineer",
            "class_code": "A1",
            "custom_fields": [{"name": "shirt", "value": "L"}]
        }))
        .unwrap();
        assert_eq!(employment.title.as_deref(), Some("Engineer"));
        assert_eq!(employment.extra["class_code"], "A1");

        let round = serde_json::to_value(&employment).unwrap();
        assert_eq!(round["custom_fields"][0]["value"], "L");
    }

    #[test]
    fn test_money_display() {
        let money = Money {
            amount: Some(123456),
            currency: Some("usd".to_string()),
        };
        assert_eq!(money.display(), "1234.56 USD");
        assert_eq!(
            Money {
                amount: None,
                currency: None
            }
            .display(),
            "-"
        );
    }

    #[test]
    fn test_payment_includes() {
        let payment: Payment = serde_json::from_value(serde_json::json!({
            "id": "pay_1",
            "pay_date": "2024-01-15",
            "individual_ids": ["a", "b"]
        }))
        .unwrap();
        assert!(payment.includes("b"));
        assert!(!payment.includes("c"));
    }

    #[test]
    fn test_location_one_line() {
        let location = Location {
            name: None,
            line1: Some("1 Main St".to_string()),
            line2: Some(String::new()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            postal_code: None,
            country: Some("US".to_string()),
        };
        assert_eq!(location.one_line(), "1 Main St, Springfield, IL, US");
    }
}
