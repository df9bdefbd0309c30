// src/web/pages.rs
//! HTML fragments for the server-rendered pages

use rocket::response::content::RawHtml;
use std::collections::HashMap;

use crate::store::JobRecord;
use crate::template_processor::{escape_html, Page, TemplateProcessor};
use crate::types::hris::{Benefit, Company, DirectoryEntry, Employment, Individual};

/// One row of the connections table on the home page.
#[derive(Debug, Clone)]
pub struct ConnectionSummary {
    pub connection_id: String,
    pub provider_id: String,
    pub company_name: String,
    pub status: String,
    pub is_active: bool,
    pub has_payroll: bool,
    pub products: Vec<String>,
}

pub fn render(page: Page, title: &str, variables: HashMap<&str, String>) -> RawHtml<String> {
    RawHtml(TemplateProcessor::render(page, title, &variables))
}

pub fn error_page(heading: &str, message: &str) -> RawHtml<String> {
    let mut vars = HashMap::new();
    vars.insert("heading", escape_html(heading));
    vars.insert("message", escape_html(message));
    render(Page::Error, heading, vars)
}

fn error_box(message: &str) -> String {
    format!("<div class=\"error\">{}</div>", escape_html(message))
}

fn text(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => escape_html(v),
        _ => "-".to_string(),
    }
}

fn definition_list(rows: &[(&str, String)]) -> String {
    let items: String = rows
        .iter()
        .map(|(label, value)| format!("<dt>{}</dt><dd>{}</dd>", label, value))
        .collect();
    format!("<dl>{}</dl>", items)
}

pub fn connections_table(connections: &[ConnectionSummary]) -> String {
    if connections.is_empty() {
        return "<tr><td colspan=\"5\">No providers connected yet.</td></tr>".to_string();
    }

    connections
        .iter()
        .map(|conn| {
            let id = escape_html(&conn.connection_id);
            let status_badge = if conn.is_active {
                "<span class=\"badge active\">Active</span>".to_string()
            } else {
                format!("<span class=\"badge\">{}</span>", escape_html(&conn.status))
            };
            let payroll_action = if conn.has_payroll {
                String::new()
            } else {
                format!(
                    " <a class=\"button secondary\" href=\"/reauth/{}\">Add payroll access</a>",
                    id
                )
            };
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><a class=\"button\" href=\"/select_provider/{}\">Open</a>{}</td></tr>",
                escape_html(&conn.company_name),
                escape_html(&conn.provider_id),
                status_badge,
                escape_html(&conn.products.join(", ")),
                id,
                payroll_action
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn company_section(company: Option<&Company>, error: Option<&str>) -> String {
    if let Some(message) = error {
        return error_box(message);
    }
    let Some(company) = company else {
        return error_box("No company data.");
    };

    let entity = company
        .entity
        .as_ref()
        .map(|e| {
            [e.entity_type.as_deref(), e.subtype.as_deref()]
                .iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
                .join(" / ")
        })
        .filter(|s| !s.is_empty());

    let departments = company
        .departments
        .iter()
        .flatten()
        .flatten()
        .filter_map(|d| d.name.as_deref())
        .map(escape_html)
        .collect::<Vec<_>>()
        .join(", ");

    let locations = company
        .locations
        .iter()
        .flatten()
        .flatten()
        .map(|l| escape_html(&l.one_line()))
        .collect::<Vec<_>>()
        .join("<br>");

    let accounts = company
        .accounts
        .iter()
        .flatten()
        .flatten()
        .map(|a| {
            format!(
                "{} ({})",
                text(a.institution_name.as_deref()),
                text(a.account_type.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("<br>");

    definition_list(&[
        ("Legal name", text(company.legal_name.as_deref())),
        ("Entity", text(entity.as_deref())),
        ("EIN", text(company.ein.as_deref())),
        ("Email", text(company.primary_email.as_deref())),
        ("Phone", text(company.primary_phone_number.as_deref())),
        ("Departments", or_dash(departments)),
        ("Locations", or_dash(locations)),
        ("Bank accounts", or_dash(accounts)),
    ])
}

fn or_dash(value: String) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value
    }
}

pub fn directory_table(individuals: &[DirectoryEntry], error: Option<&str>) -> String {
    if let Some(message) = error {
        return error_box(message);
    }
    if individuals.is_empty() {
        return "<p>No individuals found.</p>".to_string();
    }

    let rows: String = individuals
        .iter()
        .map(|person| {
            let status = match person.is_active {
                Some(true) => "Active",
                Some(false) => "Inactive",
                None => "-",
            };
            format!(
                "<tr><td><a href=\"/employee/{}\">{}</a></td><td>{}</td><td>{}</td></tr>",
                escape_html(&person.id),
                escape_html(&person.display_name()),
                text(person.department.as_ref().and_then(|d| d.name.as_deref())),
                status
            )
        })
        .collect();

    format!(
        "<p>{} individual(s)</p><table><thead><tr><th>Name</th><th>Department</th>\
         <th>Status</th></tr></thead><tbody>{}</tbody></table>",
        individuals.len(),
        rows
    )
}

pub fn individual_section(individual: Option<&Individual>, error: Option<&str>) -> String {
    if let Some(message) = error {
        return error_box(message);
    }
    let Some(person) = individual else {
        return error_box("No individual data.");
    };

    let emails = person
        .emails
        .iter()
        .flatten()
        .filter_map(|e| e.data.as_deref())
        .map(escape_html)
        .collect::<Vec<_>>()
        .join(", ");
    let phones = person
        .phone_numbers
        .iter()
        .flatten()
        .flatten()
        .filter_map(|p| p.data.as_deref())
        .map(escape_html)
        .collect::<Vec<_>>()
        .join(", ");

    definition_list(&[
        ("Name", escape_html(&person.display_name())),
        ("Preferred name", text(person.preferred_name.as_deref())),
        ("Date of birth", text(person.dob.as_deref())),
        ("Gender", text(person.gender.as_deref())),
        ("Emails", or_dash(emails)),
        ("Phone numbers", or_dash(phones)),
        (
            "Residence",
            or_dash(
                person
                    .residence
                    .as_ref()
                    .map(|r| escape_html(&r.one_line()))
                    .unwrap_or_default(),
            ),
        ),
    ])
}

pub fn employment_section(employment: Option<&Employment>, error: Option<&str>) -> String {
    if let Some(message) = error {
        return error_box(message);
    }
    let Some(job) = employment else {
        return error_box("No employment data.");
    };

    let kind = job
        .employment
        .as_ref()
        .map(|e| {
            [e.employment_type.as_deref(), e.subtype.as_deref()]
                .iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
                .join(" / ")
        })
        .filter(|s| !s.is_empty());

    let income = job.income.as_ref().map(|income| {
        let amount = crate::types::hris::Money {
            amount: income.amount,
            currency: income.currency.clone(),
        };
        match income.unit.as_deref() {
            Some(unit) => format!("{} per {}", amount.display(), unit),
            None => amount.display(),
        }
    });

    let active = job.is_active.map(|a| if a { "Yes" } else { "No" });

    definition_list(&[
        ("Title", text(job.title.as_deref())),
        (
            "Department",
            text(job.department.as_ref().and_then(|d| d.name.as_deref())),
        ),
        ("Employment", text(kind.as_deref())),
        ("Start date", text(job.start_date.as_deref())),
        ("End date", text(job.end_date.as_deref())),
        ("Active", text(active)),
        ("Income", text(income.as_deref())),
        (
            "Location",
            or_dash(
                job.location
                    .as_ref()
                    .map(|l| escape_html(&l.one_line()))
                    .unwrap_or_default(),
            ),
        ),
    ])
}

pub fn benefits_table(benefits: &[Benefit], error: Option<&str>) -> String {
    if let Some(message) = error {
        return error_box(message);
    }
    if benefits.is_empty() {
        return "<p>No benefits found.</p>".to_string();
    }

    let rows: String = benefits
        .iter()
        .map(|benefit| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td><code>{}</code></td></tr>",
                text(benefit.description.as_deref()),
                text(benefit.benefit_type.as_deref()),
                text(benefit.frequency.as_deref()),
                escape_html(&benefit.benefit_id)
            )
        })
        .collect();

    format!(
        "<table><thead><tr><th>Description</th><th>Type</th><th>Frequency</th>\
         <th>Benefit id</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

pub fn jobs_table(jobs: &[JobRecord], error: Option<&str>) -> String {
    let mut html = String::new();
    if let Some(message) = error {
        html.push_str(&error_box(message));
    }
    if jobs.is_empty() {
        html.push_str("<p>No jobs requested for this connection.</p>");
        return html;
    }

    let rows: String = jobs
        .iter()
        .map(|job| {
            format!(
                "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&job.job_id),
                escape_html(&job.job_type),
                escape_html(&job.status),
                job.created_at.format("%Y-%m-%d %H:%M UTC"),
                job.updated_at.format("%Y-%m-%d %H:%M UTC")
            )
        })
        .collect();

    html.push_str(&format!(
        "<table><thead><tr><th>Job</th><th>Type</th><th>Status</th><th>Created</th>\
         <th>Updated</th></tr></thead><tbody>{}</tbody></table>",
        rows
    ));
    html
}
