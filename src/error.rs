// src/error.rs
//! Vendor error type and the user-facing messages derived from it

use std::fmt;

/// Status the vendor uses when a provider does not expose a data family.
pub const UNSUPPORTED_STATUS: u16 = 501;

#[derive(Debug, thiserror::Error)]
pub enum FinchError {
    #[error("Finch API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request to Finch failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected Finch response: {0}")]
    Decode(String),
}

impl FinchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FinchError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_api(&self) -> bool {
        matches!(self, FinchError::Api { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        self.status() == Some(UNSUPPORTED_STATUS)
    }

    /// Message shown to the user when loading `kind` failed with this error.
    /// Transport and decode failures count as vendor failures without a
    /// status.
    pub fn user_message(&self, kind: DataKind) -> String {
        if self.is_unsupported() {
            format!("{} data unsupported for provider", kind.title())
        } else {
            format!("Could not load {} data.", kind)
        }
    }
}

/// Shown for local failures, such as an unreadable tokens file.
pub const UNEXPECTED_ERROR: &str = "Encountered an unexpected error.";

/// Data families exposed by the HR integration API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Company,
    Directory,
    Individual,
    Employment,
    Payment,
    Benefits,
    Jobs,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Company => "company",
            DataKind::Directory => "directory",
            DataKind::Individual => "individual",
            DataKind::Employment => "employment",
            DataKind::Payment => "payment",
            DataKind::Benefits => "benefits",
            DataKind::Jobs => "jobs",
        }
    }

    pub fn title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> FinchError {
        FinchError::Api {
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_unsupported_message() {
        assert_eq!(
            api(501).user_message(DataKind::Company),
            "Company data unsupported for provider"
        );
        assert_eq!(
            api(501).user_message(DataKind::Payment),
            "Payment data unsupported for provider"
        );
    }

    #[test]
    fn test_other_api_errors() {
        assert_eq!(
            api(401).user_message(DataKind::Directory),
            "Could not load directory data."
        );
        assert!(!api(401).is_unsupported());
        assert!(api(401).is_api());
    }

    #[test]
    fn test_decode_errors_are_vendor_failures() {
        let err = FinchError::Decode("not json".to_string());
        assert_eq!(
            err.user_message(DataKind::Employment),
            "Could not load employment data."
        );
        assert_eq!(err.status(), None);
        assert!(!err.is_unsupported());
    }
}
