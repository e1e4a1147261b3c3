use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoneyTrailError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid transaction {id}: {reason}")]
    InvalidTransaction { id: String, reason: String },

    #[error("Duplicate transaction id: {0}")]
    DuplicateTransaction(String),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, MoneyTrailError>;

/// Conditions the engine reports and then works around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The transaction stays in flat and tree views but has no day bucket.
    MalformedDate { transaction_id: String, raw: String },
    /// Display falls back to the raw account id.
    UnknownAccount { account_id: String },
    EmptyResult,
}

impl Notice {
    /// Log the notice once at warn level and hand it back.
    pub fn report(self) -> Self {
        log::warn!("{self}");
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MalformedDate { transaction_id, raw } => {
                write!(f, "transaction {transaction_id} has an unparsable date {raw:?}")
            }
            Notice::UnknownAccount { account_id } => {
                write!(f, "account {account_id} is not in the account directory")
            }
            Notice::EmptyResult => write!(f, "no transactions match the active filters"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_display() {
        let n = Notice::MalformedDate {
            transaction_id: "t9".to_string(),
            raw: "32/13/2024".to_string(),
        };
        assert_eq!(n.to_string(), "transaction t9 has an unparsable date \"32/13/2024\"");
        assert_eq!(
            Notice::EmptyResult.to_string(),
            "no transactions match the active filters"
        );
    }

    #[test]
    fn test_error_messages() {
        let e = MoneyTrailError::InvalidConfig("max_depth must be at least 1".to_string());
        assert_eq!(e.to_string(), "Invalid configuration: max_depth must be at least 1");
        let e = MoneyTrailError::UnknownTransaction("t404".to_string());
        assert_eq!(e.to_string(), "Unknown transaction: t404");
    }

    #[test]
    fn test_notice_serializes_with_kind_tag() {
        let n = Notice::UnknownAccount {
            account_id: "ACC-9".to_string(),
        };
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"kind":"unknown_account","account_id":"ACC-9"}"#);
    }
}
