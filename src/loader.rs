use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MoneyTrailError, Result};
use crate::models::{Account, Transaction};
use crate::store::TransactionStore;

pub const TRANSACTIONS_FILE: &str = "transactions.csv";
pub const ACCOUNTS_FILE: &str = "accounts.csv";

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub source: String,
    pub destination: String,
    pub amount: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub flagged: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRow {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<Transaction> {
        let amount = parse_amount(&self.amount).ok_or_else(|| MoneyTrailError::InvalidTransaction {
            id: self.id.clone(),
            reason: format!("unreadable amount {:?}", self.amount),
        })?;
        let mut txn = Transaction::new(
            self.id.trim(),
            self.date,
            self.source.trim(),
            self.destination.trim(),
            amount,
            self.kind.trim(),
        )
        .flagged(parse_flag(&self.flagged));
        let description = self.description.trim();
        if !description.is_empty() {
            txn = txn.with_description(description);
        }
        Ok(txn)
    }

    pub fn from_transaction(t: &Transaction) -> Self {
        Self {
            id: t.id.clone(),
            date: t.date.clone(),
            source: t.source.clone(),
            destination: t.destination.clone(),
            amount: format!("{:.2}", t.amount),
            kind: t.kind.clone(),
            description: t.description.clone().unwrap_or_default(),
            flagged: t.is_flagged.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an amount, tolerating thousands separators and a currency sign.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$' | '\u{20ac}' | '\u{a3}'))
        .collect();
    s.trim().parse().ok()
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "flagged"
    )
}

// ---------------------------------------------------------------------------
// Load / write
// ---------------------------------------------------------------------------

pub fn read_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_path(path)?;
    let mut txns = Vec::new();
    for row in reader.deserialize::<TransactionRow>() {
        txns.push(row?.into_transaction()?);
    }
    Ok(txns)
}

pub fn read_accounts(path: &Path) -> Result<Vec<Account>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut accounts = Vec::new();
    for row in reader.deserialize::<AccountRow>() {
        let row = row?;
        let name = if row.name.is_empty() { row.id.clone() } else { row.name };
        accounts.push(Account::new(row.id, name));
    }
    Ok(accounts)
}

/// Load `transactions.csv` and, when present, `accounts.csv` from `dir`.
pub fn load_dir(dir: &Path) -> Result<TransactionStore> {
    let txn_path = dir.join(TRANSACTIONS_FILE);
    if !txn_path.exists() {
        return Err(MoneyTrailError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", txn_path.display()),
        )));
    }
    let transactions = read_transactions(&txn_path)?;
    let acct_path = dir.join(ACCOUNTS_FILE);
    let accounts = if acct_path.exists() {
        read_accounts(&acct_path)?
    } else {
        log::debug!("no {ACCOUNTS_FILE} in {}, names fall back to ids", dir.display());
        Vec::new()
    };
    TransactionStore::new(transactions, accounts)
}

pub fn write_dir(dir: &Path, transactions: &[Transaction], accounts: &[Account]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut writer = csv::Writer::from_path(dir.join(TRANSACTIONS_FILE))?;
    for t in transactions {
        writer.serialize(TransactionRow::from_transaction(t))?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(dir.join(ACCOUNTS_FILE))?;
    for a in accounts {
        writer.serialize(AccountRow {
            id: a.id.clone(),
            name: a.name.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("$9,500"), Some(9500.0));
        assert_eq!(parse_amount(" 42 "), Some(42.0));
        assert_eq!(parse_amount("n/a"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            TRANSACTIONS_FILE,
            "id,date,source,destination,amount,type,description,flagged\n\
             t1,2024-01-02,A,B,\"9,500.00\",wire,Invoice 7,\n\
             t2,02/03/2024,B,C,120,cash,,true\n\
             t3,garbage,C,C,10,cash,,0\n",
        );
        write(dir.path(), ACCOUNTS_FILE, "id,name\nA,Alpha Ltd\nB,\n");

        let store = load_dir(dir.path()).unwrap();
        assert_eq!(store.transactions().len(), 3);
        let t1 = store.get("t1").unwrap();
        assert_eq!(t1.amount, 9500.0);
        assert_eq!(t1.description.as_deref(), Some("Invoice 7"));
        assert!(store.get("t2").unwrap().is_flagged);
        assert!(store.get("t2").unwrap().day.is_some());
        assert!(store.get("t3").unwrap().day.is_none());
        assert_eq!(store.display_name("A"), "Alpha Ltd");
        assert_eq!(store.display_name("B"), "B");
        assert_eq!(store.display_name("C"), "C");
    }

    #[test]
    fn test_load_dir_without_accounts() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            TRANSACTIONS_FILE,
            "id,date,source,destination,amount\nt1,2024-01-02,A,B,5\n",
        );
        let store = load_dir(dir.path()).unwrap();
        assert!(store.accounts().is_empty());
        assert_eq!(store.get("t1").unwrap().kind, "");
    }

    #[test]
    fn test_load_dir_rejects_bad_amount() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            TRANSACTIONS_FILE,
            "id,date,source,destination,amount\nt1,2024-01-02,A,B,-5\n",
        );
        let err = load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("t1"), "got: {err}");
    }

    #[test]
    fn test_missing_transactions_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("transactions.csv"), "got: {err}");
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let txns = vec![
            Transaction::new("t1", "2024-01-02", "A", "B", 12.5, "wire")
                .with_description("split, with comma")
                .flagged(true),
        ];
        let accounts = vec![Account::new("A", "Alpha")];
        write_dir(dir.path(), &txns, &accounts).unwrap();
        let store = load_dir(dir.path()).unwrap();
        let t = store.get("t1").unwrap();
        assert_eq!(t.description.as_deref(), Some("split, with comma"));
        assert!(t.is_flagged);
        assert_eq!(store.display_name("A"), "Alpha");
    }
}
