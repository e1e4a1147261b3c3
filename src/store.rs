use std::collections::{BTreeSet, HashMap};

use crate::error::{MoneyTrailError, Notice, Result};
use crate::models::{Account, Transaction};

/// Account id to display name lookup.
pub trait Directory {
    fn name_of(&self, account: &str) -> Option<&str>;
}

impl Directory for HashMap<String, String> {
    fn name_of(&self, account: &str) -> Option<&str> {
        self.get(account).map(String::as_str)
    }
}

/// Owns the loaded records. The flag toggle is the only mutation.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    accounts: Vec<Account>,
    by_id: HashMap<String, usize>,
    names: HashMap<String, usize>,
}

impl TransactionStore {
    /// Build a store, rejecting non-positive amounts and duplicate ids.
    pub fn new(transactions: Vec<Transaction>, accounts: Vec<Account>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(transactions.len());
        for (idx, t) in transactions.iter().enumerate() {
            if !t.amount.is_finite() || t.amount <= 0.0 {
                return Err(MoneyTrailError::InvalidTransaction {
                    id: t.id.clone(),
                    reason: format!("amount must be positive, got {}", t.amount),
                });
            }
            if by_id.insert(t.id.clone(), idx).is_some() {
                return Err(MoneyTrailError::DuplicateTransaction(t.id.clone()));
            }
        }
        let names = accounts
            .iter()
            .enumerate()
            .map(|(idx, a)| (a.id.clone(), idx))
            .collect();
        log::debug!(
            "store loaded: {} transactions, {} accounts",
            transactions.len(),
            accounts.len()
        );
        Ok(Self {
            transactions,
            accounts,
            by_id,
            names,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.by_id.get(id).map(|&idx| &self.transactions[idx])
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.names.get(id).map(|&idx| &self.accounts[idx])
    }

    /// Display name for an account, falling back to the raw id.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.account(id).map(|a| a.name.as_str()).unwrap_or(id)
    }

    /// Flip a transaction's flag in place and return the new value.
    pub fn toggle_flag(&mut self, id: &str) -> Result<bool> {
        let idx = *self
            .by_id
            .get(id)
            .ok_or_else(|| MoneyTrailError::UnknownTransaction(id.to_string()))?;
        let txn = &mut self.transactions[idx];
        txn.is_flagged = !txn.is_flagged;
        log::debug!("transaction {id} flagged={}", txn.is_flagged);
        Ok(txn.is_flagged)
    }

    pub fn flagged_count(&self) -> usize {
        self.transactions.iter().filter(|t| t.is_flagged).count()
    }

    /// Every account id referenced by a transaction, sorted.
    pub fn referenced_accounts(&self) -> BTreeSet<&str> {
        self.transactions
            .iter()
            .flat_map(|t| [t.source.as_str(), t.destination.as_str()])
            .collect()
    }

    /// Referenced accounts with no directory entry, one notice each.
    pub fn unknown_accounts(&self) -> Vec<Notice> {
        self.referenced_accounts()
            .into_iter()
            .filter(|id| !self.names.contains_key(*id))
            .map(|id| {
                Notice::UnknownAccount {
                    account_id: id.to_string(),
                }
                .report()
            })
            .collect()
    }

    /// Transactions whose date could not be parsed, one notice each.
    pub fn malformed_dates(&self) -> Vec<Notice> {
        self.transactions
            .iter()
            .filter(|t| t.day.is_none())
            .map(|t| {
                Notice::MalformedDate {
                    transaction_id: t.id.clone(),
                    raw: t.date.clone(),
                }
                .report()
            })
            .collect()
    }
}

impl Directory for TransactionStore {
    fn name_of(&self, account: &str) -> Option<&str> {
        self.account(account).map(|a| a.name.as_str())
    }
}
