use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl AmountRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range from optional bounds; a missing side is open.
    pub fn from_bounds(min: Option<f64>, max: Option<f64>) -> Option<Self> {
        match (min, max) {
            (None, None) => None,
            (min, max) => Some(Self {
                min: min.unwrap_or(f64::NEG_INFINITY),
                max: max.unwrap_or(f64::INFINITY),
            }),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Unordered account pair. A self-transfer pair holds the same id twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountPair(String, String);

impl AccountPair {
    pub fn of(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn for_transaction(t: &Transaction) -> Self {
        Self::of(&t.source, &t.destination)
    }
}

/// The active filter dimensions. A `None` range or an empty account set
/// leaves that dimension unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub amount: Option<AmountRange>,
    pub pair_flow: Option<AmountRange>,
    pub active_accounts: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn is_unrestricted(&self) -> bool {
        self.amount.is_none() && self.pair_flow.is_none() && self.active_accounts.is_empty()
    }

    fn admits(&self, t: &Transaction, volumes: Option<&HashMap<AccountPair, f64>>) -> bool {
        if let Some(range) = &self.amount {
            if !range.contains(t.amount) {
                return false;
            }
        }
        if let (Some(range), Some(volumes)) = (&self.pair_flow, volumes) {
            let volume = volumes
                .get(&AccountPair::for_transaction(t))
                .copied()
                .unwrap_or(0.0);
            if !range.contains(volume) {
                return false;
            }
        }
        if !self.active_accounts.is_empty()
            && !self.active_accounts.contains(&t.source)
            && !self.active_accounts.contains(&t.destination)
        {
            return false;
        }
        true
    }
}

/// Total absolute volume moved between each unordered account pair.
pub fn pair_volumes(transactions: &[Transaction]) -> HashMap<AccountPair, f64> {
    let mut volumes: HashMap<AccountPair, f64> = HashMap::new();
    for t in transactions {
        *volumes.entry(AccountPair::for_transaction(t)).or_insert(0.0) += t.amount.abs();
    }
    volumes
}

/// Narrow `transactions` to those matching every active dimension, keeping
/// their original order. Pair volumes are measured over the full input.
pub fn apply<'a>(transactions: &'a [Transaction], criteria: &FilterCriteria) -> Vec<&'a Transaction> {
    let volumes = criteria.pair_flow.map(|_| pair_volumes(transactions));
    let filtered: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| criteria.admits(t, volumes.as_ref()))
        .collect();
    log::debug!(
        "filter kept {} of {} transactions",
        filtered.len(),
        transactions.len()
    );
    filtered
}

/// (min, max) of individual transaction amounts.
pub fn amount_bounds(transactions: &[Transaction]) -> Option<AmountRange> {
    extent(transactions.iter().map(|t| t.amount))
}

/// (min, max) of pair volumes, for initialising a pairwise-flow control.
pub fn flow_bounds(transactions: &[Transaction]) -> Option<AmountRange> {
    extent(pair_volumes(transactions).into_values())
}

fn extent(values: impl Iterator<Item = f64>) -> Option<AmountRange> {
    values.fold(None, |acc, v| match acc {
        None => Some(AmountRange::new(v, v)),
        Some(r) => Some(AmountRange::new(r.min.min(v), r.max.max(v))),
    })
}
