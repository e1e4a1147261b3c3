use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::loader::write_dir;
use crate::models::{Account, Transaction};
use crate::settings::{get_data_dir, shellexpand_path};

const SEED: u64 = 0x5eed_cafe;
const DAYS: i64 = 28;
const REPORTING_THRESHOLD: f64 = 10_000.0;

const ACCOUNTS: &[(&str, &str)] = &[
    ("ACC-001", "Harbor Imports LLC"),
    ("ACC-002", "Meridian Trading Co"),
    ("ACC-003", "Blue Pine Holdings"),
    ("ACC-004", "Castell Consulting"),
    ("ACC-005", "Northgate Logistics"),
    ("ACC-101", "J. Ortega"),
    ("ACC-102", "L. Brandt"),
    ("ACC-103", "K. Osei"),
    ("ACC-104", "R. Patel"),
    ("ACC-900", "Offshore Vault Ltd"),
];

/// Cash couriers: receive sub-threshold deposits, forward to the vault.
const MULES: &[&str] = &["ACC-101", "ACC-102", "ACC-103", "ACC-104"];

/// Not in the account directory on purpose.
const EXTERNAL: &str = "EXT-77";

struct Case {
    rng: StdRng,
    start: NaiveDate,
    txns: Vec<Transaction>,
}

impl Case {
    fn push(&mut self, offset: i64, source: &str, destination: &str, amount: f64, kind: &str, note: &str) {
        let date = self.start + Duration::days(offset);
        let id = format!("T{:04}", self.txns.len() + 1);
        let amount = (amount * 100.0).round() / 100.0;
        self.txns.push(
            Transaction::new(id, date.format("%Y-%m-%d").to_string(), source, destination, amount, kind)
                .with_description(note),
        );
    }

    fn structured_amount(&mut self) -> f64 {
        REPORTING_THRESHOLD - self.rng.gen_range(150.0..1_200.0)
    }
}

/// Build the sample case: a layering chain, structured fan-out through
/// couriers, a round trip back to the origin, own-account cash churn, an
/// external sender and one record with a malformed date.
pub fn generate() -> (Vec<Transaction>, Vec<Account>) {
    let mut case = Case {
        rng: StdRng::seed_from_u64(SEED),
        start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
        txns: Vec::new(),
    };

    for day in 0..DAYS {
        // Layering chain, each hop skimming a little.
        if day % 3 == 0 {
            let base = case.rng.gen_range(40_000.0..65_000.0);
            case.push(day, "ACC-001", "ACC-002", base, "wire", "Invoice settlement");
            case.push(day + 1, "ACC-002", "ACC-003", base * 0.97, "wire", "Consulting retainer");
            case.push(day + 2, "ACC-003", "ACC-900", base * 0.94, "wire", "Loan repayment");
        }

        // Structuring: sub-threshold deposits spread across couriers.
        if day % 2 == 0 {
            let courier = MULES[case.rng.gen_range(0..MULES.len())];
            let amt = case.structured_amount();
            case.push(day, "ACC-001", courier, amt, "cash", "Cash deposit");
            let fwd = amt - case.rng.gen_range(50.0..250.0);
            case.push(day + 1, courier, "ACC-900", fwd, "transfer", "Family support");
        }

        // Own-account churn.
        if day % 4 == 1 {
            let amt = case.structured_amount();
            case.push(day, "ACC-005", "ACC-005", amt, "cash", "Internal sweep");
        }

        // Ordinary business traffic.
        if day % 5 == 2 {
            let amt = case.rng.gen_range(1_500.0..6_000.0);
            case.push(day, "ACC-005", "ACC-001", amt, "ach", "Freight services");
        }
    }

    // Round trip: vault money returns to the origin via a consultancy.
    for day in [7, 16, 25] {
        let amt = case.rng.gen_range(70_000.0..90_000.0);
        case.push(day, "ACC-900", "ACC-004", amt, "wire", "Advisory fee");
        case.push(day + 1, "ACC-004", "ACC-001", amt * 0.9, "wire", "Capital injection");
    }

    case.push(4, EXTERNAL, "ACC-001", 25_000.0, "wire", "Unidentified remitter");
    case.push(12, EXTERNAL, "ACC-002", 12_500.0, "wire", "Unidentified remitter");

    let mut txns = case.txns;
    let next = format!("T{:04}", txns.len() + 1);
    txns.push(
        Transaction::new(next, "2024-03-??", "ACC-002", "ACC-104", 4_800.0, "cash")
            .with_description("Handwritten slip"),
    );

    // Pre-flag the largest courier forward so the highlight is visible.
    if let Some(t) = txns
        .iter_mut()
        .filter(|t| t.kind == "transfer")
        .max_by(|a, b| a.amount.total_cmp(&b.amount))
    {
        t.is_flagged = true;
    }

    let accounts = ACCOUNTS.iter().map(|(id, name)| Account::new(*id, *name)).collect();
    (txns, accounts)
}

pub fn run(output: Option<&str>) -> Result<()> {
    let dir = match output {
        Some(o) => PathBuf::from(shellexpand_path(o)),
        None => get_data_dir(),
    };
    let (txns, accounts) = generate();
    write_dir(&dir, &txns, &accounts)?;
    println!(
        "Wrote {} transactions and {} accounts to {}",
        txns.len(),
        accounts.len(),
        dir.display()
    );
    println!("Try: moneytrail --data {} tree ACC-001", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TransactionStore;

    #[test]
    fn test_generate_is_deterministic() {
        let (a, _) = generate();
        let (b, _) = generate();
        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(&b).all(|(x, y)| x.id == y.id && x.amount == y.amount));
    }

    #[test]
    fn test_generated_case_is_loadable() {
        let (txns, accounts) = generate();
        let store = TransactionStore::new(txns, accounts).unwrap();
        assert_eq!(store.flagged_count(), 1);
        assert_eq!(store.malformed_dates().len(), 1);
        assert_eq!(store.unknown_accounts().len(), 1);
        assert!(store.transactions().iter().any(|t| t.is_self_transfer()));
        assert!(store
            .transactions()
            .iter()
            .filter(|t| t.kind == "cash")
            .all(|t| t.amount < REPORTING_THRESHOLD));
    }
}
