use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{print_json, InputArgs};
use crate::error::{MoneyTrailError, Result};
use crate::flow::DayWindow;
use crate::fmt::{amount, bar, day};
use crate::models::parse_day;
use crate::settings::load_settings;

const RIBBON_WIDTH: usize = 24;

fn parse_bound(raw: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    raw.map(|r| {
        parse_day(r).ok_or_else(|| {
            MoneyTrailError::InvalidArgument(format!("{flag} expects a date like 2024-03-01, got {r:?}"))
        })
    })
    .transpose()
}

pub fn run(
    input: &InputArgs,
    from: Option<&str>,
    to: Option<&str>,
    account_history: Option<&str>,
) -> Result<()> {
    let window = DayWindow::new(parse_bound(from, "--from")?, parse_bound(to, "--to")?);
    let mut investigation = input.open(load_settings().tree_config()?)?;
    investigation.view.day_window = window;
    let temporal = investigation.temporal();

    if input.json {
        return print_json(&temporal);
    }
    if temporal.bands.is_empty() {
        println!("No flows in the visible window.");
        return Ok(());
    }
    let store = investigation.store();

    if let Some(account) = account_history {
        let samples = temporal.history(account);
        let peak = samples.iter().map(|s| s.magnitude()).fold(0.0, f64::max);
        let mut table = Table::new();
        table.set_header(vec!["Day", "Inflow", "Outflow", "Balance", ""]);
        for s in samples {
            let balance = if s.balance < 0.0 {
                amount(s.balance).red().to_string()
            } else {
                amount(s.balance)
            };
            table.add_row(vec![
                Cell::new(day(s.day)),
                Cell::new(amount(s.inflow)),
                Cell::new(amount(s.outflow)),
                Cell::new(balance),
                Cell::new(bar(s.magnitude(), peak, RIBBON_WIDTH)),
            ]);
        }
        println!("Balance history: {}\n{table}", store.display_name(account));
        return Ok(());
    }

    let mut bands = Table::new();
    bands.set_header(vec!["Day", "From", "To", "Amount", "Txns", "Flag"]);
    for b in &temporal.bands {
        let flag = if b.flagged { "FLAGGED".red().bold().to_string() } else { String::new() };
        bands.add_row(vec![
            Cell::new(day(b.day)),
            Cell::new(store.display_name(&b.source)),
            Cell::new(store.display_name(&b.destination)),
            Cell::new(amount(b.amount)),
            Cell::new(b.transactions.len()),
            Cell::new(flag),
        ]);
    }
    println!("Flows\n{bands}");

    let summary = temporal.summarize();
    let peak = summary.iter().map(|s| s.peak_magnitude).fold(0.0, f64::max);
    let mut balances = Table::new();
    balances.set_header(vec!["Account", "Inflow", "Outflow", "Balance", "Peak", ""]);
    for s in &summary {
        balances.add_row(vec![
            Cell::new(store.display_name(&s.account)),
            Cell::new(amount(s.total_inflow)),
            Cell::new(amount(s.total_outflow)),
            Cell::new(amount(s.final_balance)),
            Cell::new(amount(s.peak_magnitude)),
            Cell::new(bar(s.peak_magnitude, peak, RIBBON_WIDTH)),
        ]);
    }
    println!("\nBalances\n{balances}");
    if let Some((first, last)) = temporal.day_extent() {
        println!(
            "{} bands from {} to {}, {} flagged",
            temporal.bands.len(),
            day(first),
            day(last),
            temporal.flagged_bands().count()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound(None, "--from").unwrap(), None);
        assert_eq!(
            parse_bound(Some("2024-03-01"), "--from").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        let err = parse_bound(Some("March"), "--to").unwrap_err();
        assert!(err.to_string().contains("--to expects a date"), "got: {err}");
    }
}
