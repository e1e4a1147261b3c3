use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{print_json, InputArgs};
use crate::error::Result;
use crate::fmt::amount;
use crate::settings::load_settings;

pub fn run(input: &InputArgs) -> Result<()> {
    let investigation = input.open(load_settings().tree_config()?)?;
    let filtered = investigation.filtered();

    if input.json {
        return print_json(&filtered.transactions);
    }
    if filtered.is_empty() {
        if let Some(notice) = &filtered.notice {
            println!("{notice}");
        }
        return Ok(());
    }

    let store = investigation.store();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "From", "To", "Amount", "Type", "Description", "Flag"]);
    for t in &filtered.transactions {
        let flag = if t.is_flagged { "FLAGGED".red().bold().to_string() } else { String::new() };
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(&t.date),
            Cell::new(store.display_name(&t.source)),
            Cell::new(store.display_name(&t.destination)),
            Cell::new(amount(t.amount)),
            Cell::new(&t.kind),
            Cell::new(t.description.as_deref().unwrap_or("")),
            Cell::new(flag),
        ]);
    }
    let total: f64 = filtered.transactions.iter().map(|t| t.amount).sum();
    println!("Transactions\n{table}");
    println!("{} transactions, {} total", filtered.transactions.len(), amount(total));
    Ok(())
}
