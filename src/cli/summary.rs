use comfy_table::{Cell, Table};

use crate::cli::{print_json, InputArgs};
use crate::error::Result;
use crate::filters::{amount_bounds, flow_bounds, AmountRange};
use crate::fmt::amount;
use crate::settings::load_settings;

fn range_text(range: Option<AmountRange>) -> String {
    match range {
        Some(r) => format!("{} .. {}", amount(r.min), amount(r.max)),
        None => "-".to_string(),
    }
}

pub fn run(input: &InputArgs) -> Result<()> {
    let investigation = input.open(load_settings().tree_config()?)?;
    let store = investigation.store();
    let filtered = investigation.filtered();

    let mut notices = store.unknown_accounts();
    notices.extend(store.malformed_dates());
    notices.extend(filtered.notice.clone());

    let all = store.transactions();
    if input.json {
        return print_json(&serde_json::json!({
            "transactions": all.len(),
            "accounts": store.accounts().len(),
            "referenced_accounts": store.referenced_accounts().len(),
            "flagged": store.flagged_count(),
            "filtered": filtered.transactions.len(),
            "amount_bounds": amount_bounds(all),
            "flow_bounds": flow_bounds(all),
            "notices": notices,
        }));
    }

    let mut table = Table::new();
    table.set_header(vec!["", ""]);
    table.add_row(vec![Cell::new("Transactions"), Cell::new(all.len())]);
    table.add_row(vec![Cell::new("Accounts in directory"), Cell::new(store.accounts().len())]);
    table.add_row(vec![
        Cell::new("Accounts referenced"),
        Cell::new(store.referenced_accounts().len()),
    ]);
    table.add_row(vec![Cell::new("Flagged"), Cell::new(store.flagged_count())]);
    let filters = if investigation.view.criteria.is_unrestricted() { "none" } else { "active" };
    table.add_row(vec![Cell::new("Filters"), Cell::new(filters)]);
    table.add_row(vec![
        Cell::new("Matching filters"),
        Cell::new(filtered.transactions.len()),
    ]);
    table.add_row(vec![Cell::new("Amount range"), Cell::new(range_text(amount_bounds(all)))]);
    table.add_row(vec![Cell::new("Pair volume range"), Cell::new(range_text(flow_bounds(all)))]);
    println!("Summary\n{table}");

    if !notices.is_empty() {
        println!("\nNotices");
        for notice in &notices {
            println!("  {notice}");
        }
    }
    Ok(())
}
