pub mod config;
pub mod demo;
pub mod flow;
pub mod list;
pub mod summary;
pub mod tree;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::filters::{AmountRange, FilterCriteria};
use crate::loader::load_dir;
use crate::settings::{get_data_dir, shellexpand_path};
use crate::tree::TreeConfig;
use crate::view::Investigation;

#[derive(Parser)]
#[command(
    name = "moneytrail",
    about = "Relationship trees and day-bucketed flow balances for transaction screening."
)]
pub struct Cli {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Directory holding transactions.csv and accounts.csv (default: settings data_dir)
    #[arg(long, global = true)]
    pub data: Option<String>,
    /// Smallest transaction amount to keep
    #[arg(long = "min-amount", global = true)]
    pub min_amount: Option<f64>,
    /// Largest transaction amount to keep
    #[arg(long = "max-amount", global = true)]
    pub max_amount: Option<f64>,
    /// Smallest total volume between an account pair
    #[arg(long = "min-flow", global = true)]
    pub min_flow: Option<f64>,
    /// Largest total volume between an account pair
    #[arg(long = "max-flow", global = true)]
    pub max_flow: Option<f64>,
    /// Only show transactions touching this account (repeatable)
    #[arg(long = "account", global = true, value_name = "ACCOUNT_ID")]
    pub accounts: Vec<String>,
    /// Toggle a transaction's flag before computing (repeatable)
    #[arg(long = "flag", global = true, value_name = "TXN_ID")]
    pub flags: Vec<String>,
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the transactions that pass the active filters.
    List,
    /// Show who the account sent money to and received money from.
    Tree {
        /// Focus account id
        root: String,
        /// Override the configured depth limit for this run
        #[arg(long = "max-depth")]
        max_depth: Option<usize>,
        /// Override the configured fan-out limit for this run
        #[arg(long = "max-children")]
        max_children: Option<usize>,
        /// Override the configured node limit for this run
        #[arg(long = "max-nodes")]
        max_nodes: Option<usize>,
    },
    /// Show day-bucketed flows and running balances.
    Flow {
        /// First visible day: YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// Last visible day: YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        /// Print every balance sample for one account
        #[arg(long = "account-history", value_name = "ACCOUNT_ID")]
        account_history: Option<String>,
    },
    /// Summarize the loaded data and anything the engine had to work around.
    Summary,
    /// Write a sample case (accounts.csv, transactions.csv) to explore.
    Demo {
        /// Output directory (default: settings data_dir)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show or update settings.
    Config {
        /// Default data directory
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Maximum edges from the focus account
        #[arg(long = "max-depth")]
        max_depth: Option<usize>,
        /// Maximum children kept per node
        #[arg(long = "max-children")]
        max_children: Option<usize>,
        /// Maximum nodes in one tree
        #[arg(long = "max-nodes")]
        max_nodes: Option<usize>,
        /// Order for counterparties with equal totals
        #[arg(long = "tie-break", value_enum)]
        tie_break: Option<config::TieBreakArg>,
        /// Whether own-account transfers count toward the focus account
        #[arg(long = "self-transfers", value_enum)]
        self_transfers: Option<config::SelfTransfersArg>,
    },
}

impl InputArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            amount: AmountRange::from_bounds(self.min_amount, self.max_amount),
            pair_flow: AmountRange::from_bounds(self.min_flow, self.max_flow),
            active_accounts: self.accounts.iter().cloned().collect(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        match &self.data {
            Some(d) => PathBuf::from(shellexpand_path(d)),
            None => get_data_dir(),
        }
    }

    /// Load the case, apply filters and requested flag toggles.
    pub fn open(&self, config: TreeConfig) -> Result<Investigation> {
        let store = load_dir(&self.data_dir())?;
        let mut investigation = Investigation::new(store, config)?;
        investigation.view.criteria = self.criteria();
        for id in &self.flags {
            let now = investigation.toggle_flag(id)?;
            if let Some(t) = investigation.store().get(id) {
                log::info!(
                    "{id} ({} -> {}, {}) flagged={now}",
                    t.source,
                    t.destination,
                    t.amount
                );
            }
        }
        Ok(investigation)
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
