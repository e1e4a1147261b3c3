use clap::ValueEnum;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path, Settings};
use crate::tree::{SelfTransfers, TieBreak};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TieBreakArg {
    FirstSeen,
    TransactionCount,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::FirstSeen => TieBreak::FirstSeen,
            TieBreakArg::TransactionCount => TieBreak::TransactionCount,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SelfTransfersArg {
    CountAtRoot,
    Ignore,
}

impl From<SelfTransfersArg> for SelfTransfers {
    fn from(arg: SelfTransfersArg) -> Self {
        match arg {
            SelfTransfersArg::CountAtRoot => SelfTransfers::CountAtRoot,
            SelfTransfersArg::Ignore => SelfTransfers::Ignore,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub data_dir: Option<String>,
    pub max_depth: Option<usize>,
    pub max_children: Option<usize>,
    pub max_nodes: Option<usize>,
    pub tie_break: Option<TieBreakArg>,
    pub self_transfers: Option<SelfTransfersArg>,
}

impl ConfigUpdate {
    fn is_empty(&self) -> bool {
        self.data_dir.is_none()
            && self.max_depth.is_none()
            && self.max_children.is_none()
            && self.max_nodes.is_none()
            && self.tie_break.is_none()
            && self.self_transfers.is_none()
    }

    fn apply(self, settings: &mut Settings) {
        if let Some(dir) = self.data_dir {
            settings.data_dir = shellexpand_path(&dir);
        }
        if let Some(depth) = self.max_depth {
            settings.max_depth = depth;
        }
        if let Some(children) = self.max_children {
            settings.max_children_per_node = children;
        }
        if let Some(nodes) = self.max_nodes {
            settings.max_nodes = nodes;
        }
        if let Some(tb) = self.tie_break {
            settings.tie_break = tb.into();
        }
        if let Some(st) = self.self_transfers {
            settings.self_transfers = st.into();
        }
    }
}

pub fn run(update: ConfigUpdate) -> Result<()> {
    let mut settings = load_settings();
    if !update.is_empty() {
        update.apply(&mut settings);
        // Rejects zero bounds before anything is written.
        save_settings(&settings)?;
        println!("Saved {}", settings_path().display());
    }

    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("data_dir"), Cell::new(&settings.data_dir)]);
    table.add_row(vec![Cell::new("max_depth"), Cell::new(settings.max_depth)]);
    table.add_row(vec![
        Cell::new("max_children_per_node"),
        Cell::new(settings.max_children_per_node),
    ]);
    table.add_row(vec![Cell::new("max_nodes"), Cell::new(settings.max_nodes)]);
    table.add_row(vec![Cell::new("tie_break"), Cell::new(format!("{:?}", settings.tie_break))]);
    table.add_row(vec![
        Cell::new("self_transfers"),
        Cell::new(format!("{:?}", settings.self_transfers)),
    ]);
    println!("Settings\n{table}");
    Ok(())
}
