//! View state handed between the engine and whatever renders it.
//!
//! `ViewState` carries every user-issued parameter; `Investigation` owns the
//! store and recomputes derived structures from scratch on each request.

use serde::{Deserialize, Serialize};

use crate::error::{Notice, Result};
use crate::filters::{self, FilterCriteria};
use crate::flow::{self, DayWindow, TemporalFlow};
use crate::models::Transaction;
use crate::store::TransactionStore;
use crate::tree::{build_tree, RelationshipTree, TreeConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub criteria: FilterCriteria,
    /// Focus account of the relationship tree.
    pub root_account: Option<String>,
    /// Visible days of the temporal view.
    pub day_window: DayWindow,
}

/// Filtered list and the notice that goes with an empty one.
#[derive(Debug)]
pub struct FilteredView<'a> {
    pub transactions: Vec<&'a Transaction>,
    pub notice: Option<Notice>,
}

impl<'a> FilteredView<'a> {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Single owner of the store plus the current view state.
pub struct Investigation {
    store: TransactionStore,
    config: TreeConfig,
    pub view: ViewState,
}

impl Investigation {
    /// Configuration problems surface here, once, rather than per call.
    pub fn new(store: TransactionStore, config: TreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            view: ViewState::default(),
        })
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn filtered(&self) -> FilteredView<'_> {
        let transactions = filters::apply(self.store.transactions(), &self.view.criteria);
        let notice = transactions.is_empty().then(|| Notice::EmptyResult.report());
        FilteredView {
            transactions,
            notice,
        }
    }

    /// Relationship tree for the focus account, if one is selected.
    pub fn tree(&self) -> Option<RelationshipTree<'_>> {
        let root = self.view.root_account.as_deref()?;
        let filtered = self.filtered();
        Some(build_tree(&filtered.transactions, root, &self.config, &self.store))
    }

    /// Temporal view limited to the visible day window.
    pub fn temporal(&self) -> TemporalFlow<'_> {
        let filtered = self.filtered();
        let all = flow::aggregate(&filtered.transactions);
        if self.view.day_window.is_open() {
            all
        } else {
            all.restrict(&self.view.day_window)
        }
    }

    /// Flip one transaction's flag. Derived views must be recomputed after.
    pub fn toggle_flag(&mut self, transaction_id: &str) -> Result<bool> {
        self.store.toggle_flag(transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::AmountRange;
    use crate::flags::Constituents;
    use crate::models::Account;
    use chrono::NaiveDate;

    fn investigation() -> Investigation {
        let store = TransactionStore::new(
            vec![
                Transaction::new("t1", "2024-01-01", "A", "B", 100.0, "wire"),
                Transaction::new("t2", "2024-01-01", "B", "C", 100.0, "wire"),
                Transaction::new("t3", "2024-01-05", "C", "A", 60.0, "wire"),
                Transaction::new("t4", "2024-01-09", "A", "D", 5.0, "cash"),
            ],
            vec![Account::new("A", "Alpha")],
        )
        .unwrap();
        Investigation::new(store, TreeConfig::new(2, 12).unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let store = TransactionStore::new(vec![], vec![]).unwrap();
        let config = TreeConfig {
            max_depth: 0,
            ..TreeConfig::default()
        };
        assert!(Investigation::new(store, config).is_err());
    }

    #[test]
    fn test_no_root_means_no_tree() {
        let inv = investigation();
        assert!(inv.tree().is_none());
    }

    #[test]
    fn test_empty_filter_reports_notice() {
        let mut inv = investigation();
        inv.view.criteria.amount = Some(AmountRange::new(1000.0, 2000.0));
        let filtered = inv.filtered();
        assert!(filtered.is_empty());
        assert_eq!(filtered.notice, Some(Notice::EmptyResult));
    }

    #[test]
    fn test_tree_uses_view_state() {
        let mut inv = investigation();
        inv.view.root_account = Some("A".to_string());
        let tree = inv.tree().unwrap();
        assert_eq!(tree.root.name, "Alpha");
        assert_eq!(tree.outgoing().unwrap().value, 105.0);

        inv.view.criteria.amount = Some(AmountRange::new(50.0, 1000.0));
        let tree = inv.tree().unwrap();
        assert_eq!(tree.outgoing().unwrap().value, 100.0);
    }

    #[test]
    fn test_toggle_changes_only_containing_aggregates() {
        let mut inv = investigation();
        inv.view.root_account = Some("A".to_string());

        let before: Vec<(String, bool)> = {
            let tree = inv.tree().unwrap();
            tree.root
                .iter()
                .map(|n| (format!("{:?}/{}", n.direction, n.account), n.is_flagged()))
                .collect()
        };
        assert!(before.iter().all(|(_, f)| !f));

        inv.toggle_flag("t2").unwrap();

        let tree = inv.tree().unwrap();
        for node in tree.root.iter() {
            assert_eq!(node.is_flagged(), node.transactions.iter().any(|t| t.id == "t2"));
        }
        let temporal = inv.temporal();
        for band in &temporal.bands {
            assert_eq!(band.is_flagged(), band.transactions.iter().any(|t| t.id == "t2"));
        }
    }

    #[test]
    fn test_temporal_respects_day_window() {
        let mut inv = investigation();
        assert_eq!(inv.temporal().bands.len(), 4);
        inv.view.day_window = DayWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, 2),
            NaiveDate::from_ymd_opt(2024, 1, 6),
        );
        let temporal = inv.temporal();
        assert_eq!(temporal.bands.len(), 1);
        assert_eq!(temporal.bands[0].source, "C");
        // C received 100 on the 1st, so 40 remains after sending 60.
        assert_eq!(temporal.history("C")[0].balance, 40.0);
    }
}
