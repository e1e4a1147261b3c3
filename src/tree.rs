use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{MoneyTrailError, Notice, Result};
use crate::flags::{any_flagged, Constituents};
use crate::models::Transaction;
use crate::store::Directory;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How counterparties with equal aggregate value are ordered before fan-out
/// truncation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order in which counterparties were first encountered.
    #[default]
    FirstSeen,
    /// Prefer the counterparty with more transactions, then first seen.
    TransactionCount,
}

/// Treatment of self-transfers (source == destination). They never form an
/// edge, since the child would revisit its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTransfers {
    /// Self-transfers still count toward the focus account's own aggregate.
    #[default]
    CountAtRoot,
    /// Self-transfers are left out of the tree entirely.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub max_children_per_node: usize,
    /// Ceiling on nodes in one tree, root and branch heads included.
    pub max_nodes: usize,
    pub tie_break: TieBreak,
    pub self_transfers: SelfTransfers,
}

pub const DEFAULT_MAX_DEPTH: usize = 8;
pub const DEFAULT_MAX_CHILDREN: usize = 12;
pub const DEFAULT_MAX_NODES: usize = 2_000;
/// Root plus both branch heads.
const MIN_NODES: usize = 3;

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_children_per_node: DEFAULT_MAX_CHILDREN,
            max_nodes: DEFAULT_MAX_NODES,
            tie_break: TieBreak::default(),
            self_transfers: SelfTransfers::default(),
        }
    }
}

impl TreeConfig {
    pub fn new(max_depth: usize, max_children_per_node: usize) -> Result<Self> {
        let config = Self {
            max_depth,
            max_children_per_node,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(MoneyTrailError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_children_per_node == 0 {
            return Err(MoneyTrailError::InvalidConfig(
                "max_children_per_node must be at least 1".to_string(),
            ));
        }
        if self.max_nodes < MIN_NODES {
            return Err(MoneyTrailError::InvalidConfig(format!(
                "max_nodes must be at least {MIN_NODES}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tree nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Root,
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<'a> {
    pub account: String,
    pub name: String,
    pub direction: Direction,
    pub value: f64,
    pub count: usize,
    /// Edges from the focus account.
    pub depth: usize,
    pub parent: Option<String>,
    pub flagged: bool,
    #[serde(rename = "transaction_ids", serialize_with = "serialize_ids")]
    pub transactions: Vec<&'a Transaction>,
    pub children: Vec<TreeNode<'a>>,
}

fn serialize_ids<S: Serializer>(txns: &[&Transaction], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_seq(txns.iter().map(|t| t.id.as_str()))
}

impl<'a> Constituents for TreeNode<'a> {
    fn constituents(&self) -> &[&Transaction] {
        &self.transactions
    }
}

impl<'a> TreeNode<'a> {
    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode<'a>> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Longest chain of edges below this node.
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.height())
            .max()
            .unwrap_or(0)
    }

    /// Every root-to-leaf chain of account ids starting at this node.
    #[cfg(test)]
    pub fn paths(&self) -> Vec<Vec<&str>> {
        if self.children.is_empty() {
            return vec![vec![self.account.as_str()]];
        }
        self.children
            .iter()
            .flat_map(|c| c.paths())
            .map(|mut p| {
                p.insert(0, self.account.as_str());
                p
            })
            .collect()
    }
}

/// A focus account with its outgoing and incoming subtrees as children.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipTree<'a> {
    pub root: TreeNode<'a>,
    pub notices: Vec<Notice>,
    /// True when `max_nodes` cut off counterparties that would otherwise
    /// have been kept.
    pub truncated: bool,
}

impl<'a> RelationshipTree<'a> {
    pub fn outgoing(&self) -> Option<&TreeNode<'a>> {
        self.branch(Direction::Outgoing)
    }

    pub fn incoming(&self) -> Option<&TreeNode<'a>> {
        self.branch(Direction::Incoming)
    }

    fn branch(&self, direction: Direction) -> Option<&TreeNode<'a>> {
        self.root.children.iter().find(|c| c.direction == direction)
    }

    pub fn node_count(&self) -> usize {
        self.root.iter().count()
    }

    /// Nodes whose aggregate contains a flagged transaction.
    pub fn flagged_nodes(&self) -> impl Iterator<Item = &TreeNode<'a>> {
        self.root.iter().filter(|n| n.is_flagged())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Nodes still available to the tree being built.
struct Budget {
    remaining: usize,
    exhausted: bool,
}

impl Budget {
    /// Claim up to `wanted` slots and return how many were granted.
    fn claim(&mut self, wanted: usize) -> usize {
        let granted = wanted.min(self.remaining);
        if granted < wanted {
            self.exhausted = true;
        }
        self.remaining -= granted;
        granted
    }
}

struct Edge<'a> {
    counterparty: &'a str,
    value: f64,
    transactions: Vec<&'a Transaction>,
}

/// Indexes a filtered transaction set by source and destination so each
/// expansion step is a lookup rather than a scan.
pub struct DirectionalTreeBuilder<'a> {
    transactions: Vec<&'a Transaction>,
    by_source: HashMap<&'a str, Vec<&'a Transaction>>,
    by_destination: HashMap<&'a str, Vec<&'a Transaction>>,
    config: TreeConfig,
}

impl<'a> DirectionalTreeBuilder<'a> {
    pub fn new(transactions: &[&'a Transaction], config: TreeConfig) -> Self {
        let mut by_source: HashMap<&str, Vec<&Transaction>> = HashMap::new();
        let mut by_destination: HashMap<&str, Vec<&Transaction>> = HashMap::new();
        for &t in transactions {
            by_source.entry(t.source.as_str()).or_default().push(t);
            by_destination.entry(t.destination.as_str()).or_default().push(t);
        }
        Self {
            transactions: transactions.to_vec(),
            by_source,
            by_destination,
            config,
        }
    }

    pub fn build<D: Directory + ?Sized>(&self, root: &str, directory: &D) -> RelationshipTree<'a> {
        let mut unknown = BTreeSet::new();
        let mut name = |account: &str| match directory.name_of(account) {
            Some(n) => n.to_string(),
            None => {
                unknown.insert(account.to_string());
                account.to_string()
            }
        };

        let root_txns: Vec<&Transaction> = self
            .transactions
            .iter()
            .copied()
            .filter(|t| t.touches(root))
            .filter(|t| {
                self.config.self_transfers == SelfTransfers::CountAtRoot || !t.is_self_transfer()
            })
            .collect();

        let directions: Vec<Direction> = [Direction::Outgoing, Direction::Incoming]
            .into_iter()
            .filter(|&d| self.side(root, d).iter().any(|t| !t.is_self_transfer()))
            .collect();
        // The root and every non-empty branch head are always present. The
        // rest is split between the branches; what one leaves unused passes
        // to the next.
        let mut pool = self.config.max_nodes.saturating_sub(1 + directions.len());
        let mut truncated = false;
        let mut children = Vec::with_capacity(directions.len());
        for (i, &direction) in directions.iter().enumerate() {
            let mut budget = Budget {
                remaining: pool / (directions.len() - i),
                exhausted: false,
            };
            pool -= budget.remaining;
            if let Some(branch) = self.branch(root, direction, &mut budget, &mut name) {
                children.push(branch);
            }
            pool += budget.remaining;
            truncated |= budget.exhausted;
        }

        let root_node = TreeNode {
            account: root.to_string(),
            name: name(root),
            direction: Direction::Root,
            value: root_txns.iter().map(|t| t.amount).sum(),
            count: root_txns.len(),
            depth: 0,
            parent: None,
            flagged: any_flagged(&root_txns),
            transactions: root_txns,
            children,
        };

        let notices = unknown
            .into_iter()
            .map(|account_id| Notice::UnknownAccount { account_id }.report())
            .collect();
        let tree = RelationshipTree {
            root: root_node,
            notices,
            truncated,
        };
        log::debug!(
            "tree for {root}: {} nodes, outgoing={}, incoming={}",
            tree.node_count(),
            tree.outgoing().is_some(),
            tree.incoming().is_some()
        );
        if tree.truncated {
            log::info!(
                "tree for {root} stopped at the {} node limit",
                self.config.max_nodes
            );
        }
        tree
    }

    /// The focus account seen from one side, or `None` when it has no
    /// counterparty in that direction.
    fn branch(
        &self,
        root: &str,
        direction: Direction,
        budget: &mut Budget,
        name: &mut dyn FnMut(&str) -> String,
    ) -> Option<TreeNode<'a>> {
        let side: Vec<&Transaction> = self
            .side(root, direction)
            .iter()
            .copied()
            .filter(|t| !t.is_self_transfer())
            .collect();
        if side.is_empty() {
            return None;
        }
        let mut path = vec![root.to_string()];
        let children = self.expand(root, direction, 0, &mut path, budget, name);
        Some(TreeNode {
            account: root.to_string(),
            name: name(root),
            direction,
            value: side.iter().map(|t| t.amount).sum(),
            count: side.len(),
            depth: 0,
            parent: None,
            flagged: any_flagged(&side),
            transactions: side,
            children,
        })
    }

    /// Children of `account` at `depth`. `path` holds the accounts from the
    /// focus account down to `account`; it is restored before returning.
    /// A node's children claim their slots from `budget` before any of them
    /// is expanded.
    fn expand(
        &self,
        account: &str,
        direction: Direction,
        depth: usize,
        path: &mut Vec<String>,
        budget: &mut Budget,
        name: &mut dyn FnMut(&str) -> String,
    ) -> Vec<TreeNode<'a>> {
        if depth >= self.config.max_depth {
            return Vec::new();
        }
        let mut edges = self.edges(account, direction);
        edges.retain(|e| !path.iter().any(|p| p == e.counterparty));
        self.rank(&mut edges);
        edges.truncate(self.config.max_children_per_node);
        let granted = budget.claim(edges.len());
        edges.truncate(granted);

        let mut nodes = Vec::with_capacity(edges.len());
        for edge in edges {
            path.push(edge.counterparty.to_string());
            let children = self.expand(edge.counterparty, direction, depth + 1, path, budget, name);
            path.pop();
            nodes.push(TreeNode {
                account: edge.counterparty.to_string(),
                name: name(edge.counterparty),
                direction,
                value: edge.value,
                count: edge.transactions.len(),
                depth: depth + 1,
                parent: Some(account.to_string()),
                flagged: any_flagged(&edge.transactions),
                transactions: edge.transactions,
                children,
            });
        }
        nodes
    }

    fn side(&self, account: &str, direction: Direction) -> &[&'a Transaction] {
        let index = match direction {
            Direction::Incoming => &self.by_destination,
            _ => &self.by_source,
        };
        index.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transactions on one side of `account`, grouped by counterparty in
    /// first-encountered order. Self-transfers are skipped.
    fn edges(&self, account: &str, direction: Direction) -> Vec<Edge<'a>> {
        let mut edges: Vec<Edge<'a>> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for &t in self.side(account, direction) {
            if t.is_self_transfer() {
                continue;
            }
            let counterparty = match direction {
                Direction::Incoming => t.source.as_str(),
                _ => t.destination.as_str(),
            };
            let slot = *slots.entry(counterparty).or_insert_with(|| {
                edges.push(Edge {
                    counterparty,
                    value: 0.0,
                    transactions: Vec::new(),
                });
                edges.len() - 1
            });
            edges[slot].value += t.amount;
            edges[slot].transactions.push(t);
        }
        edges
    }

    fn rank(&self, edges: &mut [Edge<'a>]) {
        match self.config.tie_break {
            TieBreak::FirstSeen => edges.sort_by(|a, b| b.value.total_cmp(&a.value)),
            TieBreak::TransactionCount => edges.sort_by(|a, b| {
                b.value
                    .total_cmp(&a.value)
                    .then_with(|| b.transactions.len().cmp(&a.transactions.len()))
            }),
        }
    }
}

/// Build the relationship tree for `root` over an already filtered set.
pub fn build_tree<'a, D: Directory + ?Sized>(
    transactions: &[&'a Transaction],
    root: &str,
    config: &TreeConfig,
    directory: &D,
) -> RelationshipTree<'a> {
    DirectionalTreeBuilder::new(transactions, config.clone()).build(root, directory)
}
