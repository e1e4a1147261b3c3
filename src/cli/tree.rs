use colored::Colorize;

use crate::cli::{print_json, InputArgs};
use crate::error::Result;
use crate::flags::Constituents;
use crate::fmt::amount;
use crate::settings::load_settings;
use crate::tree::{Direction, TreeConfig, TreeNode};

pub fn run(
    input: &InputArgs,
    root: &str,
    max_depth: Option<usize>,
    max_children: Option<usize>,
    max_nodes: Option<usize>,
) -> Result<()> {
    let base = load_settings().tree_config()?;
    let config = TreeConfig {
        max_depth: max_depth.unwrap_or(base.max_depth),
        max_children_per_node: max_children.unwrap_or(base.max_children_per_node),
        max_nodes: max_nodes.unwrap_or(base.max_nodes),
        ..base
    };
    let mut investigation = input.open(config)?;
    investigation.view.root_account = Some(root.to_string());

    let Some(tree) = investigation.tree() else {
        return Ok(());
    };
    if input.json {
        return print_json(&tree);
    }

    println!(
        "{} ({})  {} across {} transactions",
        tree.root.name.bold(),
        tree.root.account,
        amount(tree.root.value),
        tree.root.count
    );
    if tree.root.children.is_empty() {
        println!("  no counterparties under the active filters");
    }
    let branches = tree.root.children.len();
    for (i, branch) in tree.root.children.iter().enumerate() {
        let last = i + 1 == branches;
        let label = match branch.direction {
            Direction::Incoming => "received",
            _ => "sent",
        };
        let line = format!("{label} {} in {} transactions", amount(branch.value), branch.count);
        println!("{}{}", if last { "└─ " } else { "├─ " }, highlight(&line, branch));
        let prefix = if last { "   " } else { "│  " };
        render_children(branch, prefix);
    }
    let flagged = tree.flagged_nodes().count();
    println!(
        "\n{} nodes, {} flagged, {} of {} levels used",
        tree.node_count(),
        flagged,
        tree.root.height().saturating_sub(1),
        investigation.config().max_depth
    );
    if tree.truncated {
        println!(
            "{}",
            format!(
                "stopped at {} nodes; raise --max-nodes or narrow the filters to see more",
                investigation.config().max_nodes
            )
            .yellow()
        );
    }
    Ok(())
}

fn render_children(node: &TreeNode, prefix: &str) {
    let n = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == n;
        let label = if child.name == child.account {
            child.account.clone()
        } else {
            format!("{} ({})", child.name, child.account)
        };
        let line = format!("{label}  {} x{}", amount(child.value), child.count);
        println!("{prefix}{}{}", if last { "└─ " } else { "├─ " }, highlight(&line, child));
        let next = format!("{prefix}{}", if last { "   " } else { "│  " });
        render_children(child, &next);
    }
}

fn highlight(line: &str, node: &TreeNode) -> String {
    match node.flagged_count() {
        0 => line.to_string(),
        n => format!("{} {}", line.red(), format!("[flagged {n}/{}]", node.count).red().bold()),
    }
}
