mod cli;
mod error;
mod filters;
mod flags;
mod flow;
mod fmt;
mod loader;
mod models;
mod settings;
mod store;
mod tree;
mod view;

use clap::Parser;

use cli::{config::ConfigUpdate, Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List => cli::list::run(&cli.input),
        Commands::Tree {
            root,
            max_depth,
            max_children,
            max_nodes,
        } => cli::tree::run(&cli.input, &root, max_depth, max_children, max_nodes),
        Commands::Flow {
            from,
            to,
            account_history,
        } => cli::flow::run(
            &cli.input,
            from.as_deref(),
            to.as_deref(),
            account_history.as_deref(),
        ),
        Commands::Summary => cli::summary::run(&cli.input),
        Commands::Demo { output } => cli::demo::run(output.as_deref()),
        Commands::Config {
            data_dir,
            max_depth,
            max_children,
            max_nodes,
            tie_break,
            self_transfers,
        } => cli::config::run(ConfigUpdate {
            data_dir,
            max_depth,
            max_children,
            max_nodes,
            tie_break,
            self_transfers,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
