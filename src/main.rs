use std::path::PathBuf;

use clap::Parser;

use taskflow::category::CategoryRepository;
use taskflow::cli::Cli;
use taskflow::cmd::{self, Commands};
use taskflow::repo::TaskRepository;
use taskflow::store::Store;

fn main() {
    let cli = Cli::parse();

    // Completions don't need a store.
    if let Commands::Completions { shell } = &cli.command {
        cmd::cmd_completions(*shell);
        return;
    }

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".taskflow")
    });

    let store = match Store::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
    };

    let mut tasks = match TaskRepository::open(store.clone()) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("Failed to load tasks: {e}");
            std::process::exit(1);
        }
    };
    let mut categories = match CategoryRepository::open(store) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("Failed to load categories: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Completions { .. } => unreachable!("handled above"),

        Commands::Add { title, category, due, priority, desc, subtasks } =>
            cmd::cmd_add(&mut tasks, &categories, title, category, due, priority, desc, subtasks),

        Commands::List { completed, active, category, priority, due, sort, limit } =>
            cmd::cmd_list(&tasks, completed, active, category, priority, due, sort, limit),

        Commands::View { id } => cmd::cmd_view(&tasks, id),

        Commands::Update { id, title, desc, clear_desc, category, priority, due, order } =>
            cmd::cmd_update(&mut tasks, id, title, desc, clear_desc, category, priority, due, order),

        Commands::Toggle { id } => cmd::cmd_toggle(&mut tasks, id),

        Commands::Delete { id } => cmd::cmd_delete(&mut tasks, id),

        Commands::Reorder { ids } => cmd::cmd_reorder(&mut tasks, ids),

        Commands::Subtask { action } => cmd::cmd_subtask(&mut tasks, action),

        Commands::Category { action } => cmd::cmd_category(&mut categories, action),
    }
}
