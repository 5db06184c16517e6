mod aggregate;
mod config;
mod dashboard;
mod db;
mod error;
mod format;
mod identity;
mod logging;
mod models;
mod run;
mod validate;

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "format_tests.rs"]
mod format_tests;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let config = config::Config::from_env()?;
    logging::init(&config.log_filter)?;

    let mut db = db::Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    let today = chrono::Local::now().date_naive();

    let mut args: Vec<String> = std::env::args().collect();
    // With no command, show the dashboard if we know who is asking.
    if args.len() == 1 && config.user_id.is_some() {
        args.push("summary".into());
    }
    run::as_cli(&args, &mut db, &config, today)
}
