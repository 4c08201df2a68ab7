//! Stats command - print assignment statistics from the database

use std::sync::Arc;

use clap::Args;
use roster_core::model::{SortOrder, Statistics};
use roster_core::{Config, Services};

use super::open_database;

/// Print per-user assignment counts and pull request totals
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Sort by assignment count: asc or desc
    #[arg(long, default_value = "desc")]
    sort: String,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl StatsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let order: SortOrder = self.sort.parse()?;

        let db = open_database(config).await?;
        let services = Services::new(Arc::new(db.store()), config.assignment.strategy.build());
        let stats = services.stats.statistics(order).await?;
        db.close().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_table(&stats);
        }
        Ok(())
    }
}

fn print_table(stats: &Statistics) {
    println!();
    println!(
        "Pull requests: {} total, {} open, {} merged",
        stats.pull_requests.total, stats.pull_requests.open, stats.pull_requests.merged
    );
    println!();

    if stats.users.is_empty() {
        println!("No users.");
        return;
    }

    let id_width = stats
        .users
        .iter()
        .map(|u| u.user_id.len())
        .max()
        .unwrap_or(0)
        .max("USER".len());
    let name_width = stats
        .users
        .iter()
        .map(|u| u.username.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    println!("  {:<id_width$}  {:<name_width$}  ASSIGNED", "USER", "NAME");
    for user in &stats.users {
        println!(
            "  {:<id_width$}  {:<name_width$}  {}",
            user.user_id, user.username, user.assignment_count
        );
    }
}
