use anyhow::Result;
use clap::{Parser, Subcommand};
use imgbed::analytics::summarize;
use imgbed::config::Config;
use imgbed::storage;

#[derive(Parser)]
#[command(name = "imgbed-admin")]
#[command(about = "Inspect the imgbed visitor log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recorded visits, most recent first
    List {
        /// Show at most this many visits
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show visit totals per country
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = storage::connect(&config.database).await?;
    let visits = store.all().await?;

    match cli.command {
        Commands::List { limit } => {
            if visits.is_empty() {
                println!("No visits recorded yet.");
            } else {
                println!(
                    "{:<8} {:<40} {:<20} {:<20} {}",
                    "ID", "IP", "Country", "City", "Time (UTC)"
                );
                println!("{}", "-".repeat(110));
                for visit in visits.iter().take(limit.unwrap_or(usize::MAX)) {
                    println!(
                        "{:<8} {:<40} {:<20} {:<20} {}",
                        visit.id,
                        visit.ip,
                        visit.country,
                        visit.city,
                        visit.visit_time_display()
                    );
                }
            }
        }
        Commands::Stats => {
            let summary = summarize(&visits);
            println!("Total visits: {}", summary.total);
            if !summary.by_country.is_empty() {
                println!();
                println!("{:<30} {}", "Country", "Visits");
                println!("{}", "-".repeat(40));
                for (country, count) in summary.countries_by_count() {
                    println!("{:<30} {}", country, count);
                }
            }
        }
    }

    store.close().await;
    Ok(())
}
