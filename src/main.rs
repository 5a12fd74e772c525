mod catalog;
mod config;
mod export;
mod http;
mod loader;
mod marketplace;
mod models;
mod pipeline;
mod reconcile;
mod review;
mod session;
mod site;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::catalog::price::format_price;
use crate::config::AppConfig;
use crate::marketplace::{RakutenClient, YahooClient};
use crate::models::SourceKind;
use crate::pipeline::{ListingSource, Pipeline};
use crate::session::Session;
use crate::site::SiteScraper;

#[derive(Parser)]
#[command(name = "price-recon", about = "Storefront price reconciliation tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Print the derived code / expected price table without fetching anything
    Expand {
        /// Product master CSV (汎用明細表 M04)
        master: PathBuf,
    },

    /// Scrape the in-house shop's detail pages for every master code
    Site {
        master: PathBuf,

        /// Page through result URLs interactively after the fetch
        #[arg(long)]
        review: bool,
    },

    /// Query the Rakuten Ichiba search API over the expanded code set
    Rakuten {
        master: PathBuf,

        #[arg(long)]
        review: bool,
    },

    /// Query the Yahoo! Shopping search API over the expanded code set
    Yahoo {
        master: PathBuf,

        #[arg(long)]
        review: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "price_recon=info,warn",
        1 => "price_recon=debug,info",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Expand { master } => {
            let rows = loader::load_master(&master)?;
            let expanded = pipeline::expansion_preview(&rows);

            println!("{} master rows → {} derived codes", rows.len(), expanded.len());
            println!("{:<20} {:>12}  {}", "商品コード", "通販単価", "送料区分名");
            for code in &expanded {
                println!(
                    "{:<20} {:>12}  {}",
                    code.code,
                    format_price(code.expected_price),
                    code.shipping_class.as_deref().unwrap_or("")
                );
            }
        }

        Command::Site { master, review } => {
            let scraper = SiteScraper::new(&config.http, &config.site)?;
            run_fetch(&config, &scraper, SourceKind::Site, &master, review).await?;
        }

        Command::Rakuten { master, review } => {
            let client = RakutenClient::new(&config.http, &config.rakuten)?;
            run_fetch(&config, &client, SourceKind::Rakuten, &master, review).await?;
        }

        Command::Yahoo { master, review } => {
            let client = YahooClient::new(&config.http, &config.yahoo)?;
            run_fetch(&config, &client, SourceKind::Yahoo, &master, review).await?;
        }
    }

    Ok(())
}

async fn run_fetch(
    config: &AppConfig,
    source: &dyn ListingSource,
    kind: SourceKind,
    master: &Path,
    review: bool,
) -> Result<()> {
    let _t = utils::Timer::start(format!("{} fetch", kind.label()));

    let mut session = Session::new(loader::load_master(master)?);

    let report = Pipeline::new(source, kind, config.http.request_delay_ms)
        .run(&session.master)
        .await?;
    let report = &*session.report.insert(report);

    let report_path = export::write_report(&config.output.dir, report.kind, &report.rows)?;
    let not_found_path =
        export::write_not_found(&config.output.dir, report.kind, &report.not_found)?;

    println!("─────────────────────────────────");
    println!("  {} 取得結果", kind.label());
    println!("─────────────────────────────────");
    println!("  Codes    : {}", report.stats.codes_processed);
    println!("  Listings : {}", report.stats.listings_found);
    println!("  Misses   : {}", report.stats.misses);
    println!("  Skipped  : {}", report.stats.skipped);
    println!("  Not found: {}", report.not_found.len());
    println!("  Report   : {}", report_path.display());
    println!("  Missing  : {}", not_found_path.display());
    println!("─────────────────────────────────");

    let cursor = session
        .review
        .insert(review::ReviewCursor::from_rows(&report.rows));
    if review {
        review::run_review(cursor, std::io::stdin().lock(), std::io::stdout())?;
    }

    Ok(())
}
