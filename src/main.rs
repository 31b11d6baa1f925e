use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use pricebefore_etl::config::AppConfig;
use pricebefore_etl::extract::synthetic;
use pricebefore_etl::models::{ProductRecord, SeriesSource, UNKNOWN_BRAND};
use pricebefore_etl::pipeline::Pipeline;
use pricebefore_etl::storage::{CsvSink, SinkMode};
use pricebefore_etl::{loader, utils};

#[derive(Parser)]
#[command(name = "pricebefore-etl", about = "Price-history scraper for pricebefore.com", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every product URL in a list file into one multi-product CSV
    Scrape {
        /// Path to the URL list (one URL per line, # for comments)
        #[arg(short, long, default_value = "urls.txt")]
        urls: PathBuf,

        /// Output CSV path (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scrape a single product page into a Date,Price CSV
    ScrapeOne {
        url: String,

        #[arg(short, long, default_value = "price_history_data.csv")]
        output: PathBuf,
    },

    /// Write a synthetic price series (for wiring tests downstream)
    Sample {
        #[arg(short, long, default_value = "sample_data.csv")]
        output: PathBuf,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Parse and print the resolved URL list
    Urls {
        #[arg(default_value = "urls.txt")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "pricebefore_etl=info,warn",
        1 => "pricebefore_etl=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Scrape { urls, output } => {
            let _t = utils::Timer::start("Multi-product scrape");

            let url_list = loader::load_url_list(&urls, &config.scraper.base_url)?;
            if url_list.is_empty() {
                println!("No URLs in {:?} — nothing to do.", urls);
                return Ok(());
            }

            let out_path = output.unwrap_or_else(|| config.output.path.clone());
            let sink = Arc::new(CsvSink::create(&out_path, SinkMode::MultiProduct)?);

            let pipeline = Arc::new(Pipeline::new(config).context("Failed to build pipeline")?);
            let stats = pipeline.run(url_list, Arc::clone(&sink)).await;
            sink.flush()?;

            println!("─────────────────────────────────");
            println!("  pricebefore-etl — Scrape Done");
            println!("─────────────────────────────────");
            println!("  Products  : {}", utils::fmt_number(stats.products_processed as i64));
            println!("  Rows      : {}", utils::fmt_number(stats.rows_written as i64));
            println!("  Synthetic : {}", utils::fmt_number(stats.synthetic_series as i64));
            println!("  Errors    : {}", utils::fmt_number(stats.errors as i64));
            println!("  Output    : {:?}", out_path);
            println!("─────────────────────────────────");
        }

        Command::ScrapeOne { url, output } => {
            let _t = utils::Timer::start("Single-product scrape");

            let pipeline = Pipeline::new(config).context("Failed to build pipeline")?;
            let record = pipeline
                .run_url(&url)
                .await
                .with_context(|| format!("No data extracted for {}", url))?;

            let sink = CsvSink::create(&output, SinkMode::SingleProduct)?;
            let rows = sink.append_record(&record)?;
            sink.flush()?;

            println!(
                "{} [{}]: {} rows → {:?}",
                utils::ellipsize(&record.title, 50),
                record.source.as_str(),
                rows,
                output
            );
        }

        Command::Sample { output, seed } => {
            let series = synthetic::generate(&config.synthetic, seed);
            let record = ProductRecord {
                title: "Synthetic Sample".to_string(),
                brand: UNKNOWN_BRAND.to_string(),
                series,
                source: SeriesSource::Synthetic,
                scraped_at: chrono::Utc::now().naive_utc(),
            };

            let sink = CsvSink::create(&output, SinkMode::SingleProduct)?;
            let rows = sink.append_record(&record)?;
            sink.flush()?;

            info!("Sample data written");
            println!("{} synthetic rows → {:?}", rows, output);
        }

        Command::Urls { file } => {
            let urls = loader::load_url_list(&file, &config.scraper.base_url)?;
            if urls.is_empty() {
                println!("No URLs in {:?}.", file);
            } else {
                println!("{} URLs:", urls.len());
                for u in &urls {
                    println!("  {}", u);
                }
            }
        }
    }

    Ok(())
}
