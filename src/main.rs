use anyhow::Result;
use clap::Parser;
use site_asset_uploader::app::App;
use site_asset_uploader::config::Config;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "site-asset-uploader")]
#[command(about = "Upload static site assets under content-hash names")]
struct CliArgs {
    /// Configuration file.
    #[arg(long, value_name = "FILE", default_value = "uploader.yml")]
    config: PathBuf,

    /// Directory absolute asset references are resolved against.
    #[arg(long, value_name = "DIR", default_value = ".")]
    base_path: PathBuf,

    /// Delete remote objects not referenced in this run.
    /// Only safe after a full site render.
    #[arg(long)]
    delete_unused: bool,

    /// Resolve against an in-memory store instead of the real one.
    #[arg(long)]
    dry_run: bool,

    /// Asset references (e.g. /i/logo.png). Read from stdin when omitted.
    #[arg(value_name = "REFERENCE")]
    references: Vec<String>,
}

fn collect_references(args: Vec<String>, stdin: impl BufRead) -> std::io::Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(args);
    }
    let mut references = Vec::new();
    for line in stdin.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            references.push(trimmed.to_string());
        }
    }
    Ok(references)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the resolved URLs for the build tool.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "site_asset_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let references = collect_references(args.references, std::io::stdin().lock())?;
    info!("Resolving {} asset references", references.len());

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match App::new(config, args.base_path, args.dry_run).await {
        Ok(mut app) => match app.run(&references, args.delete_unused).await {
            Ok(urls) => {
                for url in urls {
                    println!("{}", url);
                }
                info!("Resolution completed successfully");
                Ok(())
            }
            Err(e) => {
                error!("Asset resolution failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize uploader: {}", e);
            std::process::exit(1);
        }
    }
}
