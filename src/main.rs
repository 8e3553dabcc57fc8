use std::time::Duration;

use clap::Parser;

use quill::{fields, Category, TraceConfig};

#[derive(Parser)]
#[command(name = "quill", about = "quill — exercise the trace/ logging pipeline end to end")]
struct Cli {
    /// Root directory for the trace tree.
    #[arg(long, default_value = "trace")]
    root: std::path::PathBuf,

    /// Minimum severity: DEBUG, INFO, WARNING, ERROR, or CRITICAL.
    #[arg(long, default_value = "DEBUG")]
    level: String,

    /// Wire format: line or json.
    #[arg(long, default_value = "line")]
    format: String,

    /// Run a retention sweep with this age threshold (days) at the end.
    #[arg(long)]
    cleanup_days: Option<u64>,

    /// Write quill's own diagnostics to /tmp/quill-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/quill-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("quill debug log started — tail -f /tmp/quill-debug.log");
    }

    let config = TraceConfig::load()?
        .with_root(&cli.root)
        .with_level(cli.level.parse()?)
        .with_format(cli.format.parse()?);
    let registry = quill::initialize(config)?;

    // A representative walk through every part of the pipeline, mirroring
    // what the pipeline components do in production.

    let twitter = registry.logger("twitter", Category::Scrapers);
    twitter.debug("this is a DEBUG message");
    twitter.info("this is an INFO message");
    twitter.warning("this is a WARNING message");
    twitter.api_call("GET", "/trends/place.json", fields! { "id" => 1, "count" => 50 });
    twitter.scraping_session(
        "twitter",
        "trending",
        "completed",
        fields! { "items_scraped" => 132 },
    );

    let store = registry.logger("raw_data_store", Category::Storage);
    store.data_operation("save", "tweets", 132, fields! { "batch" => "2024-w03" });

    let normalizer = registry.logger("normalizer", Category::Processing);
    let summed = quill::perf::measure(&normalizer, "normalize_batch", fields! {}, || {
        std::thread::sleep(Duration::from_millis(120));
        Ok::<u64, std::io::Error>(132)
    })?;
    normalizer.info(&format!("normalized {summed} items"));

    // A failing operation: the scope logs "operation failed" and the error
    // comes back unchanged for the caller to handle.
    let failed: Result<(), std::io::Error> =
        quill::perf::measure(&normalizer, "enrich_batch", fields! {}, || {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "enrichment service unreachable",
            ))
        });
    if let Err(err) = failed {
        quill::report(
            &normalizer,
            &err,
            fields! { "operation" => "enrich_batch", "endpoint" => "/enrich" },
        );
    }

    if let Some(days) = cli.cleanup_days {
        let report = registry.cleanup(days);
        tracing::debug!(deleted = report.deleted, "manual sweep done");
    }

    println!("trace written under {}", cli.root.display());
    Ok(())
}
