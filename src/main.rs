// certsweep - Concurrent TLS certificate expiry checker
// Licensed under GPL-3.0

use anyhow::Result;
use certsweep::checker::Checker;
use certsweep::input;
use certsweep::output::{csv, json, terminal};
use certsweep::{summarize, Args};
use clap::Parser;
use colored::Colorize;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize logging - respect RUST_LOG environment variable
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let args = Args::parse();

    // Assemble the raw target list from positional args and/or input file
    let mut raw_input = args.targets.join("\n");
    if let Some(path) = &args.input_file {
        let content = std::fs::read_to_string(path)?;
        raw_input.push('\n');
        raw_input.push_str(&content);
    }

    let (targets, rejects) = input::parse_targets(&raw_input, args.port);

    for reject in &rejects {
        warn!(line = %reject.raw_line, reason = %reject.reason, "rejected target line");
        eprintln!(
            "{} skipping '{}': {}",
            "[!]".yellow(),
            reject.raw_line.trim(),
            reject.reason
        );
    }

    if targets.is_empty() {
        anyhow::bail!("no valid targets supplied (pass hosts as arguments or use --file)");
    }

    let params = args.check_parameters();
    let checker = Checker::new(args.cache_ttl()).show_progress(!args.quiet);

    let results = checker.run_batch(&targets, &params).await;
    let summary = summarize(&results);

    println!("{}", terminal::render_report(&results, &summary));

    if let Some(path) = &args.json_file {
        json::write_json_file(path, &results, &summary)?;
        println!("{} JSON written to {}", "[+]".green(), path.display());
    }
    if let Some(path) = &args.csv_file {
        csv::write_csv_file(path, &results)?;
        println!("{} CSV written to {}", "[+]".green(), path.display());
    }

    Ok(())
}
