use std::process;

use clap::Parser;
use pr_scribe::Cli;

#[tokio::main]
async fn main() {
    // Logs go to stderr so they never mix with prompts and menus on stdout.
    // Default to "warn" level if RUST_LOG is not set.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.execute().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("  Caused by: {err}");
                source = err.source();
            }

            process::exit(1);
        }
    }
}
