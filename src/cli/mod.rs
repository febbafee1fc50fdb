//! Command-line interface.

use clap::{Parser, Subcommand};
use console::style;

use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "noticelens", about = "Legal notice analysis service", version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the web server
    Serve {
        /// Bind address: port, host, or host:port
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
}

/// Whether --verbose was passed (checked before clap parsing so logging can
/// be initialized first).
pub fn is_verbose() -> bool {
    std::env::args().any(|a| a == "-v" || a == "--verbose")
}

/// Parse a bind address that can be:
/// - Just a port: "3000" -> 127.0.0.1:3000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:3000
/// - Host and port: "0.0.0.0:3000" -> 0.0.0.0:3000
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), 3000))
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Serve { bind } => {
            let (host, port) = parse_bind_address(&bind)?;

            if settings.ocr.api_key.is_empty() {
                eprintln!(
                    "  {} OCR_API_KEY is not set; analyze requests will fail",
                    style("!").yellow()
                );
            }
            if settings.completion.api_key.is_empty() {
                eprintln!(
                    "  {} GROQ_API_KEY is not set; completion requests will fail",
                    style("!").yellow()
                );
            }

            println!(
                "{} Starting NoticeLens server at http://{}:{}",
                style("→").cyan(),
                host,
                port
            );
            println!("  Press Ctrl+C to stop");

            crate::server::serve(&settings, &host, port).await
        }
    }
}
