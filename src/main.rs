use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use lunar_interceptor::config::{self, validate_config};
use lunar_interceptor::interceptor::{Decision, OutboundCall};
use lunar_interceptor::lifecycle;
use lunar_interceptor::observability::logging;
use lunar_interceptor::routing::Destination;

#[derive(Parser)]
#[command(name = "lunar-interceptor")]
#[command(about = "Inspect the routing decisions of the interceptor", long_about = None)]
struct Cli {
    /// Optional TOML config file; LUNAR_* environment variables apply on top
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how an outbound call would be routed
    Decide {
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "https")]
        scheme: String,
        /// Defaults to the scheme's standard port
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        query: Option<String>,
        /// Treat the destination as known-safe
        #[arg(long)]
        managed: bool,
        /// Value of an x-lunar-allow request header
        #[arg(long)]
        allow: Option<bool>,
        #[arg(long)]
        sequence_id: Option<String>,
    },
    /// Run the handshake against the configured proxy
    Handshake,
    /// Print the effective configuration and its problems
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    logging::init(&config.observability.log_level);

    match cli.command {
        Commands::Decide {
            host,
            scheme,
            port,
            path,
            query,
            managed,
            allow,
            sequence_id,
        } => {
            let port = port.unwrap_or(if scheme == "https" { 443 } else { 80 });
            let mut call = OutboundCall::new(Destination::new(host, scheme, port))
                .with_managed_hint(managed)
                .with_allow_override(allow)
                .with_sequence_id(sequence_id);
            call.path = path;
            call.query = query;

            let interceptor = lifecycle::build(&config);
            print_json(&decision_json(interceptor.decide(&call)))?;
        }
        Commands::Handshake => {
            let interceptor = lifecycle::build(&config);
            let outcome = lifecycle::connect(&interceptor, config.proxy.handshake_port).await;
            print_json(&json!({
                "proxy": interceptor.route().map(|route| route.endpoint().to_string()),
                "connected": outcome.connected,
                "managed": outcome.managed,
                "policy_enabled": interceptor.policy().is_enabled(),
            }))?;
        }
        Commands::Config => {
            let problems: Vec<String> = match validate_config(&config) {
                Ok(()) => Vec::new(),
                Err(problems) => problems.iter().map(ToString::to_string).collect(),
            };
            print_json(&json!({
                "config": config,
                "problems": problems,
            }))?;
        }
    }

    Ok(())
}

fn decision_json(decision: Decision) -> Value {
    match decision {
        Decision::Redirect(redirect) => {
            let headers: Map<String, Value> = redirect
                .headers
                .iter()
                .map(|(name, value)| {
                    let value = value.to_str().unwrap_or_default().to_string();
                    (name.to_string(), Value::String(value))
                })
                .collect();
            json!({
                "decision": "redirect",
                "request_id": redirect.request_id,
                "url": redirect.url,
                "headers": headers,
            })
        }
        Decision::Bypass(reason) => json!({
            "decision": "bypass",
            "reason": reason,
        }),
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
