use clap::{Parser, Subcommand};
use propdata_core::ProviderConfig;
use propdata_enrichment::EnrichmentClient;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "propdata-cli")]
#[command(about = "Property-data enrichment lookups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up a single property
    Lookup {
        #[command(subcommand)]
        command: LookupCommands,
    },
    /// Show whether the provider is configured
    Status,
}

#[derive(Debug, Subcommand)]
enum LookupCommands {
    /// Search by street address and locality
    Address {
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        zip: Option<String>,
    },
    /// Search by assessor parcel number within a county
    Parcel {
        #[arg(long)]
        apn: String,
        #[arg(long)]
        fips: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = propdata_core::load_provider_config()?;
    init_tracing(&config)?;

    let client = EnrichmentClient::new(&config)?;
    tracing::debug!(
        configured = client.configuration_status().provider_configured,
        "enrichment client ready"
    );
    match cli.command {
        Commands::Lookup { command } => {
            let result = match command {
                LookupCommands::Address {
                    street,
                    city,
                    state,
                    zip,
                } => {
                    client
                        .lookup_by_address(
                            &street,
                            city.as_deref(),
                            state.as_deref(),
                            zip.as_deref(),
                        )
                        .await?
                }
                LookupCommands::Parcel { apn, fips } => client.lookup_by_parcel(&apn, &fips).await?,
            };
            print_json(&result)?;
        }
        Commands::Status => print_json(&client.status().await)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level, with raw provider bodies
/// enabled when debug mode is on.
fn init_tracing(config: &ProviderConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let filter = EnvFilter::try_new(&config.log_level)?;
            if config.debug {
                filter.add_directive("propdata_enrichment=debug".parse()?)
            } else {
                filter
            }
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
