use std::path::PathBuf;

use clap::Parser;
use issuer_endpoint::{BoundIssuer, Handoff, IssuerSettings, HANDOFF_VAR};
use tracing::info;

/// Run a disposable OpenID Connect issuer until interrupted.
///
/// The URL announced by the discovery document is read from the `jwks_uri`
/// environment variable when set, otherwise derived from the bound ports.
#[derive(Parser, Debug)]
#[command(name = "issuer-endpoint", version, about)]
struct Cli {
    /// YAML settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Issuer path segment.
    #[arg(long)]
    name: Option<String>,

    /// Announce the HTTPS listener instead of the plain one.
    #[arg(long)]
    secured: bool,

    /// Host used in the issuer URL.
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    http_port: Option<u16>,

    #[arg(long)]
    https_port: Option<u16>,
}

impl Cli {
    fn apply(self, settings: &mut IssuerSettings) {
        if let Some(name) = self.name {
            settings.name = name;
        }
        if self.secured {
            settings.secured = true;
        }
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.http_port {
            settings.http_port = port;
        }
        if let Some(port) = self.https_port {
            settings.https_port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,issuer_endpoint=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = IssuerSettings::load(cli.config.as_deref())?;
    cli.apply(&mut settings);

    // Phase 1: allocate listeners. Phase 2: inject the visible URL.
    let bound = BoundIssuer::bind(settings.into_config()).await?;
    let handoff = match Handoff::from_env() {
        Some(handoff) => {
            info!(
                var = HANDOFF_VAR,
                issuer = %handoff.issuer(),
                "Using issuer URL from environment"
            );
            handoff
        }
        None => Handoff::new(bound.url()),
    };
    let issuer = bound.start(handoff);

    tokio::signal::ctrl_c().await?;
    issuer.stop().await;
    Ok(())
}
