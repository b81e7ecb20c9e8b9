use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tt_server::ServerConfig;

pub fn run(
    host: Option<String>,
    port: Option<u16>,
    enable_success_types: bool,
) -> Result<(), String> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tt_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ServerConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if enable_success_types {
        config = config.with_success_types(true);
    }

    tracing::info!(
        address = %config.bind_addr(),
        delay_ms = ?config.roll_delay_ms,
        "Starting dice server"
    );

    super::runtime()?
        .block_on(tt_server::serve(config))
        .map_err(|e| format!("server error: {e}"))
}
