use std::net::TcpListener;
use std::sync::Arc;

use auth_service::configuration::get_configuration;
use auth_service::startup::run;
use auth_service::store::{InMemoryUserStore, UserStore};
use auth_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting auth service");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    // In-memory store by default; a persistent backend plugs in behind the
    // same UserStore trait.
    let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Auth service listening on {}", address);

    run(listener, store, configuration.jwt)?.await
}
