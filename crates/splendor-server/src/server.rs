//! `SplendorServer` builder, configuration, and accept loop.
//!
//! This is the entry point for running a Splendor server. It ties the
//! layers together: transport → dispatcher → room directory → game.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use splendor_game::{Catalog, InMemoryCatalog};
use splendor_room::{RoomConfig, RoomDirectory};
use splendor_transport::{Transport, WebSocketTransport};

use crate::ServerError;
use crate::dispatcher::{Dispatcher, Registry, ServerContext};
use crate::handler::handle_connection;

/// Address used when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// How long a connection may stay silent before it is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Server-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// `None` keeps silent connections open forever.
    pub idle_timeout: Option<Duration>,
    /// Catalog file to load instead of the bundled card set.
    pub catalog_path: Option<PathBuf>,
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            catalog_path: None,
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads overrides from the process environment:
    ///
    /// | variable                     | meaning                          |
    /// |------------------------------|----------------------------------|
    /// | `SPLENDOR_BIND`              | listen address                   |
    /// | `SPLENDOR_SEED`              | fixed seed for codes and games   |
    /// | `SPLENDOR_CATALOG`           | path to a catalog JSON file      |
    /// | `SPLENDOR_IDLE_TIMEOUT_SECS` | idle timeout, `0` disables it    |
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("SPLENDOR_BIND") {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup("SPLENDOR_SEED") {
            let seed = raw.trim().parse::<u64>().map_err(|e| {
                ServerError::Config(format!("SPLENDOR_SEED={raw:?}: {e}"))
            })?;
            config.room.seed = Some(seed);
        }
        if let Some(path) = lookup("SPLENDOR_CATALOG") {
            config.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("SPLENDOR_IDLE_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ServerError::Config(format!(
                    "SPLENDOR_IDLE_TIMEOUT_SECS={raw:?}: {e}"
                ))
            })?;
            config.idle_timeout =
                (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// dispatcher does its own locking.
pub(crate) struct ServerState {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) idle_timeout: Option<Duration>,
}

/// Builder for configuring and starting a Splendor server.
///
/// # Example
///
/// ```rust,no_run
/// use splendor_server::SplendorServer;
///
/// # async fn run() -> Result<(), splendor_server::ServerError> {
/// let server = SplendorServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SplendorServerBuilder {
    config: ServerConfig,
    catalog: Option<Arc<dyn Catalog>>,
}

impl SplendorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            catalog: None,
        }
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn room_config(mut self, room: RoomConfig) -> Self {
        self.config.room = room;
        self
    }

    /// Fixes the seed behind enter codes and game draws.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.room.seed = Some(seed);
        self
    }

    /// Uses `catalog` instead of loading one. Takes precedence over
    /// `catalog_path`.
    pub fn catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Loads the catalog, binds the listener, and wires the dispatcher.
    pub async fn build(self) -> Result<SplendorServer, ServerError> {
        let catalog = match (self.catalog, &self.config.catalog_path) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => {
                tracing::info!(path = %path.display(), "loading catalog");
                Arc::new(InMemoryCatalog::from_path(path)?)
            }
            (None, None) => Arc::new(InMemoryCatalog::standard()?),
        };

        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let directory = RoomDirectory::new(catalog, self.config.room.clone());
        let dispatcher =
            Dispatcher::new(Registry::standard(), ServerContext::new(directory));
        let state = Arc::new(ServerState {
            dispatcher,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(SplendorServer { transport, state })
    }
}

impl Default for SplendorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Splendor server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SplendorServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl SplendorServer {
    /// Creates a new builder.
    pub fn builder() -> SplendorServerBuilder {
        SplendorServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each connection. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Splendor server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) if e.is_per_connection() => {
                    tracing::debug!(error = %e, "connection attempt rejected");
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
