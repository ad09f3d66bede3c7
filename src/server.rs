//! TCP listener and per-connection dispatch
//!
//! Every accepted connection gets its own tokio task that negotiates TN3270
//! and runs a [`Session`]. Tasks share nothing but the [`FeedRegistry`] and
//! the stateless headline source; a failing connection never affects others.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::fetcher::HeadlineSource;
use crate::registry::FeedRegistry;
use crate::session::Session;
use crate::tn3270::Tn3270Session;
use socket2::{SockRef, TcpKeepalive};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Idle time before the first keepalive probe on client sockets
const KEEPALIVE_IDLE: Duration = Duration::from_secs(60);

/// Interval between keepalive probes
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Listening gateway
pub struct Gateway<F> {
    listener: TcpListener,
    config: Arc<GatewayConfig>,
    registry: Arc<FeedRegistry>,
    source: Arc<F>,
}

impl<F> Gateway<F>
where
    F: HeadlineSource + 'static,
{
    /// Bind the listener described by `config`
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Io`] if the address cannot be bound.
    pub async fn bind(config: GatewayConfig, registry: Arc<FeedRegistry>, source: F) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr()).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            config: Arc::new(config),
            registry,
            source: Arc::new(source),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever
    ///
    /// Accept errors are logged and the loop continues.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("accept: {}", e);
                    continue;
                }
            };

            let span = info_span!("session", id = %Uuid::new_v4(), %peer);
            let config = Arc::clone(&self.config);
            let registry = Arc::clone(&self.registry);
            let source = Arc::clone(&self.source);

            tokio::spawn(
                async move {
                    info!("Client connected");
                    match handle_connection(stream, &config, registry, source).await {
                        Ok(()) => info!("Client disconnected"),
                        Err(GatewayError::ConnectionClosed) => info!("Client closed connection"),
                        Err(e) => warn!("Session failed: {}", e),
                    }
                }
                .instrument(span),
            );
        }
    }
}

/// Enable TCP_NODELAY and keepalive on an accepted socket
fn tune_socket(stream: &TcpStream) {
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY: {}", e);
    }

    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_IDLE)
        .with_interval(KEEPALIVE_INTERVAL);
    if let Err(e) = SockRef::from(stream).set_tcp_keepalive(&keepalive) {
        warn!("Failed to enable TCP keepalive: {}", e);
    }
}

async fn handle_connection<F>(
    stream: TcpStream,
    config: &GatewayConfig,
    registry: Arc<FeedRegistry>,
    source: Arc<F>,
) -> Result<()>
where
    F: HeadlineSource,
{
    tune_socket(&stream);

    let transport = Tn3270Session::negotiate(stream, config.negotiation_timeout).await?;
    debug!("Terminal type {}", transport.terminal_type());

    Session::new(transport, source, registry, config.max_headlines)
        .run()
        .await
}
