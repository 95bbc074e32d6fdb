//! TCP listener and accept loop.
//!
//! Each accepted connection is handled by its own task; connections share
//! nothing but the read-only server configuration, so no locking is needed.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use txp_core::error::Result;

use crate::connection::{self, ServerConfig};

/// A bound txp server ready to accept connections.
pub struct FileServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<ServerConfig>,
}

impl FileServer {
    /// Bind the listener to the given address.
    pub async fn bind(addr: SocketAddr, config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            config: Arc::new(config),
        })
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections forever, spawning one task per connection.
    ///
    /// A failed accept is logged and does not stop the loop; a failed
    /// connection closes only that connection.
    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr, output_dir = %self.config.output_dir.display(), "listening");

        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };

            let config = Arc::clone(&self.config);
            tokio::spawn(async move {
                match connection::handle(socket, &config).await {
                    Ok(report) => {
                        info!(
                            peer = %peer,
                            file = report.name.as_str(),
                            bytes = report.bytes,
                            "file received"
                        );
                    }
                    Err(e) => {
                        warn!(peer = %peer, error = %e, "connection failed");
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txp_core::handshake::ServerParams;

    #[tokio::test]
    async fn bind_reports_ephemeral_port() {
        let config = ServerConfig {
            output_dir: std::env::temp_dir(),
            handshake: ServerParams::default(),
        };
        let server = FileServer::bind("127.0.0.1:0".parse().unwrap(), config)
            .await
            .unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }
}
