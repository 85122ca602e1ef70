//! Remote console client for the running server.
//!
//! Each command opens a fresh session: connect, authenticate, send one
//! command, read the reply, disconnect. The byte-level protocol comes from
//! the `rcon` crate.

use std::future::Future;
use std::time::Duration;

use rcon::Connection;
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::debug;

/// Host the server's control channel listens on.
pub const CONTROL_HOST: &str = "localhost";
/// Default control channel port.
pub const DEFAULT_CONTROL_PORT: u16 = 25575;
/// Upper bound on one control session, connect to reply.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Command that reloads plugins without prompting.
pub const RELOAD_COMMAND: &str = "reload confirm";
/// Command that shuts the server down gracefully.
pub const STOP_COMMAND: &str = "stop";

/// Where and how to reach the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEndpoint {
    pub host: String,
    pub port: u16,
    pub secret: String,
}

impl ControlEndpoint {
    /// Endpoint on the local host.
    pub fn local(port: u16, secret: impl Into<String>) -> Self {
        Self {
            host: CONTROL_HOST.to_string(),
            port,
            secret: secret.into(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Control channel failures. Never fatal to a workflow.
#[derive(Debug, Error)]
pub enum ControlChannelError {
    #[error("control channel at {address} is unreachable: {reason}")]
    Unreachable { address: String, reason: String },

    #[error("control session with {address} failed: {reason}")]
    Session { address: String, reason: String },

    #[error("control session with {address} timed out after {timeout:?}")]
    Timeout { address: String, timeout: Duration },
}

/// Sends commands to a running server.
pub trait ControlChannel: Send + Sync + 'static {
    /// Run one command in its own session and return the server's reply.
    fn send_command(
        &self,
        endpoint: &ControlEndpoint,
        command: &str,
    ) -> impl Future<Output = Result<String, ControlChannelError>> + Send;

    /// Whether something accepts connections at the endpoint.
    fn is_reachable(&self, endpoint: &ControlEndpoint) -> impl Future<Output = bool> + Send;
}

/// [`ControlChannel`] speaking RCON over TCP.
#[derive(Debug, Clone)]
pub struct RconChannel {
    timeout: Duration,
}

impl Default for RconChannel {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT)
    }
}

impl RconChannel {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn session(
        &self,
        endpoint: &ControlEndpoint,
        command: &str,
    ) -> Result<String, ControlChannelError> {
        let address = endpoint.address();
        let mut connection = <Connection<TcpStream>>::builder()
            .enable_minecraft_quirks(true)
            .connect(address.as_str(), &endpoint.secret)
            .await
            .map_err(|e| match e {
                rcon::Error::Auth => ControlChannelError::Session {
                    address: address.clone(),
                    reason: "authentication rejected".to_string(),
                },
                other => ControlChannelError::Unreachable {
                    address: address.clone(),
                    reason: other.to_string(),
                },
            })?;

        connection
            .cmd(command)
            .await
            .map_err(|e| ControlChannelError::Session {
                address,
                reason: e.to_string(),
            })
    }
}

impl ControlChannel for RconChannel {
    async fn send_command(
        &self,
        endpoint: &ControlEndpoint,
        command: &str,
    ) -> Result<String, ControlChannelError> {
        debug!(address = %endpoint.address(), command, "Sending control command");
        match tokio::time::timeout(self.timeout, self.session(endpoint, command)).await {
            Ok(result) => result,
            Err(_) => Err(ControlChannelError::Timeout {
                address: endpoint.address(),
                timeout: self.timeout,
            }),
        }
    }

    async fn is_reachable(&self, endpoint: &ControlEndpoint) -> bool {
        let address = endpoint.address();
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(address.as_str())).await,
            Ok(Ok(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_endpoint_address() {
        let endpoint = ControlEndpoint::local(25575, "genAbc");
        assert_eq!(endpoint.address(), "localhost:25575");
        assert_eq!(endpoint.secret, "genAbc");
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
        // listener dropped here, the port is closed again
    }

    fn endpoint(port: u16) -> ControlEndpoint {
        ControlEndpoint {
            host: "127.0.0.1".to_string(),
            port,
            secret: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let port = closed_port().await;
        let channel = RconChannel::new(Duration::from_secs(2));

        let err = channel
            .send_command(&endpoint(port), STOP_COMMAND)
            .await
            .unwrap_err();

        assert!(matches!(err, ControlChannelError::Unreachable { .. }));
        assert!(!channel.is_reachable(&endpoint(port)).await);
    }

    #[tokio::test]
    async fn test_listening_endpoint_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let channel = RconChannel::new(Duration::from_secs(2));

        assert!(channel.is_reachable(&endpoint(port)).await);
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        // Accepts the connection but never answers the login packet.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });
        let channel = RconChannel::new(Duration::from_millis(200));

        let err = channel
            .send_command(&endpoint(port), STOP_COMMAND)
            .await
            .unwrap_err();

        assert!(matches!(err, ControlChannelError::Timeout { .. }));
        server.abort();
    }
}
