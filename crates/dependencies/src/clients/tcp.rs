use super::TcpConnector;
use crate::error::ClientError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Plain TCP reachability check with a connect timeout.
#[derive(Debug, Clone)]
pub struct TokioTcpConnector {
    timeout: Duration,
}

impl TokioTcpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl TcpConnector for TokioTcpConnector {
    async fn connect(&self, host: &str, port: u16) -> Result<(), ClientError> {
        match timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(ClientError::Connection(format!(
                "failed to connect to {}:{}: {}",
                host, port, e
            ))),
            Err(_) => Err(ClientError::Timeout(self.timeout)),
        }
    }
}
