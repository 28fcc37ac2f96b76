use std::io;

use async_trait::async_trait;
use tokio::net::windows::named_pipe::{NamedPipeServer, ServerOptions};

use super::{Listener, Transport};

/// Windows named pipes at `\\.\pipe\<name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedPipeTransport;

impl NamedPipeTransport {
    /// Named pipes need no configuration.
    pub fn from_config(_config: &crate::BridgeConfig) -> Self {
        Self
    }

    /// Full pipe path for a channel name.
    pub fn pipe_path(name: &str) -> String {
        format!(r"\\.\pipe\{name}")
    }
}

impl Transport for NamedPipeTransport {
    type Listener = NamedPipeListener;

    fn bind(&self, name: &str) -> io::Result<NamedPipeListener> {
        let path = Self::pipe_path(name);
        let next = ServerOptions::new().first_pipe_instance(true).create(&path)?;
        Ok(NamedPipeListener {
            path,
            next: Some(next),
        })
    }
}

/// A pipe instance waiting for a client. A fresh instance is created after
/// each accept so the name stays claimed.
#[derive(Debug)]
pub struct NamedPipeListener {
    /// Pipe path.
    path: String,
    /// Instance to hand out on the next accept.
    next: Option<NamedPipeServer>,
}

#[async_trait]
impl Listener for NamedPipeListener {
    type Conn = NamedPipeServer;

    async fn accept(&mut self) -> io::Result<NamedPipeServer> {
        let server = match self.next.take() {
            Some(s) => s,
            None => ServerOptions::new().create(&self.path)?,
        };
        server.connect().await?;
        self.next = Some(ServerOptions::new().create(&self.path)?);
        Ok(server)
    }
}
