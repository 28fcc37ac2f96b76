//! Channel transports.
//!
//! A [`Transport`] binds a named endpoint and yields a [`Listener`]; the
//! listener accepts one duplex connection at a time. Dropping a listener
//! releases the endpoint.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

mod memory;
#[cfg(windows)]
mod windows;
#[cfg(unix)]
mod unix;

pub use memory::{ConnFailure, MemoryConn, MemoryTransport};
#[cfg(unix)]
pub use unix::UnixTransport;
#[cfg(windows)]
pub use windows::NamedPipeTransport;

/// Platform default transport.
#[cfg(unix)]
pub type DefaultTransport = UnixTransport;
/// Platform default transport.
#[cfg(windows)]
pub type DefaultTransport = NamedPipeTransport;

/// A connected duplex byte stream.
pub trait Conn: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> Conn for T {}

/// A bound endpoint accepting connections.
#[async_trait]
pub trait Listener: Send + 'static {
    /// Connection type produced by `accept`.
    type Conn: Conn;

    /// Wait for the next client.
    async fn accept(&mut self) -> io::Result<Self::Conn>;
}

/// Binds named endpoints.
pub trait Transport: Send + Sync + 'static {
    /// Listener type produced by `bind`.
    type Listener: Listener;

    /// Bind the endpoint for `name`. Must be called within a Tokio runtime.
    fn bind(&self, name: &str) -> io::Result<Self::Listener>;
}
