//! Duplex messaging bridge between a running AutoHotkey script and the host.
//!
//! The script calls `SendPipeMessage("<header>")`; the bridge receives the
//! text, hands it to a [`PipeMessageHandler`] (normally the callback
//! registry), and writes the handler's return value back as the call's
//! result.
//!
//! Public API
//! - [`Bridge`]: owns the callback registry and the current channel. `load`
//!   creates a fresh uniquely named channel, replacing any previous one, and
//!   installs the script-side client stub through the [`ahk_script::ScriptEngine`].
//! - [`PipeServer`]: the self-healing accept/read/dispatch/write loop.
//! - [`Transport`]: how channels are bound. [`UnixTransport`] on Unix,
//!   [`NamedPipeTransport`] on Windows, and [`MemoryTransport`] in-process.
//!
//! Connection lifecycle
//! - One client is served at a time. A second client waits until the first
//!   disconnects and the server loops back to accepting.
//! - Messages are UTF-16LE text, one message per read, bounded by the
//!   configured buffer size. There is no length prefix; client and server
//!   alternate strictly request/response.
//! - Any transport failure tears the listener down and binds a fresh one.
//!   Failures never reach the handler or the caller of `load`.
#![warn(missing_docs)]

mod bridge;
mod client;
pub mod codec;
mod config;
mod error;
mod server;
mod transport;

pub use bridge::Bridge;
pub use client::{CLIENT_PROBE, client_init_code, client_script};
pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use server::{PipeMessageHandler, PipeServer, ServerState};
#[cfg(windows)]
pub use transport::NamedPipeTransport;
#[cfg(unix)]
pub use transport::UnixTransport;
pub use transport::{
    Conn, ConnFailure, DefaultTransport, Listener, MemoryConn, MemoryTransport, Transport,
};
