//! Self-healing request/response server.
//!
//! State machine: `Idle` binds and moves to `Listening`; an accepted client
//! moves to `Connected`; a clean client disconnect returns to `Listening`.
//! Any transport error from bind, accept, read or write drops the listener,
//! returns to `Idle`, waits the rebuild backoff and binds again.

use std::{fmt, io, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    runtime::Handle,
    sync::watch,
    task::{self, JoinHandle},
    time,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    codec,
    transport::{Conn, Listener, Transport},
};

/// Observable server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerState {
    /// No endpoint bound.
    #[default]
    Idle,
    /// Bound and waiting for a client.
    Listening,
    /// Serving a client.
    Connected,
}

/// Turns one inbound message into the reply text.
pub trait PipeMessageHandler: Send + Sync + 'static {
    /// Handle a decoded message. The return value is sent back verbatim.
    fn handle(&self, message: &str) -> String;
}

impl<F> PipeMessageHandler for F
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    fn handle(&self, message: &str) -> String {
        self(message)
    }
}

/// State shared between the server handle and its task.
struct Shared<T: Transport> {
    /// Channel name.
    name: String,
    /// Endpoint factory.
    transport: Arc<T>,
    /// Message handler.
    handler: Arc<dyn PipeMessageHandler>,
    /// Read buffer size.
    buffer_size: usize,
    /// Delay before re-binding.
    backoff: Duration,
    /// Current state.
    state: watch::Sender<ServerState>,
}

impl<T: Transport> Shared<T> {
    /// Publish a transition made by the task owning `cancel`. Ignored once
    /// `cancel` fires; the check runs under the watch lock, so a shut-down
    /// server never leaves `Idle`.
    fn set_state(&self, next: ServerState, cancel: &CancellationToken) {
        let mut prev = next;
        let changed = self.state.send_if_modified(|s| {
            if cancel.is_cancelled() || *s == next {
                return false;
            }
            prev = *s;
            *s = next;
            true
        });
        if changed {
            debug!(name = %self.name, ?prev, ?next, "pipe_state");
        }
    }

    /// Force `Idle`. Only called after the owning task was cancelled.
    fn reset_state(&self) {
        let prev = self.state.send_replace(ServerState::Idle);
        if prev != ServerState::Idle {
            debug!(name = %self.name, ?prev, "pipe_state_reset");
        }
    }
}

/// A started server task.
struct Running {
    /// Stops the task at its next await point.
    cancel: CancellationToken,
    /// Task handle.
    task: JoinHandle<()>,
}

/// One named channel and the task serving it.
pub struct PipeServer<T: Transport> {
    /// Shared with the task.
    shared: Arc<Shared<T>>,
    /// Present while started.
    running: Mutex<Option<Running>>,
}

impl<T: Transport> fmt::Debug for PipeServer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeServer")
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .finish()
    }
}

impl<T: Transport> PipeServer<T> {
    /// Create a stopped server for `name`.
    pub fn new(
        name: impl Into<String>,
        transport: Arc<T>,
        handler: Arc<dyn PipeMessageHandler>,
        buffer_size: usize,
        backoff: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ServerState::Idle);
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                transport,
                handler,
                buffer_size: buffer_size.max(2),
                backoff,
                state,
            }),
            running: Mutex::new(None),
        }
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Current state.
    pub fn state(&self) -> ServerState {
        *self.shared.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.shared.state.subscribe()
    }

    /// Whether the serving task is running.
    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Spawn the serving task on `handle`. A no-op while already running.
    pub fn start(&self, handle: &Handle) {
        let mut running = self.running.lock();
        if running.is_some() {
            return;
        }
        let cancel = CancellationToken::new();
        let task = handle.spawn(run(self.shared.clone(), cancel.clone()));
        debug!(name = %self.shared.name, "pipe_started");
        *running = Some(Running { cancel, task });
    }

    /// Stop the task and release the endpoint. Idempotent; never fails.
    pub fn shutdown(&self) {
        if let Some(r) = self.running.lock().take() {
            r.cancel.cancel();
            r.task.abort();
            debug!(name = %self.shared.name, "pipe_shutdown");
        }
        self.shared.reset_state();
    }
}

impl<T: Transport> Drop for PipeServer<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Bind, serve, and rebuild until cancelled.
async fn run<T: Transport>(shared: Arc<Shared<T>>, cancel: CancellationToken) {
    loop {
        let result = match shared.transport.bind(&shared.name) {
            Ok(mut listener) => tokio::select! {
                _ = cancel.cancelled() => return,
                r = listen(&shared, &mut listener, &cancel) => r,
            },
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(name = %shared.name, error = %e, "pipe_rebuild");
        }
        shared.set_state(ServerState::Idle, &cancel);
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = time::sleep(shared.backoff) => {}
        }
    }
}

/// Accept and serve clients one at a time. Only returns on error.
async fn listen<T: Transport>(
    shared: &Shared<T>,
    listener: &mut T::Listener,
    cancel: &CancellationToken,
) -> io::Result<()> {
    loop {
        shared.set_state(ServerState::Listening, cancel);
        let conn = listener.accept().await?;
        shared.set_state(ServerState::Connected, cancel);
        serve(shared, conn).await?;
        debug!(name = %shared.name, "pipe_client_disconnected");
    }
}

/// Request/response loop for one client. `Ok` means the client hung up.
async fn serve<T: Transport, C: Conn>(shared: &Shared<T>, mut conn: C) -> io::Result<()> {
    let mut buf = vec![0u8; shared.buffer_size];
    loop {
        let n = conn.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        let message = codec::decode(&buf[..n]);
        let reply = dispatch(&shared.handler, message).await;
        conn.write_all(&codec::encode(&reply)).await?;
        conn.flush().await?;
    }
}

/// Run the handler off the async workers. A panicking handler yields an
/// empty reply.
async fn dispatch(handler: &Arc<dyn PipeMessageHandler>, message: String) -> String {
    let handler = handler.clone();
    match task::spawn_blocking(move || handler.handle(&message)).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "pipe_handler_failed");
            String::new()
        }
    }
}
