//! Channel lifecycle and client installation.

use std::{fmt, sync::Arc};

use ahk_script::{CallbackRegistry, ExecuteOption, Generator, GeneratorConfig, ScriptEngine};
use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::watch};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    BridgeConfig, DefaultTransport, Error, PipeMessageHandler, PipeServer, Result, ServerState,
    Transport, client,
};

/// Host side of the script messaging channel.
///
/// A bridge owns one [`CallbackRegistry`] and at most one live
/// [`PipeServer`]. Each `load` replaces the channel with a freshly named one
/// and re-points the script's client at it; previously registered callbacks
/// stay valid across loads.
pub struct Bridge<T: Transport = DefaultTransport> {
    /// Engine used to install the client stub.
    engine: Arc<dyn ScriptEngine>,
    /// Endpoint factory shared with each server.
    transport: Arc<T>,
    /// Naming, framing and recovery options.
    config: BridgeConfig,
    /// Callbacks keyed by hotkey header.
    registry: CallbackRegistry,
    /// Runtime that hosts server tasks.
    runtime: Handle,
    /// Current channel. The lock also serializes `load`.
    server: Mutex<Option<PipeServer<T>>>,
}

impl<T: Transport> fmt::Debug for Bridge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("server", &*self.server.lock())
            .finish()
    }
}

impl Bridge<DefaultTransport> {
    /// Bridge over the platform transport. Must be called inside a Tokio
    /// runtime.
    pub fn new(engine: Arc<dyn ScriptEngine>, config: BridgeConfig) -> Result<Self> {
        let transport = DefaultTransport::from_config(&config);
        Self::with_transport(engine, transport, config)
    }
}

impl<T: Transport> Bridge<T> {
    /// Bridge over an explicit transport. Must be called inside a Tokio
    /// runtime.
    pub fn with_transport(
        engine: Arc<dyn ScriptEngine>,
        transport: T,
        config: BridgeConfig,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(Self {
            engine,
            transport: Arc::new(transport),
            config,
            registry: CallbackRegistry::new(),
            runtime,
            server: Mutex::new(None),
        })
    }

    /// The callback registry served by `load_registry`.
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Bridge options.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// A generator that registers hotkey callbacks with this bridge.
    pub fn generator(&self, config: GeneratorConfig) -> Generator {
        Generator::new(config).with_registry(self.registry.clone())
    }

    /// Start a fresh channel routed to `handler` and point the script's
    /// client at it. Any previous channel is shut down first. Returns the new
    /// channel name.
    ///
    /// The new server keeps running even if the engine rejects the client
    /// code; the error carries the rejected code.
    pub fn load<H: PipeMessageHandler>(&self, handler: H) -> Result<String> {
        let mut slot = self.server.lock();
        let name = format!("{}{}", self.config.pipe_prefix, Uuid::new_v4().simple());

        if let Some(old) = slot.take() {
            old.shutdown();
        }
        let server = PipeServer::new(
            name.clone(),
            self.transport.clone(),
            Arc::new(handler),
            self.config.buffer_size,
            self.config.rebuild_backoff(),
        );
        server.start(&self.runtime);
        *slot = Some(server);
        debug!(%name, "bridge_loaded");

        let code = client::client_init_code(self.engine.as_ref(), &self.config, &name);
        if !self.engine.load_script(&code, ExecuteOption::Run) {
            warn!(%name, "client_init_rejected");
            return Err(Error::ClientInit { code });
        }
        Ok(name)
    }

    /// `load` with the bridge's callback registry as the handler.
    pub fn load_registry(&self) -> Result<String> {
        let registry = self.registry.clone();
        self.load(move |message: &str| registry.dispatch(message))
    }

    /// Stop the current channel, if any. Idempotent.
    pub fn shutdown(&self) {
        if let Some(server) = self.server.lock().take() {
            server.shutdown();
        }
    }

    /// Name of the live channel.
    pub fn pipe_name(&self) -> Option<String> {
        self.server.lock().as_ref().map(|s| s.name().to_string())
    }

    /// State of the live channel; `Idle` when none is loaded.
    pub fn server_state(&self) -> ServerState {
        self.server
            .lock()
            .as_ref()
            .map_or(ServerState::Idle, PipeServer::state)
    }

    /// State updates for the live channel.
    pub fn state_changes(&self) -> Option<watch::Receiver<ServerState>> {
        self.server.lock().as_ref().map(PipeServer::subscribe)
    }
}

impl<T: Transport> Drop for Bridge<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
