use std::{
    collections::HashMap,
    fmt, io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::{
    io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf, duplex},
    sync::mpsc,
};

use super::{Listener, Transport};

/// Size of the in-memory duplex buffers.
const DUPLEX_CAPACITY: usize = 64 * 1024;

/// Where an injected connection breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnFailure {
    /// The first read fails.
    Read,
    /// The first read yields `message` (already encoded); writing the reply
    /// fails.
    Write(Vec<u8>),
}

/// What a memory listener receives on its next accept.
enum Incoming {
    /// A connected client.
    Conn(DuplexStream),
    /// A connection that fails mid-exchange.
    Broken(ConnFailure),
    /// An injected accept failure.
    Fail(io::ErrorKind),
}

impl fmt::Debug for Incoming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conn(_) => f.write_str("Conn"),
            Self::Broken(c) => write!(f, "Broken({c:?})"),
            Self::Fail(k) => write!(f, "Fail({k:?})"),
        }
    }
}

/// In-process transport for tests and embedding.
///
/// Clones share the same endpoint table. `connect` reaches whichever
/// listener is currently bound under a name; `inject_accept_failure` and
/// `inject_conn_failure` make that listener's next accept, or the
/// connection it yields, fail.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    /// Shared endpoint table.
    inner: Arc<Mutex<Endpoints>>,
}

/// Bound endpoints and bind counters.
#[derive(Default)]
struct Endpoints {
    /// Sender half for each live name.
    live: HashMap<String, mpsc::UnboundedSender<Incoming>>,
    /// Number of times each name has been bound.
    binds: HashMap<String, usize>,
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryTransport")
            .field("binds", &inner.binds)
            .finish()
    }
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send an incoming item to the listener bound under `name`.
    fn deliver(&self, name: &str, item: Incoming) -> io::Result<()> {
        let inner = self.inner.lock();
        let tx = inner
            .live
            .get(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))?;
        tx.send(item)
            .map_err(|_| io::Error::new(io::ErrorKind::ConnectionRefused, name.to_string()))
    }

    /// Connect a client to `name`.
    pub fn connect(&self, name: &str) -> io::Result<DuplexStream> {
        let (client, server) = duplex(DUPLEX_CAPACITY);
        self.deliver(name, Incoming::Conn(server))?;
        Ok(client)
    }

    /// Make the next accept on `name` fail. Returns false when nothing is
    /// listening under that name.
    pub fn inject_accept_failure(&self, name: &str) -> bool {
        self.deliver(name, Incoming::Fail(io::ErrorKind::BrokenPipe))
            .is_ok()
    }

    /// Hand the listener on `name` a connection that breaks as `failure`
    /// describes. Returns false when nothing is listening under that name.
    pub fn inject_conn_failure(&self, name: &str, failure: ConnFailure) -> bool {
        self.deliver(name, Incoming::Broken(failure)).is_ok()
    }

    /// Whether a live listener holds `name`.
    pub fn is_bound(&self, name: &str) -> bool {
        self.inner
            .lock()
            .live
            .get(name)
            .is_some_and(|tx| !tx.is_closed())
    }

    /// How many times `name` has been bound.
    pub fn bind_count(&self, name: &str) -> usize {
        self.inner.lock().binds.get(name).copied().unwrap_or(0)
    }
}

impl Transport for MemoryTransport {
    type Listener = MemoryListener;

    fn bind(&self, name: &str) -> io::Result<MemoryListener> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        if inner.live.get(name).is_some_and(|t| !t.is_closed()) {
            return Err(io::Error::new(io::ErrorKind::AddrInUse, name.to_string()));
        }
        inner.live.insert(name.to_string(), tx);
        *inner.binds.entry(name.to_string()).or_default() += 1;
        Ok(MemoryListener { rx })
    }
}

/// Receiving end of a memory endpoint.
#[derive(Debug)]
pub struct MemoryListener {
    /// Incoming connections and injected failures.
    rx: mpsc::UnboundedReceiver<Incoming>,
}

#[async_trait]
impl Listener for MemoryListener {
    type Conn = MemoryConn;

    async fn accept(&mut self) -> io::Result<MemoryConn> {
        match self.rx.recv().await {
            Some(Incoming::Conn(stream)) => Ok(MemoryConn {
                stream,
                failure: None,
            }),
            Some(Incoming::Broken(failure)) => {
                let (stream, _) = duplex(DUPLEX_CAPACITY);
                Ok(MemoryConn {
                    stream,
                    failure: Some(failure),
                })
            }
            Some(Incoming::Fail(kind)) => Err(io::Error::new(kind, "injected failure")),
            None => Err(io::ErrorKind::BrokenPipe.into()),
        }
    }
}

/// Server side of a memory connection.
#[derive(Debug)]
pub struct MemoryConn {
    /// Duplex half shared with the client.
    stream: DuplexStream,
    /// Injected breakage, if any.
    failure: Option<ConnFailure>,
}

/// The error injected connections report.
fn injected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "injected failure")
}

impl AsyncRead for MemoryConn {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match &mut this.failure {
            Some(ConnFailure::Read) => Poll::Ready(Err(injected())),
            Some(ConnFailure::Write(pending)) if !pending.is_empty() => {
                let n = pending.len().min(buf.remaining());
                buf.put_slice(&pending[..n]);
                pending.drain(..n);
                Poll::Ready(Ok(()))
            }
            _ => Pin::new(&mut this.stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MemoryConn {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.failure.is_some() {
            return Poll::Ready(Err(injected()));
        }
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if self.failure.is_some() {
            return Poll::Ready(Err(injected()));
        }
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[tokio::test]
    async fn connect_requires_bound_name() {
        let t = MemoryTransport::new();
        assert_eq!(t.connect("x").unwrap_err().kind(), io::ErrorKind::NotFound);
        let mut l = t.bind("x").unwrap();
        let mut client = t.connect("x").unwrap();
        let mut conn = l.accept().await.unwrap();
        client.write_all(b"hi").await.unwrap();
        let mut buf = [0u8; 2];
        conn.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hi");
    }

    #[tokio::test]
    async fn dropped_listener_refuses() {
        let t = MemoryTransport::new();
        let l = t.bind("x").unwrap();
        assert!(t.is_bound("x"));
        drop(l);
        assert!(!t.is_bound("x"));
        assert!(!t.inject_accept_failure("x"));
        assert!(!t.inject_conn_failure("x", ConnFailure::Read));
        assert_eq!(
            t.connect("x").unwrap_err().kind(),
            io::ErrorKind::ConnectionRefused
        );
        // Rebinding after release is allowed.
        assert!(t.bind("x").is_ok());
        assert_eq!(t.bind_count("x"), 2);
    }

    #[tokio::test]
    async fn injected_failure_surfaces_on_accept() {
        let t = MemoryTransport::new();
        let mut l = t.bind("x").unwrap();
        assert!(t.bind("x").is_err());
        assert!(t.inject_accept_failure("x"));
        assert_eq!(
            l.accept().await.unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
    }

    #[tokio::test]
    async fn broken_conns_fail_where_told() {
        let t = MemoryTransport::new();
        let mut l = t.bind("x").unwrap();

        assert!(t.inject_conn_failure("x", ConnFailure::Read));
        let mut conn = l.accept().await.unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(
            conn.read(&mut buf).await.unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );

        assert!(t.inject_conn_failure("x", ConnFailure::Write(b"ab".to_vec())));
        let mut conn = l.accept().await.unwrap();
        let n = conn.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ab");
        assert_eq!(
            conn.write_all(b"reply").await.unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
    }
}
