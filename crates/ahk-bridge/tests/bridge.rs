use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use ahk_bridge::{
    Bridge, BridgeConfig, CLIENT_PROBE, ConnFailure, Error, MemoryTransport, ServerState, codec,
};
use ahk_script::{GeneratorConfig, Key, KeyAction, MockEngine, ScriptEngine};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    time,
};

fn config() -> BridgeConfig {
    BridgeConfig {
        rebuild_backoff_ms: 1,
        ..BridgeConfig::default()
    }
}

fn bridge() -> (Bridge<MemoryTransport>, MemoryTransport, Arc<MockEngine>) {
    logging::init_from_spec("ahk_bridge=debug,ahk_script=debug");
    let transport = MemoryTransport::new();
    let engine = Arc::new(MockEngine::new());
    let b = Bridge::with_transport(engine.clone(), transport.clone(), config()).unwrap();
    (b, transport, engine)
}

async fn until(mut cond: impl FnMut() -> bool) {
    time::timeout(Duration::from_secs(5), async {
        while !cond() {
            time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached");
}

async fn request<S: AsyncRead + AsyncWrite + Unpin>(conn: &mut S, msg: &str) -> String {
    conn.write_all(&codec::encode(msg)).await.unwrap();
    let mut buf = vec![0u8; 4096];
    let n = conn.read(&mut buf).await.unwrap();
    codec::decode(&buf[..n])
}

#[tokio::test]
async fn hotkey_callback_round_trip() {
    let (b, t, engine) = bridge();
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = hits.clone();
    let g = b.generator(GeneratorConfig::default());
    let text = g
        .hotkey(Key::A, [Key::Control])
        .action(KeyAction::press(Key::Num3))
        .on_up(move |h| {
            seen.fetch_add(1, Ordering::SeqCst);
            format!("{h} was invoked")
        })
        .build(&g);
    assert!(text.contains("SendPipeMessage(\"^a UP\")"));
    assert!(b.registry().contains("^a UP"));

    let name = b.load_registry().unwrap();
    assert!(name.starts_with("AHK-PIPE-"));
    assert_eq!(name.len(), "AHK-PIPE-".len() + 32);
    assert!(engine.function_exists(CLIENT_PROBE));
    assert!(engine.loaded()[0].0.contains(&format!("new PipeClient(\"{name}\")")));

    until(|| b.server_state() == ServerState::Listening).await;
    let mut c = t.connect(&name).unwrap();
    assert_eq!(request(&mut c, "^a UP").await, "^a UP was invoked");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    // Unknown headers get an empty reply and the channel stays usable.
    assert_eq!(request(&mut c, "^b UP").await, "");
    assert_eq!(request(&mut c, "^a UP").await, "^a UP was invoked");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reload_replaces_channel() {
    let (b, t, engine) = bridge();
    let first_hits = Arc::new(AtomicUsize::new(0));
    let counter = first_hits.clone();
    let first = b
        .load(move |m: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            m.to_string()
        })
        .unwrap();
    until(|| t.is_bound(&first)).await;

    let second = b.load(|m: &str| format!("2:{m}")).unwrap();
    assert_ne!(first, second);
    assert_eq!(b.pipe_name().as_deref(), Some(second.as_str()));

    // Second load closes the old client instead of re-adding the stub.
    let loaded = engine.loaded();
    assert_eq!(loaded.len(), 2);
    assert!(loaded[1].0.starts_with("A__PIPECLIENT.Close()\n"));
    assert!(!loaded[1].0.contains(CLIENT_PROBE));

    until(|| !t.is_bound(&first)).await;
    assert!(!t.inject_accept_failure(&first));
    assert!(t.connect(&first).is_err());
    assert_eq!(first_hits.load(Ordering::SeqCst), 0);

    until(|| b.server_state() == ServerState::Listening).await;
    let mut c = t.connect(&second).unwrap();
    assert_eq!(request(&mut c, "x").await, "2:x");
}

#[tokio::test]
async fn survives_transport_failure() {
    let (b, t, _) = bridge();
    b.registry()
        .register("F1", Arc::new(|h: &str| format!("ok {h}")));
    let name = b.load_registry().unwrap();
    until(|| b.server_state() == ServerState::Listening).await;

    assert!(t.inject_accept_failure(&name));
    until(|| t.bind_count(&name) >= 2).await;
    until(|| b.server_state() == ServerState::Listening).await;

    let mut c = t.connect(&name).unwrap();
    assert_eq!(request(&mut c, "F1").await, "ok F1");
}

#[tokio::test]
async fn survives_broken_connection() {
    let (b, t, _) = bridge();
    b.registry()
        .register("F2", Arc::new(|h: &str| format!("ok {h}")));
    let name = b.load_registry().unwrap();
    until(|| b.server_state() == ServerState::Listening).await;

    assert!(t.inject_conn_failure(&name, ConnFailure::Read));
    until(|| t.bind_count(&name) >= 2).await;
    until(|| b.server_state() == ServerState::Listening).await;

    let mut c = t.connect(&name).unwrap();
    assert_eq!(request(&mut c, "F2").await, "ok F2");
}

#[tokio::test]
async fn client_reconnects_after_disconnect() {
    let (b, t, _) = bridge();
    let name = b.load(|m: &str| m.chars().rev().collect()).unwrap();
    let mut states = b.state_changes().unwrap();
    until(|| b.server_state() == ServerState::Listening).await;

    let mut c = t.connect(&name).unwrap();
    assert_eq!(request(&mut c, "abc").await, "cba");
    drop(c);
    time::timeout(
        Duration::from_secs(5),
        states.wait_for(|s| *s == ServerState::Listening),
    )
    .await
    .unwrap()
    .unwrap();

    let mut c = t.connect(&name).unwrap();
    assert_eq!(request(&mut c, "xy").await, "yx");
    assert_eq!(t.bind_count(&name), 1);
}

#[tokio::test]
async fn shutdown_twice_is_quiet() {
    let (b, t, _) = bridge();
    let name = b.load_registry().unwrap();
    until(|| t.is_bound(&name)).await;
    b.shutdown();
    assert_eq!(b.server_state(), ServerState::Idle);
    assert_eq!(b.pipe_name(), None);
    b.shutdown();
    assert_eq!(b.server_state(), ServerState::Idle);
    until(|| !t.is_bound(&name)).await;
}

#[tokio::test]
async fn rejected_client_code_is_reported() {
    let (b, _, engine) = bridge();
    engine.set_reject(true);
    match b.load_registry() {
        Err(Error::ClientInit { code }) => assert!(code.contains("class PipeClient")),
        other => panic!("unexpected: {other:?}"),
    }
    // The server itself still came up.
    assert!(b.pipe_name().is_some());
}

#[test]
fn requires_runtime() {
    let engine = Arc::new(MockEngine::new());
    let r = Bridge::with_transport(engine, MemoryTransport::new(), config());
    assert!(matches!(r, Err(Error::NoRuntime)));
}

#[cfg(unix)]
#[tokio::test]
async fn unix_socket_round_trip() {
    use ahk_bridge::UnixTransport;
    use tokio::net::UnixStream;

    let dir = std::env::temp_dir().join(format!("ahk-bridge-it-{}", std::process::id()));
    let cfg = BridgeConfig {
        runtime_dir: Some(dir.clone()),
        ..config()
    };
    let transport = UnixTransport::from_config(&cfg);
    let engine = Arc::new(MockEngine::new());
    let b = Bridge::with_transport(engine, transport.clone(), cfg).unwrap();
    b.registry()
        .register("#z", Arc::new(|_: &str| "zapped".to_string()));
    let name = b.load_registry().unwrap();
    until(|| b.server_state() == ServerState::Listening).await;

    let path = transport.socket_path(&name);
    assert!(path.starts_with(&dir));
    let mut c = UnixStream::connect(&path).await.unwrap();
    assert_eq!(request(&mut c, "#z").await, "zapped");
    assert_eq!(request(&mut c, "nope").await, "");

    drop(c);
    b.shutdown();
    until(|| !path.exists()).await;
}
