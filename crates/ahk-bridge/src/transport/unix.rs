use std::{
    env, fs, io,
    os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, warn};

use super::{Listener, Transport};
use crate::BridgeConfig;

/// Unix domain sockets under a per-user runtime directory.
#[derive(Debug, Clone)]
pub struct UnixTransport {
    /// Directory holding socket files.
    dir: PathBuf,
}

impl Default for UnixTransport {
    fn default() -> Self {
        Self::new(socket_runtime_dir())
    }
}

impl UnixTransport {
    /// Place sockets in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `config.runtime_dir` when set, else the default runtime directory.
    pub fn from_config(config: &BridgeConfig) -> Self {
        config
            .runtime_dir
            .clone()
            .map_or_else(Self::default, Self::new)
    }

    /// Socket path for a channel name.
    pub fn socket_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.sock"))
    }
}

/// Per-user socket directory: `$XDG_RUNTIME_DIR/ahk-host`, falling back to
/// a uid-qualified directory under the system temp dir.
fn socket_runtime_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_RUNTIME_DIR")
        && !xdg.is_empty()
    {
        return PathBuf::from(xdg).join("ahk-host");
    }
    let uid = unsafe { libc::getuid() };
    env::temp_dir().join(format!("ahk-host-{uid}"))
}

impl Transport for UnixTransport {
    type Listener = UnixPipeListener;

    fn bind(&self, name: &str) -> io::Result<UnixPipeListener> {
        ensure_private_dir(&self.dir)?;
        let path = self.socket_path(name);
        validate_or_unlink_existing_socket(&path)?;
        let listener = UnixListener::bind(&path)?;
        debug!(path = %path.display(), "socket_bound");
        Ok(UnixPipeListener { listener, path })
    }
}

/// Bound socket; the file is removed on drop.
#[derive(Debug)]
pub struct UnixPipeListener {
    /// Tokio listener.
    listener: UnixListener,
    /// Socket file path.
    path: PathBuf,
}

#[async_trait]
impl Listener for UnixPipeListener {
    type Conn = UnixStream;

    async fn accept(&mut self) -> io::Result<UnixStream> {
        let (stream, _) = self.listener.accept().await?;
        Ok(stream)
    }
}

impl Drop for UnixPipeListener {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "socket_unlink_failed");
        }
    }
}

/// Create `dir` with mode 0700, or check that an existing one is a real
/// directory owned by the current user with no group or other access.
fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir)?;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
            return Ok(());
        }
        Err(e) => return Err(e),
        Ok(meta) => meta,
    };
    if !meta.file_type().is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("socket dir '{}' is not a directory", dir.display()),
        ));
    }
    let uid = unsafe { libc::getuid() };
    if meta.uid() != uid {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!(
                "socket dir '{}' not owned by current user (uid {} != {})",
                dir.display(),
                meta.uid(),
                uid
            ),
        ));
    }
    if meta.mode() & 0o077 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!(
                "socket dir '{}' is accessible to other users (mode {:o})",
                dir.display(),
                meta.mode() & 0o777
            ),
        ));
    }
    Ok(())
}

/// Remove a stale socket left at `path`, refusing anything that is not a
/// socket owned by the current user.
fn validate_or_unlink_existing_socket(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
        Ok(meta) => {
            let ft = meta.file_type();
            if !ft.is_socket() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("refusing to remove non-socket at '{}'", path.display()),
                ));
            }
            let uid = unsafe { libc::getuid() };
            if meta.uid() != uid {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!(
                        "socket at '{}' not owned by current user (uid {} != {})",
                        path.display(),
                        meta.uid(),
                        uid
                    ),
                ));
            }
            fs::remove_file(path)
        }
    }
}
