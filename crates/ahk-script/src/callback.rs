use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use tracing::trace;

/// Host function invoked when a hotkey fires. Receives the hotkey header and
/// returns the text handed back to the script.
pub type HotkeyCallback = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Maps hotkey headers to host callbacks.
///
/// Cloning shares the underlying map. Entries are added or replaced, never
/// removed. Lookups may run concurrently with registrations.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    /// Header text to callback.
    inner: Arc<RwLock<HashMap<String, HotkeyCallback>>>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `header`, replacing any earlier entry.
    /// Returns true if an entry was replaced.
    pub fn register(&self, header: &str, callback: HotkeyCallback) -> bool {
        let replaced = self
            .inner
            .write()
            .insert(header.to_string(), callback)
            .is_some();
        trace!(header, replaced, "callback_registered");
        replaced
    }

    /// Run the callback registered for `message`. A miss yields empty text.
    ///
    /// The callback runs without any registry lock held, so it may register
    /// further callbacks.
    pub fn dispatch(&self, message: &str) -> String {
        let cb = self.inner.read().get(message).cloned();
        match cb {
            Some(cb) => cb(message),
            None => {
                trace!(message, "callback_miss");
                String::new()
            }
        }
    }

    /// True if a callback is registered under `header`.
    pub fn contains(&self, header: &str) -> bool {
        self.inner.read().contains_key(header)
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Registered headers, sorted.
    pub fn headers(&self) -> Vec<String> {
        let mut out: Vec<String> = self.inner.read().keys().cloned().collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn dispatch_hit_and_miss() {
        let reg = CallbackRegistry::new();
        reg.register("^a UP", Arc::new(|h: &str| format!("got {h}")));
        assert_eq!(reg.dispatch("^a UP"), "got ^a UP");
        assert_eq!(reg.dispatch("^b UP"), "");
        assert_eq!(reg.dispatch(""), "");
    }

    #[test]
    fn later_registration_shadows() {
        let reg = CallbackRegistry::new();
        assert!(!reg.register("x", Arc::new(|_: &str| "first".into())));
        assert!(reg.register("x", Arc::new(|_: &str| "second".into())));
        assert_eq!(reg.dispatch("x"), "second");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn callback_may_register() {
        let reg = CallbackRegistry::new();
        let inner = reg.clone();
        reg.register(
            "outer",
            Arc::new(move |_: &str| {
                inner.register("inner", Arc::new(|_: &str| "ok".into()));
                "done".into()
            }),
        );
        assert_eq!(reg.dispatch("outer"), "done");
        assert_eq!(reg.dispatch("inner"), "ok");
    }

    #[test]
    fn concurrent_register_and_dispatch() {
        let reg = CallbackRegistry::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let reg = reg.clone();
                thread::spawn(move || {
                    for j in 0..100 {
                        let name = format!("k{i}-{j}");
                        reg.register(&name, Arc::new(|h: &str| h.to_string()));
                        assert_eq!(reg.dispatch(&name), name);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(reg.len(), 400);
    }
}
