//! The capability used to run generated text.

use std::collections::HashMap;

use tracing::warn;

use crate::{Error, GeneratorConfig, Result};

/// Variable used by [`ScriptEngineExt::evaluate`] to carry results.
pub const EVAL_VAR: &str = "A__EVAL";

/// Most arguments the engine's function-call entry point accepts.
pub const MAX_CALL_ARGS: usize = 10;

/// How code added to a running script is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecuteOption {
    /// Add the code without running it.
    Add,
    /// Add the code and run it.
    #[default]
    Run,
    /// Add the code, run it and wait for it to finish.
    RunWait,
}

impl ExecuteOption {
    /// Numeric flag passed to the native `addScript` entry point.
    pub fn flag(self) -> u8 {
        match self {
            Self::Add => 0,
            Self::Run => 1,
            Self::RunWait => 2,
        }
    }
}

/// A running script engine.
///
/// Failures are reported through return values; implementations must not
/// panic on rejected code.
pub trait ScriptEngine: Send + Sync {
    /// Run `code` immediately. True on success.
    fn execute(&self, code: &str) -> bool;

    /// Add `code` to the running script.
    fn load_script(&self, code: &str, option: ExecuteOption) -> bool;

    /// Read a script variable; empty when unset.
    fn get_variable(&self, name: &str) -> String;

    /// Assign a script variable, creating it if needed.
    fn set_variable(&self, name: &str, value: &str) -> bool;

    /// Call a script function and return its result as text.
    fn call_function(&self, name: &str, args: &[&str]) -> String;

    /// True if the script defines function `name`.
    fn function_exists(&self, _name: &str) -> bool {
        false
    }

    /// True once the engine initialized successfully.
    fn is_ready(&self) -> bool {
        true
    }

    /// Stop the running script. False when unsupported.
    fn terminate(&self) -> bool {
        false
    }

    /// Stop the running script and reload it from scratch. False when
    /// unsupported.
    fn reset(&self) -> bool {
        false
    }
}

/// Conveniences layered over any [`ScriptEngine`].
pub trait ScriptEngineExt: ScriptEngine {
    /// Evaluate an expression and return its value; empty on failure.
    fn evaluate(&self, expr: &str) -> String {
        if self.execute(&format!("{EVAL_VAR}:={expr}")) {
            self.get_variable(EVAL_VAR)
        } else {
            String::new()
        }
    }

    /// Assign several variables, reporting success per name.
    fn set_vars<'a, I>(&self, vars: I) -> HashMap<String, bool>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        vars.into_iter()
            .map(|(name, value)| (name.to_string(), self.set_variable(name, value)))
            .collect()
    }

    /// Suspend all hotkeys.
    fn suspend(&self) -> bool {
        self.execute("Suspend, On")
    }

    /// Resume hotkeys.
    fn unsuspend(&self) -> bool {
        self.execute("Suspend, Off")
    }

    /// Call a function, enforcing the engine's argument limit.
    ///
    /// In strict mode too many arguments is an error; otherwise it is logged
    /// and the call proceeds.
    fn call_checked(&self, config: &GeneratorConfig, name: &str, args: &[&str]) -> Result<String> {
        if args.len() > MAX_CALL_ARGS {
            if config.strict {
                return Err(Error::TooManyArguments {
                    got: args.len(),
                    max: MAX_CALL_ARGS,
                });
            }
            warn!(name, got = args.len(), "call_too_many_args");
        }
        Ok(self.call_function(name, args))
    }
}

impl<T: ScriptEngine + ?Sized> ScriptEngineExt for T {}

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::collections::{HashMap, HashSet};

    use parking_lot::Mutex;

    use super::{ExecuteOption, ScriptEngine};

    /// In-memory engine for tests.
    ///
    /// Records executed and loaded code, understands `name:=value` and
    /// `name := value` assignments, and learns function names from
    /// `Name(args) {` definition lines in loaded code.
    #[derive(Debug, Default)]
    pub struct MockEngine {
        /// Recorded activity and script state.
        state: Mutex<MockState>,
    }

    /// Mutable state behind [`MockEngine`].
    #[derive(Debug, Default)]
    struct MockState {
        /// Code passed to `execute`.
        executed: Vec<String>,
        /// Code passed to `load_script`.
        loaded: Vec<(String, ExecuteOption)>,
        /// Script variables.
        vars: HashMap<String, String>,
        /// Known function names.
        functions: HashSet<String>,
        /// Canned function results.
        returns: HashMap<String, String>,
        /// Recorded function calls.
        calls: Vec<(String, Vec<String>)>,
        /// Reject all code when set.
        reject: bool,
        /// Set by `terminate`, cleared by `reset`.
        stopped: bool,
    }

    impl MockEngine {
        /// New empty engine.
        pub fn new() -> Self {
            Self::default()
        }

        /// Reject every `execute`/`load_script` call.
        pub fn set_reject(&self, reject: bool) {
            self.state.lock().reject = reject;
        }

        /// Declare a function with a canned return value.
        pub fn define_function(&self, name: &str, returns: &str) {
            let mut s = self.state.lock();
            s.functions.insert(name.to_string());
            s.returns.insert(name.to_string(), returns.to_string());
        }

        /// Code passed to `execute`, in order.
        pub fn executed(&self) -> Vec<String> {
            self.state.lock().executed.clone()
        }

        /// Code passed to `load_script`, in order.
        pub fn loaded(&self) -> Vec<(String, ExecuteOption)> {
            self.state.lock().loaded.clone()
        }

        /// Function calls, in order.
        pub fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.state.lock().calls.clone()
        }

        fn absorb(state: &mut MockState, code: &str) {
            for line in code.lines().map(str::trim) {
                if let Some((name, value)) = line.split_once(":=") {
                    let name = name.trim();
                    if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                        let value = value.trim();
                        let value = value
                            .strip_prefix('"')
                            .and_then(|v| v.strip_suffix('"'))
                            .unwrap_or(value);
                        state.vars.insert(name.to_string(), value.to_string());
                    }
                } else if let Some(head) = line.strip_suffix('{')
                    && let Some((name, _)) = head.trim_end().split_once('(')
                    && !name.is_empty()
                    && name.chars().all(|c| c.is_alphanumeric() || c == '_')
                {
                    state.functions.insert(name.to_string());
                }
            }
        }
    }

    impl ScriptEngine for MockEngine {
        fn execute(&self, code: &str) -> bool {
            let mut s = self.state.lock();
            s.executed.push(code.to_string());
            if s.reject {
                return false;
            }
            Self::absorb(&mut s, code);
            true
        }

        fn load_script(&self, code: &str, option: ExecuteOption) -> bool {
            let mut s = self.state.lock();
            s.loaded.push((code.to_string(), option));
            if s.reject {
                return false;
            }
            Self::absorb(&mut s, code);
            true
        }

        fn get_variable(&self, name: &str) -> String {
            self.state.lock().vars.get(name).cloned().unwrap_or_default()
        }

        fn set_variable(&self, name: &str, value: &str) -> bool {
            let mut s = self.state.lock();
            if s.reject {
                return false;
            }
            s.vars.insert(name.to_string(), value.to_string());
            true
        }

        fn call_function(&self, name: &str, args: &[&str]) -> String {
            let mut s = self.state.lock();
            s.calls
                .push((name.to_string(), args.iter().map(|a| a.to_string()).collect()));
            s.returns.get(name).cloned().unwrap_or_default()
        }

        fn function_exists(&self, name: &str) -> bool {
            self.state.lock().functions.contains(name)
        }

        fn is_ready(&self) -> bool {
            !self.state.lock().stopped
        }

        fn terminate(&self) -> bool {
            self.state.lock().stopped = true;
            true
        }

        fn reset(&self) -> bool {
            let mut s = self.state.lock();
            s.stopped = false;
            s.vars.clear();
            s.functions.clear();
            true
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockEngine;
