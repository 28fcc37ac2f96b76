//! Script synthesis for an embedded AutoHotkey engine.
//!
//! Callers describe what should happen as a sequence of [`Action`]s (raw
//! text, key and mouse events, releases, nested hotkey definitions) and the
//! [`Generator`] turns that sequence into script text. While walking a
//! sequence the generator tracks which keys are logically held and appends a
//! release for every key still down at the end, so a generated block never
//! leaves a key stuck.
//!
//! [`Hotkey`] definitions may carry a host callback. Building such a hotkey
//! registers the callback in a [`CallbackRegistry`] under the hotkey's header
//! text and emits a `SendPipeMessage("<header>")` call in the body; the
//! messaging bridge later routes that message back to the callback.
//!
//! Execution is delegated to a [`ScriptEngine`] implementation supplied by
//! the embedder.
#![warn(missing_docs)]

mod action;
mod block;
mod callback;
mod config;
mod engine;
mod error;
pub mod escape;
pub mod fmt;
mod generator;
mod hotkey;

pub use action::{Action, KeyAction, Release};
pub use ahk_keycode::{Direction, Key};
pub use block::{Block, Outcome};
pub use callback::{CallbackRegistry, HotkeyCallback};
pub use config::GeneratorConfig;
#[cfg(any(test, feature = "test-utils"))]
pub use engine::MockEngine;
pub use engine::{EVAL_VAR, ExecuteOption, MAX_CALL_ARGS, ScriptEngine, ScriptEngineExt};
pub use error::{Error, Result};
pub use generator::{Generator, HeldKeys};
pub use hotkey::{CallbackPlacement, Hotkey, SEND_FUNCTION, SendMode, Trigger};
