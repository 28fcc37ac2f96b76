//! Script-side client stub.

use ahk_script::{ScriptEngine, escape, fmt};

use crate::BridgeConfig;

/// Function whose presence marks the stub as already loaded.
pub const CLIENT_PROBE: &str = "PipeClient_GetVersion";

/// Stub source with `__CLIENT_VAR__` and `__BUFFER_SIZE__` placeholders.
const CLIENT_TEMPLATE: &str = include_str!("client.ahk");

/// The client stub specialized for `config`.
pub fn client_script(config: &BridgeConfig) -> String {
    CLIENT_TEMPLATE
        .replace("__CLIENT_VAR__", &config.client_var)
        .replace("__BUFFER_SIZE__", &config.buffer_size.to_string())
}

/// Code that points the script's client at channel `name`.
///
/// The first time, this includes the stub itself. Afterwards it closes the
/// previous client instance before creating the new one.
pub fn client_init_code<E>(engine: &E, config: &BridgeConfig, name: &str) -> String
where
    E: ScriptEngine + ?Sized,
{
    let mut code = String::new();
    if engine.function_exists(CLIENT_PROBE) {
        code.push_str(&format!("{}.Close()\n", config.client_var));
    } else {
        code.push_str(&client_script(config));
        if !code.ends_with('\n') {
            code.push('\n');
        }
    }
    let quoted = escape::quote(name).unwrap_or_else(|| "\"\"".to_string());
    code.push_str(&fmt::set(
        &config.client_var,
        &format!("new PipeClient({quoted})"),
    ));
    code.push('\n');
    code
}

#[cfg(test)]
mod tests {
    use ahk_script::{ExecuteOption, MockEngine};

    use super::*;

    #[test]
    fn first_load_includes_stub() {
        let engine = MockEngine::new();
        let cfg = BridgeConfig::default();
        let code = client_init_code(&engine, &cfg, "AHK-PIPE-abc");
        assert!(code.contains("PipeClient_GetVersion() {"));
        assert!(code.contains("global A__PIPECLIENT"));
        assert!(code.contains("this.size := 65535"));
        assert!(!code.contains("__CLIENT_VAR__"));
        assert!(code.ends_with("A__PIPECLIENT := new PipeClient(\"AHK-PIPE-abc\")\n"));
        assert!(!code.contains(".Close()\nA__PIPECLIENT :="));
    }

    #[test]
    fn reload_closes_previous_client() {
        let engine = MockEngine::new();
        let cfg = BridgeConfig {
            client_var: "PC".into(),
            ..BridgeConfig::default()
        };
        assert!(engine.load_script(&client_script(&cfg), ExecuteOption::Add));
        assert!(engine.function_exists(CLIENT_PROBE));
        let code = client_init_code(&engine, &cfg, "n2");
        assert_eq!(code, "PC.Close()\nPC := new PipeClient(\"n2\")\n");
    }
}
