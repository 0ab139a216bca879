use serde::Serialize;
use crate::shared::config::OutputMode;

/// Renders any serializable value as JSON. Pretty output indents two spaces
/// per level and separates keys from values with `": "`.
pub fn render<T: Serialize>(value: &T, mode: OutputMode) -> Result<String, serde_json::Error> {
    match mode {
        OutputMode::Pretty => serde_json::to_string_pretty(value),
        OutputMode::Compact => serde_json::to_string(value),
    }
}
