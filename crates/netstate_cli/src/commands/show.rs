//! Show command implementation.

use crate::Source;
use serde_json::Value;
use tracing::debug;

/// Runs the show command.
pub fn run(
    source: &Source,
    pretty: bool,
    section: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = source.retrieve()?;
    debug!(bytes = state.len(), "retrieved net state");
    println!("{}", render(&state, pretty, section)?);
    Ok(())
}

/// Formats the snapshot for output.
///
/// Without `pretty` or `section` the payload is passed through untouched.
pub fn render(
    state: &str,
    pretty: bool,
    section: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    if !pretty && section.is_none() {
        return Ok(state.to_string());
    }

    let value: Value = serde_json::from_str(state)?;
    let value = match section {
        Some(key) => value
            .get(key)
            .cloned()
            .ok_or_else(|| format!("net state has no top-level member {key:?}"))?,
        None => value,
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}
