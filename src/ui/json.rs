use std::io::{self, Write};

use serde::Serialize;

/// Write a single NDJSON event (one JSON object per line).
pub fn write_event(out: &mut impl Write, event: &serde_json::Value) -> io::Result<()> {
    let line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convenience helper that writes to stdout.
pub fn emit(event: serde_json::Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, &event)
}

/// `{"event": <name>, "data": <payload>}`
pub fn emit_payload(event: &str, payload: &impl Serialize) -> io::Result<()> {
    let data = serde_json::to_value(payload).map_err(io::Error::other)?;
    emit(serde_json::json!({ "event": event, "data": data }))
}
