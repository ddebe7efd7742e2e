//! JSON I/O handling for CLI
//!
//! - Input: one JSON document via stdin (may span lines)
//! - Output: one JSON object per response on stdout
//! - UTF-8 only

use std::io::{Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Reads the raw request text. Empty input is an I/O error.
pub fn read_request<R: Read>(input: &mut R) -> CliResult<String> {
    let mut content = String::new();
    input.read_to_string(&mut content)?;

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(content)
}

/// Write a success response with the given fields merged into it
pub fn write_response<W: Write>(out: &mut W, key: &str, data: Value) -> CliResult<()> {
    let mut response = serde_json::Map::new();
    response.insert("status".to_string(), json!("ok"));
    response.insert(key.to_string(), data);
    write_json(out, &Value::Object(response))
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_json(out, &response)
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
