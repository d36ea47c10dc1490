pub mod file;
pub mod stdin;

use serde_json::Value;

/// Raw result payload from `--input` or piped stdin.
pub fn read_payload(path: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json_value(path);
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(value),
        None => Err("--input <file.json> or a payload piped on stdin is required".into()),
    }
}
