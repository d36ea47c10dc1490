use serde_json::Value;

/// Write the computation envelope (or bare value) to stdout as indented JSON.
pub fn print_json(value: &Value) {
    match render(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to render result as JSON: {e}"),
    }
}

fn render(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
