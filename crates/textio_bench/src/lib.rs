//! Benchmark utilities.

use textio_codec::Value;

/// Generate deterministic byte data of the specified size.
pub fn sample_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Generate `count` lines of text, every fourth one holding multibyte
/// characters.
pub fn sample_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            if i % 4 == 0 {
                format!("line {i}: caf\u{e9} \u{4e16}\u{754c}\n")
            } else {
                format!("line {i}: plain ascii content\n")
            }
        })
        .collect()
}

/// Create a flat record value.
pub fn sample_record(id: i64) -> Value {
    [
        ("id", Value::from(id)),
        ("name", Value::from(format!("user-{id}"))),
        ("email", Value::from(format!("user{id}@example.com"))),
        ("score", Value::from(id as f64 * 1.5)),
        ("active", Value::from(id % 2 == 0)),
    ]
    .into_iter()
    .collect()
}

/// Create a nested value of the given depth and width.
pub fn nested_value(depth: usize, width: usize) -> Value {
    if depth == 0 {
        Value::from("leaf")
    } else {
        let children: Vec<Value> = (0..width).map(|_| nested_value(depth - 1, width)).collect();
        [("children", Value::Array(children))].into_iter().collect()
    }
}
