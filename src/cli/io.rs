//! JSON I/O handling for CLI
//!
//! - Input: one JSON object per stdin line
//! - Output: one JSON object on stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde_json::{Map, Value};

use super::errors::{CliError, CliResult};

/// Read JSON objects, one per line. Blank lines are skipped.
pub fn read_records<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<Map<String, Value>>> {
    input
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            match serde_json::from_str::<Value>(&line)? {
                Value::Object(record) => Ok(record),
                _ => Err(CliError::invalid_input("Each input line must be a JSON object")),
            }
        })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(&response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(&response)
}

fn write_line(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_records_skips_blank_lines() {
        let input = Cursor::new("{\"key\":\"K1\"}\n\n{\"key\":\"K2\"}\n");
        let records: Vec<_> = read_records(input).collect::<CliResult<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["key"], "K2");
    }

    #[test]
    fn test_read_records_rejects_non_objects() {
        let input = Cursor::new("[1,2]\n");
        let result: CliResult<Vec<_>> = read_records(input).collect();
        assert!(result.is_err());
    }
}
