//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, then `severity`, then fields sorted by key
//! - Synchronous, no buffering
//! - INFO and below go to stdout, WARN and above to stderr

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-statement detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Something was ignored or degraded
    Warn = 2,
    /// Operation failed
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity >= Severity::Warn {
            Self::log_to_writer(severity, event, fields, &mut io::stderr());
        } else {
            Self::log_to_writer(severity, event, fields, &mut io::stdout());
        }
    }

    /// Writes one line: `event`, `severity`, then the fields by key
    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = format!(
            "{{\"event\":{},\"severity\":\"{}\"",
            json_str(event),
            severity
        );
        for (key, value) in sorted {
            line.push(',');
            line.push_str(&json_str(key));
            line.push(':');
            line.push_str(&json_str(value));
        }
        line.push_str("}\n");

        // a lost log line never fails a facet run
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

/// Quoted, escaped JSON string
fn json_str(raw: &str) -> String {
    serde_json::Value::from(raw).to_string()
}

#[cfg(test)]
pub(crate) fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_log_json_format() {
        let output = capture_log(Severity::Info, "FACETS_BEGIN", &[("facets", "3")]);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "FACETS_BEGIN");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["facets"], "3");
    }

    #[test]
    fn test_event_and_severity_lead() {
        let output = capture_log(Severity::Warn, "FACET_CLAUSE_SKIPPED", &[("a", "1")]);
        assert_eq!(
            output,
            "{\"event\":\"FACET_CLAUSE_SKIPPED\",\"severity\":\"WARN\",\"a\":\"1\"}\n"
        );
    }

    #[test]
    fn test_fields_sorted_by_key() {
        let a = capture_log(Severity::Trace, "E", &[("zebra", "1"), ("apple", "2")]);
        let b = capture_log(Severity::Trace, "E", &[("apple", "2"), ("zebra", "1")]);
        assert_eq!(a, b);
        assert!(a.find("apple").unwrap() < a.find("zebra").unwrap());
    }

    #[test]
    fn test_statement_text_is_escaped() {
        let statement = "SELECT x FROM t WHERE a = \"b\"\nAND c = 'd'";
        let output = capture_log(Severity::Trace, "FACET_COUNTED", &[("statement", statement)]);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["statement"], statement);
        assert_eq!(output.matches('\n').count(), 1);
    }
}
