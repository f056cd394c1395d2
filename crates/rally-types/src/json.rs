//! JSON codec for [`Record`] payloads.
//!
//! Serialization emits keys in insertion order and uses the minimal string
//! escaping the WSAPI accepts (backslash and double-quote). Deserialization
//! goes through `serde_json` but recognizes the backend's HTML maintenance
//! page before attempting a parse.

use crate::error::CodecError;
use crate::record::Record;
use crate::value::Value;

/// Serialize a record to JSON text.
///
/// Keys are emitted in insertion order; nested records and arrays recurse.
pub fn to_json(record: &Record) -> String {
    let mut out = String::new();
    write_record(&mut out, record);
    out
}

/// Deserialize JSON text into a record.
///
/// A body that opens with an HTML doctype marker fails with
/// [`CodecError::ServiceUnavailable`]; any other parse failure carries the
/// raw body in [`CodecError::MalformedResponse`].
pub fn from_json(body: &str) -> Result<Record, CodecError> {
    if looks_like_html(body) {
        return Err(CodecError::ServiceUnavailable);
    }

    serde_json::from_str(body).map_err(|source| CodecError::MalformedResponse {
        body: body.to_string(),
        source,
    })
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    let lowered = head
        .get(..head.len().min(16))
        .unwrap_or_default()
        .to_ascii_lowercase();
    lowered.starts_with("<!doctype") || lowered.starts_with("<html")
}

fn write_record(out: &mut String, record: &Record) {
    out.push('{');
    for (i, (key, value)) in record.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        write_escaped(out, key);
        out.push_str("\":");
        write_value(out, value);
    }
    out.push('}');
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(n) => out.push_str(&n.to_string()),
        Value::Decimal(d) => {
            // Keep whole-number decimals distinguishable from integers so
            // the value survives a round trip.
            if d.fract() == 0.0 && d.is_finite() {
                out.push_str(&format!("{d:.1}"));
            } else {
                out.push_str(&d.to_string());
            }
        }
        Value::String(s) => {
            out.push('"');
            write_escaped(out, s);
            out.push('"');
        }
        Value::Object(record) => write_record(out, record),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
    }
}

/// Escape backslash and double-quote; the service accepts everything else raw.
fn write_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        let mut nested = Record::new();
        nested.set("_ref", "https://host/slm/webservice/v2.0/defect/7");
        nested.set("Count", 3);

        let mut record = Record::new();
        record.set("Name", "A \"quoted\" name with \\ slash");
        record.set("ObjectID", 415737i64);
        record.set("PlanEstimate", 2.5);
        record.set("Ready", true);
        record.set("Parent", Value::Null);
        record.set("Tags", Value::Array(vec![
            Value::String("one".into()),
            Value::Integer(2),
            Value::Null,
        ]));
        record.set("Project", nested);
        record
    }

    #[test]
    fn test_serialize_key_order_and_escaping() {
        let mut record = Record::new();
        record.set("B", "say \"hi\"");
        record.set("A", Value::Null);

        let json = to_json(&record);
        assert_eq!(json, r#"{"B":"say \"hi\"","A":null}"#);
    }

    #[test]
    fn test_serialize_whole_number_decimal() {
        let mut record = Record::new();
        record.set("Estimate", 3.0);
        assert_eq!(to_json(&record), r#"{"Estimate":3.0}"#);
    }

    #[test]
    fn test_round_trip() {
        let record = sample_record();
        let parsed = from_json(&to_json(&record)).unwrap();
        assert_eq!(record, parsed);
    }

    #[test]
    fn test_html_body_is_service_unavailable() {
        let body = "<!DOCTYPE html>\n<html><body>Maintenance</body></html>";
        assert!(matches!(
            from_json(body),
            Err(CodecError::ServiceUnavailable)
        ));

        let body = "  <html><head></head></html>";
        assert!(matches!(
            from_json(body),
            Err(CodecError::ServiceUnavailable)
        ));
    }

    #[test]
    fn test_malformed_body_carries_raw_text() {
        let body = "{not json at all";
        match from_json(body) {
            Err(CodecError::MalformedResponse { body: raw, .. }) => {
                assert_eq!(raw, body);
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_nested_structures() {
        let json = r#"{"QueryResult":{"TotalResultCount":2,"Results":[{"Name":"a"},{"Name":"b"}]}}"#;
        let record = from_json(json).unwrap();
        let query_result = record.get("QueryResult").unwrap().as_record().unwrap();
        assert_eq!(query_result.get_i64("TotalResultCount"), Some(2));

        let results = query_result.get("Results").unwrap().as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].as_record().unwrap().get_str("Name"), Some("b"));
    }
}
