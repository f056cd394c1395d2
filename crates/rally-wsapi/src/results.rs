//! Typed result wrappers over response payloads.
//!
//! Results are plain data: success is computed from the error list, so
//! callers (and tests) can mutate `errors` and see `success()` flip.
//! Richer results embed the base [`OperationResult`] rather than
//! inheriting from it.

use rally_types::{Record, Value};

/// Errors and warnings reported by the service for one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl OperationResult {
    /// True iff the service reported no errors.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Pull `Errors` / `Warnings` lists out of a payload record.
    pub fn from_record(record: &Record) -> Self {
        Self {
            errors: string_seq(record, "Errors"),
            warnings: string_seq(record, "Warnings"),
        }
    }
}

/// Result of a query: every page's records, reassembled in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub operation: OperationResult,
    pub total_result_count: i64,
    pub start_index: i64,
    pub results: Vec<Record>,
}

impl QueryResult {
    /// True iff the service reported no errors.
    pub fn success(&self) -> bool {
        self.operation.success()
    }

    /// Build from a response payload.
    ///
    /// A payload carrying `TotalResultCount` is a genuine multi-result
    /// envelope. Anything else is a single-object fetch: synthesize a count
    /// of one and strip any `Errors`/`Warnings` keys that leaked into the
    /// object itself.
    pub fn from_record(payload: Record) -> Self {
        if payload.has("TotalResultCount") {
            let results = payload
                .get("Results")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_record)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            return Self {
                operation: OperationResult::from_record(&payload),
                total_result_count: payload.get_i64("TotalResultCount").unwrap_or(0),
                start_index: payload.get_i64("StartIndex").unwrap_or(1),
                results,
            };
        }

        let mut object = payload;
        let operation = OperationResult::from_record(&object);
        object.remove("Errors");
        object.remove("Warnings");

        Self {
            operation,
            total_result_count: 1,
            start_index: 1,
            results: vec![object],
        }
    }

    /// The sole result of a single-object fetch, when there is one.
    pub fn first(&self) -> Option<&Record> {
        self.results.first()
    }
}

/// Result of a create: the new object's reference and payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateResult {
    pub operation: OperationResult,
    pub reference: Option<String>,
    pub object: Option<Record>,
}

impl CreateResult {
    /// True iff the service reported no errors.
    pub fn success(&self) -> bool {
        self.operation.success()
    }

    /// Build from a `CreateResult` response payload.
    pub fn from_record(payload: &Record) -> Self {
        let object = payload
            .get("Object")
            .and_then(Value::as_record)
            .cloned();
        let reference = object
            .as_ref()
            .and_then(|o| o.get_str("_ref"))
            .map(str::to_string);

        Self {
            operation: OperationResult::from_record(payload),
            reference,
            object,
        }
    }
}

fn string_seq(record: &Record, key: &str) -> Vec<String> {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
