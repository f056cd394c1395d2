//! # rally-types
//!
//! Data model and codecs shared by every Rally WSAPI crate.
//!
//! This crate provides:
//! - `Value` / `Record` - a schema-less, insertion-ordered object model used
//!   as the universal currency between requests, responses, and results
//! - JSON codec - serialization tuned to the WSAPI wire format, plus
//!   deserialization that distinguishes a down backend (HTML maintenance
//!   page) from a genuinely malformed body
//! - Reference codec - parsing and formatting of the URL-like reference
//!   strings that identify artifacts and collections
//!
//! ## Example
//!
//! ```rust
//! use rally_types::{Record, Value, refs};
//!
//! let mut defect = Record::new();
//! defect.set("Name", "Crash on save");
//! defect.set("Severity", "Major");
//!
//! let json = rally_types::to_json(&defect);
//! let round_tripped = rally_types::from_json(&json).unwrap();
//! assert_eq!(defect, round_tripped);
//!
//! let parsed = refs::parse("https://host/slm/webservice/v2.0/defect/1234").unwrap();
//! assert_eq!(parsed.type_name(), "defect");
//! assert_eq!(parsed.object_id(), "1234");
//! ```

mod error;
mod json;
mod record;
pub mod refs;
mod value;

pub use error::CodecError;
pub use json::{from_json, to_json};
pub use record::Record;
pub use value::Value;
