//! Reference codec: parsing and formatting of artifact reference strings.
//!
//! A reference is a URL-like string identifying one artifact or a collection
//! hanging off an artifact, e.g.
//! `https://host/slm/webservice/v2.0/defect/1234` or
//! `/portfolioitem/feature/5678/children`. The grammar is ambiguous, so
//! patterns are tried most-specific first; the first match wins.

use std::sync::LazyLock;

use regex_lite::Regex;

// Ordered most-specific to least-specific. A dyna-type reference carries a
// two-segment type ("portfolioitem/feature"), which a later pattern would
// otherwise misparse as type + collection.
static PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        // dyna-type collection: /{type}/{subtype}/{oid}/{collection}
        Regex::new(r"/(\w+/\w+)/(-?\d+)/(\w+)$").unwrap(),
        // dyna-type: /{type}/{subtype}/{oid}
        Regex::new(r"/(\w+/\w+)/(-?\d+)$").unwrap(),
        // collection on a basic type: /{type}/{oid}/{collection}
        Regex::new(r"/(\w+)/(-?\d+)/(\w+)$").unwrap(),
        // basic: /{type}/{oid}
        Regex::new(r"/(\w+)/(-?\d+)$").unwrap(),
        // permission: /{type}/{oid}u{n}w{n} or /{type}/{oid}u{n}p{n}
        Regex::new(r"/(\w+)/(\d+u\d+(?:w|p)\d+)$").unwrap(),
    ]
});

/// A parsed reference: artifact type, object id, and (for collection
/// references) the trailing collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    type_name: String,
    object_id: String,
    collection: Option<String>,
}

impl Ref {
    /// The artifact type, e.g. `defect` or `portfolioitem/feature`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The object id segment.
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// The collection name, for collection references.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Render the relative form: `/{type}/{id}` plus the collection segment
    /// when present.
    pub fn relative(&self) -> String {
        match &self.collection {
            Some(collection) => format!("/{}/{}/{}", self.type_name, self.object_id, collection),
            None => format!("/{}/{}", self.type_name, self.object_id),
        }
    }
}

/// Try every pattern against the reference, most-specific first.
///
/// Returns `None` when nothing matches; that is a legitimate "not a
/// reference" outcome, not an error.
pub fn parse(reference: &str) -> Option<Ref> {
    let trimmed = strip_decorations(reference);

    for pattern in PATTERNS.iter() {
        if let Some(captures) = pattern.captures(trimmed) {
            let type_name = captures.get(1)?.as_str().to_string();
            let object_id = captures.get(2)?.as_str().to_string();
            let collection = captures.get(3).map(|m| m.as_str().to_string());
            return Some(Ref {
                type_name,
                object_id,
                collection,
            });
        }
    }

    None
}

/// Relative form of a reference, via the same parse.
pub fn to_relative(reference: &str) -> Option<String> {
    parse(reference).map(|r| r.relative())
}

/// The artifact type of a reference, if it parses.
pub fn type_of(reference: &str) -> Option<String> {
    parse(reference).map(|r| r.type_name)
}

/// The object id of a reference, if it parses.
pub fn id_of(reference: &str) -> Option<String> {
    parse(reference).map(|r| r.object_id)
}

/// Returns true if the string parses as a reference.
pub fn is_ref(reference: &str) -> bool {
    parse(reference).is_some()
}

/// Drop a query string and an optional `.js` suffix before matching.
fn strip_decorations(reference: &str) -> &str {
    let without_query = reference.split('?').next().unwrap_or(reference);
    without_query.strip_suffix(".js").unwrap_or(without_query)
}
