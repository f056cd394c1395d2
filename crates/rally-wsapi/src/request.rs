//! Request descriptor: one WSAPI call, URL-encodable and cloneable per page.

use indexmap::IndexMap;

use rally_client::WsapiVersion;
use rally_types::{refs, Record};

use crate::error::{Error, ErrorKind, Result};
use crate::query::QueryExpression;

/// Largest page the service will serve.
pub const MAX_PAGE_SIZE: u32 = 200;

/// What a request targets: a typed endpoint or a collection hanging off an
/// artifact. The two are mutually exclusive.
#[derive(Debug, Clone)]
enum Target {
    ArtifactType(String),
    Collection(Record),
}

/// A fully-specified, URL-encodable WSAPI request.
///
/// Descriptors are built by callers (or parsed from a URL), cloned per
/// sub-page with an adjusted start, and discarded once the page fetch
/// completes.
#[derive(Debug, Clone)]
pub struct Request {
    target: Target,
    /// Requested page size (clamped to 1..=200 on the wire).
    pub page_size: u32,
    /// 1-based start index.
    pub start: u32,
    /// Total result limit across all pages.
    pub limit: u32,
    /// Fields to fetch; empty means fetch everything.
    pub fetch: Vec<String>,
    /// Limit the field set on related objects reached through a relation.
    pub shallow_fetch: bool,
    parameters: IndexMap<String, String>,
}

impl Request {
    /// A request against a typed endpoint, e.g. `"Defect"`.
    pub fn new(artifact_type: impl Into<String>) -> Self {
        Self {
            target: Target::ArtifactType(artifact_type.into()),
            page_size: MAX_PAGE_SIZE,
            start: 1,
            limit: MAX_PAGE_SIZE,
            fetch: Vec::new(),
            shallow_fetch: false,
            parameters: IndexMap::new(),
        }
    }

    /// A request against a collection, resolved through the record's
    /// `_ref` field.
    pub fn for_collection(collection: Record) -> Self {
        Self {
            target: Target::Collection(collection),
            page_size: MAX_PAGE_SIZE,
            start: 1,
            limit: MAX_PAGE_SIZE,
            fetch: Vec::new(),
            shallow_fetch: false,
            parameters: IndexMap::new(),
        }
    }

    /// Set a free-form query parameter.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), value.into());
    }

    /// Read back a free-form query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Attach a filter clause.
    pub fn set_query(&mut self, query: &QueryExpression) {
        self.set_param("query", query.to_string());
    }

    /// Set the sort order, e.g. `"Name desc"`.
    pub fn set_order(&mut self, order: impl Into<String>) {
        self.set_param("order", order.into());
    }

    /// Scope the request to a workspace reference.
    pub fn set_workspace(&mut self, workspace_ref: impl Into<String>) {
        self.set_param("workspace", workspace_ref.into());
    }

    /// Scope the request to a project reference.
    pub fn set_project(&mut self, project_ref: impl Into<String>) {
        self.set_param("project", project_ref.into());
    }

    /// Include parent projects in the scope.
    pub fn set_project_scope_up(&mut self, up: bool) {
        self.set_param("projectScopeUp", if up { "true" } else { "false" });
    }

    /// Include child projects in the scope.
    pub fn set_project_scope_down(&mut self, down: bool) {
        self.set_param("projectScopeDown", if down { "true" } else { "false" });
    }

    /// The endpoint path, without a leading slash.
    pub fn endpoint(&self) -> Result<String> {
        match &self.target {
            Target::ArtifactType(artifact_type) => Ok(endpoint_for_type(artifact_type)),
            Target::Collection(record) => {
                let reference = record.get_str("_ref").ok_or_else(|| {
                    Error::new(ErrorKind::InvalidRequest(
                        "collection record has no _ref field".to_string(),
                    ))
                })?;
                let relative = refs::to_relative(reference).ok_or_else(|| {
                    Error::new(ErrorKind::InvalidRequest(format!(
                        "collection _ref is not a reference: {reference}"
                    )))
                })?;
                Ok(relative.trim_start_matches('/').to_string())
            }
        }
    }

    /// Page size actually sent on the wire.
    pub fn effective_page_size(&self) -> u32 {
        MAX_PAGE_SIZE.min(self.page_size).min(self.limit).max(1)
    }

    /// The sort order that will be sent: the caller's order with `ObjectID`
    /// appended when missing, or `ObjectID` alone. The tiebreaker keeps
    /// pagination stable across pages.
    pub fn effective_order(&self) -> String {
        match self.parameters.get("order") {
            None => "ObjectID".to_string(),
            Some(order) if order.contains("ObjectID") => order.clone(),
            Some(order) => format!("{order},ObjectID"),
        }
    }

    /// Render the query string: paging, fetch, order, then the free-form
    /// parameters in insertion order.
    pub fn query_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        parts.push(format!("pagesize={}", self.effective_page_size()));
        parts.push(format!("start={}", self.start));

        let fetch_key = if self.shallow_fetch { "shallowFetch" } else { "fetch" };
        if self.fetch.is_empty() {
            parts.push(format!("{fetch_key}=true"));
        } else {
            let fields: Vec<String> = self
                .fetch
                .iter()
                .map(|f| urlencoding::encode(f).into_owned())
                .collect();
            parts.push(format!("{fetch_key}={}", fields.join(",")));
        }

        parts.push(format!("order={}", urlencoding::encode(&self.effective_order())));

        for (key, value) in &self.parameters {
            if key == "order" {
                continue;
            }
            parts.push(format!("{key}={}", urlencoding::encode(value)));
        }

        parts.join("&")
    }

    /// The full request URL for one page.
    pub fn build_url(&self, server: &str, version: WsapiVersion) -> Result<String> {
        Ok(format!(
            "{}/slm/webservice/{}/{}?{}",
            server.trim_end_matches('/'),
            version.as_str(),
            self.endpoint()?,
            self.query_string()
        ))
    }

    /// Clone this descriptor for a sub-page: same target, parameters, and
    /// fetch list, with a new start and a capped page size (the final page
    /// of a limited query is usually partial).
    pub fn clone_for_page(&self, new_start: u32, page_size: u32) -> Request {
        let mut page = self.clone();
        page.start = new_start;
        page.page_size = page_size;
        page.limit = page_size;
        page
    }

    /// Parse a request back out of a URL.
    ///
    /// `pagesize`, `start`, `fetch`, `shallowFetch`, and `order` are
    /// recognized; every other parameter passes through opaquely. The path
    /// segment after `webservice/{version}/` is a bare type name or, when it
    /// contains another slash, a collection reference.
    pub fn from_url(url: &str) -> Result<Request> {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };

        let after_root = path
            .split_once("webservice/")
            .map(|(_, rest)| rest)
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidRequest(format!(
                    "not a WSAPI url: {url}"
                )))
            })?;
        let (_version, rest) = after_root.split_once('/').ok_or_else(|| {
            Error::new(ErrorKind::InvalidRequest(format!(
                "no endpoint segment in url: {url}"
            )))
        })?;

        let mut request = if rest.contains('/') {
            let mut collection = Record::new();
            collection.set("_ref", format!("/{rest}"));
            Request::for_collection(collection)
        } else {
            Request::new(rest)
        };

        for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
            let (key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(raw_value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw_value.to_string());

            match key {
                "pagesize" => {
                    request.page_size = value.parse().unwrap_or(MAX_PAGE_SIZE);
                    request.limit = request.page_size;
                }
                "start" => request.start = value.parse().unwrap_or(1),
                "fetch" | "shallowFetch" => {
                    request.shallow_fetch = key == "shallowFetch";
                    if value != "true" {
                        request.fetch = value.split(',').map(str::to_string).collect();
                    }
                }
                _ => request.set_param(key, value),
            }
        }

        Ok(request)
    }
}

/// Endpoint resolution: known singular collection names pluralize, anything
/// else lowercases to its own path segment.
pub(crate) fn endpoint_for_type(artifact_type: &str) -> String {
    let lowered = artifact_type.to_lowercase();
    match lowered.as_str() {
        "user" => "users".to_string(),
        "subscription" => "subscriptions".to_string(),
        _ => lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryOperator;

    #[test]
    fn test_endpoint_resolution() {
        assert_eq!(Request::new("User").endpoint().unwrap(), "users");
        assert_eq!(
            Request::new("Subscription").endpoint().unwrap(),
            "subscriptions"
        );
        assert_eq!(Request::new("Defect").endpoint().unwrap(), "defect");
        assert_eq!(
            Request::new("HierarchicalRequirement").endpoint().unwrap(),
            "hierarchicalrequirement"
        );
    }

    #[test]
    fn test_collection_endpoint_resolves_through_ref() {
        let mut tasks = Record::new();
        tasks.set("_ref", "https://host/slm/webservice/v2.0/defect/12345/tasks");
        let request = Request::for_collection(tasks);
        assert_eq!(request.endpoint().unwrap(), "defect/12345/tasks");
    }

    #[test]
    fn test_collection_without_ref_is_invalid() {
        let request = Request::for_collection(Record::new());
        let err = request.endpoint().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidRequest(_)));
    }

    #[test]
    fn test_effective_page_size_clamps() {
        let mut request = Request::new("Defect");
        assert_eq!(request.effective_page_size(), 200);

        request.page_size = 500;
        assert_eq!(request.effective_page_size(), 200);

        request.page_size = 50;
        assert_eq!(request.effective_page_size(), 50);

        request.limit = 10;
        assert_eq!(request.effective_page_size(), 10);
    }

    #[test]
    fn test_order_injection() {
        let mut request = Request::new("Defect");
        assert_eq!(request.effective_order(), "ObjectID");

        request.set_order("Name desc");
        assert_eq!(request.effective_order(), "Name desc,ObjectID");

        request.set_order("Rank,ObjectID");
        assert_eq!(request.effective_order(), "Rank,ObjectID");
    }

    #[test]
    fn test_query_string_fetch_encoding() {
        let mut request = Request::new("Defect");
        assert!(request.query_string().contains("fetch=true"));

        request.fetch = vec!["Name".to_string(), "FormattedID".to_string()];
        assert!(request.query_string().contains("fetch=Name,FormattedID"));

        request.shallow_fetch = true;
        assert!(request
            .query_string()
            .contains("shallowFetch=Name,FormattedID"));
    }

    #[test]
    fn test_query_string_carries_parameters_in_order() {
        let mut request = Request::new("Defect");
        request.set_query(&QueryExpression::new(
            "Name",
            QueryOperator::Contains,
            "crash",
        ));
        request.set_workspace("/workspace/42");
        request.set_project_scope_down(true);

        let qs = request.query_string();
        assert_eq!(
            qs,
            "pagesize=200&start=1&fetch=true&order=ObjectID&\
             query=%28Name%20contains%20%22crash%22%29&\
             workspace=%2Fworkspace%2F42&projectScopeDown=true"
        );
    }

    #[test]
    fn test_build_url() {
        let request = Request::new("Defect");
        let url = request
            .build_url("https://rally.example.com/", WsapiVersion::V2_0)
            .unwrap();
        assert!(url.starts_with("https://rally.example.com/slm/webservice/v2.0/defect?"));
    }

    #[test]
    fn test_clone_for_page() {
        let mut request = Request::new("Defect");
        request.set_order("Name");
        request.fetch = vec!["Name".to_string()];
        request.limit = 450;

        let page = request.clone_for_page(401, 50);
        assert_eq!(page.start, 401);
        assert_eq!(page.effective_page_size(), 50);
        assert_eq!(page.param("order"), Some("Name"));
        assert_eq!(page.fetch, vec!["Name".to_string()]);
        // the original is untouched
        assert_eq!(request.start, 1);
    }

    #[test]
    fn test_from_url_bare_type() {
        let request = Request::from_url(
            "https://host/slm/webservice/v2.0/defect?pagesize=50&start=11&fetch=Name,Severity&order=Name%2CObjectID&query=%28Name%20%3D%20%22x%22%29",
        )
        .unwrap();

        assert_eq!(request.endpoint().unwrap(), "defect");
        assert_eq!(request.page_size, 50);
        assert_eq!(request.start, 11);
        assert_eq!(request.fetch, vec!["Name".to_string(), "Severity".to_string()]);
        assert_eq!(request.param("order"), Some("Name,ObjectID"));
        assert_eq!(request.param("query"), Some(r#"(Name = "x")"#));
    }

    #[test]
    fn test_from_url_collection_path() {
        let request =
            Request::from_url("https://host/slm/webservice/v2.0/defect/123/tasks?fetch=true")
                .unwrap();
        assert_eq!(request.endpoint().unwrap(), "defect/123/tasks");
    }

    #[test]
    fn test_from_url_rejects_foreign_urls() {
        assert!(Request::from_url("https://example.com/api/things").is_err());
    }

    #[test]
    fn test_from_url_round_trip() {
        let mut original = Request::new("Defect");
        original.page_size = 25;
        original.limit = 25;
        original.start = 51;
        original.fetch = vec!["Name".to_string()];
        original.set_order("Severity");
        original.set_param("projectScopeUp", "false");

        let url = original
            .build_url("https://host", WsapiVersion::V2_0)
            .unwrap();
        let parsed = Request::from_url(&url).unwrap();

        assert_eq!(parsed.endpoint().unwrap(), original.endpoint().unwrap());
        assert_eq!(parsed.page_size, 25);
        assert_eq!(parsed.start, 51);
        assert_eq!(parsed.fetch, original.fetch);
        assert_eq!(parsed.param("order"), Some("Severity,ObjectID"));
        assert_eq!(parsed.param("projectScopeUp"), Some("false"));
    }
}
