//! Request descriptor
//!
//! Everything needed to issue one remote call: verb, path, payload shape,
//! optional bearer credential and query parameters

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use std::fmt;

/// Bearer token supplied by the caller
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value
    pub fn token(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// File attached to a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Multipart form body (text fields plus files)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Add a file field
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    /// Turn the top-level entries of a JSON object into text fields
    ///
    /// Strings are sent as-is, other values as their JSON text. `null`
    /// entries are skipped. Non-object values yield an empty form.
    pub fn from_json_fields(value: &Value) -> Self {
        let mut payload = Self::new();
        if let Some(object) = value.as_object() {
            for (name, value) in object {
                match value {
                    Value::Null => {}
                    Value::String(s) => payload.fields.push((name.clone(), s.clone())),
                    other => payload.fields.push((name.clone(), other.to_string())),
                }
            }
        }
        payload
    }

    /// Build the reqwest form; fails only on an unparseable mime type
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime)?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

/// Body of a request, serialized according to its shape
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartPayload),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<MultipartPayload> for Payload {
    fn from(form: MultipartPayload) -> Self {
        Payload::Multipart(form)
    }
}

/// One outbound call, built per request and never persisted
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`
    pub path: String,
    pub payload: Payload,
    pub credential: Option<Credential>,
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: Payload::Empty,
            credential: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_credential(mut self, credential: Option<&Credential>) -> Self {
        self.credential = credential.cloned();
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Pagination, sorting and filtering for list calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<(String, SortOrder)>,
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Render as query pairs, in a stable order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some((field, order)) = &self.sort {
            pairs.push(("sort".to_string(), field.clone()));
            pairs.push(("order".to_string(), order.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret-token");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.bearer(), "Bearer secret-token");
    }

    #[test]
    fn test_list_query_pairs() {
        let query = ListQuery::new()
            .page(2)
            .limit(10)
            .sort("price", SortOrder::Desc)
            .search("croissant")
            .filter("type", "bread");

        assert_eq!(
            query.to_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("sort".to_string(), "price".to_string()),
                ("order".to_string(), "desc".to_string()),
                ("search".to_string(), "croissant".to_string()),
                ("type".to_string(), "bread".to_string()),
            ]
        );
        assert!(ListQuery::new().to_pairs().is_empty());
    }

    #[test]
    fn test_multipart_from_json_fields() {
        let form = MultipartPayload::from_json_fields(&json!({
            "title": "Spring menu",
            "price": 25000,
            "hidden": false,
            "note": null
        }));

        assert!(form.fields.contains(&("title".to_string(), "Spring menu".to_string())));
        assert!(form.fields.contains(&("price".to_string(), "25000".to_string())));
        assert!(form.fields.contains(&("hidden".to_string(), "false".to_string())));
        assert_eq!(form.fields.len(), 3);
        assert!(MultipartPayload::from_json_fields(&json!([1, 2])).fields.is_empty());
    }

    #[test]
    fn test_multipart_rejects_bad_mime() {
        let form = MultipartPayload::new().file("image", "a.png", "not a mime", vec![1, 2, 3]);
        assert!(form.into_form().is_err());
    }

    #[test]
    fn test_descriptor_builders() {
        let credential = Credential::new("t");
        let descriptor = RequestDescriptor::put("/news/update/1")
            .with_payload(json!({"title": "x"}))
            .with_credential(Some(&credential));

        assert_eq!(descriptor.method, Method::PUT);
        assert_eq!(descriptor.payload, Payload::Json(json!({"title": "x"})));
        assert_eq!(descriptor.credential, Some(credential));
        assert!(RequestDescriptor::get("/news/get-all").payload.is_empty());
    }
}
