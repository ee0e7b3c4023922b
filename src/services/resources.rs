//! Resource wrappers
//!
//! One wrapper function per remote operation for every managed entity,
//! plus the route table mapping operations to endpoint paths

use crate::models::{Credential, ListQuery, Page, Payload, RequestDescriptor};
use crate::services::gateway::ApiGateway;
use crate::services::transport::Transport;
use crate::utils::error::{ApiError, ApiResult, AppError, AppResult};
use futures::future::join_all;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Entities managed through the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Product,
    News,
    Discount,
    Rank,
    Voucher,
    User,
    Payment,
    Rating,
    Status,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Product,
        Resource::News,
        Resource::Discount,
        Resource::Rank,
        Resource::Voucher,
        Resource::User,
        Resource::Payment,
        Resource::Rating,
        Resource::Status,
    ];

    /// Path segment used in default routes
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Product => "product",
            Resource::News => "news",
            Resource::Discount => "discount",
            Resource::Rank => "rank",
            Resource::Voucher => "voucher",
            Resource::User => "user",
            Resource::Payment => "payment",
            Resource::Rating => "rating",
            Resource::Status => "status",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AppError::InvalidRoute(format!("unknown resource '{}'", s)))
    }
}

/// Remote operations available on every resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    List,
    Detail,
    Update,
    Delete,
    DeleteMany,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Create,
        Operation::List,
        Operation::Detail,
        Operation::Update,
        Operation::Delete,
        Operation::DeleteMany,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::List => "list",
            Operation::Detail => "detail",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::DeleteMany => "delete_many",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::Create | Operation::DeleteMany => Method::POST,
            Operation::List | Operation::Detail => Method::GET,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    /// Whether the path addresses a single record
    pub fn needs_id(&self) -> bool {
        matches!(self, Operation::Detail | Operation::Update | Operation::Delete)
    }

    fn default_template(&self) -> &'static str {
        match self {
            Operation::Create => "/{resource}/create",
            Operation::List => "/{resource}/get-all",
            Operation::Detail => "/{resource}/get-details/{id}",
            Operation::Update => "/{resource}/update/{id}",
            Operation::Delete => "/{resource}/delete/{id}",
            Operation::DeleteMany => "/{resource}/delete-many",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| AppError::InvalidRoute(format!("unknown operation '{}'", s)))
    }
}

/// Path templates per resource and operation
///
/// Templates may use `{resource}` and `{id}`; id operations must use `{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    overrides: HashMap<(Resource, Operation), String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override one route
    pub fn set(
        &mut self,
        resource: Resource,
        operation: Operation,
        template: impl Into<String>,
    ) -> AppResult<()> {
        let template = template.into();
        if !template.starts_with('/') {
            return Err(AppError::InvalidRoute(format!(
                "template for {}.{} must start with '/': {}",
                resource, operation, template
            )));
        }
        if operation.needs_id() && !template.contains("{id}") {
            return Err(AppError::InvalidRoute(format!(
                "template for {}.{} must contain {{id}}: {}",
                resource, operation, template
            )));
        }
        self.overrides.insert((resource, operation), template);
        Ok(())
    }

    pub fn template(&self, resource: Resource, operation: Operation) -> &str {
        self.overrides
            .get(&(resource, operation))
            .map(String::as_str)
            .unwrap_or_else(|| operation.default_template())
    }

    /// Resolve a concrete path
    pub fn path(&self, resource: Resource, operation: Operation, id: Option<&str>) -> String {
        let path = self
            .template(resource, operation)
            .replace("{resource}", resource.as_str());
        match id {
            Some(id) => path.replace("{id}", id),
            None => path,
        }
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Wrapper functions bound to one resource
///
/// Each call issues exactly one request (except [`ResourceClient::delete_each`],
/// which issues one per id) and takes the caller's credential explicitly.
pub struct ResourceClient<'a, T> {
    gateway: &'a ApiGateway<T>,
    resource: Resource,
}

impl<'a, T: Transport> ResourceClient<'a, T> {
    pub fn new(gateway: &'a ApiGateway<T>, resource: Resource) -> Self {
        Self { gateway, resource }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    fn request(&self, operation: Operation, id: Option<&str>) -> RequestDescriptor {
        let path = self.gateway.routes().path(self.resource, operation, id);
        RequestDescriptor::new(operation.method(), path)
    }

    /// Create a record from a JSON object or multipart form
    pub async fn create<R: DeserializeOwned>(
        &self,
        payload: impl Into<Payload>,
        credential: Option<&Credential>,
    ) -> ApiResult<R> {
        let request = self
            .request(Operation::Create, None)
            .with_payload(payload)
            .with_credential(credential);
        self.gateway.call(request).await
    }

    /// List records
    pub async fn list<R: DeserializeOwned>(
        &self,
        query: &ListQuery,
        credential: Option<&Credential>,
    ) -> ApiResult<R> {
        let request = self
            .request(Operation::List, None)
            .with_query(query.to_pairs())
            .with_credential(credential);
        self.gateway.call(request).await
    }

    /// List records keeping the paging counters of the envelope
    pub async fn list_page<R: DeserializeOwned>(
        &self,
        query: &ListQuery,
        credential: Option<&Credential>,
    ) -> ApiResult<Page<R>> {
        let request = self
            .request(Operation::List, None)
            .with_query(query.to_pairs())
            .with_credential(credential);
        let (status, body) = self.gateway.execute(request).await?;
        Page::from_body(body).map_err(|e| {
            warn!("List body is not a page: {}", e);
            ApiError::RejectedWithoutMessage { status }
        })
    }

    /// Fetch one record
    pub async fn detail<R: DeserializeOwned>(
        &self,
        id: &str,
        credential: Option<&Credential>,
    ) -> ApiResult<R> {
        let request = self
            .request(Operation::Detail, Some(id))
            .with_credential(credential);
        self.gateway.call(request).await
    }

    /// Update one record
    pub async fn update<R: DeserializeOwned>(
        &self,
        id: &str,
        payload: impl Into<Payload>,
        credential: Option<&Credential>,
    ) -> ApiResult<R> {
        let request = self
            .request(Operation::Update, Some(id))
            .with_payload(payload)
            .with_credential(credential);
        self.gateway.call(request).await
    }

    /// Delete one record
    pub async fn delete<R: DeserializeOwned>(
        &self,
        id: &str,
        credential: Option<&Credential>,
    ) -> ApiResult<R> {
        let request = self
            .request(Operation::Delete, Some(id))
            .with_credential(credential);
        self.gateway.call(request).await
    }

    /// Delete several records in one call, body `{"ids": [...]}`
    pub async fn delete_many<R: DeserializeOwned, S: AsRef<str>>(
        &self,
        ids: &[S],
        credential: Option<&Credential>,
    ) -> ApiResult<R> {
        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        let request = self
            .request(Operation::DeleteMany, None)
            .with_payload(json!({ "ids": ids }))
            .with_credential(credential);
        self.gateway.call(request).await
    }

    /// Delete several records with one concurrent call per id
    ///
    /// Results come back in input order; each id succeeds or fails on its own.
    pub async fn delete_each<R: DeserializeOwned, S: AsRef<str>>(
        &self,
        ids: &[S],
        credential: Option<&Credential>,
    ) -> Vec<(String, ApiResult<R>)> {
        let calls = ids.iter().map(|id| async move {
            let id = id.as_ref();
            (id.to_string(), self.delete(id, credential).await)
        });
        join_all(calls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let routes = RouteTable::new();
        assert_eq!(routes.path(Resource::News, Operation::Create, None), "/news/create");
        assert_eq!(routes.path(Resource::Product, Operation::List, None), "/product/get-all");
        assert_eq!(routes.path(Resource::User, Operation::Detail, Some("u1")), "/user/get-details/u1");
        assert_eq!(routes.path(Resource::Voucher, Operation::Update, Some("v9")), "/voucher/update/v9");
        assert_eq!(routes.path(Resource::Rating, Operation::Delete, Some("r2")), "/rating/delete/r2");
        assert_eq!(routes.path(Resource::Discount, Operation::DeleteMany, None), "/discount/delete-many");
    }

    #[test]
    fn test_operation_methods() {
        assert_eq!(Operation::Create.method(), Method::POST);
        assert_eq!(Operation::List.method(), Method::GET);
        assert_eq!(Operation::Update.method(), Method::PUT);
        assert_eq!(Operation::Delete.method(), Method::DELETE);
        assert_eq!(Operation::DeleteMany.method(), Method::POST);
    }

    #[test]
    fn test_route_override() {
        let mut routes = RouteTable::new();
        routes.set(Resource::User, Operation::Create, "/user/sign-up").unwrap();
        routes.set(Resource::Status, Operation::Detail, "/{resource}/{id}").unwrap();

        assert_eq!(routes.path(Resource::User, Operation::Create, None), "/user/sign-up");
        assert_eq!(routes.path(Resource::Status, Operation::Detail, Some("s1")), "/status/s1");
        assert_eq!(routes.path(Resource::News, Operation::Create, None), "/news/create");
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn test_invalid_route_override() {
        let mut routes = RouteTable::new();
        assert!(routes.set(Resource::User, Operation::Create, "user/sign-up").is_err());
        assert!(routes.set(Resource::User, Operation::Detail, "/user/me").is_err());
        assert!(routes.is_empty());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("news".parse::<Resource>().unwrap(), Resource::News);
        assert_eq!("delete_many".parse::<Operation>().unwrap(), Operation::DeleteMany);
        assert!("cake".parse::<Resource>().is_err());
        for resource in Resource::ALL {
            assert_eq!(resource.to_string().parse::<Resource>().unwrap(), resource);
        }
    }
}
