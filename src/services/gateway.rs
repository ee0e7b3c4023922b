//! API gateway
//!
//! Issues one request through a [`Transport`] and resolves it to the
//! unwrapped data or a normalized [`ApiError`]

use crate::config::Settings;
use crate::models::{is_error_envelope, unwrap_envelope, RequestDescriptor};
use crate::services::resources::{Resource, ResourceClient, RouteTable};
use crate::services::transport::{HttpTransport, Transport, TransportError};
use crate::utils::error::{ApiError, ApiResult, AppResult};
use crate::utils::logging::{body_preview, summarize_payload};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn, Instrument};
use uuid::Uuid;

/// Gateway to the bakery REST backend
#[derive(Debug, Clone)]
pub struct ApiGateway<T = HttpTransport> {
    transport: T,
    routes: RouteTable,
}

impl ApiGateway<HttpTransport> {
    /// Gateway over HTTP using the default route table
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self::new(HttpTransport::new(settings)?))
    }
}

impl<T: Transport> ApiGateway<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            routes: RouteTable::default(),
        }
    }

    /// Replace the route table
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Wrapper functions for one resource
    pub fn resource(&self, resource: Resource) -> ResourceClient<'_, T> {
        ResourceClient::new(self, resource)
    }

    /// Issue a request and return the unwrapped data
    pub async fn call<R: DeserializeOwned>(&self, request: RequestDescriptor) -> ApiResult<R> {
        let (status, body) = self.execute(request).await?;
        decode(status, unwrap_envelope(body))
    }

    /// Issue a request and return the whole success body, envelope included
    pub async fn call_raw(&self, request: RequestDescriptor) -> ApiResult<Value> {
        self.execute(request).await.map(|(_, body)| body)
    }

    /// One round trip with the tiered error fallback
    pub(crate) async fn execute(&self, request: RequestDescriptor) -> ApiResult<(u16, Value)> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "api_call",
            request_id = %request_id,
            method = %request.method,
            path = %request.path,
        );

        self.round_trip(request).instrument(span).await
    }

    async fn round_trip(&self, request: RequestDescriptor) -> ApiResult<(u16, Value)> {
        debug!("payload: {}", summarize_payload(&request.payload));

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(TransportError::NoResponse(reason)) => {
                warn!("No response from server: {}", reason);
                return Err(ApiError::unreachable(reason));
            }
            Err(TransportError::InvalidRequest(reason)) => {
                error!("Request could not be built: {}", reason);
                return Err(ApiError::unreachable(reason));
            }
            Err(TransportError::BodyUnreadable { status, reason }) => {
                warn!("Unreadable response body: {} - {}", status, reason);
                return Err(ApiError::RejectedWithoutMessage { status });
            }
        };

        if !response.is_success() {
            let error = ApiError::from_response(response.status, &response.body);
            warn!(
                "Request failed: {} - {}",
                response.status,
                body_preview(&response.body)
            );
            return Err(error);
        }

        let body = if response.body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&response.body).map_err(|e| {
                warn!("Malformed success body: {} - {}", response.status, e);
                ApiError::RejectedWithoutMessage { status: response.status }
            })?
        };

        if is_error_envelope(&body) {
            warn!(
                "Request refused: {} - {}",
                response.status,
                body_preview(&response.body)
            );
            return Err(ApiError::from_response(response.status, &response.body));
        }

        debug!("Request completed: {}", response.status);
        Ok((response.status, body))
    }
}

/// Deserialize unwrapped data into the caller's type
fn decode<R: DeserializeOwned>(status: u16, data: Value) -> ApiResult<R> {
    serde_json::from_value(data).map_err(|e| {
        warn!("Response data does not match expected shape: {}", e);
        ApiError::RejectedWithoutMessage { status }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;
    use crate::services::transport::RawResponse;
    use crate::utils::error::{CONNECTIVITY_ERROR_MESSAGE, GENERIC_ERROR_MESSAGE};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Transport returning one canned outcome and recording requests
    struct CannedTransport {
        outcome: Result<RawResponse, TransportError>,
        seen: Mutex<Vec<RequestDescriptor>>,
    }

    impl CannedTransport {
        fn respond(status: u16, body: &str) -> Self {
            Self {
                outcome: Ok(RawResponse { status, body: body.as_bytes().to_vec() }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn fail(error: TransportError) -> Self {
            Self { outcome: Err(error), seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn test_success_is_unwrapped() {
        let gateway = ApiGateway::new(CannedTransport::respond(200, r#"{"status":"OK","data":{"id":"n1"}}"#));
        let data: Value = gateway.call(RequestDescriptor::post("/news/create")).await.unwrap();
        assert_eq!(data, json!({"id": "n1"}));
    }

    #[tokio::test]
    async fn test_call_raw_keeps_envelope() {
        let body = r#"{"status":"OK","data":[1],"total":1}"#;
        let gateway = ApiGateway::new(CannedTransport::respond(200, body));
        let raw = gateway.call_raw(RequestDescriptor::get("/news/get-all")).await.unwrap();
        assert_eq!(raw["total"], 1);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let gateway = ApiGateway::new(CannedTransport::respond(204, ""));
        let data: Value = gateway.call(RequestDescriptor::delete("/news/delete/1")).await.unwrap();
        assert_eq!(data, Value::Null);
        let unit: () = gateway.call(RequestDescriptor::delete("/news/delete/1")).await.unwrap();
        assert_eq!(unit, ());
    }

    #[tokio::test]
    async fn test_error_with_message() {
        let gateway = ApiGateway::new(CannedTransport::respond(400, r#"{"message":"Title is required"}"#));
        let err = gateway.call::<Value>(RequestDescriptor::post("/news/create")).await.unwrap_err();
        assert_eq!(err.message(), "Title is required");
        assert_eq!(serde_json::to_value(err.to_normalized()).unwrap(), json!({"message": "Title is required"}));
    }

    #[tokio::test]
    async fn test_error_without_message() {
        let gateway = ApiGateway::new(CannedTransport::respond(502, "Bad Gateway"));
        let err = gateway.call::<Value>(RequestDescriptor::get("/news/get-all")).await.unwrap_err();
        assert_eq!(err, ApiError::RejectedWithoutMessage { status: 502 });
        assert_eq!(err.message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let gateway = ApiGateway::new(CannedTransport::respond(200, "<html>"));
        let err = gateway.call::<Value>(RequestDescriptor::get("/news/get-all")).await.unwrap_err();
        assert_eq!(err, ApiError::RejectedWithoutMessage { status: 200 });
    }

    #[tokio::test]
    async fn test_shape_mismatch() {
        let gateway = ApiGateway::new(CannedTransport::respond(200, r#"{"status":"OK","data":"text"}"#));
        let err = gateway.call::<Vec<u32>>(RequestDescriptor::get("/news/get-all")).await.unwrap_err();
        assert_eq!(err.message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_connectivity_failure() {
        let gateway = ApiGateway::new(CannedTransport::fail(TransportError::NoResponse("dns".to_string())));
        let err = gateway.call::<Value>(RequestDescriptor::get("/news/get-all")).await.unwrap_err();
        assert_eq!(
            serde_json::to_value(err.to_normalized()).unwrap(),
            json!({"status": 500, "message": CONNECTIVITY_ERROR_MESSAGE})
        );
    }

    #[tokio::test]
    async fn test_err_envelope_on_success_status() {
        let body = r#"{"status":"ERR","message":"Title is required"}"#;
        let gateway = ApiGateway::new(CannedTransport::respond(200, body));
        let err = gateway.call::<Value>(RequestDescriptor::post("/news/create")).await.unwrap_err();
        assert_eq!(err, ApiError::Rejected { status: 200, message: "Title is required".to_string() });

        let err = gateway.call_raw(RequestDescriptor::post("/news/create")).await.unwrap_err();
        assert_eq!(err.message(), "Title is required");
    }

    #[tokio::test]
    async fn test_err_envelope_without_message() {
        let gateway = ApiGateway::new(CannedTransport::respond(200, r#"{"status":"ERR"}"#));
        let err = gateway.call::<Value>(RequestDescriptor::get("/news/get-all")).await.unwrap_err();
        assert_eq!(err, ApiError::RejectedWithoutMessage { status: 200 });
        assert_eq!(err.message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_entity_with_status_and_message_is_returned_whole() {
        let body = r#"{"id":"s1","status":"pending","message":"Giao trước 5h"}"#;
        let gateway = ApiGateway::new(CannedTransport::respond(200, body));
        let data: Value = gateway.call(RequestDescriptor::get("/status/get-details/s1")).await.unwrap();
        assert_eq!(data, json!({"id": "s1", "status": "pending", "message": "Giao trước 5h"}));
    }

    #[tokio::test]
    async fn test_unbuildable_request() {
        let failure = TransportError::InvalidRequest("invalid multipart body".to_string());
        let gateway = ApiGateway::new(CannedTransport::fail(failure));
        let err = gateway.call::<Value>(RequestDescriptor::post("/product/create")).await.unwrap_err();
        assert_eq!(err, ApiError::unreachable("invalid multipart body"));
        assert_eq!(err.message(), CONNECTIVITY_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreadable_body() {
        let failure = TransportError::BodyUnreadable { status: 200, reason: "reset".to_string() };
        let gateway = ApiGateway::new(CannedTransport::fail(failure));
        let err = gateway.call::<Value>(RequestDescriptor::get("/news/get-all")).await.unwrap_err();
        assert_eq!(err, ApiError::RejectedWithoutMessage { status: 200 });
    }

    #[tokio::test]
    async fn test_descriptor_reaches_transport_unchanged() {
        let gateway = ApiGateway::new(CannedTransport::respond(200, "[]"));
        let credential = Credential::new("abc");
        let request = RequestDescriptor::get("/product/get-all")
            .with_credential(Some(&credential))
            .with_query(vec![("page".to_string(), "1".to_string())]);

        let _: Value = gateway.call(request).await.unwrap();

        let seen = gateway.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/product/get-all");
        assert_eq!(seen[0].credential, Some(credential));
        assert_eq!(seen[0].query, vec![("page".to_string(), "1".to_string())]);
    }
}
