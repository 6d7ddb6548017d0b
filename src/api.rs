//! Transport-agnostic request handling.
//!
//! An HTTP or function host translates its requests into [`Request`] values
//! and sends back the [`Response`]. Only an unknown spec ID gets a dedicated
//! status; every other failure is a server error carrying the message.

use crate::error::{ServiceError, ServiceResult};
use crate::orchestrator::Orchestrator;
use crate::output::{build_feed, FEED_CONTENT_TYPE};
use crate::scanner::ScanApi;
use crate::storage::BlobStore;
use crate::types::{ScanRequest, SpecId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, info};

const NOT_FOUND_BODY: &str = "This scan config does not exist, no operation performed";

/// Request method.
///
/// Parsed case-insensitively; anything else is `Unsupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum Method {
    Get,
    Post,
    Delete,
    Unsupported,
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "DELETE" => Self::Delete,
            _ => Self::Unsupported,
        }
    }
}

impl From<String> for Method {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// An incoming request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    /// Spec ID path parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub body: String,
}

impl Request {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            id: None,
            body: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// An outgoing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Response {
    fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        if let Some(content_type) = content_type {
            headers.insert("Content-Type".to_string(), content_type.to_string());
        }

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    fn json(body: impl Into<String>) -> Self {
        Self::new(200, Some("application/json"), body)
    }

    fn not_found() -> Self {
        Self::new(404, Some("application/json"), NOT_FOUND_BODY)
    }

    fn method_not_allowed() -> Self {
        Self::new(405, None, "")
    }

    fn server_error(err: &ServiceError) -> Self {
        error!(error = %err, "request failed");
        Self::new(500, None, err.to_string())
    }

    fn from_result(result: ServiceResult<Response>) -> Self {
        match result {
            Ok(response) => response,
            Err(err) if err.is_not_found() => Self::not_found(),
            Err(err) => Self::server_error(&err),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Body returned after creating a spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: SpecId,
}

/// Request handlers over an orchestrator.
pub struct Service<B, A> {
    orchestrator: Orchestrator<B, A>,
}

impl<B: BlobStore, A: ScanApi> Service<B, A> {
    pub fn new(orchestrator: Orchestrator<B, A>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Orchestrator<B, A> {
        &self.orchestrator
    }

    /// Spec management: create, list, findings feed, delete.
    pub async fn handle_configs(&self, request: &Request) -> Response {
        let result = match (request.method, request.id.as_deref()) {
            (Method::Post, _) => self.create(&request.body).await,
            (Method::Get, None) => self.list().await,
            (Method::Get, Some(id)) => self.findings_feed(id).await,
            (Method::Delete, Some(id)) => self.delete(id).await,
            (Method::Delete, None) => Err(ServiceError::Validation(
                "Unknown configuration".to_string(),
            )),
            (Method::Unsupported, _) => return Response::method_not_allowed(),
        };

        Response::from_result(result)
    }

    /// Severity summary across all specs.
    pub async fn handle_summary(&self, request: &Request) -> Response {
        if request.method != Method::Get {
            return Response::method_not_allowed();
        }

        let result = self
            .orchestrator
            .summary()
            .await
            .map(|summary| Response::new(200, Some("text/plain"), summary.render()));

        Response::from_result(result)
    }

    /// Scheduled job: start scans for every spec.
    pub async fn scheduled_trigger(&self) -> ServiceResult<usize> {
        let started = self.orchestrator.trigger_all().await?;
        info!(started, "scheduled scan trigger done");
        Ok(started)
    }

    async fn create(&self, body: &str) -> ServiceResult<Response> {
        let request: ScanRequest =
            serde_json::from_str(body).map_err(|e| ServiceError::Validation(e.to_string()))?;

        let spec = self.orchestrator.registry().create(request).await?;
        let body = serde_json::to_string(&Created { id: spec.id })?;
        Ok(Response::json(body))
    }

    async fn list(&self) -> ServiceResult<Response> {
        let specs = self.orchestrator.registry().list().await?;
        Ok(Response::json(serde_json::to_string(&specs)?))
    }

    async fn findings_feed(&self, id: &str) -> ServiceResult<Response> {
        let id = parse_id(id)?;
        let scan = self.orchestrator.findings(&id).await?;
        let response = match build_feed(&scan, Utc::now()) {
            Ok(feed) => Response::new(200, Some(FEED_CONTENT_TYPE), feed),
            Err(err) => {
                error!(error = %err, "feed rendering failed");
                Response::new(500, None, err.to_string())
            }
        };

        Ok(response)
    }

    async fn delete(&self, id: &str) -> ServiceResult<Response> {
        let id = parse_id(id)?;
        let registry = self.orchestrator.registry();

        if !registry.exists(&id).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }

        registry.delete(&id).await?;
        Ok(Response::json(format!("Deleted scan config {}", id)))
    }
}

/// An ID that can't be parsed can't name a stored spec.
fn parse_id(id: &str) -> ServiceResult<SpecId> {
    id.parse()
        .map_err(|_| ServiceError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SpecRegistry;
    use crate::scanner::ScanDriver;
    use crate::storage::MemoryStore;
    use crate::testing::StubScanApi;
    use crate::types::{ImageId, ScanSpec};
    use std::sync::Arc;

    fn service(api: Arc<StubScanApi>) -> Service<MemoryStore, Arc<StubScanApi>> {
        Service::new(Orchestrator::new(
            SpecRegistry::new(MemoryStore::new()),
            ScanDriver::new(api),
        ))
    }

    async fn register(service: &Service<MemoryStore, Arc<StubScanApi>>, body: &str) -> SpecId {
        let response = service
            .handle_configs(&Request::new(Method::Post).with_body(body))
            .await;
        assert_eq!(response.status, 200, "{}", response.body);
        serde_json::from_str::<Created>(&response.body).unwrap().id
    }

    #[tokio::test]
    async fn test_end_to_end_lifecycle() {
        let api = Arc::new(StubScanApi::with_tags(["latest"]));
        let service = service(Arc::clone(&api));

        let id = register(
            &service,
            r#"{"region":"us-west-2","registry":"123","repository":"app","tags":[]}"#,
        )
        .await;

        let listed = service.handle_configs(&Request::new(Method::Get)).await;
        assert_eq!(listed.status, 200);
        let specs: Vec<ScanSpec> = serde_json::from_str(&listed.body).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].id, id);
        assert_eq!(specs[0].region, "us-west-2");
        assert_eq!(specs[0].registry_id, "123");
        assert_eq!(specs[0].repository, "app");
        assert!(specs[0].tags.is_empty());

        assert_eq!(service.scheduled_trigger().await.unwrap(), 1);
        assert_eq!(api.scanned(), vec![ImageId::tagged("latest")]);

        let deleted = service
            .handle_configs(&Request::new(Method::Delete).with_id(id.to_string()))
            .await;
        assert_eq!(deleted.status, 200);

        let listed = service.handle_configs(&Request::new(Method::Get)).await;
        assert_eq!(listed.body, "[]");
    }

    #[tokio::test]
    async fn test_responses_allow_any_origin() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"])));

        for request in [
            Request::new(Method::Get),
            Request::new(Method::Unsupported),
            Request::new(Method::Post).with_body("{"),
        ] {
            let response = service.handle_configs(&request).await;
            assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        }
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"])));

        let response = service
            .handle_configs(&Request::new(Method::Delete).with_id(SpecId::new().to_string()))
            .await;
        assert_eq!(response.status, 404);
        assert_eq!(response.body, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn test_delete_without_id_is_server_error() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"])));

        let response = service.handle_configs(&Request::new(Method::Delete)).await;
        assert_eq!(response.status, 500);
        assert!(response.body.contains("Unknown configuration"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_server_error() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"])));

        let response = service
            .handle_configs(&Request::new(Method::Post).with_body("not json"))
            .await;
        assert_eq!(response.status, 500);
        assert!(response.body.starts_with("invalid request"));
    }

    #[tokio::test]
    async fn test_findings_feed() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"])));
        let id = register(
            &service,
            r#"{"region":"us-west-2","registry":"123","repository":"app","tags":["latest"]}"#,
        )
        .await;

        let response = service
            .handle_configs(&Request::new(Method::Get).with_id(id.to_string()))
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some(FEED_CONTENT_TYPE));
        assert!(response.body.contains("For image app:latest found CVE-2024-0001"));
    }

    #[tokio::test]
    async fn test_findings_for_unknown_id() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"])));

        for id in [SpecId::new().to_string(), "not-a-uuid".to_string()] {
            let response = service
                .handle_configs(&Request::new(Method::Get).with_id(id))
                .await;
            assert_eq!(response.status, 404);
        }
    }

    #[tokio::test]
    async fn test_scan_failure_is_server_error() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"]).failing_on("latest")));
        let id = register(
            &service,
            r#"{"region":"us-west-2","registry":"123","repository":"app"}"#,
        )
        .await;

        let response = service
            .handle_configs(&Request::new(Method::Get).with_id(id.to_string()))
            .await;
        assert_eq!(response.status, 500);
        assert!(response.body.contains("app:latest"));
    }

    #[tokio::test]
    async fn test_summary_endpoint() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"])));
        register(
            &service,
            r#"{"region":"us-west-2","registry":"123","repository":"app"}"#,
        )
        .await;

        let response = service.handle_summary(&Request::new(Method::Get)).await;
        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            "Results for app:latest in us-west-2:\n{HIGH: 1, LOW: 2}\n\n"
        );

        let rejected = service.handle_summary(&Request::new(Method::Post)).await;
        assert_eq!(rejected.status, 405);
    }

    #[tokio::test]
    async fn test_create_with_null_tags() {
        let api = Arc::new(StubScanApi::with_tags(["latest"]));
        let service = service(api);

        let id = register(
            &service,
            r#"{"region":"us-west-2","registry":"123","repository":"app","tags":null,"level":""}"#,
        )
        .await;

        let spec = service.orchestrator().registry().get(&id).await.unwrap();
        assert!(spec.scans_all_tags());
        assert_eq!(spec.level, None);
    }

    #[tokio::test]
    async fn test_delete_with_foreign_json_object() {
        let service = service(Arc::new(StubScanApi::with_tags(["latest"])));
        let id = register(
            &service,
            r#"{"region":"us-west-2","registry":"123","repository":"app"}"#,
        )
        .await;
        service
            .orchestrator()
            .registry()
            .store()
            .put("settings.json", b"{}".to_vec())
            .await
            .unwrap();

        let deleted = service
            .handle_configs(&Request::new(Method::Delete).with_id(id.to_string()))
            .await;
        assert_eq!(deleted.status, 200, "{}", deleted.body);
    }

    #[test]
    fn test_method_parsing_ignores_case() {
        let request: Request = serde_json::from_str(r#"{"method":"get"}"#).unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::Delete);
        assert_eq!(serde_json::to_string(&Method::Post).unwrap(), r#""POST""#);
    }

    #[test]
    fn test_request_from_json() {
        let request: Request =
            serde_json::from_str(r#"{"method":"PATCH","id":"x"}"#).unwrap();
        assert_eq!(request.method, Method::Unsupported);
        assert_eq!(request.id.as_deref(), Some("x"));
        assert!(request.body.is_empty());
    }
}
