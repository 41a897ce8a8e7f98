// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Client side of the resolution service.
//!
//! The service maps a DRS identifier to an ordered list of storage URLs and,
//! optionally, a service account key that grants read access to them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use tracing::{debug, info};
use url::Url;

use super::auth::ResolvedCredentials;
use super::error::{DrsError, DrsResult};
use super::path::DrsPath;

/// A concrete storage location offered for a DRS object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub scheme: String,
    pub url: String,
}

impl CandidateUrl {
    /// The scheme is whatever precedes `://`, or empty if there is none.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_string())
            .unwrap_or_default();
        Self { scheme, url }
    }
}

/// Raw credential payload returned by the resolver (service account JSON).
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountKey(String);

impl ServiceAccountKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "ServiceAccountKey(<{} bytes>)", self.0.len())
    }
}

/// Outcome of a single resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrsResolutionResult {
    /// Candidate locations in resolver order; may be empty
    pub candidate_urls: Vec<CandidateUrl>,
    pub service_account_key: Option<ServiceAccountKey>,
}

impl DrsResolutionResult {
    pub fn new(
        candidate_urls: Vec<CandidateUrl>,
        service_account_key: Option<ServiceAccountKey>,
    ) -> Self {
        Self {
            candidate_urls,
            service_account_key,
        }
    }
}

/// Resolves DRS identifiers to storage locations.
#[async_trait]
pub trait DrsResolver: Send + Sync {
    /// Resolve `path` on behalf of the caller identified by `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached, rejects the call,
    /// or answers with a body that does not decode.
    async fn resolve(
        &self,
        path: &DrsPath,
        credentials: &ResolvedCredentials,
    ) -> DrsResult<DrsResolutionResult>;
}

#[derive(Serialize)]
struct ResolveRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ResolveResponse {
    dos: Option<DosObject>,
    #[serde(rename = "googleServiceAccount")]
    google_service_account: Option<GoogleServiceAccount>,
}

#[derive(Deserialize)]
struct DosObject {
    data_object: DataObject,
}

#[derive(Deserialize)]
struct DataObject {
    #[serde(default)]
    urls: Vec<UrlEntry>,
}

#[derive(Deserialize)]
struct UrlEntry {
    url: String,
}

#[derive(Deserialize)]
struct GoogleServiceAccount {
    data: Option<serde_json::Value>,
}

impl ResolveResponse {
    fn into_result(self) -> DrsResolutionResult {
        let candidate_urls = self
            .dos
            .map(|dos| {
                dos.data_object
                    .urls
                    .into_iter()
                    .map(|entry| CandidateUrl::new(entry.url))
                    .collect()
            })
            .unwrap_or_default();

        let service_account_key = self
            .google_service_account
            .and_then(|sa| sa.data)
            .filter(|data| !data.is_null())
            .map(|data| match data {
                serde_json::Value::String(raw) => ServiceAccountKey::new(raw),
                other => ServiceAccountKey::new(other.to_string()),
            });

        DrsResolutionResult::new(candidate_urls, service_account_key)
    }
}

/// Decode a resolver response body.
pub fn parse_resolution_response(body: &str) -> DrsResult<DrsResolutionResult> {
    let response: ResolveResponse = serde_json::from_str(body)
        .map_err(|e| DrsError::Resolution(format!("Failed to decode resolver response: {}", e)))?;
    Ok(response.into_result())
}

/// Resolver speaking JSON over HTTP: `POST {"url": "<drs uri>"}` with a bearer token.
#[derive(Clone)]
pub struct HttpDrsResolver {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpDrsResolver {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DrsResolver for HttpDrsResolver {
    async fn resolve(
        &self,
        path: &DrsPath,
        credentials: &ResolvedCredentials,
    ) -> DrsResult<DrsResolutionResult> {
        debug!("Resolving drs_path={} via endpoint={}", path, self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(credentials.token())
            .json(&ResolveRequest { url: path.as_str() })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DrsError::Resolution(format!(
                "Resolver returned status={} for {}: {}",
                status, path, body
            )));
        }

        let result = parse_resolution_response(&body)?;
        info!(
            "Resolved drs_path={}, candidates={}, has_service_account={}",
            path,
            result.candidate_urls.len(),
            result.service_account_key.is_some()
        );
        Ok(result)
    }
}

impl Debug for HttpDrsResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "HttpDrsResolver(endpoint={})", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const RESPONSE: &str = r#"{
        "dos": {
            "data_object": {
                "id": "abc",
                "urls": [
                    {"url": "s3://other-bucket/file.bam"},
                    {"url": "gs://my-bucket/dir/file.bam"}
                ]
            }
        },
        "googleServiceAccount": {
            "data": {"type": "service_account", "client_email": "sa@example.iam"}
        }
    }"#;

    fn credentials() -> ResolvedCredentials {
        ResolvedCredentials::new("bearer-123", vec![])
    }

    #[test]
    fn test_candidate_url_scheme() {
        assert_eq!(CandidateUrl::new("gs://b/o").scheme, "gs");
        assert_eq!(CandidateUrl::new("https://host/x").scheme, "https");
        assert_eq!(CandidateUrl::new("no-scheme").scheme, "");
    }

    #[test]
    fn test_parse_response() {
        let result = parse_resolution_response(RESPONSE).unwrap();

        assert_eq!(result.candidate_urls.len(), 2);
        assert_eq!(result.candidate_urls[0].url, "s3://other-bucket/file.bam");
        assert_eq!(result.candidate_urls[1].scheme, "gs");

        let key = result.service_account_key.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(key.as_str()).unwrap();
        assert_eq!(parsed["client_email"], "sa@example.iam");
    }

    #[test]
    fn test_parse_response_without_service_account() {
        let body = r#"{"dos": {"data_object": {"urls": [{"url": "gs://b/o"}]}}}"#;
        let result = parse_resolution_response(body).unwrap();
        assert_eq!(result.candidate_urls.len(), 1);
        assert!(result.service_account_key.is_none());
    }

    #[test]
    fn test_parse_response_null_service_account_data() {
        let body = r#"{"dos": {"data_object": {"urls": []}}, "googleServiceAccount": {"data": null}}"#;
        let result = parse_resolution_response(body).unwrap();
        assert!(result.candidate_urls.is_empty());
        assert!(result.service_account_key.is_none());
    }

    #[test]
    fn test_parse_response_without_urls() {
        let result = parse_resolution_response("{}").unwrap();
        assert_eq!(result, DrsResolutionResult::default());
    }

    #[test]
    fn test_parse_response_invalid_json() {
        let result = parse_resolution_response("not json");
        assert!(matches!(result, Err(DrsError::Resolution(_))));
    }

    #[test]
    fn test_service_account_key_debug_redacts() {
        let key = ServiceAccountKey::new(r#"{"private_key": "secret"}"#);
        let debug_str = format!("{:?}", key);
        assert!(!debug_str.contains("secret"));
    }

    #[tokio::test]
    async fn test_http_resolver_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1")
            .match_header("authorization", "Bearer bearer-123")
            .match_body(Matcher::Json(json!({"url": "drs://host/abc"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RESPONSE)
            .create_async()
            .await;

        let endpoint = Url::parse(&format!("{}/api/v1", server.url())).unwrap();
        let resolver = HttpDrsResolver::new(reqwest::Client::new(), endpoint);
        let path = DrsPath::parse("drs://host/abc").unwrap();

        let result = resolver.resolve(&path, &credentials()).await.unwrap();
        assert_eq!(result.candidate_urls.len(), 2);
        assert!(result.service_account_key.is_some());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_resolver_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(401)
            .with_body(r#"{"error": "Unauthorized"}"#)
            .create_async()
            .await;

        let endpoint = Url::parse(&server.url()).unwrap();
        let resolver = HttpDrsResolver::new(reqwest::Client::new(), endpoint);
        let path = DrsPath::parse("drs://host/abc").unwrap();

        match resolver.resolve(&path, &credentials()).await {
            Err(DrsError::Resolution(msg)) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Unauthorized"));
            }
            other => panic!("Expected Resolution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_resolver_bad_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let endpoint = Url::parse(&server.url()).unwrap();
        let resolver = HttpDrsResolver::new(reqwest::Client::new(), endpoint);
        let path = DrsPath::parse("drs://host/abc").unwrap();

        let result = resolver.resolve(&path, &credentials()).await;
        assert!(matches!(result, Err(DrsError::Resolution(_))));
    }
}
