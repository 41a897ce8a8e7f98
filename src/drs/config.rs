// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License. You may obtain a copy
// of the License at http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under
// the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR REPRESENTATIONS
// OF ANY KIND, either express or implied. See the License for the specific language
// governing permissions and limitations under the License.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::error::DrsResult;

/// Workflow option key holding the bearer token used to call the resolver.
pub const BEARER_TOKEN_OPTION: &str = "google_bearer_token";

/// Scheme the default configuration reads from.
pub const DEFAULT_DESIRED_SCHEME: &str = "gs";

/// Credential strategy details for a named auth scheme.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthSchemeConfig {
    /// Token supplied per workflow run under [`BEARER_TOKEN_OPTION`].
    BearerOption,
    /// Token read from an environment variable when the factory is set up.
    Env { variable: String },
    /// Literal token, mostly useful for local testing.
    Static { token: String },
}

/// Configuration for resolving DRS paths
///
/// `auth` names the scheme a factory uses; `auth_schemes` is the global table
/// of credential strategies that name is looked up in.
///
/// # Examples
///
/// ```
/// use drs_pulse::drs::config::{AuthSchemeConfig, DrsConfig};
///
/// let config = DrsConfig::new("https://resolver.example.org/api/v1", "user")
///     .with_auth_scheme("user", AuthSchemeConfig::BearerOption)
///     .with_option("timeout", "30");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrsConfig {
    /// Name of the auth scheme this instance uses
    pub auth: String,

    /// Known auth schemes, keyed by name
    #[serde(default)]
    pub auth_schemes: HashMap<String, AuthSchemeConfig>,

    /// Endpoint of the resolution service
    pub resolver_url: String,

    /// Scheme prefix a candidate URL must start with to be read
    #[serde(default = "default_desired_scheme")]
    pub desired_scheme: String,

    /// Scopes requested in addition to the identity scopes
    #[serde(default)]
    pub extra_scopes: Vec<String>,

    /// Client tuning options
    ///
    /// - timeout: request timeout in seconds ("0" or "disabled" turns it off)
    /// - connect_timeout: connect timeout in seconds
    /// - pool_idle_timeout: idle connection lifetime in seconds
    /// - pool_max_idle_per_host: idle connections kept per host
    /// - max_retries: storage client retries (0 leaves retrying to the caller)
    /// - retry_timeout: storage client retry budget in seconds
    #[serde(default = "DrsConfig::default_options")]
    pub options: HashMap<String, String>,
}

fn default_desired_scheme() -> String {
    DEFAULT_DESIRED_SCHEME.to_string()
}

impl DrsConfig {
    /// Create a new configuration for the given resolver endpoint and auth scheme name.
    pub fn new(resolver_url: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            auth: auth.into(),
            auth_schemes: HashMap::new(),
            resolver_url: resolver_url.into(),
            desired_scheme: default_desired_scheme(),
            extra_scopes: Vec::new(),
            options: Self::default_options(),
        }
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> DrsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> DrsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Default timeout and connection pool settings.
    pub fn default_options() -> HashMap<String, String> {
        [
            ("timeout", "60"),
            ("connect_timeout", "30"),
            ("max_retries", "0"),
            ("retry_timeout", "300"),
            ("pool_idle_timeout", "15"),
            ("pool_max_idle_per_host", "5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Register an auth scheme under `name`.
    pub fn with_auth_scheme(mut self, name: impl Into<String>, scheme: AuthSchemeConfig) -> Self {
        self.auth_schemes.insert(name.into(), scheme);
        self
    }

    pub fn with_desired_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.desired_scheme = scheme.into();
        self
    }

    pub fn with_extra_scope(mut self, scope: impl Into<String>) -> Self {
        self.extra_scopes.push(scope.into());
        self
    }

    /// Add a client tuning option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }
}

/// Workflow-level options handed to the factory for each run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOptions(HashMap<String, String>);

impl WorkflowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Bearer token stored under [`BEARER_TOKEN_OPTION`], if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.get(BEARER_TOKEN_OPTION)
    }
}

impl From<HashMap<String, String>> for WorkflowOptions {
    fn from(options: HashMap<String, String>) -> Self {
        Self(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drs::error::DrsError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_new_config_defaults() {
        let config = DrsConfig::new("https://resolver.example.org", "user");
        assert_eq!(config.auth, "user");
        assert_eq!(config.desired_scheme, "gs");
        assert!(config.auth_schemes.is_empty());
        assert!(config.extra_scopes.is_empty());
        assert_eq!(config.get_option("max_retries"), Some(&"0".to_string()));
    }

    #[test]
    fn test_default_options() {
        let options = DrsConfig::default_options();
        assert_eq!(options.get("timeout"), Some(&"60".to_string()));
        assert_eq!(options.get("connect_timeout"), Some(&"30".to_string()));
        assert_eq!(options.get("retry_timeout"), Some(&"300".to_string()));
        assert_eq!(options.get("pool_idle_timeout"), Some(&"15".to_string()));
        assert_eq!(
            options.get("pool_max_idle_per_host"),
            Some(&"5".to_string())
        );
    }

    #[test]
    fn test_method_chaining() {
        let config = DrsConfig::new("https://resolver.example.org", "service")
            .with_auth_scheme(
                "service",
                AuthSchemeConfig::Env {
                    variable: "DRS_TOKEN".to_string(),
                },
            )
            .with_desired_scheme("s3")
            .with_extra_scope("https://www.googleapis.com/auth/devstorage.read_only")
            .with_option("timeout", "10");

        assert_eq!(config.desired_scheme, "s3");
        assert_eq!(config.extra_scopes.len(), 1);
        assert_eq!(config.get_option("timeout"), Some(&"10".to_string()));
        assert_eq!(
            config.auth_schemes.get("service"),
            Some(&AuthSchemeConfig::Env {
                variable: "DRS_TOKEN".to_string()
            })
        );
    }

    #[test]
    fn test_config_deserialization_fills_defaults() {
        let json = r#"{
            "auth": "user",
            "resolver_url": "https://resolver.example.org",
            "auth_schemes": {
                "user": {"type": "bearer_option"},
                "ci": {"type": "static", "token": "abc"}
            }
        }"#;
        let config = DrsConfig::from_json(json).unwrap();

        assert_eq!(config.desired_scheme, "gs");
        assert_eq!(config.get_option("timeout"), Some(&"60".to_string()));
        assert_eq!(
            config.auth_schemes.get("user"),
            Some(&AuthSchemeConfig::BearerOption)
        );
        assert_eq!(
            config.auth_schemes.get("ci"),
            Some(&AuthSchemeConfig::Static {
                token: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = DrsConfig::new("https://resolver.example.org", "user")
            .with_auth_scheme("user", AuthSchemeConfig::BearerOption);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"auth\":\"user\""));
        assert!(json.contains("\"type\":\"bearer_option\""));
    }

    #[test]
    fn test_config_missing_resolver_url() {
        let result = DrsConfig::from_json(r#"{"auth": "user"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"auth": "user", "resolver_url": "http://localhost:8080", "desired_scheme": "gs"}}"#
        )
        .unwrap();

        let config = DrsConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.resolver_url, "http://localhost:8080");
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = DrsConfig::from_json_file("/nonexistent/drs.json");
        assert!(matches!(result, Err(DrsError::Io(_))));
    }

    #[test]
    fn test_workflow_options_bearer_token() {
        let options = WorkflowOptions::new().with_option(BEARER_TOKEN_OPTION, "token-123");
        assert_eq!(options.bearer_token(), Some("token-123"));
        assert_eq!(options.get("other"), None);
    }

    #[test]
    fn test_workflow_options_from_map() {
        let mut map = HashMap::new();
        map.insert("google_project".to_string(), "my-project".to_string());
        let options = WorkflowOptions::from(map);
        assert_eq!(options.get("google_project"), Some("my-project"));
        assert_eq!(options.bearer_token(), None);
    }
}
