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

//! Credential strategies used to call the resolution service.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use tracing::debug;

use super::config::{AuthSchemeConfig, WorkflowOptions, BEARER_TOKEN_OPTION};
use super::error::{DrsError, DrsResult};

/// Identity scopes the resolution service needs to know who is calling.
pub const IDENTITY_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Token and scopes produced once per factory and shared by its path builders.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    token: String,
    scopes: Vec<String>,
}

impl ResolvedCredentials {
    pub fn new(token: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            token: token.into(),
            scopes,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ResolvedCredentials")
            .field("token", &"<redacted>")
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// A strategy that issues bearer credentials for the resolution service.
#[async_trait]
pub trait AuthMode: Send + Sync + Debug {
    /// Name of the auth scheme this strategy was resolved from.
    fn name(&self) -> &str;

    /// Produce credentials for the given workflow options and scopes.
    ///
    /// # Errors
    ///
    /// Returns [`DrsError::Credentials`] if no token can be produced.
    async fn credentials(
        &self,
        options: &WorkflowOptions,
        scopes: &[String],
    ) -> DrsResult<ResolvedCredentials>;
}

/// Reads the token a workflow run supplies under [`BEARER_TOKEN_OPTION`].
#[derive(Debug, Clone)]
pub struct BearerOptionAuth {
    name: String,
}

impl BearerOptionAuth {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl AuthMode for BearerOptionAuth {
    fn name(&self) -> &str {
        &self.name
    }

    async fn credentials(
        &self,
        options: &WorkflowOptions,
        scopes: &[String],
    ) -> DrsResult<ResolvedCredentials> {
        let token = options.bearer_token().ok_or_else(|| {
            DrsError::Credentials(format!(
                "Auth scheme '{}' requires workflow option '{}'",
                self.name, BEARER_TOKEN_OPTION
            ))
        })?;
        Ok(ResolvedCredentials::new(token, scopes.to_vec()))
    }
}

/// Reads the token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvTokenAuth {
    name: String,
    variable: String,
}

impl EnvTokenAuth {
    pub fn new(name: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable: variable.into(),
        }
    }
}

#[async_trait]
impl AuthMode for EnvTokenAuth {
    fn name(&self) -> &str {
        &self.name
    }

    async fn credentials(
        &self,
        _options: &WorkflowOptions,
        scopes: &[String],
    ) -> DrsResult<ResolvedCredentials> {
        let token = std::env::var(&self.variable).map_err(|e| {
            DrsError::Credentials(format!(
                "Auth scheme '{}' could not read env variable '{}': {}",
                self.name, self.variable, e
            ))
        })?;
        Ok(ResolvedCredentials::new(token, scopes.to_vec()))
    }
}

/// Always hands out the same configured token.
#[derive(Clone)]
pub struct StaticTokenAuth {
    name: String,
    token: String,
}

impl StaticTokenAuth {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
        }
    }
}

impl Debug for StaticTokenAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "StaticTokenAuth(name={})", self.name)
    }
}

#[async_trait]
impl AuthMode for StaticTokenAuth {
    fn name(&self) -> &str {
        &self.name
    }

    async fn credentials(
        &self,
        _options: &WorkflowOptions,
        scopes: &[String],
    ) -> DrsResult<ResolvedCredentials> {
        Ok(ResolvedCredentials::new(self.token.clone(), scopes.to_vec()))
    }
}

/// Resolves auth scheme names against the configured scheme table.
pub struct AuthResolver<'a> {
    schemes: &'a HashMap<String, AuthSchemeConfig>,
}

impl<'a> AuthResolver<'a> {
    pub fn new(schemes: &'a HashMap<String, AuthSchemeConfig>) -> Self {
        Self { schemes }
    }

    /// Look up `name` and build its strategy.
    ///
    /// # Errors
    ///
    /// Returns [`DrsError::AuthConfiguration`] if no scheme is configured under `name`.
    pub fn resolve(&self, name: &str) -> DrsResult<Arc<dyn AuthMode>> {
        let scheme = self.schemes.get(name).ok_or_else(|| {
            let mut known: Vec<&str> = self.schemes.keys().map(String::as_str).collect();
            known.sort_unstable();
            DrsError::AuthConfiguration(format!(
                "Unknown auth scheme '{}', configured schemes: [{}]",
                name,
                known.join(", ")
            ))
        })?;

        let mode: Arc<dyn AuthMode> = match scheme {
            AuthSchemeConfig::BearerOption => Arc::new(BearerOptionAuth::new(name)),
            AuthSchemeConfig::Env { variable } => Arc::new(EnvTokenAuth::new(name, variable)),
            AuthSchemeConfig::Static { token } => Arc::new(StaticTokenAuth::new(name, token)),
        };
        debug!("Resolved auth scheme={}, mode={:?}", name, mode);
        Ok(mode)
    }
}

/// Identity scopes followed by `extra`, without duplicates, in first-seen order.
pub fn drs_scopes(extra: &[String]) -> Vec<String> {
    let mut scopes: Vec<String> = Vec::with_capacity(IDENTITY_SCOPES.len() + extra.len());
    for scope in IDENTITY_SCOPES.iter().map(|s| s.to_string()).chain(extra.iter().cloned()) {
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemes() -> HashMap<String, AuthSchemeConfig> {
        let mut schemes = HashMap::new();
        schemes.insert("user".to_string(), AuthSchemeConfig::BearerOption);
        schemes.insert(
            "ci".to_string(),
            AuthSchemeConfig::Static {
                token: "static-token".to_string(),
            },
        );
        schemes.insert(
            "env".to_string(),
            AuthSchemeConfig::Env {
                variable: "DRS_PULSE_TEST_TOKEN_UNSET".to_string(),
            },
        );
        schemes
    }

    #[test]
    fn test_resolve_known_scheme() {
        let schemes = schemes();
        let mode = AuthResolver::new(&schemes).resolve("user").unwrap();
        assert_eq!(mode.name(), "user");
    }

    #[test]
    fn test_resolve_unknown_scheme() {
        let schemes = schemes();
        let result = AuthResolver::new(&schemes).resolve("missing");

        match result {
            Err(DrsError::AuthConfiguration(msg)) => {
                assert!(msg.contains("missing"));
                assert!(msg.contains("ci, env, user"));
            }
            _ => panic!("Expected AuthConfiguration error"),
        }
    }

    #[test]
    fn test_resolve_empty_table() {
        let schemes = HashMap::new();
        let result = AuthResolver::new(&schemes).resolve("user");
        assert!(matches!(result, Err(DrsError::AuthConfiguration(_))));
    }

    #[tokio::test]
    async fn test_bearer_option_auth() {
        let options = WorkflowOptions::new().with_option(BEARER_TOKEN_OPTION, "abc");
        let scopes = drs_scopes(&[]);
        let credentials = BearerOptionAuth::new("user")
            .credentials(&options, &scopes)
            .await
            .unwrap();

        assert_eq!(credentials.token(), "abc");
        assert_eq!(credentials.scopes(), scopes.as_slice());
    }

    #[tokio::test]
    async fn test_bearer_option_auth_missing_token() {
        let result = BearerOptionAuth::new("user")
            .credentials(&WorkflowOptions::new(), &[])
            .await;

        match result {
            Err(DrsError::Credentials(msg)) => assert!(msg.contains(BEARER_TOKEN_OPTION)),
            _ => panic!("Expected Credentials error"),
        }
    }

    #[tokio::test]
    async fn test_static_token_auth() {
        let schemes = schemes();
        let mode = AuthResolver::new(&schemes).resolve("ci").unwrap();
        let credentials = mode.credentials(&WorkflowOptions::new(), &[]).await.unwrap();
        assert_eq!(credentials.token(), "static-token");
    }

    #[tokio::test]
    async fn test_env_token_auth_unset_variable() {
        let schemes = schemes();
        let mode = AuthResolver::new(&schemes).resolve("env").unwrap();
        let result = mode.credentials(&WorkflowOptions::new(), &[]).await;
        assert!(matches!(result, Err(DrsError::Credentials(_))));
    }

    #[test]
    fn test_drs_scopes_identity_first() {
        let scopes = drs_scopes(&[]);
        assert_eq!(scopes, IDENTITY_SCOPES.map(String::from).to_vec());
    }

    #[test]
    fn test_drs_scopes_deduplicates() {
        let extra = vec![
            "https://www.googleapis.com/auth/devstorage.read_only".to_string(),
            IDENTITY_SCOPES[0].to_string(),
            "https://www.googleapis.com/auth/devstorage.read_only".to_string(),
        ];
        let scopes = drs_scopes(&extra);

        assert_eq!(scopes.len(), 3);
        assert_eq!(scopes[0], IDENTITY_SCOPES[0]);
        assert_eq!(scopes[1], IDENTITY_SCOPES[1]);
        assert_eq!(
            scopes[2],
            "https://www.googleapis.com/auth/devstorage.read_only"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let credentials = ResolvedCredentials::new("super-secret", vec!["openid".to_string()]);
        let debug_str = format!("{:?}", credentials);
        assert!(!debug_str.contains("super-secret"));
        assert!(debug_str.contains("redacted"));
        assert!(debug_str.contains("openid"));
    }

    #[test]
    fn test_static_auth_debug_hides_token() {
        let mode = StaticTokenAuth::new("ci", "super-secret");
        assert!(!format!("{:?}", mode).contains("super-secret"));
    }
}
