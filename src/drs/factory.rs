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

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;
use url::Url;

use super::auth::{drs_scopes, AuthMode, AuthResolver, ResolvedCredentials};
use super::channel::ReadChannelFactory;
use super::config::{DrsConfig, WorkflowOptions};
use super::error::DrsResult;
use super::filesystem::DrsFileSystemProvider;
use super::path::DrsPathBuilder;
use super::resolver::{DrsResolver, HttpDrsResolver};
use crate::storage::backend::ReadBackend;

/// State created once per factory and shared by every path builder it produces.
pub struct FactorySetup {
    pub client: reqwest::Client,
    pub scopes: Vec<String>,
    pub credentials: Arc<ResolvedCredentials>,
    pub provider: Arc<DrsFileSystemProvider>,
}

impl Debug for FactorySetup {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FactorySetup")
            .field("scopes", &self.scopes)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Entry point for the engine: one factory per workflow run.
///
/// The auth scheme is resolved when the factory is created. The HTTP client,
/// scope list and credentials are set up on the first [`build`](Self::build)
/// (or an explicit [`initialize`](Self::initialize)) and reused afterwards.
///
/// # Examples
///
/// ```no_run
/// use drs_pulse::drs::config::{AuthSchemeConfig, DrsConfig, WorkflowOptions, BEARER_TOKEN_OPTION};
/// use drs_pulse::drs::factory::DrsPathBuilderFactory;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let config = DrsConfig::new("https://resolver.example.org/api/v1", "user")
///     .with_auth_scheme("user", AuthSchemeConfig::BearerOption);
/// let factory = DrsPathBuilderFactory::new(config)?;
///
/// let options = WorkflowOptions::new().with_option(BEARER_TOKEN_OPTION, "token");
/// let builder = factory.build(&options).await?;
/// let channel = builder.open_uri("drs://drs.example.org/object-id").await?;
/// let bytes = channel.read_to_end().await?;
/// # Ok(())
/// # }
/// ```
pub struct DrsPathBuilderFactory {
    config: DrsConfig,
    endpoint: Url,
    auth: Arc<dyn AuthMode>,
    channels: ReadChannelFactory,
    resolver: Option<Arc<dyn DrsResolver>>,
    setup: OnceCell<Arc<FactorySetup>>,
}

impl DrsPathBuilderFactory {
    /// Create a factory, resolving `config.auth` against `config.auth_schemes`.
    ///
    /// # Errors
    ///
    /// Returns [`DrsError::AuthConfiguration`](super::error::DrsError::AuthConfiguration)
    /// if the auth scheme is unknown, or a URL parse error if `resolver_url` is invalid.
    pub fn new(config: DrsConfig) -> DrsResult<Self> {
        let auth = AuthResolver::new(&config.auth_schemes).resolve(&config.auth)?;
        Self::with_auth(config, auth)
    }

    /// Create a factory with an already resolved auth strategy.
    pub fn with_auth(config: DrsConfig, auth: Arc<dyn AuthMode>) -> DrsResult<Self> {
        let endpoint = Url::parse(&config.resolver_url)?;
        let channels = ReadChannelFactory::with_default_backends(&config.options);

        info!(
            "Created DRS path builder factory auth={}, resolver={}, desired_scheme={}",
            auth.name(),
            endpoint,
            config.desired_scheme
        );

        Ok(Self {
            config,
            endpoint,
            auth,
            channels,
            resolver: None,
            setup: OnceCell::new(),
        })
    }

    /// Register an additional read backend.
    pub fn with_backend(mut self, backend: Arc<dyn ReadBackend>) -> Self {
        self.channels.register(backend);
        self
    }

    /// Use `resolver` instead of the HTTP resolver built from `resolver_url`.
    pub fn with_resolver(mut self, resolver: Arc<dyn DrsResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn config(&self) -> &DrsConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.setup.initialized()
    }

    /// Run the one-time setup if it has not completed yet.
    ///
    /// Concurrent callers wait for a single initialisation and all receive
    /// the same result. A failed setup is not stored, so a later call tries again.
    pub async fn initialize(&self, options: &WorkflowOptions) -> DrsResult<Arc<FactorySetup>> {
        self.setup
            .get_or_try_init(|| self.create_setup(options))
            .await
            .map(Arc::clone)
    }

    /// Produce a path builder bound to this factory's shared setup.
    pub async fn build(&self, options: &WorkflowOptions) -> DrsResult<DrsPathBuilder> {
        let setup = self.initialize(options).await?;
        Ok(DrsPathBuilder::new(Arc::clone(&setup.provider)))
    }

    fn build_http_client(&self) -> DrsResult<reqwest::Client> {
        let options = &self.config.options;
        let seconds = |key: &str| {
            options
                .get(key)
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
        };

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = seconds("timeout") {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = seconds("connect_timeout") {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(pool_idle_timeout) = seconds("pool_idle_timeout") {
            builder = builder.pool_idle_timeout(pool_idle_timeout);
        }
        if let Some(max_idle) = options
            .get("pool_max_idle_per_host")
            .and_then(|s| s.parse::<usize>().ok())
        {
            builder = builder.pool_max_idle_per_host(max_idle);
        }
        Ok(builder.build()?)
    }

    async fn create_setup(&self, options: &WorkflowOptions) -> DrsResult<Arc<FactorySetup>> {
        let client = self.build_http_client()?;
        let scopes = drs_scopes(&self.config.extra_scopes);
        let credentials = Arc::new(self.auth.credentials(options, &scopes).await?);

        let resolver: Arc<dyn DrsResolver> = match &self.resolver {
            Some(resolver) => Arc::clone(resolver),
            None => Arc::new(HttpDrsResolver::new(client.clone(), self.endpoint.clone())),
        };

        let provider = Arc::new(DrsFileSystemProvider::new(
            resolver,
            self.channels.clone(),
            Arc::clone(&credentials),
            self.config.desired_scheme.clone(),
        ));

        info!(
            "Initialized DRS factory auth={}, scopes={}",
            self.auth.name(),
            scopes.len()
        );

        Ok(Arc::new(FactorySetup {
            client,
            scopes,
            credentials,
            provider,
        }))
    }
}

impl Debug for DrsPathBuilderFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "DrsPathBuilderFactory(auth={}, resolver={}, initialized={}, channels={:?})",
            self.auth.name(),
            self.endpoint,
            self.is_initialized(),
            self.channels
        )
    }
}
