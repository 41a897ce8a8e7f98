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

use async_trait::async_trait;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, ObjectStore, RetryConfig};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::time::Duration;
use tracing::info;

use super::backend::{ReadBackend, StorageObjectRef};
use crate::drs::channel::ReadableChannel;
use crate::drs::error::{DrsError, DrsResult};
use crate::drs::resolver::ServiceAccountKey;

/// Scheme of Google Cloud Storage URLs.
pub const GCS_SCHEME: &str = "gs";

/// Reads `gs://bucket/object` URLs with the service account key returned by the resolver.
///
/// A new client is built for every open; nothing is cached between reads.
pub struct GcsReadBackend {
    options: HashMap<String, String>,
}

impl GcsReadBackend {
    /// Create a backend using the given client tuning options.
    ///
    /// # Arguments
    ///
    /// * `options` - Timeout, pool and retry settings (see [`crate::drs::config::DrsConfig::options`])
    pub fn new(options: HashMap<String, String>) -> Self {
        Self { options }
    }

    /// Build connection options from configuration.
    ///
    /// # Arguments
    ///
    /// * `options` - Client options with optional timeout and connection settings
    ///
    /// # Returns
    ///
    /// A `ClientOptions` instance configured with timeout and connection settings.
    pub(crate) fn build_connection_options(options: &HashMap<String, String>) -> ClientOptions {
        let mut client_options = ClientOptions::default();
        if let Some(timeout_str) = options.get("timeout") {
            if timeout_str == "0" || timeout_str == "disabled" {
                client_options = client_options.with_timeout_disabled();
            } else if let Ok(sec) = timeout_str.parse::<u64>() {
                client_options = client_options.with_timeout(Duration::from_secs(sec))
            }
        };
        if let Some(connect_timeout_str) = options.get("connect_timeout") {
            if connect_timeout_str == "0" || connect_timeout_str == "disabled" {
                client_options = client_options.with_connect_timeout_disabled();
            } else if let Ok(sec) = connect_timeout_str.parse::<u64>() {
                client_options = client_options.with_connect_timeout(Duration::from_secs(sec))
            }
        }
        if let Some(pool_idle_timeout_str) = options.get("pool_idle_timeout") {
            if let Ok(sec) = pool_idle_timeout_str.parse::<u64>() {
                client_options = client_options.with_pool_idle_timeout(Duration::from_secs(sec))
            }
        }
        if let Some(pool_max_idle_per_host_str) = options.get("pool_max_idle_per_host") {
            if let Ok(max_idle) = pool_max_idle_per_host_str.parse::<usize>() {
                client_options = client_options.with_pool_max_idle_per_host(max_idle)
            }
        }
        client_options
    }

    /// Build retry options from configuration.
    ///
    /// Unset or unparsable `max_retries` means no retries.
    pub(crate) fn build_retry_options(options: &HashMap<String, String>) -> RetryConfig {
        let default_retry_config = RetryConfig::default();
        let max_retries = options
            .get("max_retries")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        let retry_timeout = options
            .get("retry_timeout")
            .and_then(|s| Some(Duration::from_secs(s.parse::<u64>().ok()?)))
            .unwrap_or(default_retry_config.retry_timeout);
        RetryConfig {
            backoff: Default::default(),
            max_retries,
            retry_timeout,
        }
    }

    /// Build a GCS client scoped to one bucket and one credential payload.
    ///
    /// # Errors
    ///
    /// Returns [`DrsError::Credentials`] if the key cannot be parsed into credentials.
    fn build_store(
        &self,
        object: &StorageObjectRef,
        key: &ServiceAccountKey,
    ) -> DrsResult<GoogleCloudStorage> {
        GoogleCloudStorageBuilder::new()
            .with_client_options(Self::build_connection_options(&self.options))
            .with_retry(Self::build_retry_options(&self.options))
            .with_bucket_name(&object.bucket)
            .with_service_account_key(key.as_str())
            .build()
            .map_err(|e| {
                DrsError::Credentials(format!(
                    "Failed to create GCS client for bucket={}: {}",
                    object.bucket, e
                ))
            })
    }
}

#[async_trait]
impl ReadBackend for GcsReadBackend {
    fn scheme(&self) -> &str {
        GCS_SCHEME
    }

    async fn open(&self, url: &str, key: &ServiceAccountKey) -> DrsResult<ReadableChannel> {
        let object = StorageObjectRef::parse(url, GCS_SCHEME)?;
        let store = self.build_store(&object, key)?;

        info!(
            "Opening GCS object bucket={}, object={}",
            object.bucket, object.object_path
        );
        let result = store
            .get(&ObjectPath::from(object.object_path.as_str()))
            .await?;

        Ok(ReadableChannel::from_get_result(url, result))
    }
}

impl Debug for GcsReadBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GcsReadBackend(options={:?})", self.options)
    }
}
