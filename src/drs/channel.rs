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

//! Read channels and the scheme-keyed factory that opens them.

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use object_store::GetResult;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::{debug, info};

use super::error::{DrsError, DrsResult};
use super::resolver::DrsResolutionResult;
use super::selector::select_url;
use crate::storage::backend::ReadBackend;
use crate::storage::gcs::GcsReadBackend;

/// A deferred channel open.
///
/// Awaiting the task performs the network calls (resolution and storage
/// open) and may fail with any [`DrsError`]. Nothing is retried, and
/// dropping the task simply abandons the work.
pub type ChannelTask = BoxFuture<'static, DrsResult<ReadableChannel>>;

/// A byte stream over one storage object, owned by whoever opened it.
pub struct ReadableChannel {
    location: String,
    stream: BoxStream<'static, DrsResult<Bytes>>,
}

impl ReadableChannel {
    pub fn new(location: impl Into<String>, stream: BoxStream<'static, DrsResult<Bytes>>) -> Self {
        Self {
            location: location.into(),
            stream,
        }
    }

    /// Wrap the body of an object store `get`.
    pub fn from_get_result(location: impl Into<String>, result: GetResult) -> Self {
        Self::new(location, result.into_stream().map_err(DrsError::from).boxed())
    }

    /// The storage URL this channel reads from.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub async fn next_chunk(&mut self) -> Option<DrsResult<Bytes>> {
        self.stream.next().await
    }

    /// Drain the channel into memory.
    pub async fn read_to_end(mut self) -> DrsResult<Vec<u8>> {
        let mut buffer = Vec::new();
        while let Some(chunk) = self.stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer)
    }

    /// Adapt the channel to [`AsyncRead`].
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin + 'static {
        StreamReader::new(self.stream.map_err(std::io::Error::other))
    }
}

impl Stream for ReadableChannel {
    type Item = DrsResult<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl Debug for ReadableChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "ReadableChannel(location={})", self.location)
    }
}

/// Opens read channels for resolution results, dispatching on scheme.
#[derive(Clone, Default)]
pub struct ReadChannelFactory {
    backends: Arc<HashMap<String, Arc<dyn ReadBackend>>>,
}

impl ReadChannelFactory {
    /// Factory with no backends registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with the built-in backends (currently GCS).
    pub fn with_default_backends(options: &HashMap<String, String>) -> Self {
        let mut factory = Self::new();
        factory.register(Arc::new(GcsReadBackend::new(options.clone())));
        factory
    }

    /// Register `backend` under its scheme, replacing any previous one.
    pub fn register(&mut self, backend: Arc<dyn ReadBackend>) {
        let scheme = backend.scheme().to_string();
        debug!("Registering read backend scheme={}", scheme);
        Arc::make_mut(&mut self.backends).insert(scheme, backend);
    }

    pub fn supports(&self, scheme: &str) -> bool {
        self.backends.contains_key(scheme)
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Deferred open of the `desired_scheme` URL in `resolution`.
    ///
    /// When awaited:
    /// 1. the service account key must be present ([`DrsError::ServiceAccountMissing`]),
    /// 2. a candidate URL must match ([`DrsError::UrlNotFound`]),
    /// 3. a backend must be registered for the scheme ([`DrsError::UnsupportedScheme`]),
    /// 4. the backend opens the object from offset 0.
    pub fn open(
        &self,
        path: impl Into<String>,
        resolution: DrsResolutionResult,
        desired_scheme: impl Into<String>,
    ) -> ChannelTask {
        let backends = Arc::clone(&self.backends);
        let path = path.into();
        let desired_scheme = desired_scheme.into();

        async move {
            let key = resolution
                .service_account_key
                .as_ref()
                .ok_or_else(|| DrsError::ServiceAccountMissing { path: path.clone() })?;

            let url = select_url(&path, &resolution.candidate_urls, &desired_scheme)?;

            let backend = backends
                .get(&desired_scheme)
                .ok_or_else(|| DrsError::UnsupportedScheme {
                    scheme: desired_scheme.clone(),
                })?;

            info!("Opening drs_path={}, url={}", path, url);
            backend.open(url, key).await
        }
        .boxed()
    }
}

impl Debug for ReadChannelFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "ReadChannelFactory(schemes={:?})", self.schemes())
    }
}
