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

use futures::future::FutureExt;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use super::auth::ResolvedCredentials;
use super::channel::{ChannelTask, ReadChannelFactory};
use super::path::DrsPath;
use super::resolver::{DrsResolutionResult, DrsResolver};
use crate::util::util::measure_dur_async;

/// Read interpreter handed to the generic filesystem layer.
pub type ReadInterpreter = Arc<dyn Fn(DrsPath) -> ChannelTask + Send + Sync>;

/// Turns DRS paths into read channels: resolve, select, open.
///
/// Holds only shared, immutable collaborators; all per-read state lives in
/// the returned task.
pub struct DrsFileSystemProvider {
    resolver: Arc<dyn DrsResolver>,
    channels: ReadChannelFactory,
    credentials: Arc<ResolvedCredentials>,
    desired_scheme: String,
}

impl DrsFileSystemProvider {
    pub fn new(
        resolver: Arc<dyn DrsResolver>,
        channels: ReadChannelFactory,
        credentials: Arc<ResolvedCredentials>,
        desired_scheme: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            channels,
            credentials,
            desired_scheme: desired_scheme.into(),
        }
    }

    pub fn credentials(&self) -> &Arc<ResolvedCredentials> {
        &self.credentials
    }

    pub fn desired_scheme(&self) -> &str {
        &self.desired_scheme
    }

    /// Deferred read of `path`.
    ///
    /// Awaiting the task calls the resolver and then opens the selected URL.
    /// Errors from either step are returned unchanged.
    pub fn read_channel(&self, path: &DrsPath) -> ChannelTask {
        let resolver = Arc::clone(&self.resolver);
        let credentials = Arc::clone(&self.credentials);
        let channels = self.channels.clone();
        let desired_scheme = self.desired_scheme.clone();
        let path = path.clone();

        async move {
            let resolution = measure_dur_async(
                "drs_resolve",
                || resolver.resolve(&path, &credentials),
                Some(|r: &DrsResolutionResult| format!("candidates={}", r.candidate_urls.len())),
            )
            .await?;

            channels
                .open(path.to_string(), resolution, desired_scheme)
                .await
        }
        .boxed()
    }

    /// Wrap this provider in a [`ReadInterpreter`].
    pub fn interpreter(self: &Arc<Self>) -> ReadInterpreter {
        let provider = Arc::clone(self);
        Arc::new(move |path: DrsPath| provider.read_channel(&path))
    }
}

impl Debug for DrsFileSystemProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "DrsFileSystemProvider(desired_scheme={}, channels={:?})",
            self.desired_scheme, self.channels
        )
    }
}
