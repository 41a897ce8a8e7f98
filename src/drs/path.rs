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

use futures::future::{self, FutureExt};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use super::auth::ResolvedCredentials;
use super::channel::ChannelTask;
use super::error::{DrsError, DrsResult};
use super::filesystem::DrsFileSystemProvider;

/// URI schemes that address DRS objects.
pub const DRS_SCHEMES: [&str; 2] = ["drs", "dos"];

/// A parsed DRS identifier such as `drs://host/object-id`.
///
/// The compact form `drs://host` (no object segment) is accepted; some
/// resolvers encode the whole identifier in the host part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrsPath {
    uri: String,
    scheme_len: usize,
}

impl DrsPath {
    /// Parse a DRS uri.
    ///
    /// # Errors
    ///
    /// Returns [`DrsError::InvalidDrsUri`] if the scheme is not `drs` or `dos`,
    /// or if nothing follows the `://` separator.
    pub fn parse(uri: &str) -> DrsResult<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| DrsError::InvalidDrsUri(format!("missing scheme in '{}'", uri)))?;

        if !DRS_SCHEMES.contains(&scheme) {
            return Err(DrsError::InvalidDrsUri(format!(
                "unsupported scheme '{}' in '{}'",
                scheme, uri
            )));
        }

        if rest.is_empty() || rest.starts_with('/') {
            return Err(DrsError::InvalidDrsUri(format!("missing host in '{}'", uri)));
        }

        Ok(Self {
            uri: uri.to_string(),
            scheme_len: scheme.len(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.uri[..self.scheme_len]
    }

    /// Everything after `scheme://`.
    pub fn path_without_scheme(&self) -> &str {
        &self.uri[self.scheme_len + 3..]
    }

    pub fn host(&self) -> &str {
        let rest = self.path_without_scheme();
        rest.split_once('/').map_or(rest, |(host, _)| host)
    }

    /// The object segment after the host, if present.
    pub fn object_id(&self) -> Option<&str> {
        self.path_without_scheme()
            .split_once('/')
            .map(|(_, id)| id)
            .filter(|id| !id.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl Display for DrsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.uri)
    }
}

/// Seam used by the engine's generic path layer.
pub trait PathBuilder: Send + Sync {
    fn name(&self) -> &str;

    /// Build a path from a string, or fail if this builder does not handle it.
    fn build_path(&self, uri: &str) -> DrsResult<DrsPath>;
}

/// Builds DRS paths and opens them through a [`DrsFileSystemProvider`].
#[derive(Clone)]
pub struct DrsPathBuilder {
    provider: Arc<DrsFileSystemProvider>,
}

impl DrsPathBuilder {
    pub fn new(provider: Arc<DrsFileSystemProvider>) -> Self {
        Self { provider }
    }

    /// Deferred read of `path`. Nothing runs until the task is awaited.
    pub fn open(&self, path: &DrsPath) -> ChannelTask {
        self.provider.read_channel(path)
    }

    /// Parse `uri` and open it; a parse failure surfaces when the task is awaited.
    pub fn open_uri(&self, uri: &str) -> ChannelTask {
        match self.build_path(uri) {
            Ok(path) => self.open(&path),
            Err(e) => future::ready(Err(e)).boxed(),
        }
    }

    pub fn credentials(&self) -> &Arc<ResolvedCredentials> {
        self.provider.credentials()
    }

    pub fn provider(&self) -> &Arc<DrsFileSystemProvider> {
        &self.provider
    }
}

impl PathBuilder for DrsPathBuilder {
    fn name(&self) -> &str {
        "drs"
    }

    fn build_path(&self, uri: &str) -> DrsResult<DrsPath> {
        DrsPath::parse(uri)
    }
}

impl Debug for DrsPathBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "DrsPathBuilder(provider={:?})", self.provider)
    }
}
