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

use thiserror::Error;

/// Errors that can occur while resolving and opening DRS objects
#[derive(Error, Debug)]
pub enum DrsError {
    /// The configured auth scheme has no matching credential strategy.
    #[error("Auth configuration error: {0}")]
    AuthConfiguration(String),

    /// None of the resolved candidate URLs starts with the desired scheme.
    #[error("Could not find a {scheme} url to download {path}")]
    UrlNotFound { path: String, scheme: String },

    /// Resolution succeeded but returned no credential payload.
    #[error("Expected a service account key for {path}, but the resolver returned none")]
    ServiceAccountMissing { path: String },

    /// A URL matched the desired scheme but no backend is registered for it.
    #[error("Unsupported scheme for reading: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// The matched URL could not be split into bucket and object.
    #[error("Malformed storage url '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("Invalid DRS uri: {0}")]
    InvalidDrsUri(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object store error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type for DRS operations
pub type DrsResult<T> = Result<T, DrsError>;
