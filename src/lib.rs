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

//! # DRS Pulse
//!
//! A Rust library for reading GA4GH DRS objects (`drs://` and `dos://` URIs)
//! through a workflow engine's generic file layer.
//!
//! A DRS identifier names a data object by identity rather than location. DRS
//! Pulse calls a resolution service to turn the identifier into candidate
//! storage URLs plus a service account key, picks the URL matching the
//! desired scheme, and opens it as a byte stream with the matching backend.
//!
//! ## Features
//!
//! - **One-time setup**: auth, HTTP client and credentials are initialised once per workflow run
//! - **Scheme registry**: storage backends are registered per URL scheme (GCS built in)
//! - **Lazy reads**: every open returns a task that does no I/O until awaited
//! - **Typed failures**: each failure mode is a distinct [`DrsError`] variant
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drs_pulse::{AuthSchemeConfig, DrsConfig, DrsPathBuilderFactory, WorkflowOptions};
//! use drs_pulse::drs::config::BEARER_TOKEN_OPTION;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = DrsConfig::new("https://resolver.example.org/api/v1", "user")
//!     .with_auth_scheme("user", AuthSchemeConfig::BearerOption);
//!
//! // Fails here if "user" is not a configured auth scheme
//! let factory = DrsPathBuilderFactory::new(config)?;
//!
//! let options = WorkflowOptions::new().with_option(BEARER_TOKEN_OPTION, "ya29.token");
//! let builder = factory.build(&options).await?;
//!
//! let channel = builder.open_uri("drs://drs.example.org/0012-abcd").await?;
//! println!("{} bytes", channel.read_to_end().await?.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`drs`] - Resolution pipeline, path builders and the factory
//! - [`storage`] - Storage backends that open resolved URLs
//! - [`util`] - Utility functions and helpers

pub mod drs;
pub mod storage;
pub mod util;

// Re-export commonly used types
pub use drs::{
    AuthSchemeConfig, DrsConfig, DrsError, DrsPath, DrsPathBuilder, DrsPathBuilderFactory,
    DrsResult, ReadableChannel, WorkflowOptions,
};
