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

//! DRS resolution pipeline
//!
//! A DRS path is opened in three steps, all deferred until the returned
//! [`channel::ChannelTask`] is awaited:
//!
//! 1. the resolution service maps the identifier to candidate URLs and a
//!    service account key ([`resolver`]),
//! 2. the first URL with the desired scheme is selected ([`selector`]),
//! 3. the backend registered for that scheme opens a byte stream ([`channel`]).
//!
//! [`factory::DrsPathBuilderFactory`] wires auth and the HTTP client once per
//! workflow run and hands out [`path::DrsPathBuilder`]s.

pub mod auth;
pub mod channel;
pub mod config;
pub mod error;
pub mod factory;
pub mod filesystem;
pub mod path;
pub mod resolver;
pub mod selector;

// Public exports
pub use channel::{ChannelTask, ReadChannelFactory, ReadableChannel};
pub use config::{AuthSchemeConfig, DrsConfig, WorkflowOptions};
pub use error::{DrsError, DrsResult};
pub use factory::DrsPathBuilderFactory;
pub use filesystem::DrsFileSystemProvider;
pub use path::{DrsPath, DrsPathBuilder, PathBuilder};
pub use resolver::{DrsResolutionResult, DrsResolver};
pub use selector::SchemeSelector;
