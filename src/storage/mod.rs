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

//! Storage backends for reading resolved objects
//!
//! Each backend reads URLs of one scheme using the `object_store` crate.
//! Adding a backend means implementing [`ReadBackend`] and registering it
//! with a [`crate::drs::ReadChannelFactory`].

pub mod backend;
pub mod gcs;

// Public exports
pub use backend::{ReadBackend, StorageObjectRef};
pub use gcs::GcsReadBackend;
