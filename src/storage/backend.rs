// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License. You may obtain a copy
// of the License at http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under
// the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR REPRESENTATIONS
// OF ANY KIND, either express or implied. See the License for the specific language
// governing permissions and limitations under the License.

use async_trait::async_trait;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::drs::channel::ReadableChannel;
use crate::drs::error::{DrsError, DrsResult};
use crate::drs::resolver::ServiceAccountKey;

/// Location of an object inside a bucket-addressed store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObjectRef {
    pub bucket: String,
    pub object_path: String,
}

impl StorageObjectRef {
    /// Parse `<scheme>://<bucket>/<object_path>`.
    ///
    /// The remainder after the scheme is split on the first `/` only, so the
    /// object path may itself contain separators.
    ///
    /// # Errors
    ///
    /// Returns [`DrsError::MalformedUrl`] if the URL does not start with
    /// `<scheme>://`, has no separator after the bucket, or has an empty
    /// bucket or object path.
    pub fn parse(url: &str, scheme: &str) -> DrsResult<Self> {
        let malformed = |reason: &str| DrsError::MalformedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let remainder = url
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix("://"))
            .ok_or_else(|| malformed(&format!("expected a {}:// prefix", scheme)))?;

        let (bucket, object_path) = remainder
            .split_once('/')
            .ok_or_else(|| malformed("missing '/' between bucket and object path"))?;

        if bucket.is_empty() {
            return Err(malformed("empty bucket name"));
        }
        if object_path.is_empty() {
            return Err(malformed("empty object path"));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            object_path: object_path.to_string(),
        })
    }
}

/// A storage backend able to open a read channel for URLs of one scheme.
#[async_trait]
pub trait ReadBackend: Send + Sync {
    /// Scheme this backend is registered under, e.g. `gs`.
    fn scheme(&self) -> &str;

    /// Open `url` for reading from offset 0 using the credential payload `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse, the credentials are
    /// unusable, or the storage service rejects the read.
    async fn open(&self, url: &str, key: &ServiceAccountKey) -> DrsResult<ReadableChannel>;
}

impl Debug for dyn ReadBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "ReadBackend(scheme={})", self.scheme())
    }
}
