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

use super::error::{DrsError, DrsResult};
use super::resolver::CandidateUrl;

/// Pick the first candidate whose URL starts with `desired_scheme`.
///
/// The match is a literal string prefix test: `"gs"` also matches
/// `"gsx://..."`. Backends reject such URLs when they parse them.
///
/// # Errors
///
/// Returns [`DrsError::UrlNotFound`] if no candidate matches.
pub fn select_url<'a>(
    path: &str,
    candidates: &'a [CandidateUrl],
    desired_scheme: &str,
) -> DrsResult<&'a str> {
    candidates
        .iter()
        .find(|candidate| candidate.url.starts_with(desired_scheme))
        .map(|candidate| candidate.url.as_str())
        .ok_or_else(|| DrsError::UrlNotFound {
            path: path.to_string(),
            scheme: desired_scheme.to_string(),
        })
}

/// Selector bound to one desired scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeSelector {
    desired_scheme: String,
}

impl SchemeSelector {
    pub fn new(desired_scheme: impl Into<String>) -> Self {
        Self {
            desired_scheme: desired_scheme.into(),
        }
    }

    pub fn desired_scheme(&self) -> &str {
        &self.desired_scheme
    }

    pub fn select<'a>(&self, path: &str, candidates: &'a [CandidateUrl]) -> DrsResult<&'a str> {
        select_url(path, candidates, &self.desired_scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(urls: &[&str]) -> Vec<CandidateUrl> {
        urls.iter().map(|u| CandidateUrl::new(*u)).collect()
    }

    #[test]
    fn test_select_first_match_in_order() {
        let candidates = candidates(&[
            "s3://bucket-a/file",
            "gs://bucket-b/file",
            "gs://bucket-c/file",
        ]);
        let url = select_url("drs://host/id", &candidates, "gs").unwrap();
        assert_eq!(url, "gs://bucket-b/file");
    }

    #[test]
    fn test_select_only_candidate() {
        let candidates = candidates(&["gs://bucket/file"]);
        assert_eq!(
            select_url("drs://host/id", &candidates, "gs").unwrap(),
            "gs://bucket/file"
        );
    }

    #[test]
    fn test_select_no_match() {
        let candidates = candidates(&["s3://bucket/file", "https://host/file"]);
        let result = select_url("drs://host/id", &candidates, "gs");

        match result {
            Err(DrsError::UrlNotFound { path, scheme }) => {
                assert_eq!(path, "drs://host/id");
                assert_eq!(scheme, "gs");
            }
            _ => panic!("Expected UrlNotFound"),
        }
    }

    #[test]
    fn test_select_empty_candidates() {
        let result = select_url("drs://host/id", &[], "gs");
        assert!(matches!(result, Err(DrsError::UrlNotFound { .. })));
    }

    #[test]
    fn test_select_literal_prefix() {
        // "gsx://" starts with "gs", so it is picked over a later "gs://" entry
        let candidates = candidates(&["gsx://bucket/file", "gs://bucket/file"]);
        assert_eq!(
            select_url("drs://host/id", &candidates, "gs").unwrap(),
            "gsx://bucket/file"
        );
    }

    #[test]
    fn test_select_is_case_sensitive() {
        let candidates = candidates(&["GS://bucket/file"]);
        assert!(select_url("drs://host/id", &candidates, "gs").is_err());
    }

    #[test]
    fn test_scheme_selector() {
        let selector = SchemeSelector::new("s3");
        let candidates = candidates(&["gs://a/b", "s3://c/d"]);
        assert_eq!(selector.desired_scheme(), "s3");
        assert_eq!(selector.select("drs://h/i", &candidates).unwrap(), "s3://c/d");
    }
}
