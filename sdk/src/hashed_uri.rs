// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    jumbf::labels::{parse_jumbf_uri, JumbfUri},
    utils::hash_utils::hash_by_alg,
    Result,
};

/// Hashed Uri structure as defined by C2PA spec
///
/// The hash is stored as a CBOR byte string, or as an array of numbers in
/// JSON assertions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashedUri {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    alg: Option<String>,
    #[serde(with = "serde_bytes")]
    hash: Vec<u8>,
}

impl HashedUri {
    pub fn new(url: String, alg: Option<String>, hash_bytes: &[u8]) -> Self {
        Self {
            url,
            alg,
            hash: hash_bytes.to_vec(),
        }
    }

    /// Hash a JUMBF superbox (without its 8 byte box header) and point at it.
    pub(crate) fn from_superbox_bytes(url: String, alg: &str, box_bytes: &[u8]) -> Result<Self> {
        let payload = box_bytes.get(8..).unwrap_or_default();
        let hash = hash_by_alg(alg, payload, &[])?;
        Ok(Self::new(url, Some(alg.to_owned()), &hash))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_relative_url(&self) -> bool {
        !matches!(
            parse_jumbf_uri(&self.url),
            Some(JumbfUri::Absolute { .. }) | Some(JumbfUri::Manifest(_))
        )
    }

    /// The manifest label for absolute manifest or assertion URLs.
    pub(crate) fn manifest_label(&self) -> Option<&str> {
        match parse_jumbf_uri(&self.url)? {
            JumbfUri::Absolute { manifest, .. } | JumbfUri::Manifest(manifest) => Some(manifest),
            JumbfUri::Relative(_) => None,
        }
    }

    pub fn alg(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }
}

impl fmt::Display for HashedUri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "url: {}, alg: {:?}, hash", self.url, self.alg)
    }
}
