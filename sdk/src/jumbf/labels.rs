// Copyright 2024 Adobe. All rights reserved.
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

//! Labels for the standard C2PA JUMBF boxes and helpers for building and
//! resolving `self#jumbf=` URIs.

/// Label for the top level manifest store box.
pub const MANIFEST_STORE: &str = "c2pa";

/// Label for the assertion store box within a manifest.
pub const ASSERTIONS: &str = "c2pa.assertions";

/// Label for the claim box within a manifest.
pub const CLAIM: &str = "c2pa.claim";

/// Label for the signature box within a manifest.
pub const SIGNATURE: &str = "c2pa.signature";

const JUMBF_PREFIX: &str = "self#jumbf";

pub(crate) fn to_manifest_uri(manifest_label: &str) -> String {
    format!("{JUMBF_PREFIX}=/{MANIFEST_STORE}/{manifest_label}")
}

pub(crate) fn to_assertion_uri(manifest_label: &str, assertion_label: &str) -> String {
    format!(
        "{}/{}/{}",
        to_manifest_uri(manifest_label),
        ASSERTIONS,
        assertion_label
    )
}

/// The manifest relative form used inside claims.
pub(crate) fn to_relative_assertion_uri(assertion_label: &str) -> String {
    format!("{JUMBF_PREFIX}={ASSERTIONS}/{assertion_label}")
}

pub(crate) fn to_signature_uri() -> String {
    format!("{JUMBF_PREFIX}={SIGNATURE}")
}

/// A parsed `self#jumbf=` reference.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum JumbfUri<'a> {
    /// `self#jumbf=/c2pa/<manifest>/c2pa.assertions/<label>`
    Absolute {
        manifest: &'a str,
        assertion: &'a str,
    },
    /// `self#jumbf=/c2pa/<manifest>`
    Manifest(&'a str),
    /// `self#jumbf=c2pa.assertions/<label>`, relative to the current manifest
    Relative(&'a str),
}

pub(crate) fn parse_jumbf_uri(uri: &str) -> Option<JumbfUri<'_>> {
    let path = uri.strip_prefix(JUMBF_PREFIX)?.strip_prefix('=')?;

    if let Some(abs) = path.strip_prefix('/') {
        let rest = abs.strip_prefix(MANIFEST_STORE)?.strip_prefix('/')?;
        let assertions_sep = format!("/{ASSERTIONS}/");
        return match rest.find(&assertions_sep) {
            Some(pos) => Some(JumbfUri::Absolute {
                manifest: &rest[..pos],
                assertion: &rest[pos + assertions_sep.len()..],
            }),
            None => Some(JumbfUri::Manifest(rest)),
        };
    }

    path.strip_prefix(ASSERTIONS)?
        .strip_prefix('/')
        .map(JumbfUri::Relative)
}

/// Strip a trailing `__<n>` instance suffix from an assertion label.
pub(crate) fn base_label(label: &str) -> &str {
    match label.rsplit_once("__") {
        Some((base, n)) if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) => base,
        _ => label,
    }
}
