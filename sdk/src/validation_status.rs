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

//! Implements validation status for specific parts of a manifest.
//!
//! See <https://c2pa.org/specifications/specifications/1.0/specs/C2PA_Specification.html#_existing_manifests>.

#![deny(missing_docs)]

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The claim signature does not match the claim.
pub const CLAIM_SIGNATURE_MISMATCH: &str = "claimSignature.mismatch";

/// The signing credential is not valid for the signing algorithm.
pub const SIGNING_CREDENTIAL_INVALID: &str = "signingCredential.invalid";

/// The hash of an assertion does not match the hashed URI in the claim,
/// or the referenced assertion is missing.
pub const ASSERTION_HASHEDURI_MISMATCH: &str = "assertion.hashedURI.mismatch";

/// The data hash does not match the asset.
pub const ASSERTION_DATAHASH_MISMATCH: &str = "assertion.dataHash.mismatch";

/// The active claim has no hard binding assertion.
pub const CLAIM_HARD_BINDINGS_MISSING: &str = "claim.hardBindings.missing";

/// An ingredient's manifest does not match the hash recorded for it.
pub const INGREDIENT_MANIFEST_MISMATCH: &str = "ingredient.manifest.mismatch";

/// The claim could not be parsed.
pub const CLAIM_MALFORMED: &str = "claim.malformed";

/// A `ValidationStatus` struct describes the validation status of a
/// specific part of a manifest.
///
/// See <https://c2pa.org/specifications/specifications/1.0/specs/C2PA_Specification.html#_existing_manifests>.
#[derive(Clone, Debug, Deserialize, Serialize, Eq)]
pub struct ValidationStatus {
    code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

impl ValidationStatus {
    pub(crate) fn new<S: Into<String>>(code: S) -> Self {
        Self {
            code: code.into(),
            url: None,
            explanation: None,
        }
    }

    /// Returns the validation status code.
    ///
    /// These are defined as constants in the
    /// [`validation_status`](crate::validation_status) mod.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the internal JUMBF reference to the entity that was validated.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns a human-readable description of the validation that was performed.
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Sets the internal JUMBF reference to the entity was validated.
    pub(crate) fn set_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the human-readable description of the validation that was performed.
    pub(crate) fn set_explanation<S: Into<String>>(mut self, explanation: S) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    // Maps errors into validation_status codes.
    fn code_from_error(error: &Error) -> &'static str {
        match error {
            Error::HashMismatch(_) => ASSERTION_DATAHASH_MISMATCH,
            Error::ClaimMissingHardBinding => CLAIM_HARD_BINDINGS_MISSING,
            Error::CoseError(c2pa_crypto::cose::CoseError::CertificateMismatch(_))
            | Error::CoseError(c2pa_crypto::cose::CoseError::UnsupportedSigningAlgorithm) => {
                SIGNING_CREDENTIAL_INVALID
            }
            Error::CoseError(_) | Error::CoseNoCerts => CLAIM_SIGNATURE_MISMATCH,
            _ => CLAIM_MALFORMED,
        }
    }

    /// Creates a ValidationStatus from an error.
    pub(crate) fn from_error(error: &Error) -> Self {
        let code = Self::code_from_error(error);
        debug!("ValidationStatus {code} from error {error:?}");
        Self::new(code).set_explanation(error.to_string())
    }
}

impl PartialEq for ValidationStatus {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.url == other.url
    }
}
