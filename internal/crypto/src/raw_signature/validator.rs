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

use thiserror::Error;

use crate::raw_signature::{rust_native, SigningAlg};

/// Checks a bare signature produced by one [`SigningAlg`].
///
/// Validators see only the signature bytes. Unwrapping the COSE envelope
/// and picking the public key out of the certificate happen in
/// [`crate::cose`].
pub trait RawSignatureValidator {
    /// Succeed if `sig` was made over `data` with the private half of
    /// `public_key` (a DER `SubjectPublicKeyInfo`).
    fn validate(
        &self,
        sig: &[u8],
        data: &[u8],
        public_key: &[u8],
    ) -> Result<(), RawSignatureValidationError>;
}

/// Look up the validator for `alg`.
///
/// Every algorithm in [`SigningAlg`] currently has one, but callers should
/// still treat `None` as an unsupported algorithm.
pub fn validator_for_signing_alg(alg: SigningAlg) -> Option<Box<dyn RawSignatureValidator>> {
    Some(rust_native::validators::for_alg(alg))
}

/// Reasons a raw signature fails to validate.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum RawSignatureValidationError {
    /// Well-formed, but made with a different key or over different data.
    #[error("the signature does not match the provided data or public key")]
    SignatureMismatch,

    /// The key bytes could not be decoded for this algorithm.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// The signature has the wrong length or encoding.
    #[error("invalid signature value")]
    InvalidSignature,
}
