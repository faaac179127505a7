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

use ecdsa::signature::hazmat::PrehashVerifier;
use p256::{ecdsa::VerifyingKey as P256VerifyingKey, pkcs8::DecodePublicKey};
use p384::ecdsa::VerifyingKey as P384VerifyingKey;
use p521::{ecdsa::VerifyingKey as P521VerifyingKey, PublicKey as P521PublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::raw_signature::{RawSignatureValidationError, RawSignatureValidator};

/// An `EcdsaValidator` can validate raw signatures with one of the ECDSA
/// signature algorithms.
///
/// Signatures may be supplied in P1363 (`r | s`) or DER form.
pub(crate) enum EcdsaValidator {
    /// ECDSA with SHA-256
    Es256,

    /// ECDSA with SHA-384
    Es384,

    /// ECDSA with SHA-512
    Es512,
}

impl RawSignatureValidator for EcdsaValidator {
    fn validate(
        &self,
        sig: &[u8],
        data: &[u8],
        public_key: &[u8],
    ) -> Result<(), RawSignatureValidationError> {
        let result = match self {
            Self::Es256 => {
                let digest = Sha256::digest(data);
                let signature = p256::ecdsa::Signature::from_slice(sig)
                    .or_else(|_| p256::ecdsa::Signature::from_der(sig))
                    .map_err(|_| RawSignatureValidationError::InvalidSignature)?;

                let vk = P256VerifyingKey::from_public_key_der(public_key)
                    .map_err(|_| RawSignatureValidationError::InvalidPublicKey)?;

                vk.verify_prehash(&digest, &signature)
            }

            Self::Es384 => {
                let digest = Sha384::digest(data);
                let signature = p384::ecdsa::Signature::from_slice(sig)
                    .or_else(|_| p384::ecdsa::Signature::from_der(sig))
                    .map_err(|_| RawSignatureValidationError::InvalidSignature)?;

                let vk = P384VerifyingKey::from_public_key_der(public_key)
                    .map_err(|_| RawSignatureValidationError::InvalidPublicKey)?;

                vk.verify_prehash(&digest, &signature)
            }

            Self::Es512 => {
                let digest = Sha512::digest(data);
                let signature = p521::ecdsa::Signature::from_slice(sig)
                    .or_else(|_| p521::ecdsa::Signature::from_der(sig))
                    .map_err(|_| RawSignatureValidationError::InvalidSignature)?;

                // p521 has no SPKI decoder for its verifying key, so go through SEC1.
                let pk = P521PublicKey::from_public_key_der(public_key)
                    .map_err(|_| RawSignatureValidationError::InvalidPublicKey)?;

                let vk = P521VerifyingKey::from_sec1_bytes(&pk.to_sec1_bytes())
                    .map_err(|_| RawSignatureValidationError::InvalidPublicKey)?;

                vk.verify_prehash(&digest, &signature)
            }
        };

        result.map_err(|_| RawSignatureValidationError::SignatureMismatch)
    }
}
