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

use ed25519_dalek::{pkcs8::DecodePrivateKey, Signer, SigningKey};

use super::Credentials;
use crate::raw_signature::{RawSigner, RawSignerError, SigningAlg};

/// Ed25519 signer backed by `ed25519-dalek`.
pub(crate) struct Ed25519Signer {
    creds: Credentials,
    key: SigningKey,
}

impl Ed25519Signer {
    pub(crate) fn new(creds: Credentials, private_key_pem: &str) -> Result<Self, RawSignerError> {
        let key = SigningKey::from_pkcs8_pem(private_key_pem).map_err(|e| {
            RawSignerError::InvalidSigningCredentials(format!("invalid Ed25519 private key: {e}"))
        })?;

        Ok(Self { creds, key })
    }
}

impl RawSigner for Ed25519Signer {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, RawSignerError> {
        self.key
            .try_sign(data)
            .map(|sig| sig.to_bytes().to_vec())
            .map_err(|e| RawSignerError::InternalError(format!("Ed25519 signing failed: {e}")))
    }

    fn alg(&self) -> SigningAlg {
        SigningAlg::Ed25519
    }

    fn reserve_size(&self) -> usize {
        self.creds.reserve_size()
    }

    fn cert_chain(&self) -> Result<Vec<Vec<u8>>, RawSignerError> {
        Ok(self.creds.certs())
    }

    fn time_stamp_service_url(&self) -> Option<String> {
        self.creds.tsa_url()
    }
}
