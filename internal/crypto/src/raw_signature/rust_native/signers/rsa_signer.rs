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

use rsa::{
    pkcs8::DecodePrivateKey,
    pss::SigningKey,
    sha2::{Sha256, Sha384, Sha512},
    signature::{RandomizedSigner, SignatureEncoding},
    RsaPrivateKey,
};

use super::Credentials;
use crate::raw_signature::{RawSigner, RawSignerError, SigningAlg};

/// RSASSA-PSS signer backed by the `rsa` crate.
///
/// PSS salts are random, so two signatures over the same data differ.
pub(crate) struct RsaSigner {
    creds: Credentials,
    key: RsaPrivateKey,
    alg: SigningAlg,
}

impl RsaSigner {
    pub(crate) fn new(
        creds: Credentials,
        private_key_pem: &str,
        alg: SigningAlg,
    ) -> Result<Self, RawSignerError> {
        if !matches!(alg, SigningAlg::Ps256 | SigningAlg::Ps384 | SigningAlg::Ps512) {
            return Err(RawSignerError::InternalError(format!(
                "{alg} is not an RSASSA-PSS algorithm"
            )));
        }

        let key = RsaPrivateKey::from_pkcs8_pem(private_key_pem).map_err(|e| {
            RawSignerError::InvalidSigningCredentials(format!("invalid RSA private key: {e}"))
        })?;

        Ok(Self { creds, key, alg })
    }

    fn sign_with<D>(&self, data: &[u8]) -> Result<Vec<u8>, rsa::signature::Error>
    where
        D: rsa::sha2::Digest + rsa::sha2::digest::FixedOutputReset,
    {
        let mut rng = rand::thread_rng();
        SigningKey::<D>::new(self.key.clone())
            .try_sign_with_rng(&mut rng, data)
            .map(|sig| sig.to_vec())
    }
}

impl RawSigner for RsaSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, RawSignerError> {
        let sig = match self.alg {
            SigningAlg::Ps384 => self.sign_with::<Sha384>(data),
            SigningAlg::Ps512 => self.sign_with::<Sha512>(data),
            _ => self.sign_with::<Sha256>(data),
        };

        sig.map_err(|e| RawSignerError::InternalError(format!("RSA signing failed: {e}")))
    }

    fn alg(&self) -> SigningAlg {
        self.alg
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
