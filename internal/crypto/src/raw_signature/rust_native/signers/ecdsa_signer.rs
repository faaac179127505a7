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

use ecdsa::signature::Signer;
use p256::ecdsa::{Signature as P256Signature, SigningKey as P256SigningKey};
use p384::ecdsa::{Signature as P384Signature, SigningKey as P384SigningKey};
use p521::ecdsa::{Signature as P521Signature, SigningKey as P521SigningKey};
use pkcs8::{DecodePrivateKey, PrivateKeyInfo};
use simple_asn1::{from_der, ASN1Block};

use super::Credentials;
use crate::raw_signature::{RawSigner, RawSignerError, SigningAlg};

// Signing keys for each curve are distinct types.
enum EcdsaSigningKey {
    Es256(P256SigningKey),
    Es384(P384SigningKey),
    Es512(P521SigningKey),
}

/// Implements [`RawSigner`] for the ECDSA family using the RustCrypto curves.
///
/// Signatures are produced in the fixed-width P1363 `r | s` encoding that
/// COSE expects, and are deterministic (RFC 6979).
pub(crate) struct EcdsaSigner {
    creds: Credentials,
    key: EcdsaSigningKey,
}

impl EcdsaSigner {
    pub(crate) fn new(
        creds: Credentials,
        private_key_pem: &str,
        alg: SigningAlg,
    ) -> Result<Self, RawSignerError> {
        let bad_key = |e: pkcs8::Error| {
            RawSignerError::InvalidSigningCredentials(format!("invalid {alg} private key: {e}"))
        };

        let key = match alg {
            SigningAlg::Es256 => EcdsaSigningKey::Es256(
                P256SigningKey::from_pkcs8_pem(private_key_pem).map_err(bad_key)?,
            ),
            SigningAlg::Es384 => EcdsaSigningKey::Es384(
                P384SigningKey::from_pkcs8_pem(private_key_pem).map_err(bad_key)?,
            ),
            SigningAlg::Es512 => EcdsaSigningKey::Es512(es512_from_pkcs8_pem(private_key_pem)?),
            _ => {
                return Err(RawSignerError::InvalidSigningCredentials(
                    "Unsupported algorithm".to_string(),
                ))
            }
        };

        Ok(Self { creds, key })
    }
}

impl RawSigner for EcdsaSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, RawSignerError> {
        Ok(match &self.key {
            EcdsaSigningKey::Es256(key) => Signer::<P256Signature>::sign(key, data).to_vec(),
            EcdsaSigningKey::Es384(key) => Signer::<P384Signature>::sign(key, data).to_vec(),
            EcdsaSigningKey::Es512(key) => Signer::<P521Signature>::sign(key, data).to_vec(),
        })
    }

    fn alg(&self) -> SigningAlg {
        match self.key {
            EcdsaSigningKey::Es256(_) => SigningAlg::Es256,
            EcdsaSigningKey::Es384(_) => SigningAlg::Es384,
            EcdsaSigningKey::Es512(_) => SigningAlg::Es512,
        }
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

// p521 has no PKCS#8 decoder of its own, so the ECPrivateKey is unwrapped by hand.
fn es512_from_pkcs8_pem(private_key_pem: &str) -> Result<P521SigningKey, RawSignerError> {
    let pem = pem::parse(private_key_pem).map_err(|e| {
        RawSignerError::InvalidSigningCredentials(format!("invalid ES512 private key PEM: {e}"))
    })?;

    let pk_info = PrivateKeyInfo::try_from(pem.contents()).map_err(|e| {
        RawSignerError::InvalidSigningCredentials(format!("invalid ES512 PKCS#8 structure: {e}"))
    })?;

    let blocks = from_der(pk_info.private_key).map_err(|e| {
        RawSignerError::InvalidSigningCredentials(format!("invalid ES512 ECPrivateKey ASN.1: {e}"))
    })?;

    let scalar = extract_ec_private_key_scalar(&blocks)?;

    P521SigningKey::from_slice(scalar).map_err(|e| {
        RawSignerError::InvalidSigningCredentials(format!("invalid ES512 private key: {e}"))
    })
}

fn extract_ec_private_key_scalar(blocks: &[ASN1Block]) -> Result<&[u8], RawSignerError> {
    if let Some(ASN1Block::Sequence(_, ref items)) = blocks.first() {
        if let Some(ASN1Block::OctetString(_, ref scalar)) = items.get(1) {
            return Ok(scalar);
        }
        return Err(RawSignerError::InvalidSigningCredentials(
            "ECPrivateKey ASN.1 sequence too short".to_string(),
        ));
    }

    Err(RawSignerError::InvalidSigningCredentials(
        "ECPrivateKey ASN.1 structure not as expected".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn creds(pem: &[u8], tsa_url: Option<String>) -> Credentials {
        Credentials::from_pem(pem, tsa_url).unwrap()
    }

    #[test]
    fn es512_keys_are_supported() {
        let signer = EcdsaSigner::new(
            creds(include_bytes!("../../../../tests/fixtures/raw_signature/es512.pub"), None),
            include_str!("../../../../tests/fixtures/raw_signature/es512.priv"),
            SigningAlg::Es512,
        )
        .unwrap();

        assert_eq!(signer.alg(), SigningAlg::Es512);
        assert_eq!(signer.sign(b"abc").unwrap().len(), 132);
    }

    #[test]
    fn rsa_algorithm_is_rejected() {
        let result = EcdsaSigner::new(
            creds(include_bytes!("../../../../tests/fixtures/raw_signature/ps256.pub"), None),
            include_str!("../../../../tests/fixtures/raw_signature/ps256.priv"),
            SigningAlg::Ps256,
        );

        match result {
            Err(RawSignerError::InvalidSigningCredentials(msg)) => {
                assert_eq!(msg, "Unsupported algorithm")
            }
            _ => unreachable!("expected InvalidSigningCredentials"),
        }
    }

    #[test]
    fn es256_signatures_are_deterministic() {
        let signer = EcdsaSigner::new(
            creds(
                include_bytes!("../../../../tests/fixtures/raw_signature/es256.pub"),
                Some("http://timestamp.example.com".to_string()),
            ),
            include_str!("../../../../tests/fixtures/raw_signature/es256.priv"),
            SigningAlg::Es256,
        )
        .unwrap();

        assert_eq!(signer.sign(b"data").unwrap(), signer.sign(b"data").unwrap());
        assert_eq!(signer.cert_chain().unwrap().len(), 2);
        assert_eq!(
            signer.time_stamp_service_url().as_deref(),
            Some("http://timestamp.example.com")
        );
    }
}
