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

//! Pure-Rust [`RawSigner`] implementations.
//!
//! Each signer pairs a private key with a [`Credentials`] block that holds
//! the parsed certificate chain and the optional time stamp authority URL.

use crate::raw_signature::{cert_chain_from_pem, RawSigner, RawSignerError, SigningAlg};

mod ecdsa_signer;
mod ed25519_signer;
mod rsa_signer;

/// Space set aside in the signature box for an eventual time stamp token.
const TIME_STAMP_RESERVE: usize = 10000;

/// Space set aside for the COSE structure around the signature itself.
const COSE_OVERHEAD: usize = 1024;

/// Certificate material shared by every built-in signer.
pub(crate) struct Credentials {
    certs: Vec<Vec<u8>>,
    tsa_url: Option<String>,
}

impl Credentials {
    pub(crate) fn from_pem(
        cert_chain: &[u8],
        tsa_url: Option<String>,
    ) -> Result<Self, RawSignerError> {
        Ok(Self {
            certs: cert_chain_from_pem(cert_chain)?,
            tsa_url,
        })
    }

    pub(crate) fn certs(&self) -> Vec<Vec<u8>> {
        self.certs.clone()
    }

    pub(crate) fn tsa_url(&self) -> Option<String> {
        self.tsa_url.clone()
    }

    /// Upper bound for the signature box built around these credentials.
    pub(crate) fn reserve_size(&self) -> usize {
        let der_len: usize = self.certs.iter().map(Vec::len).sum();
        COSE_OVERHEAD + der_len + TIME_STAMP_RESERVE
    }
}

/// Decode a PEM private key into text, rejecting anything that isn't UTF-8.
pub(crate) fn private_key_pem(private_key: &[u8]) -> Result<&str, RawSignerError> {
    std::str::from_utf8(private_key).map_err(|e| {
        RawSignerError::InvalidSigningCredentials(format!("private key is not PEM text: {e}"))
    })
}

/// Build the signer matching `alg` from PEM credentials.
pub(crate) fn signer_from_cert_chain_and_private_key(
    cert_chain: &[u8],
    private_key: &[u8],
    alg: SigningAlg,
    time_stamp_service_url: Option<String>,
) -> Result<Box<dyn RawSigner + Send + Sync>, RawSignerError> {
    let creds = Credentials::from_pem(cert_chain, time_stamp_service_url)?;
    let key = private_key_pem(private_key)?;

    Ok(match alg {
        SigningAlg::Ed25519 => Box::new(ed25519_signer::Ed25519Signer::new(creds, key)?),
        SigningAlg::Ps256 | SigningAlg::Ps384 | SigningAlg::Ps512 => {
            Box::new(rsa_signer::RsaSigner::new(creds, key, alg)?)
        }
        SigningAlg::Es256 | SigningAlg::Es384 | SigningAlg::Es512 => {
            Box::new(ecdsa_signer::EcdsaSigner::new(creds, key, alg)?)
        }
    })
}
