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

#![deny(missing_docs)]

//! The `create_signer` module provides a way to obtain a [`Signer`]
//! instance for each signing format supported by this crate.

#[cfg(feature = "file_io")]
use std::path::Path;

use c2pa_crypto::raw_signature::{signer_from_cert_chain_and_private_key, SigningAlg};

use crate::{error::Result, signer::RawSignerWrapper, Signer};

/// Creates a [`Signer`] instance using signing certificate and private key
/// as byte slices.
///
/// The signing certificate chain and private key are PEM encoded. Fails with
/// an invalid-credentials error if either does not parse or if they do not
/// belong together.
pub fn from_keys(
    signcert: &[u8],
    pkey: &[u8],
    alg: SigningAlg,
    tsa_url: Option<String>,
) -> Result<Box<dyn Signer + Send + Sync>> {
    let raw_signer = signer_from_cert_chain_and_private_key(signcert, pkey, alg, tsa_url)?;
    Ok(Box::new(RawSignerWrapper(raw_signer)))
}

/// Creates a [`Signer`] instance using signing certificate and
/// private key files.
#[cfg(feature = "file_io")]
pub fn from_files<P: AsRef<Path>>(
    signcert_path: P,
    pkey_path: P,
    alg: SigningAlg,
    tsa_url: Option<String>,
) -> Result<Box<dyn Signer + Send + Sync>> {
    let signcert = std::fs::read(signcert_path)?;
    let pkey = std::fs::read(pkey_path)?;

    from_keys(&signcert, &pkey, alg, tsa_url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::{utils::test::fixture_path, ErrorKind};

    #[test]
    fn signers_for_every_fixture() {
        for alg in [SigningAlg::Es256, SigningAlg::Ps256, SigningAlg::Ed25519] {
            let signer = from_files(
                fixture_path(&format!("certs/{alg}.pub")),
                fixture_path(&format!("certs/{alg}.priv")),
                alg,
                Some("http://timestamp.example.com".to_owned()),
            )
            .unwrap();

            assert_eq!(signer.alg(), alg);
            assert!(!signer.certs().unwrap().is_empty());
            assert!(signer.reserve_size() > 1024);
            assert_eq!(
                signer.time_authority_url().as_deref(),
                Some("http://timestamp.example.com")
            );
            assert!(!signer.sign(b"data").unwrap().is_empty());
        }
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let certs = std::fs::read(fixture_path("certs/es256.pub")).unwrap();
        let key = std::fs::read(fixture_path("certs/ed25519.priv")).unwrap();
        let err = from_keys(&certs, &key, SigningAlg::Es256, None).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn missing_file() {
        let err = from_files("no/such.pub", "no/such.priv", SigningAlg::Es256, None)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }
}
