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

#![allow(clippy::unwrap_used)] // This mod is only used in test code.

use c2pa_crypto::raw_signature::{signer_from_cert_chain_and_private_key, SigningAlg};

use crate::{signer::RawSignerWrapper, utils::test::fixture_path, BoxedSigner};

/// Creates a [`Signer`](crate::Signer) instance for testing purposes using test credentials.
pub(crate) fn test_signer(alg: SigningAlg) -> BoxedSigner {
    let (cert_chain, private_key) = cert_chain_and_private_key_for_alg(alg);

    Box::new(RawSignerWrapper(
        signer_from_cert_chain_and_private_key(&cert_chain, &private_key, alg, None).unwrap(),
    ))
}

/// PEM certificate chain and PKCS#8 key from `tests/fixtures/certs`.
///
/// Only es256, es384, es512, ps256 and ed25519 have fixtures.
pub(crate) fn cert_chain_and_private_key_for_alg(alg: SigningAlg) -> (Vec<u8>, Vec<u8>) {
    let cert_chain = std::fs::read(fixture_path(&format!("certs/{alg}.pub"))).unwrap();
    let private_key = std::fs::read(fixture_path(&format!("certs/{alg}.priv"))).unwrap();
    (cert_chain, private_key)
}
