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

use crate::raw_signature::{
    signer_from_cert_chain_and_private_key, validator_for_signing_alg, RawSignerError, SigningAlg,
};

fn sign_and_validate(
    alg: SigningAlg,
    cert_chain: &[u8],
    private_key: &[u8],
    pub_key: &[u8],
) {
    let signer = signer_from_cert_chain_and_private_key(cert_chain, private_key, alg, None).unwrap();
    assert_eq!(signer.alg(), alg);

    let data = b"some sample content to sign";
    let signature = signer.sign(data).unwrap();

    assert!(signature.len() <= signer.reserve_size());

    let validator = validator_for_signing_alg(alg).unwrap();
    validator.validate(&signature, data, pub_key).unwrap();
}

#[test]
fn es256() {
    sign_and_validate(
        SigningAlg::Es256,
        include_bytes!("../../../tests/fixtures/raw_signature/es256.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/es256.priv"),
        include_bytes!("../../../tests/fixtures/raw_signature/es256.pub_key"),
    );
}

#[test]
fn es384() {
    sign_and_validate(
        SigningAlg::Es384,
        include_bytes!("../../../tests/fixtures/raw_signature/es384.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/es384.priv"),
        include_bytes!("../../../tests/fixtures/raw_signature/es384.pub_key"),
    );
}

#[test]
fn es512() {
    sign_and_validate(
        SigningAlg::Es512,
        include_bytes!("../../../tests/fixtures/raw_signature/es512.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/es512.priv"),
        include_bytes!("../../../tests/fixtures/raw_signature/es512.pub_key"),
    );
}

#[test]
fn ed25519() {
    sign_and_validate(
        SigningAlg::Ed25519,
        include_bytes!("../../../tests/fixtures/raw_signature/ed25519.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/ed25519.priv"),
        include_bytes!("../../../tests/fixtures/raw_signature/ed25519.pub_key"),
    );
}

#[test]
fn ps256() {
    sign_and_validate(
        SigningAlg::Ps256,
        include_bytes!("../../../tests/fixtures/raw_signature/ps256.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/ps256.priv"),
        include_bytes!("../../../tests/fixtures/raw_signature/ps256.pub_key"),
    );
}

#[test]
fn ps384_with_rsa_key() {
    sign_and_validate(
        SigningAlg::Ps384,
        include_bytes!("../../../tests/fixtures/raw_signature/ps256.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/ps256.priv"),
        include_bytes!("../../../tests/fixtures/raw_signature/ps256.pub_key"),
    );
}

#[test]
fn garbage_private_key() {
    let cert_chain = include_bytes!("../../../tests/fixtures/raw_signature/es256.pub");

    let result =
        signer_from_cert_chain_and_private_key(cert_chain, b"not a key", SigningAlg::Es256, None);

    assert!(matches!(
        result,
        Err(RawSignerError::InvalidSigningCredentials(_))
    ));
}

#[test]
fn empty_cert_chain() {
    let private_key = include_bytes!("../../../tests/fixtures/raw_signature/es256.priv");

    let result = signer_from_cert_chain_and_private_key(b"", private_key, SigningAlg::Es256, None);

    assert!(matches!(
        result,
        Err(RawSignerError::InvalidSigningCredentials(_))
    ));
}
