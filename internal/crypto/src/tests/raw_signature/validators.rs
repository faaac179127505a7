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
    signer_from_cert_chain_and_private_key, validator_for_signing_alg,
    RawSignatureValidationError, SigningAlg,
};

const SAMPLE_DATA: &[u8] = b"some sample content to sign";

#[test]
fn es256_rejects_altered_data() {
    let signer = signer_from_cert_chain_and_private_key(
        include_bytes!("../../../tests/fixtures/raw_signature/es256.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/es256.priv"),
        SigningAlg::Es256,
        None,
    )
    .unwrap();

    let signature = signer.sign(SAMPLE_DATA).unwrap();
    let pub_key = include_bytes!("../../../tests/fixtures/raw_signature/es256.pub_key");

    let validator = validator_for_signing_alg(SigningAlg::Es256).unwrap();
    assert_eq!(
        validator.validate(&signature, b"other content", pub_key),
        Err(RawSignatureValidationError::SignatureMismatch)
    );
}

#[test]
fn ed25519_bad_signature_length() {
    let pub_key = include_bytes!("../../../tests/fixtures/raw_signature/ed25519.pub_key");

    let validator = validator_for_signing_alg(SigningAlg::Ed25519).unwrap();
    assert_eq!(
        validator.validate(&[1, 2, 3], SAMPLE_DATA, pub_key),
        Err(RawSignatureValidationError::InvalidSignature)
    );
}

#[test]
fn wrong_public_key_type() {
    let signer = signer_from_cert_chain_and_private_key(
        include_bytes!("../../../tests/fixtures/raw_signature/es256.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/es256.priv"),
        SigningAlg::Es256,
        None,
    )
    .unwrap();

    let signature = signer.sign(SAMPLE_DATA).unwrap();
    let rsa_key = include_bytes!("../../../tests/fixtures/raw_signature/ps256.pub_key");

    let validator = validator_for_signing_alg(SigningAlg::Es256).unwrap();
    assert_eq!(
        validator.validate(&signature, SAMPLE_DATA, rsa_key),
        Err(RawSignatureValidationError::InvalidPublicKey)
    );
}

#[test]
fn ps256_rejects_altered_signature() {
    let signer = signer_from_cert_chain_and_private_key(
        include_bytes!("../../../tests/fixtures/raw_signature/ps256.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/ps256.priv"),
        SigningAlg::Ps256,
        None,
    )
    .unwrap();

    let mut signature = signer.sign(SAMPLE_DATA).unwrap();
    signature[10] ^= 0xff;

    let pub_key = include_bytes!("../../../tests/fixtures/raw_signature/ps256.pub_key");
    let validator = validator_for_signing_alg(SigningAlg::Ps256).unwrap();

    assert_eq!(
        validator.validate(&signature, SAMPLE_DATA, pub_key),
        Err(RawSignatureValidationError::SignatureMismatch)
    );
}
