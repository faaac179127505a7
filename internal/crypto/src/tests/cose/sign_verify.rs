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

use crate::{
    cose::{
        check_certificate_chain_for_alg, parse_cose_sign1, sign, signing_cert_info,
        verify_cose_sign1, CoseError,
    },
    raw_signature::{
        cert_chain_from_pem, signer_from_cert_chain_and_private_key, RawSignatureValidationError,
        RawSigner, SigningAlg,
    },
};

const CLAIM: &[u8] = b"pretend this is a CBOR claim";

fn es256_signer() -> Box<dyn RawSigner + Send + Sync> {
    signer_from_cert_chain_and_private_key(
        include_bytes!("../../../tests/fixtures/raw_signature/es256.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/es256.priv"),
        SigningAlg::Es256,
        None,
    )
    .unwrap()
}

#[test]
fn sign_then_verify() {
    let signer = es256_signer();

    let cose = sign(signer.as_ref(), CLAIM, None).unwrap();
    let info = verify_cose_sign1(&cose, CLAIM).unwrap();

    assert_eq!(info.alg, Some(SigningAlg::Es256));
    assert_eq!(info.issuer_org.as_deref(), Some("C2PA Test Root"));
    assert!(info.cert_serial_number.is_some());
}

#[test]
fn padded_signature_still_verifies() {
    let signer = es256_signer();
    let box_size = signer.reserve_size();

    let cose = sign(signer.as_ref(), CLAIM, Some(box_size)).unwrap();
    assert_eq!(cose.len(), box_size);

    verify_cose_sign1(&cose, CLAIM).unwrap();
}

#[test]
fn signature_does_not_fit() {
    let signer = es256_signer();

    assert!(matches!(
        sign(signer.as_ref(), CLAIM, Some(100)),
        Err(CoseError::BoxSizeTooSmall)
    ));
}

#[test]
fn cert_info_without_payload() {
    let signer = es256_signer();
    let cose = sign(signer.as_ref(), CLAIM, None).unwrap();

    let info = signing_cert_info(&cose).unwrap();
    assert_eq!(info, verify_cose_sign1(&cose, CLAIM).unwrap());
}

#[test]
fn detached_payload_mismatch() {
    let signer = es256_signer();
    let cose = sign(signer.as_ref(), CLAIM, None).unwrap();

    assert!(matches!(
        verify_cose_sign1(&cose, b"a different claim"),
        Err(CoseError::RawSignatureValidationError(
            RawSignatureValidationError::SignatureMismatch
        ))
    ));
}

#[test]
fn ed25519_round_trip() {
    let signer = signer_from_cert_chain_and_private_key(
        include_bytes!("../../../tests/fixtures/raw_signature/ed25519.pub"),
        include_bytes!("../../../tests/fixtures/raw_signature/ed25519.priv"),
        SigningAlg::Ed25519,
        None,
    )
    .unwrap();

    let cose = sign(signer.as_ref(), CLAIM, Some(signer.reserve_size())).unwrap();
    let sign1 = parse_cose_sign1(&cose).unwrap();
    assert!(sign1.payload.is_none());

    let info = verify_cose_sign1(&cose, CLAIM).unwrap();
    assert_eq!(info.alg, Some(SigningAlg::Ed25519));
}

#[test]
fn garbage_is_not_cose() {
    assert!(matches!(
        verify_cose_sign1(b"\x01\x02\x03", CLAIM),
        Err(CoseError::CborParsingError(_))
    ));
}

#[test]
fn certificate_must_match_algorithm() {
    let ec_chain =
        cert_chain_from_pem(include_bytes!("../../../tests/fixtures/raw_signature/es256.pub"))
            .unwrap();

    check_certificate_chain_for_alg(&ec_chain, SigningAlg::Es256).unwrap();

    assert!(matches!(
        check_certificate_chain_for_alg(&ec_chain, SigningAlg::Es384),
        Err(CoseError::CertificateMismatch(_))
    ));
    assert!(matches!(
        check_certificate_chain_for_alg(&ec_chain, SigningAlg::Ps256),
        Err(CoseError::CertificateMismatch(_))
    ));

    let rsa_chain =
        cert_chain_from_pem(include_bytes!("../../../tests/fixtures/raw_signature/ps256.pub"))
            .unwrap();
    check_certificate_chain_for_alg(&rsa_chain, SigningAlg::Ps512).unwrap();

    let p521_chain =
        cert_chain_from_pem(include_bytes!("../../../tests/fixtures/raw_signature/es512.pub"))
            .unwrap();
    check_certificate_chain_for_alg(&p521_chain, SigningAlg::Es512).unwrap();

    assert!(matches!(
        check_certificate_chain_for_alg(&[b"not a cert".to_vec()], SigningAlg::Es256),
        Err(CoseError::CertificateMismatch(_))
    ));
}
