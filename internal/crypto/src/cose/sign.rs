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

use ciborium::value::Value;
use coset::{
    iana::{self, EnumI64},
    CoseSign1, CoseSign1Builder, HeaderBuilder, Label, TaggedCborSerializable,
};

use crate::{
    cose::{sign1::X5CHAIN, CoseError},
    raw_signature::{RawSigner, SigningAlg},
};

const PAD: &str = "pad";
const PAD2: &str = "pad2";

/// Generate a COSE_Sign1 signature over `data` with a detached payload.
///
/// When `box_size` is given the result is padded with zero bytes in the
/// unprotected header so that it is exactly `box_size` bytes long. Fails with
/// [`CoseError::BoxSizeTooSmall`] if the signature cannot fit.
pub fn sign(
    signer: &dyn RawSigner,
    data: &[u8],
    box_size: Option<usize>,
) -> Result<Vec<u8>, CoseError> {
    let alg = signer.alg();
    let certs = signer.cert_chain()?;
    if certs.is_empty() {
        return Err(CoseError::MissingSigningCertificateChain);
    }

    let cose_alg = iana::Algorithm::from_i64(alg.cose_alg_id())
        .ok_or(CoseError::UnsupportedSigningAlgorithm)?;

    // A single certificate is stored as a bare byte string.
    let x5chain = match certs.len() {
        1 => Value::Bytes(certs[0].clone()),
        _ => Value::Array(certs.into_iter().map(Value::Bytes).collect()),
    };

    let protected = HeaderBuilder::new()
        .algorithm(cose_alg)
        .value(X5CHAIN, x5chain)
        .build();

    // We don't use the additional data header.
    let aad: &[u8; 0] = b"";

    let mut sign1 = CoseSign1Builder::new().protected(protected).build();
    let tbs = sign1.tbs_detached_data(data, aad);

    let signature = signer.sign(&tbs)?;
    sign1.signature = normalize_ecdsa_signature(alg, signature);

    pad_cose_sig(&sign1, box_size)
}

/// Same as [`sign`] with a mandatory box size.
pub fn sign_with_box_size(
    signer: &dyn RawSigner,
    data: &[u8],
    box_size: usize,
) -> Result<Vec<u8>, CoseError> {
    sign(signer, data, Some(box_size))
}

// Callback signers frequently hand back DER encoded ECDSA signatures; COSE
// requires the fixed-width r | s form.
fn normalize_ecdsa_signature(alg: SigningAlg, signature: Vec<u8>) -> Vec<u8> {
    let converted = match alg {
        SigningAlg::Es256 if signature.len() != 64 => p256::ecdsa::Signature::from_der(&signature)
            .ok()
            .map(|s| s.to_vec()),
        SigningAlg::Es384 if signature.len() != 96 => p384::ecdsa::Signature::from_der(&signature)
            .ok()
            .map(|s| s.to_vec()),
        SigningAlg::Es512 if signature.len() != 132 => {
            p521::ecdsa::Signature::from_der(&signature)
                .ok()
                .map(|s| s.to_vec())
        }
        _ => None,
    };

    converted.unwrap_or(signature)
}

fn to_tagged_vec(sign1: &CoseSign1) -> Result<Vec<u8>, CoseError> {
    sign1
        .clone()
        .to_tagged_vec()
        .map_err(|e| CoseError::CborGenerationError(e.to_string()))
}

fn set_pad(sign1: &mut CoseSign1, label: &str, len: usize) {
    let label = Label::Text(label.to_string());
    let value = Value::Bytes(vec![0u8; len]);

    match sign1.unprotected.rest.iter_mut().find(|(l, _)| *l == label) {
        Some(pair) => pair.1 = value,
        None => sign1.unprotected.rest.push((label, value)),
    }
}

fn pad_cose_sig(sign1: &CoseSign1, end_size: Option<usize>) -> Result<Vec<u8>, CoseError> {
    let cur_vec = to_tagged_vec(sign1)?;

    let Some(end_size) = end_size else {
        return Ok(cur_vec);
    };

    if cur_vec.len() == end_size {
        return Ok(cur_vec);
    }
    if cur_vec.len() > end_size {
        return Err(CoseError::BoxSizeTooSmall);
    }

    let mut padded = sign1.clone();
    set_pad(&mut padded, PAD, 0);

    if let Some(result) = fill_pad(&padded, end_size)? {
        return Ok(result);
    }

    // Some sizes can't be reached with a single byte string because its
    // length header grows in steps; a second pad absorbs the difference.
    set_pad(&mut padded, PAD2, 0);
    fill_pad(&padded, end_size)?.ok_or(CoseError::BoxSizeTooSmall)
}

// Grow the `pad` entry until the encoded structure is exactly `end_size`.
fn fill_pad(sign1: &CoseSign1, end_size: usize) -> Result<Option<Vec<u8>>, CoseError> {
    let base_len = to_tagged_vec(sign1)?.len();
    if base_len > end_size {
        return Err(CoseError::BoxSizeTooSmall);
    }

    let delta = end_size - base_len;

    // A byte string of n bytes has a 1, 2, 3 or 5 byte header.
    for extra_header in [0usize, 1, 2, 4] {
        let Some(pad_len) = delta.checked_sub(extra_header) else {
            continue;
        };

        let mut candidate = sign1.clone();
        set_pad(&mut candidate, PAD, pad_len);

        let encoded = to_tagged_vec(&candidate)?;
        if encoded.len() == end_size {
            return Ok(Some(encoded));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn sign1_with_signature(len: usize) -> CoseSign1 {
        let protected = HeaderBuilder::new()
            .algorithm(iana::Algorithm::ES256)
            .value(X5CHAIN, Value::Bytes(vec![1, 2, 3]))
            .build();

        let mut sign1 = CoseSign1Builder::new().protected(protected).build();
        sign1.signature = vec![7u8; len];
        sign1
    }

    #[test]
    fn pads_to_exact_sizes() {
        let sign1 = sign1_with_signature(64);
        let natural = to_tagged_vec(&sign1).unwrap().len();

        // The smallest pad entry costs five bytes.
        let near = natural + 5..natural + 400;
        let header_steps = [natural + 65_530, natural + 65_540, natural + 65_545];

        for end_size in near.chain(header_steps) {
            let padded = pad_cose_sig(&sign1, Some(end_size)).unwrap();
            assert_eq!(padded.len(), end_size);
        }
    }

    #[test]
    fn box_too_small() {
        let sign1 = sign1_with_signature(64);
        let natural = to_tagged_vec(&sign1).unwrap().len();

        assert!(matches!(
            pad_cose_sig(&sign1, Some(natural - 1)),
            Err(CoseError::BoxSizeTooSmall)
        ));
    }

    #[test]
    fn no_box_size_means_no_padding() {
        let sign1 = sign1_with_signature(64);
        assert_eq!(
            pad_cose_sig(&sign1, None).unwrap(),
            to_tagged_vec(&sign1).unwrap()
        );
    }
}
