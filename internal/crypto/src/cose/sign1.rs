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
use coset::{iana::EnumI64, CoseSign1, Label, RegisteredLabelWithPrivate, TaggedCborSerializable};

use crate::{cose::CoseError, raw_signature::SigningAlg};

/// COSE header label for an X.509 certificate chain (RFC 9360).
pub(crate) const X5CHAIN: i64 = 33;

/// Parse a tagged COSE_Sign1 structure.
///
/// The payload is expected to be detached; any payload that is present is
/// dropped so that [`CoseSign1::tbs_detached_data`] can be used.
pub fn parse_cose_sign1(cose_bytes: &[u8]) -> Result<CoseSign1, CoseError> {
    let mut sign1 = <CoseSign1 as TaggedCborSerializable>::from_tagged_slice(cose_bytes)
        .map_err(|e| CoseError::CborParsingError(e.to_string()))?;

    sign1.payload = None;
    Ok(sign1)
}

/// Return the signing algorithm named in the protected header.
pub(crate) fn signing_alg_from_sign1(sign1: &CoseSign1) -> Result<SigningAlg, CoseError> {
    let Some(ref alg) = sign1.protected.header.alg else {
        return Err(CoseError::UnsupportedSigningAlgorithm);
    };

    match alg {
        RegisteredLabelWithPrivate::Assigned(a) => {
            SigningAlg::from_cose_alg_id(a.to_i64()).ok_or(CoseError::UnsupportedSigningAlgorithm)
        }
        RegisteredLabelWithPrivate::PrivateUse(id) => {
            SigningAlg::from_cose_alg_id(*id).ok_or(CoseError::UnsupportedSigningAlgorithm)
        }
        RegisteredLabelWithPrivate::Text(_) => Err(CoseError::UnsupportedSigningAlgorithm),
    }
}

/// Return the DER certificate chain carried in the `x5chain` header.
///
/// The protected header is searched first. A chain may be a single byte
/// string or an array of byte strings.
pub(crate) fn cert_chain_from_sign1(sign1: &CoseSign1) -> Result<Vec<Vec<u8>>, CoseError> {
    let header_value = |rest: &[(Label, Value)]| {
        rest.iter()
            .find(|(label, _)| *label == Label::Int(X5CHAIN))
            .map(|(_, value)| value.clone())
    };

    let value = header_value(&sign1.protected.header.rest)
        .or_else(|| header_value(&sign1.unprotected.rest))
        .ok_or(CoseError::MissingSigningCertificateChain)?;

    match value {
        Value::Bytes(cert) => Ok(vec![cert]),
        Value::Array(items) => {
            let certs = items
                .into_iter()
                .map(|item| match item {
                    Value::Bytes(cert) => Ok(cert),
                    _ => Err(CoseError::CborParsingError(
                        "x5chain entries must be byte strings".to_string(),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?;

            if certs.is_empty() {
                Err(CoseError::MissingSigningCertificateChain)
            } else {
                Ok(certs)
            }
        }
        _ => Err(CoseError::CborParsingError(
            "x5chain must be a byte string or array".to_string(),
        )),
    }
}
