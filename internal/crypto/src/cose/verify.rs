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

use log::debug;

use crate::{
    cose::{
        check_certificate_chain_for_alg,
        parse_cose_sign1,
        sign1::{cert_chain_from_sign1, signing_alg_from_sign1},
        CertificateInfo, CoseError,
    },
    raw_signature::validator_for_signing_alg,
};

/// Verify a COSE_Sign1 signature over the detached payload `data`.
///
/// On success, returns a summary of the signing certificate. Certificate
/// trust is not evaluated; only the signature and the consistency between
/// the certificate key and the declared algorithm are checked.
pub fn verify_cose_sign1(cose_bytes: &[u8], data: &[u8]) -> Result<CertificateInfo, CoseError> {
    let sign1 = parse_cose_sign1(cose_bytes)?;

    let alg = signing_alg_from_sign1(&sign1)?;
    let certs = cert_chain_from_sign1(&sign1)?;
    let info = check_certificate_chain_for_alg(&certs, alg)?;

    let validator =
        validator_for_signing_alg(alg).ok_or(CoseError::UnsupportedSigningAlgorithm)?;

    let tbs = sign1.tbs_detached_data(data, b"");
    validator
        .validate(&sign1.signature, &tbs, &info.public_key)
        .inspect_err(|e| debug!("COSE signature rejected: {e}"))?;

    Ok(info)
}

/// Summarize the signing certificate of a COSE_Sign1 signature without
/// checking the signature itself.
pub fn signing_cert_info(cose_bytes: &[u8]) -> Result<CertificateInfo, CoseError> {
    let sign1 = parse_cose_sign1(cose_bytes)?;
    let alg = signing_alg_from_sign1(&sign1)?;
    let certs = cert_chain_from_sign1(&sign1)?;
    check_certificate_chain_for_alg(&certs, alg)
}
