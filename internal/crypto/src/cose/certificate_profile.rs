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

use x509_parser::{certificate::X509Certificate, prelude::FromDer, public_key::PublicKey};

use crate::{cose::CoseError, raw_signature::SigningAlg};

const RSA_OID: &str = "1.2.840.113549.1.1.1";
const RSA_PSS_OID: &str = "1.2.840.113549.1.1.10";
const EC_PUBLICKEY_OID: &str = "1.2.840.10045.2.1";
const ED25519_OID: &str = "1.3.101.112";

/// Summary of the end-entity certificate that produced a signature.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CertificateInfo {
    /// Algorithm used to produce the signature.
    pub alg: Option<SigningAlg>,

    /// Organization named in the certificate issuer, if any.
    pub issuer_org: Option<String>,

    /// Common name of the certificate subject, if any.
    pub common_name: Option<String>,

    /// Certificate serial number in decimal.
    pub cert_serial_number: Option<String>,

    /// DER-encoded `SubjectPublicKeyInfo` of the signing key.
    pub public_key: Vec<u8>,
}

/// Confirm that the end-entity certificate of `cert_chain` holds a key usable
/// with `alg`, and summarize it.
///
/// `cert_chain` is a list of DER certificates starting with the signer.
pub fn check_certificate_chain_for_alg(
    cert_chain: &[Vec<u8>],
    alg: SigningAlg,
) -> Result<CertificateInfo, CoseError> {
    let signing_cert = cert_chain
        .first()
        .ok_or(CoseError::MissingSigningCertificateChain)?;

    for cert in cert_chain {
        X509Certificate::from_der(cert)
            .map_err(|e| CoseError::CertificateMismatch(format!("invalid certificate: {e}")))?;
    }

    let (_, cert) = X509Certificate::from_der(signing_cert)
        .map_err(|e| CoseError::CertificateMismatch(format!("invalid certificate: {e}")))?;

    let spki = &cert.tbs_certificate.subject_pki;
    let key_oid = spki.algorithm.algorithm.to_id_string();

    let matches = match alg {
        SigningAlg::Es256 | SigningAlg::Es384 | SigningAlg::Es512 => {
            key_oid == EC_PUBLICKEY_OID && {
                let bits = match spki.parsed() {
                    Ok(PublicKey::EC(point)) => point.key_size(),
                    _ => 0,
                };
                // An uncompressed P-521 point reports 528 bits.
                match alg {
                    SigningAlg::Es256 => bits == 256,
                    SigningAlg::Es384 => bits == 384,
                    _ => bits == 521 || bits == 528,
                }
            }
        }
        SigningAlg::Ps256 | SigningAlg::Ps384 | SigningAlg::Ps512 => {
            key_oid == RSA_OID || key_oid == RSA_PSS_OID
        }
        SigningAlg::Ed25519 => key_oid == ED25519_OID,
    };

    if !matches {
        return Err(CoseError::CertificateMismatch(format!(
            "{alg} cannot be used with a key of type {key_oid}"
        )));
    }

    let issuer_org = cert
        .issuer()
        .iter_organization()
        .next()
        .and_then(|o| o.as_str().ok())
        .map(|s| s.to_string());

    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(|s| s.to_string());

    Ok(CertificateInfo {
        alg: Some(alg),
        issuer_org,
        common_name,
        cert_serial_number: Some(cert.tbs_certificate.serial.to_string()),
        public_key: spki.raw.to_vec(),
    })
}
