// Copyright 2023 Adobe. All rights reserved.
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

use c2pa_pipeline::{create_signer, BoxedSigner, SigningAlg};
use serde::Deserialize;

use crate::{Error, Result};

/// SignerInfo provides the information needed to create a signer
/// and sign a manifest.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignerInfo {
    /// The alg field is used to determine the signing algorithm.
    pub alg: String,
    /// The public certificate chain used to sign the manifest in PEM format.
    pub sign_cert: Vec<u8>,
    /// The private key used to sign the manifest in PEM format.
    pub private_key: Vec<u8>,
    /// An optional time stamp authority URL. It is recorded with the signer.
    pub ta_url: Option<String>,
}

impl SignerInfo {
    /// Create a SignerInfo from a JSON formatted SignerInfo string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    // Algorithm names are accepted in any case.
    fn alg(&self) -> Result<SigningAlg> {
        self.alg
            .to_lowercase()
            .parse()
            .map_err(|_| Error::NotSupported(format!("signing algorithm {}", self.alg)))
    }

    /// Create a signer from the SignerInfo
    pub fn signer(&self) -> Result<BoxedSigner> {
        Ok(create_signer::from_keys(
            &self.sign_cert,
            &self.private_key,
            self.alg()?,
            self.ta_url.clone(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use c2pa_pipeline::Signer;
    use serde_json::json;

    use super::*;

    fn fixture(name: &str) -> Vec<u8> {
        let path = format!("{}/../sdk/tests/fixtures/certs/{name}", env!("CARGO_MANIFEST_DIR"));
        std::fs::read(path).unwrap()
    }

    #[test]
    fn test_signer_info_valid() {
        let json = json!({
            "alg": "Es256",
            "sign_cert": fixture("es256.pub"),
            "private_key": fixture("es256.priv"),
            "ta_url": "https://timestamp.example.com"
        })
        .to_string();

        let signer_info = SignerInfo::from_json(&json).unwrap();
        assert_eq!(signer_info.alg, "Es256");
        let signer = signer_info.signer().unwrap();
        assert_eq!(signer.alg(), SigningAlg::Es256);
        assert_eq!(
            signer.time_authority_url().as_deref(),
            Some("https://timestamp.example.com")
        );
    }

    #[test]
    fn test_signer_info_missing_fields() {
        let json = json!({
            "alg": "Es256",
            "sign_cert": b"test_cert".to_vec()
        })
        .to_string();

        let err = SignerInfo::from_json(&json).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Json: missing field `private_key`"));
    }

    #[test]
    fn test_signer_info_invalid_algorithm() {
        let signer_info = SignerInfo {
            alg: "rot13".to_string(),
            ..Default::default()
        };
        let err = signer_info.signer().err().unwrap();
        assert_eq!(err.to_string(), "NotSupported: signing algorithm rot13");
    }

    #[test]
    fn test_signer_creation_fail() {
        let signer_info = SignerInfo {
            alg: "ed25519".to_string(),
            sign_cert: b"test_cert".to_vec(),
            private_key: b"test_key".to_vec(),
            ta_url: None,
        };
        assert!(signer_info.signer().is_err());
    }
}
