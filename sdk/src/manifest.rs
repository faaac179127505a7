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

use c2pa_crypto::cose::CertificateInfo;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    assertion::AssertionData,
    assertions::labels,
    claim::Claim,
    error::Result,
    ingredient::Ingredient,
    jumbf::labels::{base_label, to_assertion_uri},
    manifest_definition::AssertionKind,
    resource_store::ResourceRef,
    store::Store,
    ClaimGeneratorInfo,
};

/// A Manifest as the [`Reader`](crate::Reader) reports it: the content of
/// one signed claim.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Manifest {
    pub claim_generator: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    claim_generator_info: Vec<ClaimGeneratorInfo>,

    /// A human-readable title, generally source filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    /// The format of the source file as a MIME type.
    format: String,

    /// Instance ID from `xmpMM:InstanceID` in XMP metadata.
    instance_id: String,

    /// The claim thumbnail; the identifier is its JUMBF URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<ResourceRef>,

    #[serde(default)]
    ingredients: Vec<Ingredient>,

    /// Assertions other than the hard binding, thumbnails and ingredients.
    #[serde(default)]
    assertions: Vec<ManifestAssertion>,

    #[serde(skip_serializing_if = "Option::is_none")]
    signature_info: Option<SignatureInfo>,

    label: String,
}

impl Manifest {
    pub fn claim_generator(&self) -> &str {
        &self.claim_generator
    }

    pub fn claim_generator_info(&self) -> &[ClaimGeneratorInfo] {
        &self.claim_generator_info
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn thumbnail_ref(&self) -> Option<&ResourceRef> {
        self.thumbnail.as_ref()
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn assertions(&self) -> &[ManifestAssertion] {
        &self.assertions
    }

    pub fn signature_info(&self) -> Option<&SignatureInfo> {
        self.signature_info.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Build the view of `claim`. Ingredient references are resolved
    /// against the rest of `store`.
    pub(crate) fn from_store(store: &Store, claim: &Claim) -> Result<Self> {
        let mut manifest = Manifest {
            claim_generator: claim.claim_generator().to_owned(),
            claim_generator_info: claim.claim_generator_info().to_vec(),
            title: claim.title().map(|t| t.to_owned()),
            format: claim.format().to_owned(),
            instance_id: claim.instance_id().to_owned(),
            signature_info: Store::signature_info(claim).map(SignatureInfo::from),
            label: claim.label().to_owned(),
            ..Default::default()
        };

        for assertion in claim.claim_assertions() {
            let base = base_label(assertion.label());

            if base.starts_with(labels::CLAIM_THUMBNAIL) {
                if let AssertionData::EmbeddedFile(file) = assertion.decode_data() {
                    manifest.thumbnail = Some(ResourceRef::new(
                        file.media_type.clone(),
                        to_assertion_uri(claim.label(), assertion.label()),
                    ));
                }
            } else if base == labels::INGREDIENT {
                match Ingredient::from_assertion_in(store, claim, assertion) {
                    Ok(ingredient) => manifest.ingredients.push(ingredient),
                    Err(e) => warn!("skipping ingredient {}: {e}", assertion.label()),
                }
            } else if !labels::is_internal(assertion.label()) {
                let kind = match assertion.decode_data() {
                    AssertionData::Cbor(_) => Some(AssertionKind::Cbor),
                    _ => None,
                };
                manifest.assertions.push(ManifestAssertion {
                    label: base.to_owned(),
                    data: assertion.as_json_object()?,
                    instance: instance_of(assertion.label()),
                    kind,
                });
            }
        }

        Ok(manifest)
    }
}

fn instance_of(label: &str) -> Option<usize> {
    label.rsplit_once("__").and_then(|(_, n)| n.parse().ok())
}

/// A labeled container for an Assertion value in a Manifest
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ManifestAssertion {
    /// An assertion label in reverse domain format
    label: String,

    data: Value,

    /// There can be more than one assertion for any label
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<usize>,

    /// `Cbor` for assertions stored as CBOR
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<AssertionKind>,
}

impl ManifestAssertion {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &Value {
        &self.data
    }

    pub fn instance(&self) -> Option<usize> {
        self.instance
    }

    pub fn kind(&self) -> Option<AssertionKind> {
        self.kind
    }
}

/// Holds information about a signature
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SignatureInfo {
    /// the signing algorithm, such as `es256`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// human readable issuing authority for this signature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// The serial number of the certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_serial_number: Option<String>,
}

impl From<CertificateInfo> for SignatureInfo {
    fn from(info: CertificateInfo) -> Self {
        Self {
            alg: info.alg.map(|alg| alg.to_string()),
            issuer: info.issuer_org,
            common_name: info.common_name,
            cert_serial_number: info.cert_serial_number,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::assertion::Assertion;

    #[test]
    fn claim_view() {
        let mut claim = Claim::new("test/1.0", "image/png", "sha256");
        claim.set_title(Some("A.png".to_owned()));
        claim
            .add_assertion_data(Assertion::from_data_json("org.test", br#"{"n":1}"#).unwrap())
            .unwrap();
        claim
            .add_assertion_data(Assertion::from_data_json("org.test", br#"{"n":2}"#).unwrap())
            .unwrap();
        claim
            .add_assertion_data(Assertion::from_embedded_file(
                "c2pa.thumbnail.claim.png",
                "image/png",
                None,
                vec![1, 2, 3],
            ))
            .unwrap();

        let manifest = Manifest::from_store(&Store::new(), &claim).unwrap();
        assert_eq!(manifest.claim_generator(), "test/1.0");
        assert_eq!(manifest.title(), Some("A.png"));
        assert_eq!(manifest.assertions().len(), 2);
        assert_eq!(manifest.assertions()[1].instance(), Some(1));
        assert_eq!(manifest.assertions()[1].value()["n"], 2);
        assert!(manifest.signature_info().is_none());

        let thumb = manifest.thumbnail_ref().unwrap();
        assert_eq!(thumb.format, "image/png");
        assert!(thumb.identifier.ends_with("/c2pa.assertions/c2pa.thumbnail.claim.png"));

        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("claim_generator_info").is_none());
        assert_eq!(json["label"], claim.label());
    }
}
