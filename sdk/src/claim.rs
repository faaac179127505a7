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

use serde::{Deserialize, Serialize};

use crate::{
    assertion::{Assertion, AssertionBase},
    assertions::{labels, DataHash},
    error::{Error, Result},
    hashed_uri::HashedUri,
    jumbf::{
        boxes::{
            JUMBFSuperBox, CAI_ASSERTION_STORE_UUID, CAI_CLAIM_UUID, CAI_SIGNATURE_UUID,
            CAI_STORE_UUID, CBOR_TYPE,
        },
        labels::{
            base_label, parse_jumbf_uri, to_assertion_uri, to_relative_assertion_uri,
            to_signature_uri, JumbfUri, ASSERTIONS, CLAIM, SIGNATURE,
        },
    },
    ClaimGeneratorInfo,
};

// The CBOR map stored in the `c2pa.claim` box. Field order is the
// serialization order.
#[derive(Deserialize, Serialize, Debug, Clone)]
struct ClaimMap {
    claim_generator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    claim_generator_info: Vec<ClaimGeneratorInfo>,
    signature: String,
    assertions: Vec<HashedUri>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alg: Option<String>,
    #[serde(rename = "dc:title", skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(rename = "dc:format")]
    format: String,
    #[serde(rename = "instanceID")]
    instance_id: String,
}

/// A claim: the signed list of hashed references to a manifest's assertions.
///
/// A claim read from an asset keeps the superbox it was parsed from so it
/// can be written again byte for byte.
#[derive(Debug, Clone)]
pub struct Claim {
    label: String,
    map: ClaimMap,
    assertion_store: Vec<Assertion>,
    signature_val: Vec<u8>,
    original_box: Option<JUMBFSuperBox>,
}

impl Claim {
    /// Creates a claim with a fresh `urn:uuid:` label.
    #[cfg(test)]
    pub(crate) fn new(claim_generator: &str, format: &str, alg: &str) -> Self {
        Self::new_with_label(
            &format!("urn:uuid:{}", uuid::Uuid::new_v4()),
            &format!("xmp:iid:{}", uuid::Uuid::new_v4()),
            claim_generator,
            format,
            alg,
        )
    }

    pub fn new_with_label(
        label: &str,
        instance_id: &str,
        claim_generator: &str,
        format: &str,
        alg: &str,
    ) -> Self {
        Claim {
            label: label.to_owned(),
            map: ClaimMap {
                claim_generator: claim_generator.to_owned(),
                claim_generator_info: Vec::new(),
                signature: to_signature_uri(),
                assertions: Vec::new(),
                alg: Some(alg.to_owned()),
                title: None,
                format: format.to_owned(),
                instance_id: instance_id.to_owned(),
            },
            assertion_store: Vec::new(),
            signature_val: Vec::new(),
            original_box: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn claim_generator(&self) -> &str {
        &self.map.claim_generator
    }

    pub fn claim_generator_info(&self) -> &[ClaimGeneratorInfo] {
        &self.map.claim_generator_info
    }

    pub fn add_claim_generator_info(&mut self, info: ClaimGeneratorInfo) -> &mut Self {
        self.map.claim_generator_info.push(info);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.map.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.map.title = title;
    }

    pub fn format(&self) -> &str {
        &self.map.format
    }

    pub fn instance_id(&self) -> &str {
        &self.map.instance_id
    }

    /// The hash algorithm for hashed URIs, sha256 if the claim names none.
    pub fn alg(&self) -> &str {
        self.map.alg.as_deref().unwrap_or("sha256")
    }

    pub fn signature_val(&self) -> &[u8] {
        &self.signature_val
    }

    pub(crate) fn set_signature_val(&mut self, signature: Vec<u8>) {
        self.signature_val = signature;
    }

    /// The assertions stored in this claim's assertion store, in order.
    pub fn claim_assertions(&self) -> &[Assertion] {
        &self.assertion_store
    }

    pub fn get_assertion(&self, label: &str) -> Option<&Assertion> {
        self.assertion_store.iter().find(|a| a.label() == label)
    }

    /// Resolve a claim or ingredient reference to an assertion in this claim.
    pub(crate) fn assertion_for_uri(&self, uri: &str) -> Option<&Assertion> {
        match parse_jumbf_uri(uri)? {
            JumbfUri::Relative(label) => self.get_assertion(label),
            JumbfUri::Absolute { manifest, assertion } if manifest == self.label => {
                self.get_assertion(assertion)
            }
            _ => None,
        }
    }

    pub fn data_hash_assertions(&self) -> Vec<&Assertion> {
        self.assertions_with_base(labels::DATA_HASH)
    }

    pub fn ingredient_assertions(&self) -> Vec<&Assertion> {
        self.assertions_with_base(labels::INGREDIENT)
    }

    fn assertions_with_base(&self, base: &str) -> Vec<&Assertion> {
        self.assertion_store
            .iter()
            .filter(|a| base_label(a.label()) == base)
            .collect()
    }

    pub fn data_hash(&self) -> Result<Option<DataHash>> {
        self.data_hash_assertions()
            .first()
            .map(|a| DataHash::from_assertion(a))
            .transpose()
    }

    /// True if the claim was read from an asset rather than built here.
    pub fn is_imported(&self) -> bool {
        self.original_box.is_some()
    }

    // next free label for a base label: label, label__1, label__2 ...
    fn unique_label(&self, label: &str) -> String {
        let mut candidate = label.to_owned();
        let mut count = 1;
        while self.get_assertion(&candidate).is_some() {
            candidate = format!("{label}__{count}");
            count += 1;
        }
        candidate
    }

    fn hashed_uri_for(&self, assertion: &Assertion) -> Result<HashedUri> {
        let box_bytes = assertion.to_superbox()?.to_bytes()?;
        HashedUri::from_superbox_bytes(
            to_relative_assertion_uri(assertion.label()),
            self.alg(),
            &box_bytes,
        )
    }

    /// Add an assertion to the claim, returning its hashed reference.
    ///
    /// Repeated labels get an instance suffix (`__1`, `__2`, ...).
    pub fn add_assertion<T: AssertionBase>(&mut self, assertion_builder: &T) -> Result<HashedUri> {
        self.add_assertion_data(assertion_builder.to_assertion()?)
    }

    pub(crate) fn add_assertion_data(&mut self, mut assertion: Assertion) -> Result<HashedUri> {
        if self.is_imported() {
            return Err(Error::InvalidClaim("imported claims are read only".to_owned()));
        }
        let label = self.unique_label(assertion.label());
        assertion.set_label(label);

        let hashed_uri = self.hashed_uri_for(&assertion)?;
        self.map.assertions.push(hashed_uri.clone());
        self.assertion_store.push(assertion);
        Ok(hashed_uri)
    }

    /// Replace an assertion's content, keeping its label and position, and
    /// rehash its reference.
    pub(crate) fn replace_assertion(&mut self, label: &str, mut assertion: Assertion) -> Result<()> {
        let index = self
            .assertion_store
            .iter()
            .position(|a| a.label() == label)
            .ok_or_else(|| Error::InvalidClaim(format!("no assertion {label}")))?;
        assertion.set_label(label.to_owned());

        let hashed_uri = self.hashed_uri_for(&assertion)?;
        let url = hashed_uri.url().to_owned();
        let slot = self
            .map
            .assertions
            .iter_mut()
            .find(|h| h.url() == url)
            .ok_or_else(|| Error::InvalidClaim(format!("no reference to {label}")))?;
        *slot = hashed_uri;
        self.assertion_store[index] = assertion;
        Ok(())
    }

    /// Swap the first data hash assertion for `data_hash`.
    pub(crate) fn update_data_hash(&mut self, data_hash: DataHash) -> Result<()> {
        let label = self
            .data_hash_assertions()
            .first()
            .map(|a| a.label().to_owned())
            .ok_or(Error::ClaimMissingHardBinding)?;
        self.replace_assertion(&label, data_hash.to_assertion()?)
    }

    /// The CBOR encoding of the claim, which is what gets signed.
    pub fn data(&self) -> Result<Vec<u8>> {
        if let Some(original) = self.original_box.as_ref() {
            if let Some(bytes) = original
                .find_superbox(CLAIM)
                .and_then(|sb| sb.content_of_type(&CBOR_TYPE))
            {
                return Ok(bytes.to_vec());
            }
        }
        let mut data = Vec::new();
        ciborium::into_writer(&self.map, &mut data).map_err(|_| Error::ClaimEncoding)?;
        Ok(data)
    }

    /// Build the manifest superbox for this claim.
    pub fn to_superbox(&self) -> Result<JUMBFSuperBox> {
        if let Some(original) = self.original_box.as_ref() {
            return Ok(original.clone());
        }

        let mut manifest = JUMBFSuperBox::new(&self.label, CAI_STORE_UUID)?;

        let mut assertion_store = JUMBFSuperBox::new(ASSERTIONS, CAI_ASSERTION_STORE_UUID)?;
        for assertion in &self.assertion_store {
            assertion_store.add_superbox(assertion.to_superbox()?);
        }
        manifest.add_superbox(assertion_store);

        let mut claim_box = JUMBFSuperBox::new(CLAIM, CAI_CLAIM_UUID)?;
        claim_box.add_content(CBOR_TYPE, self.data()?);
        manifest.add_superbox(claim_box);

        let mut sig_box = JUMBFSuperBox::new(SIGNATURE, CAI_SIGNATURE_UUID)?;
        sig_box.add_content(CBOR_TYPE, self.signature_val.clone());
        manifest.add_superbox(sig_box);

        Ok(manifest)
    }

    /// Parse a manifest superbox.
    pub fn from_superbox(manifest: &JUMBFSuperBox) -> Result<Self> {
        if manifest.uuid() != CAI_STORE_UUID {
            return Err(Error::InvalidClaim(format!(
                "{} is not a manifest box",
                manifest.label()
            )));
        }

        let claim_bytes = manifest
            .find_superbox(CLAIM)
            .and_then(|sb| sb.content_of_type(&CBOR_TYPE))
            .ok_or(Error::JumbfBoxNotFound)?;
        let map: ClaimMap = ciborium::from_reader(claim_bytes)
            .map_err(|e| Error::ClaimDecoding(format!("{}: {e}", manifest.label())))?;

        let signature_val = manifest
            .find_superbox(SIGNATURE)
            .and_then(|sb| sb.content_of_type(&CBOR_TYPE))
            .ok_or(Error::JumbfBoxNotFound)?
            .to_vec();

        let assertion_store = match manifest.find_superbox(ASSERTIONS) {
            Some(store) => store
                .superboxes()
                .map(Assertion::from_superbox)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Claim {
            label: manifest.label(),
            map,
            assertion_store,
            signature_val,
            original_box: Some(manifest.clone()),
        })
    }

    /// Recompute the hash of every assertion the claim references and return
    /// the references that do not match, or whose assertion is missing.
    pub(crate) fn mismatched_assertions(&self) -> Vec<(String, String)> {
        let mut failures = Vec::new();
        for hashed_uri in &self.map.assertions {
            let absolute = match parse_jumbf_uri(hashed_uri.url()) {
                Some(JumbfUri::Relative(label)) => to_assertion_uri(&self.label, label),
                _ => hashed_uri.url().to_owned(),
            };

            let assertion = match self.assertion_for_uri(hashed_uri.url()) {
                Some(a) => a,
                None => {
                    failures.push((absolute, "assertion is missing".to_owned()));
                    continue;
                }
            };

            let alg = hashed_uri.alg().unwrap_or(self.alg());
            let matches = assertion
                .to_superbox()
                .and_then(|sb| sb.to_bytes().map_err(Error::from))
                .and_then(|bytes| {
                    HashedUri::from_superbox_bytes(hashed_uri.url().to_owned(), alg, &bytes)
                })
                .map(|h| h.hash() == hashed_uri.hash());

            match matches {
                Ok(true) => (),
                Ok(false) => failures.push((absolute, "hash does not match".to_owned())),
                Err(e) => failures.push((absolute, e.to_string())),
            }
        }
        failures
    }
}
