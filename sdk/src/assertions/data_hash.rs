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

use log::debug;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use crate::{
    assertion::{Assertion, AssertionBase, AssertionCbor},
    assertions::labels,
    asset_io::CAIRead,
    error::{Error, Result},
    utils::hash_utils::{
        hash_stream_by_alg, is_supported_hash_alg, verify_stream_by_alg, HashRange,
    },
};

/// Helper class to create a DataHash assertion
///
/// This is the hard binding between a claim and the asset bytes: a hash over
/// the asset with the manifest store itself excluded.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct DataHash {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<HashRange>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    #[serde(with = "serde_bytes")]
    pub hash: Vec<u8>,

    #[serde(with = "serde_bytes", default)]
    pub pad: Vec<u8>,

    // serde_bytes does not handle Option<Vec<u8>>, hence the ByteBuf
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad2: Option<ByteBuf>,
}

impl DataHash {
    /// Label prefix for a data hash assertion.
    ///
    /// See <https://c2pa.org/specifications/specifications/1.0/specs/C2PA_Specification.html#_data_hash>.
    pub const LABEL: &'static str = labels::DATA_HASH;

    /// Create new DataHash instance
    pub fn new(name: &str, alg: &str) -> Self {
        DataHash {
            exclusions: None,
            name: Some(name.to_string()),
            alg: Some(alg.to_string()),
            hash: Vec::new(),
            pad: Vec::new(),
            pad2: None,
        }
    }

    /// A DataHash with `slots` dummy exclusions and a zeroed hash of the
    /// right length for `alg`, used to reserve space before the real
    /// values are known.
    pub fn placeholder(alg: &str, slots: usize) -> Result<Self> {
        let hash_len = match alg {
            "sha256" => 32,
            "sha384" => 48,
            "sha512" => 64,
            _ => return Err(Error::UnknownAlgorithm),
        };

        let mut dh = DataHash::new("jumbf manifest", alg);
        for _ in 0..slots {
            // widest integer encoding so real values never grow the box
            dh.add_exclusion(HashRange::new(u32::MAX as usize, u32::MAX as usize));
        }
        dh.hash = vec![0u8; hash_len];
        Ok(dh)
    }

    pub fn add_exclusion(&mut self, exclusion: HashRange) {
        self.exclusions.get_or_insert_with(Vec::new).push(exclusion);
    }

    pub fn exclusions(&self) -> &[HashRange] {
        self.exclusions.as_deref().unwrap_or_default()
    }

    pub fn set_hash(&mut self, hash: Vec<u8>) {
        self.hash = hash;
    }

    /// The hash algorithm, falling back to `default_alg` when unset.
    pub fn alg_or<'a>(&'a self, default_alg: &'a str) -> &'a str {
        self.alg.as_deref().unwrap_or(default_alg)
    }

    /// Generate the hash value for the asset stream using the exclusions from the DataHash.
    pub fn gen_hash_from_stream(&mut self, stream: &mut dyn CAIRead) -> Result<()> {
        self.hash = self.hash_from_stream(stream)?;
        Ok(())
    }

    /// Generate the asset hash from a stream using the configured exclusions.
    pub fn hash_from_stream(&self, stream: &mut dyn CAIRead) -> Result<Vec<u8>> {
        let alg = self.alg_or("sha256");
        if !is_supported_hash_alg(alg) {
            return Err(Error::UnknownAlgorithm);
        }

        let hash = hash_stream_by_alg(alg, stream, self.exclusions())?;
        if hash.is_empty() {
            Err(Error::BadParam("could not generate data hash".to_string()))
        } else {
            Ok(hash)
        }
    }

    /// Used to verify a DataHash against an asset stream.
    pub fn verify_stream_hash(&self, stream: &mut dyn CAIRead, alg: Option<&str>) -> Result<()> {
        let curr_alg = match &self.alg {
            Some(a) => a.as_str(),
            None => alg.unwrap_or("sha256"),
        };

        if verify_stream_by_alg(curr_alg, &self.hash, stream, self.exclusions())? {
            Ok(())
        } else {
            Err(Error::HashMismatch("Hashes do not match".to_owned()))
        }
    }

    fn cbor_len(&self) -> Result<usize> {
        Ok(self.to_cbor_assertion()?.data().len())
    }

    /// Add padding until the CBOR encoding is exactly `desired_size` bytes.
    ///
    /// Some sizes cannot be reached with a single pad because the byte string
    /// length prefix grows in steps. A second `pad2` field shifts the total
    /// by its own overhead so those sizes become reachable.
    pub fn pad_to_size(&mut self, desired_size: usize) -> Result<()> {
        self.pad.clear();
        self.pad2 = None;

        for pad2 in [None, Some(0usize), Some(1)] {
            self.pad2 = pad2.map(|n| ByteBuf::from(vec![0u8; n]));
            self.pad.clear();

            let base = self.cbor_len()?;
            if base > desired_size {
                continue;
            }

            // the length prefix only ever adds bytes, so start from the
            // upper estimate and walk down
            let mut pad_len = desired_size - base;
            loop {
                self.pad = vec![0u8; pad_len];
                let size = self.cbor_len()?;
                if size == desired_size {
                    debug!("data hash padded with {pad_len} byte(s), pad2 {pad2:?}");
                    return Ok(());
                }
                if size < desired_size || pad_len == 0 {
                    break;
                }
                pad_len -= 1;
            }
        }

        self.pad.clear();
        self.pad2 = None;
        Err(Error::JumbfCreationError)
    }

    /// Create a new instance from Assertion
    pub fn from_assertion(assertion: &Assertion) -> Result<Self> {
        Self::from_cbor_assertion(assertion)
    }
}

impl AssertionCbor for DataHash {}

impl AssertionBase for DataHash {
    const LABEL: &'static str = Self::LABEL;

    fn to_assertion(&self) -> Result<Assertion> {
        if self.hash.is_empty() {
            return Err(Error::BadParam(
                "no hash found, gen_hash must be called".to_string(),
            ));
        }
        Self::to_cbor_assertion(self)
    }

    fn from_assertion(assertion: &Assertion) -> Result<Self> {
        Self::from_cbor_assertion(assertion)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_build_assertion() {
        let mut data_hash = DataHash::new("Some data", "sha256");
        data_hash.add_exclusion(HashRange::new(0, 1234));
        data_hash.hash = vec![1, 2, 3];

        let assertion = data_hash.to_assertion().unwrap();
        assert_eq!(assertion.label(), labels::DATA_HASH);

        let from_bytes = Assertion::from_data_cbor(assertion.label(), assertion.data());
        assert_eq!(DataHash::from_assertion(&from_bytes).unwrap(), data_hash);
    }

    #[test]
    fn test_stream_hash() {
        let data: Vec<u8> = (0..0x6000u32).map(|i| i as u8).collect();
        let mut data_hash = DataHash::new("Some data", "sha256");
        data_hash.add_exclusion(HashRange::new(0x2000, 0x1000));
        data_hash.add_exclusion(HashRange::new(0x4000, 0x1000));

        let mut stream = Cursor::new(data.clone());
        data_hash.gen_hash_from_stream(&mut stream).unwrap();
        data_hash.verify_stream_hash(&mut stream, None).unwrap();

        // changing an excluded byte keeps the hash
        let mut changed = data.clone();
        changed[0x2001] ^= 0xff;
        data_hash
            .verify_stream_hash(&mut Cursor::new(changed), None)
            .unwrap();

        // changing a covered byte does not
        let mut changed = data;
        changed[0x10] ^= 0xff;
        assert!(matches!(
            data_hash.verify_stream_hash(&mut Cursor::new(changed), None),
            Err(Error::HashMismatch(_))
        ));
    }

    #[test]
    fn pad_reaches_every_size() {
        let template = DataHash::placeholder("sha256", 1).unwrap();
        let base = template.cbor_len().unwrap();

        for target in base..base + 300 {
            let mut dh = template.clone();
            dh.pad_to_size(target).unwrap();
            assert_eq!(dh.cbor_len().unwrap(), target, "target {target}");
        }
    }

    #[test]
    fn real_values_fit_the_placeholder() {
        let placeholder = DataHash::placeholder("sha256", 10).unwrap();
        let reserved = placeholder.cbor_len().unwrap();

        let mut dh = DataHash::new("jumbf manifest", "sha256");
        dh.add_exclusion(HashRange::new(20, 40000));
        dh.hash = vec![7u8; 32];
        dh.pad_to_size(reserved).unwrap();
        assert_eq!(dh.cbor_len().unwrap(), reserved);
    }

    #[test]
    fn too_small_target_fails() {
        let mut dh = DataHash::placeholder("sha256", 3).unwrap();
        assert!(matches!(dh.pad_to_size(10), Err(Error::JumbfCreationError)));
    }

    #[test]
    fn json_form_accepts_byte_arrays() {
        let dh: DataHash = serde_json::from_str(
            r#"{"exclusions":[{"start":20,"length":100}],"name":"jumbf manifest","alg":"sha256","hash":[1,2,3],"pad":[]}"#,
        )
        .unwrap();
        assert_eq!(dh.exclusions(), &[HashRange::new(20, 100)]);
        assert_eq!(dh.hash, vec![1, 2, 3]);
    }
}
