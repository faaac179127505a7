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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    assertion::Assertion, ingredient::Ingredient, resource_store::ResourceRef,
    ClaimGeneratorInfo, Error, Result,
};

/// A Manifest Definition
///
/// This is the JSON a [`Builder`](crate::Builder) is created from. It names
/// the claim generator, the thumbnail and ingredients (as references into
/// the builder's resources) and the assertions to sign.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[non_exhaustive]
pub struct ManifestDefinition {
    /// Name of the software creating the claim, `c2pa-pipeline/<version>` if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_generator: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claim_generator_info: Vec<ClaimGeneratorInfo>,

    /// A human-readable title, generally source filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The format of the source file as a MIME type.
    #[serde(default = "default_format")]
    pub format: String,

    /// Instance ID from `xmpMM:InstanceID` in XMP metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ResourceRef>,

    /// A List of ingredients
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    /// A list of assertions
    #[serde(default)]
    pub assertions: Vec<AssertionDefinition>,

    /// The manifest label, a `urn:uuid:` generated when the builder is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_format() -> String {
    "application/octet-stream".to_owned()
}

impl ManifestDefinition {
    pub fn new() -> Self {
        Self {
            format: default_format(),
            ..Default::default()
        }
    }

    pub fn set_claim_generator_info<I>(&mut self, claim_generator_info: I) -> &mut Self
    where
        I: Into<ClaimGeneratorInfo>,
    {
        self.claim_generator_info = vec![claim_generator_info.into()];
        self
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    /// Adds a CBOR assertion to the manifest.
    ///
    /// `data` is any serde serializable value.
    pub fn add_assertion<S, T>(&mut self, label: S, data: &T) -> Result<&mut Self>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.assertions.push(AssertionDefinition {
            label: label.into(),
            data: serde_json::to_value(data)?,
            kind: Some(AssertionKind::Cbor),
        });
        Ok(self)
    }

    /// Adds a JSON assertion to the manifest.
    pub fn add_assertion_json<S, T>(&mut self, label: S, data: &T) -> Result<&mut Self>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.assertions.push(AssertionDefinition {
            label: label.into(),
            data: serde_json::to_value(data)?,
            kind: None,
        });
        Ok(self)
    }
}

/// How an assertion's data is stored in the manifest.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum AssertionKind {
    Cbor,
    #[default]
    Json,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[non_exhaustive]
pub struct AssertionDefinition {
    pub label: String,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<AssertionKind>,
}

impl AssertionDefinition {
    pub(crate) fn to_assertion(&self) -> Result<Assertion> {
        if self.label.is_empty() {
            return Err(Error::BadParam("assertion label is empty".to_owned()));
        }
        match self.kind.unwrap_or_default() {
            AssertionKind::Json => {
                Assertion::from_data_json(&self.label, &serde_json::to_vec(&self.data)?)
            }
            AssertionKind::Cbor => {
                let mut cbor = Vec::new();
                ciborium::into_writer(&self.data, &mut cbor)
                    .map_err(|_| Error::AssertionEncoding)?;
                Ok(Assertion::from_data_cbor(&self.label, &cbor))
            }
        }
    }
}
