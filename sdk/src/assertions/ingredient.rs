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
    assertion::{Assertion, AssertionBase, AssertionJson},
    assertions::labels,
    error::Result,
    hashed_uri::HashedUri,
};

/// The relationship of the ingredient to the current asset.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum Relationship {
    /// The current asset is derived from this ingredient.
    #[serde(rename = "parentOf")]
    ParentOf,
    /// The current asset is a part of this ingredient.
    #[serde(rename = "componentOf")]
    #[default]
    ComponentOf,
    /// The ingredient was used as an input to a computational process to create or modify the asset.
    #[serde(rename = "inputTo")]
    InputTo,
}

/// An ingredient assertion
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(rename = "dc:title")]
    pub title: String,
    #[serde(rename = "dc:format")]
    pub format: String,
    #[serde(rename = "instanceID", skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub relationship: Relationship,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<HashedUri>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c2pa_manifest: Option<HashedUri>,
}

impl Ingredient {
    /// Label prefix for an ingredient assertion.
    ///
    /// See <https://c2pa.org/specifications/specifications/2.2/specs/C2PA_Specification.html#ingredient_assertion>.
    pub const LABEL: &'static str = labels::INGREDIENT;

    pub fn new(title: &str, format: &str, relationship: Relationship) -> Self {
        Self {
            title: title.to_owned(),
            format: format.to_owned(),
            relationship,
            ..Default::default()
        }
    }

    /// The label of the ingredient's own active manifest, if it has one.
    pub fn active_manifest(&self) -> Option<&str> {
        self.c2pa_manifest.as_ref().and_then(|m| m.manifest_label())
    }
}

impl AssertionJson for Ingredient {}

impl AssertionBase for Ingredient {
    const LABEL: &'static str = labels::INGREDIENT;

    fn to_assertion(&self) -> Result<Assertion> {
        self.to_json_assertion()
    }

    fn from_assertion(assertion: &Assertion) -> Result<Self> {
        Self::from_json_assertion(assertion)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn ingredient_assertion() {
        let mut i = Ingredient::new("A.jpg", "image/jpeg", Relationship::ParentOf);
        i.c2pa_manifest = Some(HashedUri::new(
            "self#jumbf=/c2pa/urn:uuid:1234".into(),
            Some("sha256".into()),
            &[1, 2, 3],
        ));

        let a = i.to_assertion().unwrap();
        let json = a.as_json_object().unwrap();
        assert_eq!(json["relationship"], "parentOf");
        assert_eq!(json["dc:title"], "A.jpg");

        let back = Ingredient::from_assertion(&a).unwrap();
        assert_eq!(back, i);
        assert_eq!(back.active_manifest(), Some("urn:uuid:1234"));
    }

    #[test]
    fn relationship_defaults_to_component() {
        let i: Ingredient =
            serde_json::from_str(r#"{"dc:title":"x","dc:format":"image/png"}"#).unwrap();
        assert_eq!(i.relationship, Relationship::ComponentOf);
    }
}
