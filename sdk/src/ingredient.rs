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

#[cfg(feature = "file_io")]
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    assertion::{Assertion, AssertionData},
    assertions::{self, labels, Relationship},
    asset_io::CAIRead,
    claim::Claim,
    error::{Error, Result},
    hashed_uri::HashedUri,
    jumbf::labels::{base_label, to_assertion_uri},
    jumbf_io::load_jumbf_from_stream,
    resource_store::{ResourceRef, ResourceStore},
    store::Store,
    utils::mime::format_to_mime,
    validation_status::ValidationStatus,
};

/// An ingredient: an asset used to create the one being signed.
///
/// Ingredients are added to a [`Builder`](crate::Builder) from JSON plus an
/// asset stream. When the asset carries its own manifest store, that store
/// is kept as `manifest_data` and merged into the new store at signing time.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Ingredient {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    instance_id: Option<String>,

    #[serde(default)]
    relationship: Relationship,

    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<ResourceRef>,

    /// Label of the ingredient's active manifest, when it has a store.
    #[serde(skip_serializing_if = "Option::is_none")]
    active_manifest: Option<String>,

    /// The ingredient's manifest store, as a resource reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest_data: Option<ResourceRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    validation_status: Option<Vec<ValidationStatus>>,

    #[serde(skip)]
    resources: ResourceStore,
}

impl Ingredient {
    pub fn new(title: &str, format: &str, relationship: Relationship) -> Self {
        Self {
            title: Some(title.to_owned()),
            format: Some(format_to_mime(format)),
            relationship,
            ..Default::default()
        }
    }

    /// Parse an ingredient from its JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    pub fn relationship(&self) -> &Relationship {
        &self.relationship
    }

    pub fn is_parent(&self) -> bool {
        self.relationship == Relationship::ParentOf
    }

    pub fn thumbnail_ref(&self) -> Option<&ResourceRef> {
        self.thumbnail.as_ref()
    }

    pub fn active_manifest(&self) -> Option<&str> {
        self.active_manifest.as_deref()
    }

    pub fn manifest_data_ref(&self) -> Option<&ResourceRef> {
        self.manifest_data.as_ref()
    }

    pub fn validation_status(&self) -> Option<&[ValidationStatus]> {
        self.validation_status.as_deref()
    }

    /// Resources collected while reading the ingredient asset.
    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_relationship(&mut self, relationship: Relationship) -> &mut Self {
        self.relationship = relationship;
        self
    }

    pub fn set_thumbnail_ref(&mut self, thumbnail: ResourceRef) -> &mut Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    /// Fill in the ingredient from its asset: the format, an instance id and
    /// the asset's manifest store, if it has one.
    ///
    /// A store that fails validation is still kept, with the failures
    /// recorded in `validation_status`. Assets of a type with no handler
    /// are accepted as plain ingredients.
    pub fn with_stream(mut self, format: &str, stream: &mut dyn CAIRead) -> Result<Self> {
        let format = format_to_mime(format);
        if self.format.is_none() {
            self.format = Some(format.clone());
        }
        if self.instance_id.is_none() {
            self.instance_id = Some(format!("xmp:iid:{}", Uuid::new_v4()));
        }

        stream.rewind()?;
        let jumbf = match load_jumbf_from_stream(&format, stream) {
            Ok(jumbf) => jumbf,
            Err(Error::JumbfNotFound) | Err(Error::UnsupportedType) => {
                debug!("ingredient {format} has no manifest store");
                return Ok(self);
            }
            Err(e) => return Err(e),
        };

        let statuses = match Store::from_jumbf(&jumbf) {
            Ok(store) => {
                self.active_manifest = store.provenance_label().map(|l| l.to_owned());
                stream.rewind()?;
                store.verify_store(Some(stream))
            }
            Err(e) => vec![ValidationStatus::from_error(&e)],
        };
        if !statuses.is_empty() {
            self.validation_status = Some(statuses);
        }

        let id = self.resources.id_from("manifest_data", "application/c2pa");
        self.resources.add(&id, jumbf)?;
        self.manifest_data = Some(ResourceRef::new("application/c2pa", id));
        Ok(self)
    }

    /// Creates an Ingredient from a stream.
    pub fn from_stream(format: &str, stream: &mut dyn CAIRead) -> Result<Self> {
        Self::default().with_stream(format, stream)
    }

    /// Creates an Ingredient from a file path.
    ///
    /// The title is the file name and the format comes from the extension.
    #[cfg(feature = "file_io")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = crate::jumbf_io::get_file_extension(path)
            .ok_or_else(|| Error::BadParam(format!("no extension: {}", path.display())))?;
        let mut file = std::fs::File::open(path)?;

        let mut ingredient = Self::default();
        ingredient.title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        ingredient.with_stream(&format, &mut file)
    }

    /// Move the resources this ingredient collected into `store`, under
    /// fresh identifiers.
    pub(crate) fn move_resources_to(&mut self, store: &mut ResourceStore) -> Result<()> {
        for slot in [&mut self.thumbnail, &mut self.manifest_data] {
            let Some(resource) = slot.as_mut() else {
                continue;
            };
            // references into the destination store are left alone
            let Ok(data) = self.resources.get(&resource.identifier) else {
                continue;
            };
            let data = data.into_owned();
            *resource = store.add_with(&resource.identifier, &resource.format, data)?;
        }
        self.resources = ResourceStore::new();
        Ok(())
    }

    /// Add this ingredient's assertions to `claim` and its manifests to
    /// `store`, returning the reference to the ingredient assertion.
    pub(crate) fn add_to_claim(
        &self,
        claim: &mut Claim,
        store: &mut Store,
        resources: &ResourceStore,
    ) -> Result<HashedUri> {
        let mut thumbnail = None;

        let c2pa_manifest = match &self.manifest_data {
            Some(manifest_data) => {
                let jumbf = resources.get(&manifest_data.identifier)?;
                let ingredient_store = Store::from_jumbf(&jumbf)?;
                let label = match &self.active_manifest {
                    Some(label) => label.clone(),
                    None => ingredient_store
                        .provenance_label()
                        .map(|l| l.to_owned())
                        .ok_or(Error::JumbfNotFound)?,
                };
                let active = ingredient_store
                    .get_claim(&label)
                    .ok_or_else(|| Error::ClaimMissing {
                        label: label.clone(),
                    })?;

                // point at the ingredient's own thumbnail when it has one
                thumbnail = active
                    .claim_assertions()
                    .iter()
                    .find(|a| base_label(a.label()).starts_with(labels::CLAIM_THUMBNAIL))
                    .map(|a| {
                        HashedUri::from_superbox_bytes(
                            to_assertion_uri(&label, a.label()),
                            claim.alg(),
                            &a.to_superbox()?.to_bytes()?,
                        )
                    })
                    .transpose()?;

                store.import_claims(&ingredient_store);
                Some(ingredient_store.manifest_hashed_uri(&label, claim.alg())?)
            }
            None => None,
        };

        // a supplied thumbnail replaces the one from the ingredient's manifest
        if let Some(thumb_ref) = &self.thumbnail {
            let data = resources.get(&thumb_ref.identifier)?.into_owned();
            let label =
                labels::add_thumbnail_format(labels::INGREDIENT_THUMBNAIL, &thumb_ref.format);
            thumbnail = Some(claim.add_assertion_data(Assertion::from_embedded_file(
                &label,
                &format_to_mime(&thumb_ref.format),
                Some(thumb_ref.identifier.clone()),
                data,
            ))?);
        }

        let mut ingredient_assertion = assertions::Ingredient::new(
            self.title.as_deref().unwrap_or_default(),
            self.format.as_deref().unwrap_or("application/octet-stream"),
            self.relationship.clone(),
        );
        ingredient_assertion.instance_id = self.instance_id.clone();
        ingredient_assertion.thumbnail = thumbnail;
        ingredient_assertion.c2pa_manifest = c2pa_manifest;

        debug!(
            "adding ingredient {} ({:?})",
            ingredient_assertion.title, self.active_manifest
        );
        claim.add_assertion(&ingredient_assertion)
    }

    /// The reader's view of an ingredient assertion in `claim`.
    pub(crate) fn from_assertion_in(
        store: &Store,
        claim: &Claim,
        assertion: &Assertion,
    ) -> Result<Self> {
        use crate::assertion::AssertionBase;

        let ingredient = assertions::Ingredient::from_assertion(assertion)?;

        let thumbnail = ingredient.thumbnail.as_ref().and_then(|hashed_uri| {
            let (uri, thumb) = resolve_uri(store, claim, hashed_uri.url())?;
            match thumb.decode_data() {
                AssertionData::EmbeddedFile(file) => {
                    Some(ResourceRef::new(file.media_type.clone(), uri))
                }
                _ => None,
            }
        });

        Ok(Self {
            title: Some(ingredient.title.clone()),
            format: Some(ingredient.format.clone()),
            instance_id: ingredient.instance_id.clone(),
            active_manifest: ingredient.active_manifest().map(|l| l.to_owned()),
            relationship: ingredient.relationship,
            thumbnail,
            ..Default::default()
        })
    }
}

/// Find the assertion a (possibly relative) URI in `claim` refers to,
/// returning its absolute URI.
pub(crate) fn resolve_uri<'a>(
    store: &'a Store,
    claim: &'a Claim,
    uri: &str,
) -> Option<(String, &'a Assertion)> {
    use crate::jumbf::labels::{parse_jumbf_uri, JumbfUri};

    match parse_jumbf_uri(uri)? {
        JumbfUri::Relative(label) => claim
            .get_assertion(label)
            .map(|a| (to_assertion_uri(claim.label(), label), a)),
        JumbfUri::Absolute {
            manifest,
            assertion,
        } => store
            .get_claim(manifest)?
            .get_assertion(assertion)
            .map(|a| (to_assertion_uri(manifest, assertion), a)),
        JumbfUri::Manifest(_) => None,
    }
}
