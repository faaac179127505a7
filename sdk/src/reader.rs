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

//! The Reader provides a way to read a manifest store from an asset.
//! It also performs validation on the manifest store.

use std::{
    collections::BTreeMap,
    io::{Read, Seek, Write},
};
#[cfg(feature = "file_io")]
use std::{
    fs::{read, File},
    path::{Path, PathBuf},
};

use log::debug;
use serde::Serialize;

use crate::{
    assertion::Assertion,
    asset_io::CAIRead,
    error::{Error, Result},
    ingredient::resolve_uri,
    manifest::Manifest,
    settings::get_settings_value,
    store::Store,
    validation_status::ValidationStatus,
};
#[cfg(feature = "file_io")]
use crate::utils::io_utils::safe_file_name;

/// Where the bytes a [`Reader`] was built from came from.
///
/// A reader that opened a file itself owns it for the duration of the
/// constructor and closes it before returning. Caller streams are only
/// borrowed. In both cases the reader holds no I/O resources afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    /// A caller supplied stream holding an embedded store.
    Stream,
    /// A file the reader opened.
    #[cfg(feature = "file_io")]
    File(PathBuf),
    /// A detached store validated against a caller supplied stream.
    ManifestData,
}

/// Use a Reader to read and validate a manifest store.
#[derive(Debug, Serialize)]
pub struct Reader {
    /// A label for the active (most recent) manifest in the store
    #[serde(skip_serializing_if = "Option::is_none")]
    active_manifest: Option<String>,

    manifests: BTreeMap<String, Manifest>,

    /// Failures found while validating the store, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_status: Option<Vec<ValidationStatus>>,

    #[serde(skip)]
    store: Store,

    #[serde(skip)]
    source: AssetSource,
}

impl Reader {
    /// Create a manifest store [`Reader`] from a stream.
    ///
    /// `format` is a MIME type or extension. Fails with
    /// [`Error::JumbfNotFound`] when the asset has no manifest store; an
    /// asset that has one but fails validation is read successfully and the
    /// failures are reported by [`Reader::validation_status`].
    pub fn from_stream(format: &str, mut stream: impl Read + Seek) -> Result<Reader> {
        let store = Store::load_from_stream(format, &mut stream)?;
        Self::from_store(store, &mut stream, AssetSource::Stream)
    }

    /// Create a manifest store [`Reader`] from a file.
    ///
    /// If the file has no embedded store, a sidecar `.c2pa` file next to it
    /// is used instead when present.
    #[cfg(feature = "file_io")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Reader> {
        let path = path.as_ref();
        let format = crate::jumbf_io::get_supported_file_extension(path)
            .ok_or(Error::UnsupportedType)?;
        let mut file = File::open(path)?;

        let mut reader = match Self::from_stream(&format, &mut file) {
            Err(Error::JumbfNotFound) => {
                let sidecar = path.with_extension("c2pa");
                if !sidecar.is_file() {
                    return Err(Error::JumbfNotFound);
                }
                debug!("reading sidecar manifest {}", sidecar.display());
                Self::from_manifest_data_and_stream(&read(sidecar)?, &format, &mut file)?
            }
            result => result?,
        };
        reader.source = AssetSource::File(path.to_path_buf());
        Ok(reader)
    }

    /// Create a manifest store [`Reader`] from existing manifest store bytes
    /// and the asset they describe.
    ///
    /// Use this to validate a sidecar or remote manifest.
    pub fn from_manifest_data_and_stream(
        c2pa_data: &[u8],
        format: &str,
        mut stream: impl Read + Seek,
    ) -> Result<Reader> {
        crate::jumbf_io::handler_for(format)?;
        let store = Store::from_jumbf(c2pa_data)?;
        Self::from_store(store, &mut stream, AssetSource::ManifestData)
    }

    fn from_store(
        store: Store,
        stream: &mut (impl Read + Seek),
        source: AssetSource,
    ) -> Result<Self> {
        let verify = get_settings_value::<bool>("verify.verify_after_reading").unwrap_or(true);

        let validation_status = if verify {
            stream.rewind()?;
            let asset: &mut dyn CAIRead = stream;
            let statuses = store.verify_store(Some(asset));
            (!statuses.is_empty()).then_some(statuses)
        } else {
            debug!("verify_after_reading is off, store not validated");
            None
        };

        let mut manifests = BTreeMap::new();
        for claim in store.claims() {
            manifests.insert(
                claim.label().to_owned(),
                Manifest::from_store(&store, claim)?,
            );
        }

        Ok(Self {
            active_manifest: store.provenance_label().map(|l| l.to_owned()),
            manifests,
            validation_status,
            store,
            source,
        })
    }

    /// Get the manifest store as a JSON string
    pub fn json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_owned())
    }

    /// Get the [`ValidationStatus`] array of the manifest store if it exists.
    ///
    /// Call this method to check for validation errors. `None` means the
    /// store validated, or that validation was turned off in the settings.
    pub fn validation_status(&self) -> Option<&[ValidationStatus]> {
        self.validation_status.as_deref()
    }

    /// Returns the active manifest, the one that was signed last.
    pub fn active_manifest(&self) -> Option<&Manifest> {
        self.manifests.get(self.active_manifest.as_deref()?)
    }

    pub fn active_label(&self) -> Option<&str> {
        self.active_manifest.as_deref()
    }

    pub fn manifests(&self) -> &BTreeMap<String, Manifest> {
        &self.manifests
    }

    pub fn get_manifest(&self, label: &str) -> Option<&Manifest> {
        self.manifests.get(label)
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    // A resource is a JUMBF URI, absolute or relative to the active
    // manifest, or a bare assertion label in the active manifest.
    fn find_resource(&self, uri: &str) -> Result<&Assertion> {
        let active = self
            .active_manifest
            .as_deref()
            .and_then(|label| self.store.get_claim(label))
            .ok_or_else(|| Error::ResourceNotFound(uri.to_owned()))?;

        let found = match resolve_uri(&self.store, active, uri) {
            Some((_, assertion)) => Some(assertion),
            None => active.get_assertion(uri),
        };
        found.ok_or_else(|| Error::ResourceNotFound(uri.to_owned()))
    }

    /// Write a resource, such as a thumbnail, to a stream.
    ///
    /// Returns the number of bytes written.
    pub fn resource_to_stream(&self, uri: &str, mut stream: impl Write) -> Result<usize> {
        let data = self.find_resource(uri)?.data();
        stream.write_all(data)?;
        stream.flush()?;
        Ok(data.len())
    }

    /// Write the manifest store JSON and all resources to a folder.
    ///
    /// The JSON is written to `manifest_store.json`. Resources are stored in
    /// sub-folders named after their manifest label. Labels come from the
    /// asset, so separators and `:` are replaced by `_` and every file stays
    /// under `path`.
    #[cfg(feature = "file_io")]
    pub fn to_folder<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        std::fs::write(path.join("manifest_store.json"), self.json())?;

        for claim in self.store.claims() {
            let folder = path.join(safe_file_name(claim.label()));
            for assertion in claim.claim_assertions() {
                if !matches!(
                    assertion.decode_data(),
                    crate::assertion::AssertionData::EmbeddedFile(_)
                ) {
                    continue;
                }
                std::fs::create_dir_all(&folder)?;
                std::fs::write(
                    folder.join(safe_file_name(assertion.label())),
                    assertion.data(),
                )?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.json())
    }
}
