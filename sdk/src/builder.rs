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

use std::{
    borrow::Cow,
    collections::BTreeMap,
    io::{Read, Seek, Write},
};
#[cfg(feature = "file_io")]
use std::{fs::File, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::{
    assertion::Assertion,
    assertions::{labels, DataHash},
    asset_io::{CAIRead, CAIReadWrite},
    claim::Claim,
    error::{Error, Result},
    ingredient::Ingredient,
    jumbf_io::{compose_manifest, handler_for},
    manifest_definition::ManifestDefinition,
    resource_store::{ResourceRef, ResourceStore},
    settings::{builder::BuilderSettings, get_settings_value},
    store::Store,
    utils::mime::format_to_mime,
    ClaimGeneratorInfo, Signer,
};

/// Version of the archive layout written by [`Builder::to_archive`].
const ARCHIVE_VERSION: &str = "1";

/// Use a Builder to add a signed manifest to an asset.
///
/// A builder holds a [`ManifestDefinition`] plus the resources it refers
/// to. It can be signed any number of times, and its whole state can be
/// saved with [`Builder::to_archive`] and restored with
/// [`Builder::from_archive`].
///
/// # Example: Building and signing a manifest
///
/// ```no_run
/// use std::io::Cursor;
///
/// use c2pa_pipeline::{create_signer, Builder, Result, SigningAlg};
///
/// # fn main() -> Result<()> {
/// let mut builder = Builder::from_json(r#"{"claim_generator": "my_app/1.0"}"#)?;
/// builder.add_resource("thumbnail.jpg", Cursor::new(vec![0xff, 0xd8, 0xff, 0xd9]))?;
///
/// let signer = create_signer::from_files("es256.pub", "es256.pem", SigningAlg::Es256, None)?;
/// let mut source = Cursor::new(std::fs::read("A.jpg")?);
/// let mut dest = Cursor::new(Vec::new());
/// builder.sign(signer.as_ref(), "image/jpeg", &mut source, &mut dest)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Builder {
    #[serde(flatten)]
    pub definition: ManifestDefinition,

    /// A URL where the manifest store can be fetched from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_url: Option<String>,

    /// If true, `sign` leaves the asset untouched and only returns the store.
    #[serde(default)]
    no_embed: bool,

    #[serde(skip)]
    resources: ResourceStore,

    // signature size reserved by the last data hashed placeholder, archived
    // so a resumed builder signs to the same size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder_reserve: Option<usize>,
}

impl Builder {
    /// Creates a new builder with an empty definition and a fresh manifest
    /// label and instance id.
    pub fn new() -> Self {
        let mut builder = Self {
            definition: ManifestDefinition::new(),
            ..Default::default()
        };
        builder.assign_ids();
        builder
    }

    /// Creates a builder from a JSON [`ManifestDefinition`].
    ///
    /// Fails with a JSON error if the text does not describe a manifest.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut builder = Self {
            definition: serde_json::from_str(json)?,
            ..Default::default()
        };
        builder.assign_ids();
        Ok(builder)
    }

    // Ids are fixed once so every signing of this builder (and of an
    // archived copy) produces the same claim.
    fn assign_ids(&mut self) {
        if self.definition.label.is_none() {
            self.definition.label = Some(format!("urn:uuid:{}", Uuid::new_v4()));
        }
        if self.definition.instance_id.is_none() {
            self.definition.instance_id = Some(format!("xmp:iid:{}", Uuid::new_v4()));
        }
    }

    /// Sets the title, typically the file name of the asset.
    pub fn set_title<S: Into<String>>(&mut self, title: S) -> &mut Self {
        self.definition.set_title(title);
        self
    }

    /// Do not embed the manifest store; `sign` copies the source unchanged.
    pub fn set_no_embed(&mut self, no_embed: bool) -> &mut Self {
        self.no_embed = no_embed;
        self
    }

    pub fn no_embed(&self) -> bool {
        self.no_embed
    }

    /// Records where the manifest store will be published.
    ///
    /// Fails if `url` is not a valid absolute URL.
    pub fn set_remote_url<S: Into<String>>(&mut self, url: S) -> Result<&mut Self> {
        let url = url.into();
        url::Url::parse(&url)?;
        self.remote_url = Some(url);
        Ok(self)
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    /// Resource identifiers that are not added to the builder are read as
    /// files relative to this folder.
    #[cfg(feature = "file_io")]
    pub fn set_base_path<P: Into<std::path::PathBuf>>(&mut self, base_path: P) -> &mut Self {
        self.resources.set_base_path(base_path);
        self
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    /// Adds a resource, such as a thumbnail, that the definition refers to
    /// by `id`.
    ///
    /// Fails if `id` is empty or already used.
    pub fn add_resource(&mut self, id: &str, mut stream: impl Read) -> Result<&mut Self> {
        if self.resources.resources().contains_key(id) {
            return Err(Error::ResourceExists(id.to_owned()));
        }
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        self.resources.add(id, buf)?;
        Ok(self)
    }

    /// Adds an ingredient described by `ingredient_json`, read from `stream`.
    ///
    /// If the ingredient asset carries a manifest store, the store is kept
    /// and merged into the signed manifest. Every call appends a new
    /// ingredient.
    pub fn add_ingredient_from_stream<R: Read + Seek>(
        &mut self,
        ingredient_json: &str,
        format: &str,
        stream: &mut R,
    ) -> Result<&mut Ingredient> {
        let mut ingredient = Ingredient::from_json(ingredient_json)?.with_stream(format, stream)?;
        ingredient.move_resources_to(&mut self.resources)?;

        let index = self.definition.ingredients.len();
        self.definition.ingredients.push(ingredient);
        Ok(&mut self.definition.ingredients[index])
    }

    /// Adds an ingredient from a file. The format comes from the extension
    /// and the title defaults to the file name.
    #[cfg(feature = "file_io")]
    pub fn add_ingredient_from_file<P: AsRef<Path>>(
        &mut self,
        ingredient_json: &str,
        path: P,
    ) -> Result<&mut Ingredient> {
        let path = path.as_ref();
        let format = crate::jumbf_io::get_file_extension(path)
            .ok_or_else(|| Error::BadParam(format!("no extension: {}", path.display())))?;
        let mut file = File::open(path)?;

        let ingredient = self.add_ingredient_from_stream(ingredient_json, &format, &mut file)?;
        if ingredient.title().is_none() {
            if let Some(name) = path.file_name() {
                ingredient.set_title(name.to_string_lossy());
            }
        }
        Ok(ingredient)
    }

    // Every resource the definition refers to, by identifier.
    fn referenced_resources(&self) -> Vec<&ResourceRef> {
        let def = &self.definition;
        def.thumbnail
            .iter()
            .chain(def.ingredients.iter().flat_map(|i| {
                i.thumbnail_ref()
                    .into_iter()
                    .chain(i.manifest_data_ref())
            }))
            .collect()
    }

    /// Build the store holding the claim for this definition, unsigned and
    /// without a hard binding.
    fn to_store(&self, format: &str) -> Result<Store> {
        let def = &self.definition;
        let alg = get_settings_value::<String>("core.hash_alg")
            .unwrap_or_else(|_| "sha256".to_owned());
        let generator = def
            .claim_generator
            .clone()
            .unwrap_or_else(|| format!("{}/{}", crate::NAME, crate::VERSION));

        let mut claim = Claim::new_with_label(
            def.label.as_deref().ok_or(Error::ClaimEncoding)?,
            def.instance_id.as_deref().ok_or(Error::ClaimEncoding)?,
            &generator,
            &format_to_mime(format),
            &alg,
        );
        claim.set_title(def.title.clone());

        for info in &def.claim_generator_info {
            claim.add_claim_generator_info(info.clone());
        }
        if let Some(info) = get_settings_value::<BuilderSettings>("builder")
            .ok()
            .and_then(|b| b.claim_generator_info)
        {
            claim.add_claim_generator_info(ClaimGeneratorInfo::from(&info));
        }

        if let Some(thumb) = &def.thumbnail {
            let data = self.resources.get(&thumb.identifier)?.into_owned();
            claim.add_assertion_data(Assertion::from_embedded_file(
                &labels::add_thumbnail_format(labels::CLAIM_THUMBNAIL, &thumb.format),
                &format_to_mime(&thumb.format),
                Some(thumb.identifier.clone()),
                data,
            ))?;
        }

        let mut store = Store::new();
        for ingredient in &def.ingredients {
            ingredient.add_to_claim(&mut claim, &mut store, &self.resources)?;
        }

        for assertion in &def.assertions {
            claim.add_assertion_data(assertion.to_assertion()?)?;
        }

        store.commit_claim(claim)?;
        Ok(store)
    }

    /// Sign the definition and write the signed asset to `dest`.
    ///
    /// `source` is read as `format`. Returns the manifest store bytes. With
    /// [`Builder::set_no_embed`] the source is copied to `dest` as is.
    ///
    /// Fails if the format has no handler, if a resource is missing, or if
    /// the signer produces a signature larger than its reserve size.
    pub fn sign<R, W>(
        &mut self,
        signer: &dyn Signer,
        format: &str,
        source: &mut R,
        dest: &mut W,
    ) -> Result<Vec<u8>>
    where
        R: Read + Seek,
        W: Write + Read + Seek,
    {
        let format = format_to_mime(format);
        handler_for(&format)?;
        debug!("signing {format} asset, no_embed = {}", self.no_embed);

        let mut store = self.to_store(&format)?;
        let source: &mut dyn CAIRead = source;
        let dest: &mut dyn CAIReadWrite = dest;
        if self.no_embed {
            store.save_no_embed(source, dest, signer)
        } else {
            store.save_to_stream(&format, source, dest, signer)
        }
    }

    /// Sign a file, writing the signed copy to `dest`.
    ///
    /// The destination folder is created if needed. `source` and `dest`
    /// may be the same file.
    #[cfg(feature = "file_io")]
    pub fn sign_file<S, D>(&mut self, signer: &dyn Signer, source: S, dest: D) -> Result<Vec<u8>>
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        let source = source.as_ref();
        let dest = dest.as_ref();
        let format = crate::jumbf_io::get_file_extension(source)
            .ok_or_else(|| Error::BadParam(format!("no extension: {}", source.display())))?;

        let mut input = std::io::Cursor::new(std::fs::read(source).map_err(|e| {
            match e.kind() {
                std::io::ErrorKind::NotFound => Error::FileNotFound(source.display().to_string()),
                _ => Error::IoError(e),
            }
        })?);

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut output = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(dest)?;
        self.sign(signer, &format, &mut input, &mut output)
    }

    /// Create a placeholder for a data hashed manifest.
    ///
    /// The placeholder is composed for `format` and has room for a signature
    /// of `reserve_size` bytes. The caller embeds it, hashes the asset with
    /// the placeholder excluded, and then calls
    /// [`Builder::sign_data_hashed_embeddable`] with that hash.
    pub fn data_hashed_placeholder(&mut self, reserve_size: usize, format: &str) -> Result<Vec<u8>> {
        let mut store = self.to_store(format)?;
        let placeholder = store.get_data_hashed_manifest_placeholder(reserve_size, format)?;
        self.placeholder_reserve = Some(reserve_size);
        Ok(placeholder)
    }

    /// Create a signed manifest, composed for `format`, for an asset the
    /// caller hashed.
    ///
    /// When `asset` is given the hash is computed from it with the
    /// exclusions in `data_hash`; otherwise `data_hash` must carry the hash.
    /// For embeddable formats `data_hash` must exclude the manifest.
    ///
    /// The result has the size of the last placeholder when the signature
    /// fits it. If it does not, the first exclusion of the hard binding is
    /// resized to the size of the result.
    pub fn sign_data_hashed_embeddable(
        &mut self,
        signer: &dyn Signer,
        data_hash: &DataHash,
        format: &str,
        asset: Option<&mut dyn CAIRead>,
    ) -> Result<Vec<u8>> {
        let mut store = self.to_store(format)?;
        store.get_data_hashed_embeddable_manifest(
            data_hash,
            signer,
            format,
            asset,
            self.placeholder_reserve,
        )
    }

    /// Converts a manifest store into the embeddable form for `format`.
    ///
    /// This is a pure function of its inputs.
    pub fn format_embeddable(format: &str, manifest_bytes: &[u8]) -> Result<Vec<u8>> {
        compose_manifest(format, manifest_bytes)
    }

    /// Same as [`Builder::format_embeddable`] with the arguments swapped.
    pub fn composed_manifest(manifest_bytes: &[u8], format: &str) -> Result<Vec<u8>> {
        Self::format_embeddable(format, manifest_bytes)
    }

    /// Write the builder to a zip archive.
    ///
    /// The archive holds `version.txt`, the builder state as
    /// `manifest.json`, and every resource under `resources/`. Entries are
    /// stored uncompressed with a fixed timestamp, so equal builders give
    /// equal archives.
    pub fn to_archive(&self, stream: impl Write + Seek) -> Result<()> {
        let mut entries: BTreeMap<&str, Cow<'_, Vec<u8>>> = self
            .resources
            .resources()
            .iter()
            .map(|(id, data)| (id.as_str(), Cow::Borrowed(data)))
            .collect();
        // resources found through the base path are copied in
        for resource in self.referenced_resources() {
            if !entries.contains_key(resource.identifier.as_str()) {
                let data = self.resources.get(&resource.identifier)?;
                entries.insert(resource.identifier.as_str(), data);
            }
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default());

        let mut zip = ZipWriter::new(stream);
        zip.start_file("version.txt", options)?;
        zip.write_all(ARCHIVE_VERSION.as_bytes())?;

        zip.start_file("manifest.json", options)?;
        zip.write_all(&serde_json::to_vec(self)?)?;

        for (id, data) in entries {
            zip.start_file(format!("resources/{id}"), options)?;
            zip.write_all(&data)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Restore a builder written by [`Builder::to_archive`].
    ///
    /// Fails with [`Error::ArchiveVersion`] for archives of another version.
    pub fn from_archive(stream: impl Read + Seek) -> Result<Self> {
        let mut zip = ZipArchive::new(stream)?;

        let mut version = String::new();
        zip.by_name("version.txt")?.read_to_string(&mut version)?;
        if version.trim() != ARCHIVE_VERSION {
            return Err(Error::ArchiveVersion(version));
        }

        let mut manifest = Vec::new();
        zip.by_name("manifest.json")?.read_to_end(&mut manifest)?;
        let mut builder: Builder = serde_json::from_slice(&manifest)?;
        builder.assign_ids();

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let Some(id) = file.name().strip_prefix("resources/") else {
                continue;
            };
            if id.is_empty() {
                continue;
            }
            let id = id.to_owned();
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            builder.resources.add(id, data)?;
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Cursor;

    use c2pa_crypto::raw_signature::SigningAlg;

    use super::*;
    use crate::{
        utils::{hash_utils::HashRange, test::test_manifest_json, test_signer::test_signer},
        Reader,
    };

    const SAMPLE_JPEG: &[u8] = include_bytes!("../tests/fixtures/sample.jpg");
    const SAMPLE_PNG: &[u8] = include_bytes!("../tests/fixtures/sample.png");
    const THUMBNAIL: &[u8] = include_bytes!("../tests/fixtures/thumbnail.jpg");

    fn test_builder() -> Builder {
        let mut builder = Builder::from_json(&test_manifest_json()).unwrap();
        builder
            .add_resource("thumbnail.jpg", Cursor::new(THUMBNAIL))
            .unwrap();
        builder
    }

    #[test]
    fn from_json_assigns_ids() {
        let builder = Builder::from_json(r#"{"claim_generator": "test"}"#).unwrap();
        assert!(builder.definition.label.as_ref().unwrap().starts_with("urn:uuid:"));
        assert!(builder.definition.instance_id.as_ref().unwrap().starts_with("xmp:iid:"));

        let err = Builder::from_json(r#"{"assertions": 5}"#).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Parse);
    }

    #[test]
    fn sign_and_read() {
        let signer = test_signer(SigningAlg::Es256);
        let mut builder = test_builder();

        let mut dest = Cursor::new(Vec::new());
        let manifest_bytes = builder
            .sign(signer.as_ref(), "image/jpeg", &mut Cursor::new(SAMPLE_JPEG), &mut dest)
            .unwrap();
        assert!(!manifest_bytes.is_empty());

        dest.rewind().unwrap();
        let reader = Reader::from_stream("jpeg", &mut dest).unwrap();
        assert!(reader.validation_status().is_none(), "{reader}");

        let manifest = reader.active_manifest().unwrap();
        assert_eq!(manifest.claim_generator(), "test");
        assert_eq!(manifest.label(), builder.definition.label.as_deref().unwrap());
        assert_eq!(manifest.assertions()[0].label(), "org.test.notes");

        let mut thumb = Vec::new();
        let uri = &manifest.thumbnail_ref().unwrap().identifier;
        reader.resource_to_stream(uri, &mut thumb).unwrap();
        assert_eq!(thumb, THUMBNAIL);
    }

    #[test]
    fn missing_resource_fails() {
        let signer = test_signer(SigningAlg::Es256);
        let mut builder = Builder::from_json(&test_manifest_json()).unwrap();
        let err = builder
            .sign(
                signer.as_ref(),
                "jpeg",
                &mut Cursor::new(SAMPLE_JPEG),
                &mut Cursor::new(Vec::new()),
            )
            .unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound(_)));
    }

    #[test]
    fn duplicate_and_empty_resources_rejected() {
        let mut builder = test_builder();
        let err = builder
            .add_resource("thumbnail.jpg", Cursor::new(THUMBNAIL))
            .unwrap_err();
        assert!(matches!(err, Error::ResourceExists(_)));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);

        let err = builder.add_resource("", Cursor::new(THUMBNAIL)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[test]
    fn remote_url_is_validated() {
        let mut builder = Builder::new();
        assert!(builder.set_remote_url("not a url").is_err());
        builder.set_remote_url("https://example.com/m.c2pa").unwrap();
        assert_eq!(builder.remote_url(), Some("https://example.com/m.c2pa"));
    }

    #[test]
    fn no_embed_leaves_asset_alone() {
        let signer = test_signer(SigningAlg::Ed25519);
        let mut builder = test_builder();
        builder.set_no_embed(true);

        let mut dest = Cursor::new(Vec::new());
        let manifest_bytes = builder
            .sign(signer.as_ref(), "png", &mut Cursor::new(SAMPLE_PNG), &mut dest)
            .unwrap();
        assert_eq!(dest.get_ref().as_slice(), SAMPLE_PNG);

        let reader =
            Reader::from_manifest_data_and_stream(&manifest_bytes, "png", Cursor::new(SAMPLE_PNG))
                .unwrap();
        assert!(reader.validation_status().is_none());
    }

    #[test]
    fn archive_round_trip_signs_identically() {
        let signer = test_signer(SigningAlg::Es256);
        let mut builder = test_builder();
        builder.set_remote_url("https://example.com/m.c2pa").unwrap();

        let mut archive = Cursor::new(Vec::new());
        builder.to_archive(&mut archive).unwrap();
        archive.rewind().unwrap();
        let mut restored = Builder::from_archive(&mut archive).unwrap();
        assert_eq!(restored.remote_url(), builder.remote_url());

        let mut a = Cursor::new(Vec::new());
        let mut b = Cursor::new(Vec::new());
        let ma = builder
            .sign(signer.as_ref(), "jpeg", &mut Cursor::new(SAMPLE_JPEG), &mut a)
            .unwrap();
        let mb = restored
            .sign(signer.as_ref(), "jpeg", &mut Cursor::new(SAMPLE_JPEG), &mut b)
            .unwrap();
        assert_eq!(ma, mb);
        assert_eq!(a.into_inner(), b.into_inner());
    }

    #[test]
    fn archive_errors() {
        let err = Builder::from_archive(Cursor::new(b"not a zip".to_vec())).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Parse);

        let mut zipped = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut zipped);
            zip.start_file("version.txt", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"2").unwrap();
            zip.finish().unwrap();
        }
        zipped.rewind().unwrap();
        let err = Builder::from_archive(zipped).unwrap_err();
        assert!(matches!(err, Error::ArchiveVersion(_)));
        assert_eq!(err.kind(), crate::ErrorKind::Parse);
    }

    #[test]
    fn ingredient_manifests_are_merged() {
        let signer = test_signer(SigningAlg::Es256);

        let mut parent = Cursor::new(Vec::new());
        test_builder()
            .sign(signer.as_ref(), "jpeg", &mut Cursor::new(SAMPLE_JPEG), &mut parent)
            .unwrap();

        let mut builder = Builder::from_json(r#"{"claim_generator": "test/2"}"#).unwrap();
        parent.rewind().unwrap();
        builder
            .add_ingredient_from_stream(
                r#"{"title": "parent.jpg", "relationship": "parentOf"}"#,
                "image/jpeg",
                &mut parent,
            )
            .unwrap();

        let mut dest = Cursor::new(Vec::new());
        builder
            .sign(signer.as_ref(), "jpeg", &mut parent, &mut dest)
            .unwrap();

        dest.rewind().unwrap();
        let reader = Reader::from_stream("jpeg", &mut dest).unwrap();
        assert!(reader.validation_status().is_none(), "{reader}");
        assert_eq!(reader.manifests().len(), 2);

        let ingredient = &reader.active_manifest().unwrap().ingredients()[0];
        assert!(ingredient.is_parent());
        let parent_label = ingredient.active_manifest().unwrap();
        assert!(reader.get_manifest(parent_label).is_some());
        assert!(ingredient.thumbnail_ref().is_some());
    }

    #[test]
    fn two_phase_signing() {
        let signer = test_signer(SigningAlg::Es256);
        let mut builder = test_builder();

        let placeholder = builder.data_hashed_placeholder(128, "jpeg").unwrap();

        let mut asset = SAMPLE_JPEG[..2].to_vec();
        asset.extend_from_slice(&placeholder);
        asset.extend_from_slice(&SAMPLE_JPEG[2..]);

        let mut dh = DataHash::new("jumbf manifest", "sha256");
        dh.add_exclusion(HashRange::new(2, placeholder.len()));
        dh.gen_hash_from_stream(&mut Cursor::new(&asset)).unwrap();

        let signed = builder
            .sign_data_hashed_embeddable(signer.as_ref(), &dh, "jpeg", None)
            .unwrap();

        // the signature did not fit 128 bytes, so the store grew
        let mut final_asset = SAMPLE_JPEG[..2].to_vec();
        final_asset.extend_from_slice(&signed);
        final_asset.extend_from_slice(&SAMPLE_JPEG[2..]);

        let reader = Reader::from_stream("jpeg", Cursor::new(final_asset)).unwrap();
        assert!(reader.validation_status().is_none(), "{reader}");
    }

    #[test]
    fn data_hash_must_exclude_the_manifest() {
        let signer = test_signer(SigningAlg::Es256);
        let mut builder = test_builder();
        let mut dh = DataHash::new("jumbf manifest", "sha256");
        dh.set_hash(vec![1u8; 32]);

        let err = builder
            .sign_data_hashed_embeddable(signer.as_ref(), &dh, "jpeg", None)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[test]
    fn format_embeddable_is_pure() {
        let signer = test_signer(SigningAlg::Es256);
        let mut builder = test_builder();
        let manifest = builder
            .sign(
                signer.as_ref(),
                "c2pa",
                &mut Cursor::new(SAMPLE_JPEG),
                &mut Cursor::new(Vec::new()),
            )
            .unwrap();

        let a = Builder::format_embeddable("image/jpeg", &manifest).unwrap();
        let b = Builder::composed_manifest(&manifest, "image/jpeg").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, manifest);
    }

    #[test]
    fn settings_generator_info_is_appended() {
        crate::settings::load_settings_from_str(
            r#"{"builder": {"claim_generator_info": {"name": "host_app", "version": "2.0"}}}"#,
            "json",
        )
        .unwrap();

        let signer = test_signer(SigningAlg::Es256);
        let mut builder = test_builder();
        let mut dest = Cursor::new(Vec::new());
        builder
            .sign(signer.as_ref(), "jpeg", &mut Cursor::new(SAMPLE_JPEG), &mut dest)
            .unwrap();
        crate::settings::reset_default_settings().unwrap();

        dest.rewind().unwrap();
        let reader = Reader::from_stream("jpeg", &mut dest).unwrap();
        let info = reader.active_manifest().unwrap().claim_generator_info();
        assert_eq!(info.last().unwrap().name, "host_app");
    }
}
