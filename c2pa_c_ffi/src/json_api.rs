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

//! One-shot JSON convenience functions over files.

use std::path::Path;

use c2pa_pipeline::{Builder, Error as PipelineError, Ingredient, Reader};

use crate::{Result, SignerInfo};

/// Returns the manifest store JSON of a file, or `None` if it has none.
///
/// If data_dir is provided, the JSON and every resource are also written to
/// that folder. Validation failures are reported in the validation_status
/// field.
pub fn read_file(path: &str, data_dir: Option<String>) -> Result<Option<String>> {
    let reader = match Reader::from_file(path) {
        Ok(reader) => reader,
        Err(PipelineError::JumbfNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if let Some(dir) = data_dir {
        reader.to_folder(dir)?;
    }
    Ok(Some(reader.json()))
}

/// Returns the ingredient JSON for a file and writes its resources (a
/// thumbnail, the manifest store) into `data_dir`.
pub fn read_ingredient_file(path: &str, data_dir: &str) -> Result<String> {
    let ingredient = Ingredient::from_file(path)?;

    let data_dir = Path::new(data_dir);
    std::fs::create_dir_all(data_dir)?;
    for (id, data) in ingredient.resources().resources() {
        std::fs::write(data_dir.join(id), data)?;
    }
    Ok(serde_json::to_string_pretty(&ingredient)?)
}

/// Adds a manifest to the source file and writes the result to the destination file.
/// Also returns the binary manifest data for optional cloud storage.
///
/// Resources in the manifest definition are read relative to `data_dir`. If
/// the source already has a manifest store and no parent ingredient is
/// given, the source becomes the parent.
pub fn sign_file(
    source: &str,
    dest: &str,
    manifest_json: &str,
    signer_info: &SignerInfo,
    data_dir: Option<String>,
) -> Result<Vec<u8>> {
    let mut builder = Builder::from_json(manifest_json)?;
    if let Some(path) = data_dir {
        builder.set_base_path(path);
    }

    if !builder.definition.ingredients.iter().any(|i| i.is_parent()) {
        let source_ingredient = Ingredient::from_file(source)?;
        if source_ingredient.manifest_data_ref().is_some() {
            log::debug!("using {source} as the parent ingredient");
            builder.add_ingredient_from_file(r#"{"relationship": "parentOf"}"#, source)?;
        }
    }

    let signer = signer_info.signer()?;
    Ok(builder.sign_file(signer.as_ref(), source, dest)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    pub fn test_path(path: &str) -> String {
        let base = env!("CARGO_MANIFEST_DIR");
        format!("{base}/../sdk/tests/{path}")
    }

    fn signer_info() -> SignerInfo {
        SignerInfo {
            alg: "es256".to_string(),
            sign_cert: std::fs::read(test_path("fixtures/certs/es256.pub")).unwrap(),
            private_key: std::fs::read(test_path("fixtures/certs/es256.priv")).unwrap(),
            ta_url: None,
        }
    }

    const MANIFEST: &str = r#"{
        "claim_generator": "json_api_test/1.0",
        "title": "signed.jpg",
        "thumbnail": {"format": "image/jpeg", "identifier": "thumbnail.jpg"}
    }"#;

    #[test]
    fn test_read_file_without_manifest() {
        let result = read_file(&test_path("fixtures/sample.jpg"), None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_file_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let err = read_file(path.to_str().unwrap(), None).unwrap_err();
        assert!(err.to_string().starts_with("NotSupported: "), "{err}");
    }

    #[test]
    fn test_sign_then_read_with_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out/signed.jpg");
        let data_dir = dir.path().join("data");

        let manifest = sign_file(
            &test_path("fixtures/sample.jpg"),
            dest.to_str().unwrap(),
            MANIFEST,
            &signer_info(),
            Some(test_path("fixtures")),
        )
        .unwrap();
        assert!(!manifest.is_empty());

        let json = read_file(
            dest.to_str().unwrap(),
            Some(data_dir.to_string_lossy().into_owned()),
        )
        .unwrap()
        .unwrap();
        assert!(json.contains("json_api_test/1.0"));
        assert!(!json.contains("validation_status"));
        assert!(data_dir.join("manifest_store.json").exists());
    }

    #[test]
    fn test_signed_source_becomes_parent() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.jpg");
        let second = dir.path().join("second.jpg");
        let manifest = r#"{"claim_generator": "json_api_test/1.0"}"#;

        sign_file(
            &test_path("fixtures/sample.jpg"),
            first.to_str().unwrap(),
            manifest,
            &signer_info(),
            None,
        )
        .unwrap();
        sign_file(
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            manifest,
            &signer_info(),
            None,
        )
        .unwrap();

        let json = read_file(second.to_str().unwrap(), None).unwrap().unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["manifests"].as_object().unwrap().len(), 2);
        let active = report["active_manifest"].as_str().unwrap();
        assert_eq!(
            report["manifests"][active]["ingredients"][0]["relationship"],
            "parentOf"
        );
    }

    #[test]
    fn test_read_ingredient_file_writes_resources() {
        let dir = tempfile::tempdir().unwrap();
        let signed = dir.path().join("signed.jpg");
        sign_file(
            &test_path("fixtures/sample.jpg"),
            signed.to_str().unwrap(),
            MANIFEST,
            &signer_info(),
            Some(test_path("fixtures")),
        )
        .unwrap();

        let data_dir = dir.path().join("ingredient");
        let json = read_ingredient_file(signed.to_str().unwrap(), data_dir.to_str().unwrap())
            .unwrap();
        let ingredient: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(ingredient["title"], "signed.jpg");

        let id = ingredient["manifest_data"]["identifier"].as_str().unwrap();
        assert!(data_dir.join(id).is_file());
    }
}
