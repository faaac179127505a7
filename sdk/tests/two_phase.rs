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

//! Placeholder then sign flows where the caller embeds the manifest.

use std::io::Cursor;

use c2pa_pipeline::{Builder, DataHash, HashRange, Reader, Result, Signer, SigningAlg};

mod common;
use common::{init_logger, test_signer, SAMPLE_JPEG, SAMPLE_PNG};

// Just past the JPEG SOI marker.
const JPEG_OFFSET: usize = 2;
// Just past the PNG signature and IHDR chunk.
const PNG_OFFSET: usize = 33;

fn splice(asset: &[u8], offset: usize, manifest: &[u8]) -> Vec<u8> {
    let mut out = asset[..offset].to_vec();
    out.extend_from_slice(manifest);
    out.extend_from_slice(&asset[offset..]);
    out
}

fn builder() -> Result<Builder> {
    Builder::from_json(r#"{"claim_generator": "two_phase/1.0", "title": "placed"}"#)
}

#[test]
fn signed_manifest_replaces_placeholder_in_place() -> Result<()> {
    init_logger();
    let signer = test_signer(SigningAlg::Es256);
    let mut builder = builder()?;

    let placeholder = builder.data_hashed_placeholder(signer.reserve_size(), "image/jpeg")?;
    let with_placeholder = splice(SAMPLE_JPEG, JPEG_OFFSET, &placeholder);

    let mut data_hash = DataHash::new("jumbf manifest", "sha256");
    data_hash.add_exclusion(HashRange::new(JPEG_OFFSET, placeholder.len()));
    data_hash.gen_hash_from_stream(&mut Cursor::new(&with_placeholder))?;

    let signed =
        builder.sign_data_hashed_embeddable(signer.as_ref(), &data_hash, "image/jpeg", None)?;
    assert_eq!(signed.len(), placeholder.len());

    let mut patched = with_placeholder;
    patched[JPEG_OFFSET..JPEG_OFFSET + signed.len()].copy_from_slice(&signed);

    let reader = Reader::from_stream("image/jpeg", Cursor::new(patched))?;
    assert_eq!(reader.validation_status(), None);
    assert_eq!(reader.active_manifest().unwrap().title(), Some("placed"));
    Ok(())
}

#[test]
fn small_reserve_grows_the_manifest() -> Result<()> {
    let signer = test_signer(SigningAlg::Es256);
    let mut builder = builder()?;

    let placeholder = builder.data_hashed_placeholder(128, "jpeg")?;
    let with_placeholder = splice(SAMPLE_JPEG, JPEG_OFFSET, &placeholder);

    let mut data_hash = DataHash::new("jumbf manifest", "sha256");
    data_hash.add_exclusion(HashRange::new(JPEG_OFFSET, placeholder.len()));
    data_hash.gen_hash_from_stream(&mut Cursor::new(&with_placeholder))?;

    let signed = builder.sign_data_hashed_embeddable(signer.as_ref(), &data_hash, "jpeg", None)?;
    assert!(signed.len() > placeholder.len());

    // the caller re-lays the asset out around the larger manifest
    let asset = splice(SAMPLE_JPEG, JPEG_OFFSET, &signed);
    let reader = Reader::from_stream("jpeg", Cursor::new(asset))?;
    assert_eq!(reader.validation_status(), None);
    Ok(())
}

#[test]
fn hash_computed_from_asset_stream() -> Result<()> {
    let signer = test_signer(SigningAlg::Ps256);
    let mut builder = builder()?;

    let placeholder = builder.data_hashed_placeholder(signer.reserve_size(), "png")?;
    let mut asset = Cursor::new(splice(SAMPLE_PNG, PNG_OFFSET, &placeholder));

    // exclusions only; the hash comes from the stream
    let data_hash: DataHash = serde_json::from_value(serde_json::json!({
        "name": "jumbf manifest",
        "alg": "sha256",
        "hash": [],
        "exclusions": [{"start": PNG_OFFSET, "length": placeholder.len()}],
    }))?;

    let signed = builder.sign_data_hashed_embeddable(
        signer.as_ref(),
        &data_hash,
        "png",
        Some(&mut asset),
    )?;
    assert_eq!(signed.len(), placeholder.len());

    let mut patched = asset.into_inner();
    patched[PNG_OFFSET..PNG_OFFSET + signed.len()].copy_from_slice(&signed);
    let reader = Reader::from_stream("png", Cursor::new(patched))?;
    assert_eq!(reader.validation_status(), None);
    Ok(())
}

#[test]
fn wrong_hash_is_reported_on_read() -> Result<()> {
    let signer = test_signer(SigningAlg::Es256);
    let mut builder = builder()?;

    let placeholder = builder.data_hashed_placeholder(signer.reserve_size(), "jpeg")?;
    let mut data_hash = DataHash::new("jumbf manifest", "sha256");
    data_hash.add_exclusion(HashRange::new(JPEG_OFFSET, placeholder.len()));
    data_hash.set_hash(vec![0u8; 32]);

    let signed = builder.sign_data_hashed_embeddable(signer.as_ref(), &data_hash, "jpeg", None)?;
    let asset = splice(SAMPLE_JPEG, JPEG_OFFSET, &signed);

    let reader = Reader::from_stream("jpeg", Cursor::new(asset))?;
    let statuses = reader.validation_status().unwrap();
    assert!(statuses
        .iter()
        .any(|s| s.code() == c2pa_pipeline::validation_status::ASSERTION_DATAHASH_MISMATCH));
    Ok(())
}

#[test]
fn archived_builder_keeps_placeholder_size() -> Result<()> {
    let signer = test_signer(SigningAlg::Es256);
    let mut builder = builder()?;

    // larger than the signer needs, so a forgotten reserve changes the size
    let reserve = signer.reserve_size() + 2048;
    let placeholder = builder.data_hashed_placeholder(reserve, "jpeg")?;
    let with_placeholder = splice(SAMPLE_JPEG, JPEG_OFFSET, &placeholder);

    let mut archive = Cursor::new(Vec::new());
    builder.to_archive(&mut archive)?;
    archive.set_position(0);
    let mut resumed = Builder::from_archive(archive)?;

    let mut data_hash = DataHash::new("jumbf manifest", "sha256");
    data_hash.add_exclusion(HashRange::new(JPEG_OFFSET, placeholder.len()));
    data_hash.gen_hash_from_stream(&mut Cursor::new(&with_placeholder))?;

    let signed = resumed.sign_data_hashed_embeddable(signer.as_ref(), &data_hash, "jpeg", None)?;
    assert_eq!(signed.len(), placeholder.len());

    let mut patched = with_placeholder;
    patched[JPEG_OFFSET..JPEG_OFFSET + signed.len()].copy_from_slice(&signed);
    let reader = Reader::from_stream("jpeg", Cursor::new(patched))?;
    assert_eq!(reader.validation_status(), None);
    Ok(())
}
