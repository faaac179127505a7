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

use std::io::{self, Cursor, Seek, SeekFrom, Write};

use c2pa_pipeline::{Builder, Error, ErrorKind, Reader, Result, SigningAlg};
use zip::{write::SimpleFileOptions, ZipWriter};

mod common;
use common::{assert_err, manifest_def, test_signer, SAMPLE_JPEG, SAMPLE_PNG, THUMBNAIL};

fn sign(builder: &mut Builder) -> Result<Vec<u8>> {
    let signer = test_signer(SigningAlg::Ed25519);
    let mut dest = Cursor::new(Vec::new());
    builder.sign(signer.as_ref(), "jpeg", &mut Cursor::new(SAMPLE_JPEG), &mut dest)?;
    Ok(dest.into_inner())
}

fn populated_builder() -> Result<Builder> {
    let mut builder = Builder::from_json(&manifest_def())?;
    builder.add_resource("thumbnail.jpg", Cursor::new(THUMBNAIL))?;
    builder.add_ingredient_from_stream(
        r#"{"title": "layer.png", "relationship": "componentOf"}"#,
        "png",
        &mut Cursor::new(SAMPLE_PNG),
    )?;
    Ok(builder)
}

#[test]
fn restored_builder_signs_the_same_bytes() -> Result<()> {
    let mut builder = populated_builder()?;
    let mut archive = Cursor::new(Vec::new());
    builder.to_archive(&mut archive)?;

    archive.set_position(0);
    let mut restored = Builder::from_archive(&mut archive)?;
    assert_eq!(
        restored.definition.instance_id,
        builder.definition.instance_id
    );

    let original = sign(&mut builder)?;
    let copy = sign(&mut restored)?;
    assert_eq!(original, copy);

    let reader = Reader::from_stream("jpeg", Cursor::new(copy))?;
    assert_eq!(reader.validation_status(), None);
    assert_eq!(reader.active_manifest().unwrap().ingredients().len(), 1);
    Ok(())
}

#[test]
fn archives_are_reproducible() -> Result<()> {
    let builder = populated_builder()?;
    let mut first = Cursor::new(Vec::new());
    let mut second = Cursor::new(Vec::new());
    builder.to_archive(&mut first)?;
    builder.to_archive(&mut second)?;
    assert_eq!(first.into_inner(), second.into_inner());
    Ok(())
}

#[test]
fn foreign_archive_version_is_rejected() -> Result<()> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("version.txt", SimpleFileOptions::default())?;
    zip.write_all(b"2")?;
    zip.start_file("manifest.json", SimpleFileOptions::default())?;
    zip.write_all(b"{}")?;
    let mut data = zip.finish()?;
    data.set_position(0);

    let err = Builder::from_archive(data).unwrap_err();
    assert_err!(err, Error::ArchiveVersion(_));
    assert_eq!(err.kind(), ErrorKind::Parse);
    Ok(())
}

#[test]
fn not_a_zip() {
    let err = Builder::from_archive(Cursor::new(SAMPLE_JPEG)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

struct FullDisk;

impl Write for FullDisk {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("no space left on device"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for FullDisk {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

#[test]
fn failing_destination_is_an_io_error() -> Result<()> {
    let builder = populated_builder()?;
    let err = builder.to_archive(FullDisk).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io, "{err}");
    Ok(())
}
