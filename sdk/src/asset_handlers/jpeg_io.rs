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

use std::io::{Cursor, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use img_parts::{
    jpeg::{markers, Jpeg, JpegSegment},
    Bytes,
};

use crate::{
    asset_io::{
        AssetIO, CAIRead, CAIReadWrite, CAIReader, CAIWriter, ComposedManifestRef,
        HashBlockObjectType, HashObjectPositions,
    },
    error::{Error, Result},
};

static SUPPORTED_TYPES: [&str; 3] = ["jpg", "jpeg", "image/jpeg"];

const MAX_JPEG_MARKER_SIZE: usize = 64000; // technically it's 64K but a bit smaller is fine

const C2PA_MARKER: [u8; 4] = [0x63, 0x32, 0x70, 0x61];

// JPEG XT box framing: CI "JP" and a fixed box instance number.
const JP_CI: [u8; 2] = [0x4A, 0x50];
const JP_EN: [u8; 2] = [0x02, 0x11];

// CI + En + Z + LBox + TBox
const CONTINUATION_HDR_LEN: usize = 16;

fn read_jpeg(stream: &mut dyn CAIRead) -> Result<Jpeg> {
    let mut buf: Vec<u8> = Vec::new();
    stream.seek(SeekFrom::Start(0))?;
    stream.read_to_end(&mut buf).map_err(Error::IoError)?;

    Jpeg::from_bytes(buf.into())
        .map_err(|_err| Error::InvalidAsset("Could not parse input JPEG".to_owned()))
}

// True if this APP11 payload starts a JUMBF box whose description is a c2pa
// manifest store.
fn is_cai_start(raw: &[u8]) -> bool {
    raw.len() > 28 && raw[0..2] == JP_CI && raw[24..28] == C2PA_MARKER
}

fn get_cai_segments(jpeg: &Jpeg) -> Result<Vec<usize>> {
    let mut cai_segs: Vec<usize> = Vec::new();
    let mut cai_en: Option<[u8; 2]> = None;

    for (i, segment) in jpeg.segments().iter().enumerate() {
        let raw = segment.contents();
        if segment.marker() != markers::APP11 || raw.len() <= CONTINUATION_HDR_LEN {
            continue;
        }

        let en = [raw[2], raw[3]];
        if cai_en == Some(en) && !is_cai_start(raw) {
            cai_segs.push(i);
        } else if is_cai_start(raw) {
            cai_segs.push(i);
            cai_en = Some(en);
        }
    }
    Ok(cai_segs)
}

fn delete_cai_segments(jpeg: &mut Jpeg) -> Result<()> {
    let cai_segs = get_cai_segments(jpeg)?;
    let jpeg_segs = jpeg.segments_mut();

    for seg in cai_segs.iter().rev() {
        jpeg_segs.remove(*seg);
    }
    Ok(())
}

// Split a manifest store into APP11 marker segments. Every segment after the
// first repeats the LBox/TBox of the store so readers can reassemble it.
fn cai_segments(store_bytes: &[u8]) -> Result<Vec<JpegSegment>> {
    if store_bytes.len() < 8 {
        return Err(Error::EmbeddingError);
    }

    let mut segments = Vec::new();
    for (i, chunk) in store_bytes.chunks(MAX_JPEG_MARKER_SIZE).enumerate() {
        let z = u32::try_from(i + 1).map_err(|_| Error::EmbeddingError)?;

        let mut seg_data = Vec::with_capacity(chunk.len() + CONTINUATION_HDR_LEN);
        seg_data.extend_from_slice(&JP_CI);
        seg_data.extend_from_slice(&JP_EN);
        seg_data.extend_from_slice(&z.to_be_bytes());
        if i > 0 {
            seg_data.extend_from_slice(&store_bytes[..8]);
        }
        seg_data.extend_from_slice(chunk);

        segments.push(JpegSegment::new_with_contents(
            markers::APP11,
            Bytes::from(seg_data),
        ));
    }
    Ok(segments)
}

pub struct JpegIO {}

impl CAIReader for JpegIO {
    fn read_cai(&self, asset_reader: &mut dyn CAIRead) -> Result<Vec<u8>> {
        let jpeg = read_jpeg(asset_reader)?;

        let mut buffer: Vec<u8> = Vec::new();
        let mut cai_en: Option<[u8; 2]> = None;
        let mut cai_seg_cnt: u32 = 0;

        for segment in jpeg.segments_by_marker(markers::APP11) {
            let raw = segment.contents();
            if raw.len() <= CONTINUATION_HDR_LEN {
                continue;
            }

            let en = [raw[2], raw[3]];
            let z = Cursor::new(&raw[4..8]).read_u32::<BigEndian>()?;

            if cai_seg_cnt > 0 && cai_en == Some(en) && !is_cai_start(raw) {
                // out of sequence segments end the store
                if z <= cai_seg_cnt {
                    cai_en = None;
                    continue;
                }
                buffer.extend_from_slice(&raw[CONTINUATION_HDR_LEN..]);
                cai_seg_cnt += 1;
            } else if is_cai_start(raw) {
                if !buffer.is_empty() {
                    return Err(Error::InvalidAsset(
                        "more than one manifest store detected".to_owned(),
                    ));
                }
                buffer.extend_from_slice(&raw[8..]);
                cai_seg_cnt = 1;
                cai_en = Some(en);
            }
        }

        if buffer.is_empty() {
            return Err(Error::JumbfNotFound);
        }

        Ok(buffer)
    }
}

impl CAIWriter for JpegIO {
    fn write_cai(
        &self,
        input_stream: &mut dyn CAIRead,
        output_stream: &mut dyn CAIReadWrite,
        store_bytes: &[u8],
    ) -> Result<()> {
        let mut jpeg = read_jpeg(input_stream)?;

        delete_cai_segments(&mut jpeg)?;

        // the store goes right after the first segment (usually APP0)
        let insert_at = jpeg.segments().len().min(1);
        for (i, seg) in cai_segments(store_bytes)?.into_iter().enumerate() {
            jpeg.segments_mut().insert(insert_at + i, seg);
        }

        output_stream.seek(SeekFrom::Start(0))?;
        jpeg.encoder()
            .write_to(output_stream)
            .map_err(|_err| Error::InvalidAsset("JPEG write error".to_owned()))?;
        Ok(())
    }

    fn get_object_locations_from_stream(
        &self,
        input_stream: &mut dyn CAIRead,
    ) -> Result<Vec<HashObjectPositions>> {
        let jpeg = read_jpeg(input_stream)?;
        let cai_segs = get_cai_segments(&jpeg)?;

        let mut positions: Vec<HashObjectPositions> = Vec::new();
        let mut curr_offset = 2; // start after JPEG marker

        for (i, seg) in jpeg.segments().iter().enumerate() {
            let htype = if cai_segs.contains(&i) {
                HashBlockObjectType::Cai
            } else {
                HashBlockObjectType::Other
            };

            positions.push(HashObjectPositions {
                offset: curr_offset,
                length: seg.len_with_entropy(),
                htype,
            });
            curr_offset += seg.len_with_entropy();
        }

        Ok(positions)
    }

    fn remove_cai_store_from_stream(
        &self,
        input_stream: &mut dyn CAIRead,
        output_stream: &mut dyn CAIReadWrite,
    ) -> Result<()> {
        let mut jpeg = read_jpeg(input_stream)?;

        delete_cai_segments(&mut jpeg)?;

        output_stream.seek(SeekFrom::Start(0))?;
        jpeg.encoder()
            .write_to(output_stream)
            .map_err(|_err| Error::InvalidAsset("JPEG write error".to_owned()))?;
        Ok(())
    }
}

impl ComposedManifestRef for JpegIO {
    fn compose_manifest(&self, manifest_data: &[u8], _format: &str) -> Result<Vec<u8>> {
        let mut composed = Vec::with_capacity(manifest_data.len() + 64);
        for seg in cai_segments(manifest_data)? {
            composed.extend_from_slice(&seg.encoder().bytes());
        }
        Ok(composed)
    }
}

impl AssetIO for JpegIO {
    fn new(_asset_type: &str) -> Self
    where
        Self: Sized,
    {
        JpegIO {}
    }

    fn get_handler(&self, asset_type: &str) -> Box<dyn AssetIO> {
        Box::new(JpegIO::new(asset_type))
    }

    fn get_reader(&self) -> &dyn CAIReader {
        self
    }

    fn get_writer(&self, asset_type: &str) -> Option<Box<dyn CAIWriter>> {
        Some(Box::new(JpegIO::new(asset_type)))
    }

    fn composed_data_ref(&self) -> Option<&dyn ComposedManifestRef> {
        Some(self)
    }

    fn supported_types(&self) -> &[&str] {
        &SUPPORTED_TYPES
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Cursor;

    use super::*;

    const SAMPLE: &[u8] = include_bytes!("../../tests/fixtures/sample.jpg");

    // A minimal stand-in for a manifest store: a superbox whose description
    // UUID starts with "c2pa".
    fn fake_store(payload_len: usize) -> Vec<u8> {
        let mut jumd = Vec::new();
        jumd.extend_from_slice(&C2PA_MARKER);
        jumd.extend_from_slice(&[0u8; 12]);
        jumd.push(0x03);
        jumd.extend_from_slice(b"c2pa\0");

        let mut out = Vec::new();
        let total = 8 + 8 + jumd.len() + payload_len;
        out.extend_from_slice(&(total as u32).to_be_bytes());
        out.extend_from_slice(b"jumb");
        out.extend_from_slice(&((8 + jumd.len()) as u32).to_be_bytes());
        out.extend_from_slice(b"jumd");
        out.extend_from_slice(&jumd);
        out.extend((0..payload_len).map(|i| (i % 251) as u8));
        out
    }

    fn embed(store: &[u8]) -> Vec<u8> {
        let mut input = Cursor::new(SAMPLE);
        let mut output = Cursor::new(Vec::new());
        JpegIO {}
            .write_cai(&mut input, &mut output, store)
            .unwrap();
        output.into_inner()
    }

    #[test]
    fn no_store_is_not_found() {
        let err = JpegIO {}.read_cai(&mut Cursor::new(SAMPLE)).unwrap_err();
        assert!(matches!(err, Error::JumbfNotFound));
    }

    #[test]
    fn not_a_jpeg() {
        let err = JpegIO {}
            .read_cai(&mut Cursor::new(b"not a jpeg at all".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAsset(_)));
    }

    #[test]
    fn write_then_read_small_store() {
        let store = fake_store(100);
        let out = embed(&store);
        assert_eq!(out.len(), SAMPLE.len() + store.len() + 4 + 8);

        let read = JpegIO {}.read_cai(&mut Cursor::new(out)).unwrap();
        assert_eq!(read, store);
    }

    #[test]
    fn large_store_spans_segments() {
        let store = fake_store(150_000);
        let out = embed(&store);

        let read = JpegIO {}.read_cai(&mut Cursor::new(out.clone())).unwrap();
        assert_eq!(read, store);

        let positions = JpegIO {}
            .get_object_locations_from_stream(&mut Cursor::new(out))
            .unwrap();
        let cai: Vec<_> = positions
            .iter()
            .filter(|p| p.htype == HashBlockObjectType::Cai)
            .collect();
        assert_eq!(cai.len(), 3);
        // the segments are contiguous
        assert_eq!(cai[0].offset + cai[0].length, cai[1].offset);
        assert_eq!(cai[1].offset + cai[1].length, cai[2].offset);
    }

    #[test]
    fn composed_matches_embedded_bytes() {
        let store = fake_store(70_000);
        let out = embed(&store);
        let composed = JpegIO {}.compose_manifest(&store, "jpeg").unwrap();

        let positions = JpegIO {}
            .get_object_locations_from_stream(&mut Cursor::new(out.clone()))
            .unwrap();
        let start = positions
            .iter()
            .find(|p| p.htype == HashBlockObjectType::Cai)
            .unwrap()
            .offset;
        assert_eq!(&out[start..start + composed.len()], composed.as_slice());
    }

    #[test]
    fn rewriting_replaces_existing_store() {
        let first = embed(&fake_store(10));
        let second_store = fake_store(20);

        let mut output = Cursor::new(Vec::new());
        JpegIO {}
            .write_cai(&mut Cursor::new(first), &mut output, &second_store)
            .unwrap();

        let read = JpegIO {}
            .read_cai(&mut Cursor::new(output.get_ref().clone()))
            .unwrap();
        assert_eq!(read, second_store);

        let mut stripped = Cursor::new(Vec::new());
        JpegIO {}
            .remove_cai_store_from_stream(&mut Cursor::new(output.into_inner()), &mut stripped)
            .unwrap();
        assert_eq!(stripped.into_inner(), SAMPLE);
    }
}
