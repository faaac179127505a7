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
use img_parts::{png::PngChunk, Bytes};

use crate::{
    asset_io::{
        AssetIO, CAIRead, CAIReadWrite, CAIReader, CAIWriter, ComposedManifestRef,
        HashBlockObjectType, HashObjectPositions,
    },
    error::{Error, Result},
};

static SUPPORTED_TYPES: [&str; 2] = ["png", "image/png"];

const PNG_ID: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];
const CAI_CHUNK: [u8; 4] = *b"caBX";
const IMG_HDR: [u8; 4] = *b"IHDR";
const PNG_END: [u8; 4] = *b"IEND";
const PNG_HDR_LEN: u64 = 12;

#[derive(Clone, Debug)]
struct PngChunkPos {
    pub start: u64,
    pub length: u32,
    pub name: [u8; 4],
}

impl PngChunkPos {
    pub fn end(&self) -> u64 {
        self.start + self.length as u64 + PNG_HDR_LEN
    }
}

fn get_png_chunk_positions(f: &mut dyn CAIRead) -> Result<Vec<PngChunkPos>> {
    let current_len = f.seek(SeekFrom::End(0))?;
    let mut chunk_positions: Vec<PngChunkPos> = Vec::new();

    f.seek(SeekFrom::Start(0))?;

    let mut buf4 = [0; 4];
    let mut hdr = [0; 8];

    f.read_exact(&mut hdr)
        .map_err(|_err| Error::InvalidAsset("PNG invalid".to_string()))?;
    if hdr != PNG_ID {
        return Err(Error::InvalidAsset("PNG invalid".to_string()));
    }

    loop {
        let current_pos = f.stream_position()?;

        let length = f
            .read_u32::<BigEndian>()
            .map_err(|_err| Error::InvalidAsset("PNG out of range".to_string()))?;

        f.read_exact(&mut buf4)
            .map_err(|_err| Error::InvalidAsset("PNG out of range".to_string()))?;
        let name = buf4;

        // skip the data, then read the crc to be sure the chunk is complete
        f.seek(SeekFrom::Current(length as i64))
            .map_err(|_err| Error::InvalidAsset("PNG out of range".to_string()))?;
        f.read_exact(&mut buf4)
            .map_err(|_err| Error::InvalidAsset("PNG out of range".to_string()))?;

        chunk_positions.push(PngChunkPos {
            start: current_pos,
            length,
            name,
        });

        if name == PNG_END || f.stream_position()? >= current_len {
            break;
        }
    }

    Ok(chunk_positions)
}

fn get_cai_data(f: &mut dyn CAIRead) -> Result<Vec<u8>> {
    let ps = get_png_chunk_positions(f)?;

    if ps.iter().filter(|pcp| pcp.name == CAI_CHUNK).count() > 1 {
        return Err(Error::InvalidAsset(
            "more than one manifest store detected".to_owned(),
        ));
    }

    let pcp = ps
        .into_iter()
        .find(|pcp| pcp.name == CAI_CHUNK)
        .ok_or(Error::JumbfNotFound)?;

    f.seek(SeekFrom::Start(pcp.start + 8))?; // skip ahead from chunk start + length(4) + name(4)

    let mut data: Vec<u8> = vec![0; pcp.length as usize];
    f.read_exact(&mut data[..])
        .map_err(|_err| Error::InvalidAsset("PNG out of range".to_string()))?;

    Ok(data)
}

fn read_all(stream: &mut dyn CAIRead) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.seek(SeekFrom::Start(0))?;
    stream.read_to_end(&mut buf)?;
    Ok(buf)
}

// Remove any manifest chunk from an in-memory PNG.
fn strip_cai_chunks(png_buf: &mut Vec<u8>) -> Result<()> {
    let ps = get_png_chunk_positions(&mut Cursor::new(png_buf.as_slice()))?;

    for pcp in ps.iter().rev().filter(|pcp| pcp.name == CAI_CHUNK) {
        png_buf.drain(pcp.start as usize..pcp.end() as usize);
    }
    Ok(())
}

fn cai_chunk_bytes(store_bytes: &[u8]) -> Vec<u8> {
    PngChunk::new(CAI_CHUNK, Bytes::copy_from_slice(store_bytes))
        .encoder()
        .bytes()
        .to_vec()
}

pub struct PngIO {}

impl CAIReader for PngIO {
    fn read_cai(&self, asset_reader: &mut dyn CAIRead) -> Result<Vec<u8>> {
        get_cai_data(asset_reader)
    }
}

impl CAIWriter for PngIO {
    fn write_cai(
        &self,
        input_stream: &mut dyn CAIRead,
        output_stream: &mut dyn CAIReadWrite,
        store_bytes: &[u8],
    ) -> Result<()> {
        let mut png_buf = read_all(input_stream)?;
        strip_cai_chunks(&mut png_buf)?;

        // the manifest goes right after the image header
        let ps = get_png_chunk_positions(&mut Cursor::new(png_buf.as_slice()))?;
        let img_hdr = ps
            .iter()
            .find(|pcp| pcp.name == IMG_HDR)
            .ok_or(Error::EmbeddingError)?;
        let end = img_hdr.end() as usize;

        let cai_data = cai_chunk_bytes(store_bytes);
        png_buf.splice(end..end, cai_data);

        output_stream.seek(SeekFrom::Start(0))?;
        output_stream.write_all(&png_buf)?;
        Ok(())
    }

    fn get_object_locations_from_stream(
        &self,
        input_stream: &mut dyn CAIRead,
    ) -> Result<Vec<HashObjectPositions>> {
        let ps = get_png_chunk_positions(input_stream)?;

        let mut positions = vec![HashObjectPositions {
            offset: 0,
            length: PNG_ID.len(),
            htype: HashBlockObjectType::Other,
        }];

        for pcp in ps {
            positions.push(HashObjectPositions {
                offset: pcp.start as usize,
                length: (pcp.end() - pcp.start) as usize,
                htype: if pcp.name == CAI_CHUNK {
                    HashBlockObjectType::Cai
                } else {
                    HashBlockObjectType::Other
                },
            });
        }

        Ok(positions)
    }

    fn remove_cai_store_from_stream(
        &self,
        input_stream: &mut dyn CAIRead,
        output_stream: &mut dyn CAIReadWrite,
    ) -> Result<()> {
        let mut png_buf = read_all(input_stream)?;
        strip_cai_chunks(&mut png_buf)?;

        output_stream.seek(SeekFrom::Start(0))?;
        output_stream.write_all(&png_buf)?;
        Ok(())
    }
}

impl ComposedManifestRef for PngIO {
    fn compose_manifest(&self, manifest_data: &[u8], _format: &str) -> Result<Vec<u8>> {
        Ok(cai_chunk_bytes(manifest_data))
    }
}

impl AssetIO for PngIO {
    fn new(_asset_type: &str) -> Self
    where
        Self: Sized,
    {
        PngIO {}
    }

    fn get_handler(&self, asset_type: &str) -> Box<dyn AssetIO> {
        Box::new(PngIO::new(asset_type))
    }

    fn get_reader(&self) -> &dyn CAIReader {
        self
    }

    fn get_writer(&self, asset_type: &str) -> Option<Box<dyn CAIWriter>> {
        Some(Box::new(PngIO::new(asset_type)))
    }

    fn composed_data_ref(&self) -> Option<&dyn ComposedManifestRef> {
        Some(self)
    }

    fn supported_types(&self) -> &[&str] {
        &SUPPORTED_TYPES
    }
}
