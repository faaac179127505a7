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

use std::path::Path;

use crate::{
    asset_handlers::{c2pa_io::C2paIO, jpeg_io::JpegIO, png_io::PngIO},
    asset_io::{AssetIO, CAIRead, CAIReadWrite, HashObjectPositions},
    error::{Error, Result},
};

fn handlers() -> [Box<dyn AssetIO>; 3] {
    [
        Box::new(C2paIO::new("")),
        Box::new(JpegIO::new("")),
        Box::new(PngIO::new("")),
    ]
}

/// Every format hint (extension or MIME type) with a handler.
pub fn get_supported_types() -> Vec<String> {
    handlers()
        .iter()
        .flat_map(|h| h.supported_types().iter().map(|t| t.to_string()))
        .collect()
}

/// Return the handler for a format hint, which may be a file extension or
/// a MIME type. Matching ignores case and a leading dot.
pub fn get_assetio_handler(asset_type: &str) -> Option<Box<dyn AssetIO>> {
    let asset_type = asset_type.trim_start_matches('.').to_lowercase();

    handlers()
        .into_iter()
        .find(|h| h.supported_types().contains(&asset_type.as_str()))
        .map(|h| h.get_handler(&asset_type))
}

pub(crate) fn handler_for(asset_type: &str) -> Result<Box<dyn AssetIO>> {
    get_assetio_handler(asset_type).ok_or_else(|| {
        log::debug!("no asset handler for format {asset_type}");
        Error::UnsupportedType
    })
}

pub fn load_jumbf_from_stream(asset_type: &str, input_stream: &mut dyn CAIRead) -> Result<Vec<u8>> {
    let handler = handler_for(asset_type)?;
    let cai_block = handler.get_reader().read_cai(input_stream)?;
    if cai_block.is_empty() {
        return Err(Error::JumbfNotFound);
    }
    Ok(cai_block)
}

pub fn save_jumbf_to_stream(
    asset_type: &str,
    input_stream: &mut dyn CAIRead,
    output_stream: &mut dyn CAIReadWrite,
    store_bytes: &[u8],
) -> Result<()> {
    let handler = handler_for(asset_type)?;
    let writer = handler
        .get_writer(asset_type)
        .ok_or(Error::UnsupportedType)?;
    writer.write_cai(input_stream, output_stream, store_bytes)
}

pub fn object_locations_from_stream(
    asset_type: &str,
    stream: &mut dyn CAIRead,
) -> Result<Vec<HashObjectPositions>> {
    let handler = handler_for(asset_type)?;
    let writer = handler
        .get_writer(asset_type)
        .ok_or(Error::UnsupportedType)?;
    writer.get_object_locations_from_stream(stream)
}

/// Wrap manifest store bytes for embedding in the given format.
pub fn compose_manifest(asset_type: &str, manifest_data: &[u8]) -> Result<Vec<u8>> {
    let handler = handler_for(asset_type)?;
    handler
        .composed_data_ref()
        .ok_or(Error::UnsupportedType)?
        .compose_manifest(manifest_data, asset_type)
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    Some(ext.to_lowercase())
}

/// The format hint for a file path, if its extension is supported.
pub fn get_supported_file_extension(path: &Path) -> Option<String> {
    let ext = get_file_extension(path)?;
    get_assetio_handler(&ext).map(|_| ext)
}
