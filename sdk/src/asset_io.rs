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
    fmt,
    io::{Read, Seek, SeekFrom, Write},
};

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashBlockObjectType {
    Cai,
    Other,
}

impl fmt::Display for HashBlockObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashObjectPositions {
    pub offset: usize, // offset from beginning of the asset to the beginning of the object
    pub length: usize, // length of object
    pub htype: HashBlockObjectType,
}

/// A readable, seekable asset source.
pub trait CAIRead: Read + Seek {
    fn rewind_stream(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

/// A readable, writable, seekable asset destination.
pub trait CAIReadWrite: CAIRead + Write {}

impl<T: Read + Seek> CAIRead for T {}
impl<T: Read + Write + Seek> CAIReadWrite for T {}

pub trait CAIReader: Sync + Send {
    /// Return the raw JUMBF manifest store embedded in the asset.
    ///
    /// Fails with `Error::JumbfNotFound` if the asset carries none.
    fn read_cai(&self, asset_reader: &mut dyn CAIRead) -> Result<Vec<u8>>;
}

pub trait CAIWriter: Sync + Send {
    /// Copy `input_stream` to `output_stream`, replacing any existing
    /// manifest store with `store_bytes`.
    fn write_cai(
        &self,
        input_stream: &mut dyn CAIRead,
        output_stream: &mut dyn CAIReadWrite,
        store_bytes: &[u8],
    ) -> Result<()>;

    /// Locate the manifest store and the other top level blocks of the asset.
    fn get_object_locations_from_stream(
        &self,
        input_stream: &mut dyn CAIRead,
    ) -> Result<Vec<HashObjectPositions>>;

    fn remove_cai_store_from_stream(
        &self,
        input_stream: &mut dyn CAIRead,
        output_stream: &mut dyn CAIReadWrite,
    ) -> Result<()>;
}

/// Wraps manifest store bytes in the framing an asset format uses to embed
/// them.
pub trait ComposedManifestRef {
    fn compose_manifest(&self, manifest_data: &[u8], format: &str) -> Result<Vec<u8>>;
}

pub trait AssetIO: Sync + Send {
    fn new(asset_type: &str) -> Self
    where
        Self: Sized;

    fn get_handler(&self, asset_type: &str) -> Box<dyn AssetIO>;

    fn get_reader(&self) -> &dyn CAIReader;

    fn get_writer(&self, _asset_type: &str) -> Option<Box<dyn CAIWriter>> {
        None
    }

    fn composed_data_ref(&self) -> Option<&dyn ComposedManifestRef> {
        None
    }

    /// True if the manifest store is embedded inside the asset rather than
    /// replacing it.
    fn is_embeddable(&self) -> bool {
        true
    }

    fn supported_types(&self) -> &[&str];
}
