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

use std::io::SeekFrom;

use crate::{
    asset_io::{
        AssetIO, CAIRead, CAIReadWrite, CAIReader, CAIWriter, ComposedManifestRef,
        HashBlockObjectType, HashObjectPositions,
    },
    error::{Error, Result},
};

static SUPPORTED_TYPES: [&str; 2] = ["c2pa", "application/c2pa"];

/// Stand-alone manifest store (sidecar) files. The whole file is the store.
pub struct C2paIO {}

impl CAIReader for C2paIO {
    fn read_cai(&self, asset_reader: &mut dyn CAIRead) -> Result<Vec<u8>> {
        let mut cai_data = Vec::new();
        asset_reader.seek(SeekFrom::Start(0))?;
        asset_reader.read_to_end(&mut cai_data)?;

        if cai_data.is_empty() {
            return Err(Error::JumbfNotFound);
        }
        Ok(cai_data)
    }
}

impl CAIWriter for C2paIO {
    fn write_cai(
        &self,
        _input_stream: &mut dyn CAIRead,
        output_stream: &mut dyn CAIReadWrite,
        store_bytes: &[u8],
    ) -> Result<()> {
        output_stream.seek(SeekFrom::Start(0))?;
        output_stream.write_all(store_bytes)?;
        Ok(())
    }

    fn get_object_locations_from_stream(
        &self,
        input_stream: &mut dyn CAIRead,
    ) -> Result<Vec<HashObjectPositions>> {
        let length = input_stream.seek(SeekFrom::End(0))? as usize;
        input_stream.seek(SeekFrom::Start(0))?;

        Ok(vec![HashObjectPositions {
            offset: 0,
            length,
            htype: HashBlockObjectType::Cai,
        }])
    }

    fn remove_cai_store_from_stream(
        &self,
        _input_stream: &mut dyn CAIRead,
        _output_stream: &mut dyn CAIReadWrite,
    ) -> Result<()> {
        Ok(())
    }
}

impl ComposedManifestRef for C2paIO {
    fn compose_manifest(&self, manifest_data: &[u8], _format: &str) -> Result<Vec<u8>> {
        Ok(manifest_data.to_vec())
    }
}

impl AssetIO for C2paIO {
    fn new(_asset_type: &str) -> Self
    where
        Self: Sized,
    {
        C2paIO {}
    }

    fn get_handler(&self, asset_type: &str) -> Box<dyn AssetIO> {
        Box::new(C2paIO::new(asset_type))
    }

    fn get_reader(&self) -> &dyn CAIReader {
        self
    }

    fn get_writer(&self, asset_type: &str) -> Option<Box<dyn CAIWriter>> {
        Some(Box::new(C2paIO::new(asset_type)))
    }

    fn composed_data_ref(&self) -> Option<&dyn ComposedManifestRef> {
        Some(self)
    }

    fn is_embeddable(&self) -> bool {
        false
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

    #[test]
    fn sidecar_is_the_store() {
        let store = b"store".to_vec();
        let mut out = Cursor::new(Vec::new());
        C2paIO {}
            .write_cai(&mut Cursor::new(b"ignored".to_vec()), &mut out, &store)
            .unwrap();
        assert_eq!(out.get_ref(), &store);
        assert_eq!(C2paIO {}.read_cai(&mut out).unwrap(), store);
    }

    #[test]
    fn empty_sidecar_has_no_store() {
        let err = C2paIO {}
            .read_cai(&mut Cursor::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, Error::JumbfNotFound));
    }
}
