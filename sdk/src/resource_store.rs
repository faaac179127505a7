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

#[cfg(feature = "file_io")]
use std::path::{Path, PathBuf};
use std::{borrow::Cow, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A reference to a resource to be used in JSON serialization
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct ResourceRef {
    pub format: String,
    pub identifier: String,
}

impl ResourceRef {
    pub fn new<S: Into<String>, I: Into<String>>(format: S, identifier: I) -> Self {
        Self {
            format: format.into(),
            identifier: identifier.into(),
        }
    }
}

/// Resource store to contain binary objects referenced from JSON serializable structures
///
/// Identifiers are unique. Adding an empty or existing identifier fails
/// rather than replacing the stored bytes.
#[derive(Clone, Debug, Default)]
pub struct ResourceStore {
    resources: BTreeMap<String, Vec<u8>>,
    #[cfg(feature = "file_io")]
    base_path: Option<PathBuf>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "file_io")]
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Identifiers not found in memory are looked up as files under this path.
    #[cfg(feature = "file_io")]
    pub fn set_base_path<P: Into<PathBuf>>(&mut self, base_path: P) {
        self.base_path = Some(base_path.into());
    }

    ///  generate a unique id for a given content type (adds a file extension)
    pub fn id_from(&self, key: &str, format: &str) -> String {
        let ext = match format {
            "jpg" | "jpeg" | "image/jpeg" => ".jpg",
            "png" | "image/png" => ".png",
            "c2pa" | "application/c2pa" => ".c2pa",
            _ => "",
        };
        // clean string for possible filesystem use
        let id_base = key.replace(['/', ':', '#', '='], "-");

        // ensure it is unique in this store
        let mut count = 1;
        let mut id = format!("{id_base}{ext}");
        while self.exists(&id) {
            id = format!("{id_base}-{count}{ext}");
            count += 1;
        }
        id
    }

    /// Adds a resource, generating a resource ref from a key and format.
    ///
    /// The generated identifier may be different from the key
    pub fn add_with<R>(&mut self, key: &str, format: &str, value: R) -> Result<ResourceRef>
    where
        R: Into<Vec<u8>>,
    {
        let id = self.id_from(key, format);
        self.add(&id, value)?;
        Ok(ResourceRef::new(format, id))
    }

    /// Adds a resource, using a given id value.
    pub fn add<S, R>(&mut self, id: S, value: R) -> Result<()>
    where
        S: Into<String>,
        R: Into<Vec<u8>>,
    {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::BadParam("resource identifier is empty".to_owned()));
        }
        if self.resources.contains_key(&id) {
            return Err(Error::ResourceExists(id));
        }
        self.resources.insert(id, value.into());
        Ok(())
    }

    pub fn resources(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.resources
    }

    /// Returns a copy on write reference to the resource if found.
    ///
    /// returns Error::ResourceNotFound if it cannot find a resource matching that id
    pub fn get(&self, id: &str) -> Result<Cow<'_, Vec<u8>>> {
        if let Some(value) = self.resources.get(id) {
            return Ok(Cow::Borrowed(value));
        }

        #[cfg(feature = "file_io")]
        if let Some(path) = self.path_for_id(id) {
            if path.is_file() {
                return Ok(Cow::Owned(std::fs::read(path)?));
            }
        }

        Err(Error::ResourceNotFound(id.to_owned()))
    }

    /// Returns true if the resource has been added or exists as file.
    pub fn exists(&self, id: &str) -> bool {
        if self.resources.contains_key(id) {
            return true;
        }
        #[cfg(feature = "file_io")]
        if let Some(path) = self.path_for_id(id) {
            return path.is_file();
        }
        false
    }

    // return the full path for an id
    #[cfg(feature = "file_io")]
    fn path_for_id(&self, id: &str) -> Option<PathBuf> {
        self.base_path.as_ref().map(|base| base.join(id))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn resource_store() {
        let mut c = ResourceStore::new();
        let value = b"my value";
        c.add("abc123.jpg", value.to_vec()).unwrap();
        assert!(c.exists("abc123.jpg"));
        assert_eq!(c.get("abc123.jpg").unwrap().as_slice(), value);

        let r = c.add_with("abc123", "image/jpeg", b"other".to_vec()).unwrap();
        assert_eq!(r.identifier, "abc123-1.jpg");
        assert_eq!(r.format, "image/jpeg");

        let id = c.id_from("self#jumbf=/c2pa/urn:uuid:1/c2pa.assertions/x", "png");
        assert!(!id.contains(['/', ':', '#']));
    }

    #[test]
    fn duplicates_and_empty_ids_are_rejected() {
        let mut c = ResourceStore::new();
        c.add("thumb", vec![1u8]).unwrap();

        let err = c.add("thumb", vec![2u8]).unwrap_err();
        assert!(matches!(err, Error::ResourceExists(_)));
        assert_eq!(c.get("thumb").unwrap().as_slice(), &[1u8]);

        let err = c.add("", vec![2u8]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);

        let err = c.get("missing").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[test]
    #[cfg(feature = "file_io")]
    fn falls_back_to_base_path() {
        let mut c = ResourceStore::new();
        c.set_base_path(crate::utils::test::fixture_path(""));
        assert!(c.exists("thumbnail.jpg"));
        assert!(!c.get("thumbnail.jpg").unwrap().is_empty());
        assert!(!c.exists("nope.jpg"));
    }
}
