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

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    error::{Error, Result},
    jumbf::boxes::{
        EmbeddedFile, JUMBFSuperBox, CAI_CBOR_ASSERTION_UUID, CAI_EMBEDDED_FILE_UUID,
        CAI_JSON_ASSERTION_UUID, CBOR_TYPE, JSON_TYPE,
    },
    utils::cbor_json::cbor_to_json,
};

/// The core required trait for all assertions.
///
/// This defines the label for the assertion and supplies the to/from
/// converters for the C2PA assertion format.
pub trait AssertionBase
where
    Self: Sized,
{
    const LABEL: &'static str = "unknown";

    /// Returns a label for this assertion.
    fn label(&self) -> &str {
        Self::LABEL
    }

    /// Returns an Assertion upon success or Error otherwise.
    fn to_assertion(&self) -> Result<Assertion>;

    /// Returns Self or an AssertionDecoding error from an assertion.
    fn from_assertion(assertion: &Assertion) -> Result<Self>;
}

/// Trait to handle default CBOR encoding/decoding of Assertions
pub trait AssertionCbor: Serialize + DeserializeOwned + AssertionBase {
    fn to_cbor_assertion(&self) -> Result<Assertion> {
        let mut data = Vec::new();
        ciborium::into_writer(self, &mut data).map_err(|_err| Error::AssertionEncoding)?;
        Ok(Assertion::new(self.label(), AssertionData::Cbor(data)))
    }

    fn from_cbor_assertion(assertion: &Assertion) -> Result<Self> {
        match assertion.decode_data() {
            AssertionData::Cbor(data) => ciborium::from_reader(data.as_slice())
                .map_err(|e| Error::AssertionDecoding(format!("{}: {e}", assertion.label()))),
            _ => Err(Error::AssertionDecoding(format!(
                "{}: expected cbor data",
                assertion.label()
            ))),
        }
    }
}

/// Trait to handle default JSON encoding/decoding of Assertions
pub trait AssertionJson: Serialize + DeserializeOwned + AssertionBase {
    fn to_json_assertion(&self) -> Result<Assertion> {
        let data =
            AssertionData::Json(serde_json::to_string(self).map_err(|_| Error::AssertionEncoding)?);
        Ok(Assertion::new(self.label(), data))
    }

    fn from_json_assertion(assertion: &Assertion) -> Result<Self> {
        match assertion.decode_data() {
            AssertionData::Json(data) => serde_json::from_str(data)
                .map_err(|e| Error::AssertionDecoding(format!("{}: {e}", assertion.label()))),
            _ => Err(Error::AssertionDecoding(format!(
                "{}: expected json data",
                assertion.label()
            ))),
        }
    }
}

/// Assertion payload, as stored in the assertion's JUMBF box.
#[derive(Clone, PartialEq, Eq)]
pub enum AssertionData {
    Json(String),
    Cbor(Vec<u8>),
    EmbeddedFile(EmbeddedFile),
}

impl fmt::Debug for AssertionData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Json(s) => write!(f, "{s:?}"),
            Self::Cbor(c) => match cbor_to_json(c) {
                Ok(v) => write!(f, "{v}"),
                Err(_) => write!(f, "<invalid cbor>"),
            },
            Self::EmbeddedFile(e) => write!(f, "{}, <omitted>", e.media_type),
        }
    }
}

/// A labeled assertion in a manifest's assertion store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion {
    label: String,
    data: AssertionData,
}

impl Assertion {
    pub(crate) fn new(label: &str, data: AssertionData) -> Self {
        Self {
            label: label.to_owned(),
            data,
        }
    }

    pub(crate) fn from_data_cbor(label: &str, binary_data: &[u8]) -> Self {
        Self::new(label, AssertionData::Cbor(binary_data.to_vec()))
    }

    pub(crate) fn from_data_json(label: &str, binary_data: &[u8]) -> Result<Self> {
        let json = String::from_utf8(binary_data.to_vec())
            .map_err(|_| Error::AssertionDecoding(format!("{label}: json is not utf-8")))?;
        Ok(Self::new(label, AssertionData::Json(json)))
    }

    pub(crate) fn from_embedded_file(
        label: &str,
        media_type: &str,
        file_name: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        Self::new(
            label,
            AssertionData::EmbeddedFile(EmbeddedFile {
                media_type: media_type.to_owned(),
                file_name,
                data,
            }),
        )
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub(crate) fn decode_data(&self) -> &AssertionData {
        &self.data
    }

    /// Return a reference to the payload bytes.
    pub(crate) fn data(&self) -> &[u8] {
        match &self.data {
            AssertionData::Json(x) => x.as_bytes(),
            AssertionData::Cbor(x) => x,
            AssertionData::EmbeddedFile(e) => &e.data,
        }
    }

    /// Return the assertion as a serde_json value.
    ///
    /// CBOR byte strings become arrays of numbers.
    pub(crate) fn as_json_object(&self) -> Result<Value> {
        match &self.data {
            AssertionData::Json(x) => serde_json::from_str(x)
                .map_err(|e| Error::AssertionDecoding(format!("{}: {e}", self.label))),
            AssertionData::Cbor(x) => cbor_to_json(x),
            AssertionData::EmbeddedFile(e) => Ok(serde_json::json!({
                "format": e.media_type,
                "identifier": e.file_name,
            })),
        }
    }

    /// Build the assertion's JUMBF superbox.
    pub(crate) fn to_superbox(&self) -> Result<JUMBFSuperBox> {
        let sb = match &self.data {
            AssertionData::Json(x) => {
                let mut sb = JUMBFSuperBox::new(&self.label, CAI_JSON_ASSERTION_UUID)?;
                sb.add_content(JSON_TYPE, x.as_bytes().to_vec());
                sb
            }
            AssertionData::Cbor(x) => {
                let mut sb = JUMBFSuperBox::new(&self.label, CAI_CBOR_ASSERTION_UUID)?;
                sb.add_content(CBOR_TYPE, x.clone());
                sb
            }
            AssertionData::EmbeddedFile(e) => {
                let mut sb = JUMBFSuperBox::new(&self.label, CAI_EMBEDDED_FILE_UUID)?;
                e.add_to(&mut sb);
                sb
            }
        };
        Ok(sb)
    }

    /// Decode an assertion from its JUMBF superbox.
    pub(crate) fn from_superbox(sb: &JUMBFSuperBox) -> Result<Self> {
        let label = sb.label();
        let uuid = sb.uuid();

        if uuid == CAI_JSON_ASSERTION_UUID {
            let data = sb.content_of_type(&JSON_TYPE).ok_or_else(|| {
                Error::AssertionDecoding(format!("{label}: missing json box"))
            })?;
            Self::from_data_json(&label, data)
        } else if uuid == CAI_CBOR_ASSERTION_UUID {
            let data = sb.content_of_type(&CBOR_TYPE).ok_or_else(|| {
                Error::AssertionDecoding(format!("{label}: missing cbor box"))
            })?;
            Ok(Self::from_data_cbor(&label, data))
        } else if uuid == CAI_EMBEDDED_FILE_UUID {
            let file = EmbeddedFile::from_superbox(sb)?;
            Ok(Self::new(&label, AssertionData::EmbeddedFile(file)))
        } else {
            Err(Error::AssertionDecoding(format!(
                "{label}: unsupported assertion type {uuid}"
            )))
        }
    }
}
