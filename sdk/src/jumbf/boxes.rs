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

//! JUMBF (ISO/IEC 19566-5) box model.
//!
//! A superbox (`jumb`) holds a description box (`jumd`) followed by any
//! number of data boxes, which are either nested superboxes or content
//! boxes. Content boxes are kept as raw bytes so that a parsed tree
//! serializes back to the identical byte sequence.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use hex::FromHex;
use thiserror::Error;

/// `JumbfParseError` enumerates errors detected while parsing JUMBF data structures.
#[derive(Debug, Error)]
pub enum JumbfParseError {
    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("invalid box header")]
    InvalidBoxHeader,

    #[error("invalid box range")]
    InvalidBoxRange,

    #[error("invalid JUMB box")]
    InvalidJumbBox,

    #[error("invalid description box")]
    InvalidDescriptionBox,

    #[error("invalid UUID label")]
    InvalidUuidValue,

    #[error("invalid embedded file box")]
    InvalidEmbeddedFileBox,
}

impl From<std::io::Error> for JumbfParseError {
    fn from(_err: std::io::Error) -> Self {
        JumbfParseError::UnexpectedEof
    }
}

pub type JumbfParseResult<T> = std::result::Result<T, JumbfParseError>;

// ANCHOR JUMBF box types
pub const JUMB_TYPE: [u8; 4] = *b"jumb";
pub const JUMD_TYPE: [u8; 4] = *b"jumd";
pub const JSON_TYPE: [u8; 4] = *b"json";
pub const CBOR_TYPE: [u8; 4] = *b"cbor";
pub const EMBEDDED_FILE_DESC_TYPE: [u8; 4] = *b"bfdb";
pub const EMBEDDED_FILE_DATA_TYPE: [u8; 4] = *b"bidb";

// ANCHOR C2PA UUIDs
pub const CAI_BLOCK_UUID: &str = "6332706100110010800000AA00389B71"; // c2pa
pub const CAI_STORE_UUID: &str = "63326D6100110010800000AA00389B71"; // c2ma
pub const CAI_ASSERTION_STORE_UUID: &str = "6332617300110010800000AA00389B71"; // c2as
pub const CAI_CLAIM_UUID: &str = "6332636C00110010800000AA00389B71"; // c2cl
pub const CAI_SIGNATURE_UUID: &str = "6332637300110010800000AA00389B71"; // c2cs
pub const CAI_JSON_ASSERTION_UUID: &str = "6A736F6E00110010800000AA00389B71"; // json
pub const CAI_CBOR_ASSERTION_UUID: &str = "63626F7200110010800000AA00389B71"; // cbor
pub const CAI_EMBEDDED_FILE_UUID: &str = "40CB0C32BB8A489DA70B2AD6F47F4369";

const BOX_HDR_LEN: usize = 8;

// Requestable + Label Present
const DEFAULT_TOGGLES: u8 = 0x03;
const TOGGLE_LABEL: u8 = 0x02;
const TOGGLE_ID: u8 = 0x04;
const TOGGLE_SIGNATURE: u8 = 0x08;

fn write_box_header(
    out: &mut Vec<u8>,
    box_type: &[u8; 4],
    payload_len: usize,
) -> JumbfParseResult<()> {
    let len = u32::try_from(payload_len + BOX_HDR_LEN)
        .map_err(|_| JumbfParseError::InvalidBoxRange)?;
    out.write_u32::<BigEndian>(len)?;
    out.extend_from_slice(box_type);
    Ok(())
}

// Split off the next box, returning its type, payload and the remaining bytes.
fn next_box(buf: &[u8]) -> JumbfParseResult<([u8; 4], &[u8], &[u8])> {
    if buf.len() < BOX_HDR_LEN {
        return Err(JumbfParseError::UnexpectedEof);
    }

    let mut rdr = Cursor::new(buf);
    let lbox = rdr.read_u32::<BigEndian>()? as u64;
    let mut box_type = [0u8; 4];
    rdr.read_exact(&mut box_type)?;

    let (hdr_len, total_len) = match lbox {
        0 => (BOX_HDR_LEN as u64, buf.len() as u64),
        1 => {
            let xlbox = rdr.read_u64::<BigEndian>()?;
            (BOX_HDR_LEN as u64 + 8, xlbox)
        }
        2..=7 => return Err(JumbfParseError::InvalidBoxHeader),
        n => (BOX_HDR_LEN as u64, n),
    };

    if total_len < hdr_len || total_len > buf.len() as u64 {
        return Err(JumbfParseError::InvalidBoxRange);
    }

    let (this_box, rest) = buf.split_at(total_len as usize);
    Ok((box_type, &this_box[hdr_len as usize..], rest))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JUMBFDescriptionBox {
    box_uuid: [u8; 16],          // a 128-bit UUID for the type
    toggles: u8,                 // bit field for valid values
    label: Option<String>,       // null terminated UTF-8 string (OPTIONAL)
    box_id: Option<u32>,         // user assigned value (OPTIONAL)
    signature: Option<[u8; 32]>, // SHA-256 hash of the payload (OPTIONAL)
    private: Vec<u8>,            // private box bytes, kept verbatim
}

impl JUMBFDescriptionBox {
    /// Makes a new `JUMBFDescriptionBox` instance.
    pub fn new(box_label: &str, a_type: &str) -> JumbfParseResult<Self> {
        Ok(JUMBFDescriptionBox {
            box_uuid: <[u8; 16]>::from_hex(a_type)
                .map_err(|_| JumbfParseError::InvalidUuidValue)?,
            toggles: DEFAULT_TOGGLES,
            label: Some(box_label.to_owned()),
            box_id: None,
            signature: None,
            private: Vec::new(),
        })
    }

    pub fn uuid(&self) -> String {
        hex::encode(self.box_uuid).to_uppercase()
    }

    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_default()
    }

    fn write(&self, out: &mut Vec<u8>) -> JumbfParseResult<()> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&self.box_uuid);
        payload.push(self.toggles);
        if let Some(label) = &self.label {
            payload.extend_from_slice(label.as_bytes());
            payload.push(0);
        }
        if let Some(id) = self.box_id {
            payload.write_u32::<BigEndian>(id)?;
        }
        if let Some(sig) = &self.signature {
            payload.extend_from_slice(sig);
        }
        payload.extend_from_slice(&self.private);

        write_box_header(out, &JUMD_TYPE, payload.len())?;
        out.extend_from_slice(&payload);
        Ok(())
    }

    fn parse(payload: &[u8]) -> JumbfParseResult<Self> {
        if payload.len() < 17 {
            return Err(JumbfParseError::InvalidDescriptionBox);
        }

        let mut box_uuid = [0u8; 16];
        box_uuid.copy_from_slice(&payload[..16]);
        let toggles = payload[16];
        let mut rest = &payload[17..];

        let label = if toggles & TOGGLE_LABEL != 0 {
            let end = rest
                .iter()
                .position(|b| *b == 0)
                .ok_or(JumbfParseError::InvalidDescriptionBox)?;
            let label = std::str::from_utf8(&rest[..end])
                .map_err(|_| JumbfParseError::InvalidDescriptionBox)?
                .to_owned();
            rest = &rest[end + 1..];
            Some(label)
        } else {
            None
        };

        let box_id = if toggles & TOGGLE_ID != 0 {
            let id = Cursor::new(rest).read_u32::<BigEndian>()?;
            rest = &rest[4..];
            Some(id)
        } else {
            None
        };

        let signature = if toggles & TOGGLE_SIGNATURE != 0 {
            if rest.len() < 32 {
                return Err(JumbfParseError::InvalidDescriptionBox);
            }
            let mut sig = [0u8; 32];
            sig.copy_from_slice(&rest[..32]);
            rest = &rest[32..];
            Some(sig)
        } else {
            None
        };

        Ok(JUMBFDescriptionBox {
            box_uuid,
            toggles,
            label,
            box_id,
            signature,
            private: rest.to_vec(),
        })
    }
}

/// A leaf box whose payload is not interpreted by the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JUMBFContentBox {
    box_type: [u8; 4],
    data: Vec<u8>,
}

impl JUMBFContentBox {
    pub fn new(box_type: [u8; 4], data: Vec<u8>) -> Self {
        JUMBFContentBox { box_type, data }
    }

    pub fn box_type(&self) -> &[u8; 4] {
        &self.box_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JUMBFBox {
    Super(JUMBFSuperBox),
    Content(JUMBFContentBox),
}

impl JUMBFBox {
    fn write(&self, out: &mut Vec<u8>) -> JumbfParseResult<()> {
        match self {
            JUMBFBox::Super(sb) => sb.write(out),
            JUMBFBox::Content(cb) => {
                write_box_header(out, &cb.box_type, cb.data.len())?;
                out.extend_from_slice(&cb.data);
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JUMBFSuperBox {
    desc_box: JUMBFDescriptionBox,
    data_boxes: Vec<JUMBFBox>,
}

impl JUMBFSuperBox {
    /// Makes a new, empty superbox with the given label and type UUID (hex).
    pub fn new(box_label: &str, a_type: &str) -> JumbfParseResult<Self> {
        Ok(JUMBFSuperBox {
            desc_box: JUMBFDescriptionBox::new(box_label, a_type)?,
            data_boxes: Vec::new(),
        })
    }

    pub fn add_superbox(&mut self, sb: JUMBFSuperBox) {
        self.data_boxes.push(JUMBFBox::Super(sb));
    }

    pub fn add_content(&mut self, box_type: [u8; 4], data: Vec<u8>) {
        self.data_boxes
            .push(JUMBFBox::Content(JUMBFContentBox::new(box_type, data)));
    }

    pub fn label(&self) -> String {
        self.desc_box.label()
    }

    pub fn uuid(&self) -> String {
        self.desc_box.uuid()
    }

    pub fn superboxes(&self) -> impl Iterator<Item = &JUMBFSuperBox> {
        self.data_boxes.iter().filter_map(|b| match b {
            JUMBFBox::Super(sb) => Some(sb),
            JUMBFBox::Content(_) => None,
        })
    }

    pub fn content_boxes(&self) -> impl Iterator<Item = &JUMBFContentBox> {
        self.data_boxes.iter().filter_map(|b| match b {
            JUMBFBox::Content(cb) => Some(cb),
            JUMBFBox::Super(_) => None,
        })
    }

    /// The first direct child superbox with this label.
    pub fn find_superbox(&self, label: &str) -> Option<&JUMBFSuperBox> {
        self.superboxes().find(|sb| sb.label() == label)
    }

    /// The payload of the first content box of the given type.
    pub fn content_of_type(&self, box_type: &[u8; 4]) -> Option<&[u8]> {
        self.content_boxes()
            .find(|cb| cb.box_type() == box_type)
            .map(|cb| cb.data())
    }

    fn write(&self, out: &mut Vec<u8>) -> JumbfParseResult<()> {
        let mut payload = Vec::new();
        self.desc_box.write(&mut payload)?;
        for b in &self.data_boxes {
            b.write(&mut payload)?;
        }

        write_box_header(out, &JUMB_TYPE, payload.len())?;
        out.extend_from_slice(&payload);
        Ok(())
    }

    /// Serialize the superbox, including its own box header.
    pub fn to_bytes(&self) -> JumbfParseResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }

    /// Parse a complete superbox. Trailing bytes after the box are ignored.
    pub fn from_bytes(buf: &[u8]) -> JumbfParseResult<Self> {
        let (box_type, payload, _rest) = next_box(buf)?;
        if box_type != JUMB_TYPE {
            return Err(JumbfParseError::InvalidJumbBox);
        }
        Self::parse_payload(payload)
    }

    fn parse_payload(payload: &[u8]) -> JumbfParseResult<Self> {
        let (desc_type, desc_payload, mut rest) = next_box(payload)?;
        if desc_type != JUMD_TYPE {
            return Err(JumbfParseError::InvalidJumbBox);
        }
        let desc_box = JUMBFDescriptionBox::parse(desc_payload)?;

        let mut data_boxes = Vec::new();
        while !rest.is_empty() {
            let (box_type, box_payload, remaining) = next_box(rest)?;
            if box_type == JUMB_TYPE {
                data_boxes.push(JUMBFBox::Super(Self::parse_payload(box_payload)?));
            } else {
                data_boxes.push(JUMBFBox::Content(JUMBFContentBox::new(
                    box_type,
                    box_payload.to_vec(),
                )));
            }
            rest = remaining;
        }

        Ok(JUMBFSuperBox {
            desc_box,
            data_boxes,
        })
    }
}

/// An embedded file decoded from a `bfdb` + `bidb` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedFile {
    pub media_type: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

const EMBEDDED_FILE_NAME_PRESENT: u8 = 0x01;

impl EmbeddedFile {
    /// Append the description and data boxes to an embedded file superbox.
    pub fn add_to(&self, sb: &mut JUMBFSuperBox) {
        let mut desc = Vec::new();
        let toggles = if self.file_name.is_some() {
            EMBEDDED_FILE_NAME_PRESENT
        } else {
            0
        };
        desc.push(toggles);
        desc.extend_from_slice(self.media_type.as_bytes());
        desc.push(0);
        if let Some(name) = &self.file_name {
            desc.extend_from_slice(name.as_bytes());
            desc.push(0);
        }

        sb.add_content(EMBEDDED_FILE_DESC_TYPE, desc);
        sb.add_content(EMBEDDED_FILE_DATA_TYPE, self.data.clone());
    }

    pub fn from_superbox(sb: &JUMBFSuperBox) -> JumbfParseResult<Self> {
        let desc = sb
            .content_of_type(&EMBEDDED_FILE_DESC_TYPE)
            .ok_or(JumbfParseError::InvalidEmbeddedFileBox)?;
        let data = sb
            .content_of_type(&EMBEDDED_FILE_DATA_TYPE)
            .ok_or(JumbfParseError::InvalidEmbeddedFileBox)?;

        let (toggles, strings) = desc
            .split_first()
            .ok_or(JumbfParseError::InvalidEmbeddedFileBox)?;
        let mut parts = strings.split(|b| *b == 0).map(|s| {
            std::str::from_utf8(s)
                .map(|s| s.to_owned())
                .map_err(|_| JumbfParseError::InvalidEmbeddedFileBox)
        });

        let media_type = parts
            .next()
            .ok_or(JumbfParseError::InvalidEmbeddedFileBox)??;
        let file_name = if toggles & EMBEDDED_FILE_NAME_PRESENT != 0 {
            Some(
                parts
                    .next()
                    .ok_or(JumbfParseError::InvalidEmbeddedFileBox)??,
            )
        } else {
            None
        };

        Ok(EmbeddedFile {
            media_type,
            file_name,
            data: data.to_vec(),
        })
    }
}
