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

use std::cell::RefCell;

use c2pa_pipeline::ErrorKind;
use thiserror::Error;

thread_local! {
    static LAST_ERROR: RefCell<Option<C2paError>> = const { RefCell::new(None) };
}

#[derive(Error, Debug)]
/// Errors reported across the C boundary.
///
/// The display form is always `"<Type>: <message>"` so host languages can
/// map the prefix back onto their own exception types.
pub enum C2paError {
    #[error("Decoding: {0}")]
    Decoding(String),
    #[error("Encoding: {0}")]
    Encoding(String),
    #[error("FileNotFound: {0}")]
    FileNotFound(String),
    #[error("Io: {0}")]
    Io(String),
    #[error("Json: {0}")]
    Json(String),
    #[error("Manifest: {0}")]
    Manifest(String),
    #[error("ManifestNotFound: {0}")]
    ManifestNotFound(String),
    #[error("NotSupported: {0}")]
    NotSupported(String),
    #[error("Other: {0}")]
    Other(String),
    #[error("NullParameter: {0}")]
    NullParameter(String),
    #[error("Remote: {0}")]
    RemoteManifest(String),
    #[error("ResourceNotFound: {0}")]
    ResourceNotFound(String),
    #[error("Signature: {0}")]
    Signature(String),
    #[error("Verify: {0}")]
    Verify(String),
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),
    #[error("StringTooLong: {0}")]
    StringTooLong(String),
    #[error("InvalidHandle: {0}")]
    InvalidHandle(u64),
    #[error("WrongHandleType: {0}")]
    WrongHandleType(u64),
}

pub type Error = C2paError;
pub type Result<T> = std::result::Result<T, Error>;

impl C2paError {
    /// Returns the error code for this error type
    pub fn code(&self) -> i32 {
        match self {
            Self::Decoding(_) => 102,
            Self::Encoding(_) => 103,
            Self::FileNotFound(_) => 104,
            Self::Io(_) => 105,
            Self::Json(_) => 106,
            Self::Manifest(_) => 107,
            Self::ManifestNotFound(_) => 108,
            Self::NotSupported(_) => 109,
            Self::Other(_) => 110,
            Self::NullParameter(_) => 111,
            Self::RemoteManifest(_) => 112,
            Self::ResourceNotFound(_) => 113,
            Self::Signature(_) => 114,
            Self::Verify(_) => 115,
            Self::InvalidArgument(_) => 116,
            Self::StringTooLong(_) => 117,
            Self::InvalidHandle(_) => 118,
            Self::WrongHandleType(_) => 119,
        }
    }

    /// Latch this error as the last error of the calling thread.
    pub fn set_last(self) {
        log::debug!("c2pa ffi error: {self}");
        LAST_ERROR.with(|last| *last.borrow_mut() = Some(self));
    }

    /// Take the last error of the calling thread, clearing it.
    pub fn take_last() -> Option<Self> {
        LAST_ERROR.with(|last| last.borrow_mut().take())
    }

    /// The message of the last error, or an empty string. Does not clear it.
    pub fn last_message() -> String {
        LAST_ERROR.with(|last| {
            last.borrow()
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default()
        })
    }

    // Pipeline errors are mapped by kind, keeping their message.
    pub(crate) fn from_pipeline_error(err: c2pa_pipeline::Error) -> Self {
        use c2pa_pipeline::Error as E;

        let msg = err.to_string();
        match (&err, err.kind()) {
            (E::ResourceNotFound(_), _) => Self::ResourceNotFound(msg),
            (_, ErrorKind::NotFound) => Self::ManifestNotFound(msg),
            (_, ErrorKind::FileNotFound) => Self::FileNotFound(msg),
            (_, ErrorKind::Io) => Self::Io(msg),
            (_, ErrorKind::FormatNotSupported) => Self::NotSupported(msg),
            (E::UrlError(_), _) => Self::RemoteManifest(msg),
            (_, ErrorKind::InvalidArgument) => Self::InvalidArgument(msg),
            (E::JsonError(_), _) => Self::Json(msg),
            (E::ClaimMissingHardBinding | E::InvalidClaim(_), _) => Self::Manifest(msg),
            (_, ErrorKind::Parse) => Self::Decoding(msg),
            (E::HashMismatch(_) | E::ClaimVerification(_), _) => Self::Verify(msg),
            (_, ErrorKind::Signature) => Self::Signature(msg),
            (E::ClaimEncoding | E::AssertionEncoding | E::JumbfCreationError, _) => {
                Self::Encoding(msg)
            }
            _ => Self::Other(msg),
        }
    }

    /// Converts a type and message to an Error.
    ///
    /// Unrecognized types become [`C2paError::Other`] with the type kept in
    /// the message.
    pub fn from_type_and_message<S: Into<String>>(error_type: &str, error_message: S) -> Self {
        let error_message = error_message.into();
        match error_type {
            "Decoding" => Self::Decoding(error_message),
            "Encoding" => Self::Encoding(error_message),
            "FileNotFound" => Self::FileNotFound(error_message),
            "Io" => Self::Io(error_message),
            "Json" => Self::Json(error_message),
            "Manifest" => Self::Manifest(error_message),
            "ManifestNotFound" => Self::ManifestNotFound(error_message),
            "NotSupported" => Self::NotSupported(error_message),
            "Other" => Self::Other(error_message),
            "NullParameter" => Self::NullParameter(error_message),
            "Remote" => Self::RemoteManifest(error_message),
            "ResourceNotFound" => Self::ResourceNotFound(error_message),
            "Signature" => Self::Signature(error_message),
            "Verify" => Self::Verify(error_message),
            "InvalidArgument" => Self::InvalidArgument(error_message),
            "StringTooLong" => Self::StringTooLong(error_message),
            _ => Self::Other(format!("{error_type}: {error_message}")),
        }
    }
}

impl From<c2pa_pipeline::Error> for C2paError {
    fn from(err: c2pa_pipeline::Error) -> Self {
        Self::from_pipeline_error(err)
    }
}

impl From<std::io::Error> for C2paError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for C2paError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<&str> for C2paError {
    fn from(err: &str) -> Self {
        // only the first ": " separates the type
        match err.split_once(": ") {
            Some((error_type, message)) => Self::from_type_and_message(error_type, message),
            None => Self::Other(err.to_string()),
        }
    }
}

impl From<String> for C2paError {
    fn from(err: String) -> Self {
        Self::from(err.as_str())
    }
}
