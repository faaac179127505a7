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

use c2pa_crypto::{cose::CoseError, raw_signature::RawSignerError};
use thiserror::Error;

/// `Error` enumerates errors returned by the pipeline operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // --- manifest errors ---
    /// Could not find a claim with this label.
    #[error("claim missing: label = {label}")]
    ClaimMissing { label: String },

    /// The attempt to serialize the claim to CBOR failed.
    #[error("claim could not be converted to CBOR")]
    ClaimEncoding,

    #[error("claim could not be converted from CBOR: {0}")]
    ClaimDecoding(String),

    #[error("invalid claim content: {0}")]
    InvalidClaim(String),

    #[error("claim missing hard binding")]
    ClaimMissingHardBinding,

    /// The assertion could not be serialized.
    #[error("unable to encode assertion data")]
    AssertionEncoding,

    #[error("unable to decode assertion data: {0}")]
    AssertionDecoding(String),

    #[error("bad parameter: {0}")]
    BadParam(String),

    #[error("COSE Signature too big for JUMBF box")]
    CoseSigboxTooSmall,

    #[error("COSE Signer does not contain signing certificate")]
    CoseNoCerts,

    #[error(transparent)]
    CoseError(CoseError),

    #[error(transparent)]
    RawSignerError(#[from] RawSignerError),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("no JUMBF data found")]
    JumbfNotFound,

    #[error("required JUMBF box not found")]
    JumbfBoxNotFound,

    #[error(transparent)]
    JumbfParseError(#[from] crate::jumbf::boxes::JumbfParseError),

    /// Unable to generate valid JUMBF for a claim.
    #[error("could not create valid JUMBF for claim")]
    JumbfCreationError,

    #[error("manifest size changed from {expected} to {actual} bytes while signing")]
    ManifestSizeMismatch { expected: usize, actual: usize },

    #[error("type is unsupported")]
    UnsupportedType,

    #[error("embedding error")]
    EmbeddingError,

    #[error("asset could not be parsed: {0}")]
    InvalidAsset(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("resource already exists: {0}")]
    ResourceExists(String),

    #[error("hash verification( {0} )")]
    HashMismatch(String),

    #[error("claim verification failure: {0}")]
    ClaimVerification(String),

    #[error("unknown algorithm")]
    UnknownAlgorithm,

    #[error("incompatible archive version: {0}")]
    ArchiveVersion(String),

    #[error("archive could not be read: {0}")]
    ArchiveError(String),

    #[error("could not parse settings: {0}")]
    SettingsError(String),

    // --- third-party errors ---
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("CBOR error: {0}")]
    CborError(String),

    #[error(transparent)]
    ZipError(#[from] zip::result::ZipError),

    #[error(transparent)]
    UrlError(#[from] url::ParseError),

    #[error(transparent)]
    OtherError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// A specialized `Result` type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The coarse failure categories callers branch on.
///
/// `NotFound` is the "no provenance data" outcome that read paths treat as
/// a normal result rather than a defect.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    FileNotFound,
    Io,
    FormatNotSupported,
    InvalidArgument,
    Parse,
    Signature,
    Internal,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::JumbfNotFound | Error::ClaimMissing { .. } | Error::ResourceNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::FileNotFound(_) => ErrorKind::FileNotFound,
            Error::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::FileNotFound
            }
            Error::IoError(_) | Error::ZipError(zip::result::ZipError::Io(_)) => ErrorKind::Io,
            Error::UnsupportedType | Error::UnknownAlgorithm => ErrorKind::FormatNotSupported,
            Error::BadParam(_)
            | Error::CoseSigboxTooSmall
            | Error::CoseNoCerts
            | Error::ResourceExists(_)
            | Error::UrlError(_) => ErrorKind::InvalidArgument,
            Error::RawSignerError(RawSignerError::InvalidSigningCredentials(_)) => {
                ErrorKind::InvalidArgument
            }
            Error::ClaimDecoding(_)
            | Error::InvalidClaim(_)
            | Error::ClaimMissingHardBinding
            | Error::AssertionDecoding(_)
            | Error::JumbfBoxNotFound
            | Error::JumbfParseError(_)
            | Error::InvalidAsset(_)
            | Error::ArchiveVersion(_)
            | Error::ArchiveError(_)
            | Error::SettingsError(_)
            | Error::JsonError(_)
            | Error::CborError(_)
            | Error::ZipError(_) => ErrorKind::Parse,
            Error::CoseError(CoseError::BoxSizeTooSmall) => ErrorKind::InvalidArgument,
            Error::CoseError(_)
            | Error::RawSignerError(_)
            | Error::SigningFailed(_)
            | Error::HashMismatch(_)
            | Error::ClaimVerification(_) => ErrorKind::Signature,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<CoseError> for Error {
    fn from(err: CoseError) -> Self {
        match err {
            CoseError::BoxSizeTooSmall => Error::CoseSigboxTooSmall,
            CoseError::MissingSigningCertificateChain => Error::CoseNoCerts,
            CoseError::RawSignerError(e) => Error::SigningFailed(e.to_string()),
            err => Error::CoseError(err),
        }
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(err: ciborium::de::Error<std::io::Error>) -> Self {
        Error::CborError(err.to_string())
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(err: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::CborError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(Error::JumbfNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(Error::UnsupportedType.kind(), ErrorKind::FormatNotSupported);
        assert_eq!(Error::CoseSigboxTooSmall.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            Error::ArchiveVersion("2".to_string()).kind(),
            ErrorKind::Parse
        );
        assert_eq!(
            Error::SigningFailed("callback".to_string()).kind(),
            ErrorKind::Signature
        );
        assert_eq!(Error::EmbeddingError.kind(), ErrorKind::Internal);
    }

    #[test]
    fn missing_file_is_distinguished_from_io() {
        let e: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(e.kind(), ErrorKind::FileNotFound);

        let e: Error = std::io::Error::other("disk").into();
        assert_eq!(e.kind(), ErrorKind::Io);
    }

    #[test]
    fn archive_write_failure_is_io() {
        let e: Error = zip::result::ZipError::Io(std::io::Error::other("disk full")).into();
        assert_eq!(e.kind(), ErrorKind::Io);

        let e: Error = zip::result::ZipError::InvalidArchive("bad".into()).into();
        assert_eq!(e.kind(), ErrorKind::Parse);
    }

    #[test]
    fn cose_box_too_small_maps_to_sigbox_error() {
        let e: Error = CoseError::BoxSizeTooSmall.into();
        assert!(matches!(e, Error::CoseSigboxTooSmall));
    }
}
