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

use thiserror::Error;

use crate::raw_signature::{RawSignatureValidationError, RawSignerError};

/// Describes errors that can occur when processing or generating [COSE]
/// signatures.
///
/// [COSE]: https://datatracker.ietf.org/doc/rfc9052/
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoseError {
    /// No signing certificate chain was found.
    #[error("missing signing certificate chain")]
    MissingSigningCertificateChain,

    /// The signature uses an algorithm this crate does not support.
    #[error("unsupported signing algorithm")]
    UnsupportedSigningAlgorithm,

    /// The signing certificate does not carry a key usable with the stated
    /// algorithm.
    #[error("the signing certificate does not match the signing algorithm ({0})")]
    CertificateMismatch(String),

    /// The reserved signature box is smaller than the generated signature.
    #[error("the signature box is too small for the generated signature")]
    BoxSizeTooSmall,

    /// An error occurred while parsing CBOR.
    #[error("error while parsing CBOR ({0})")]
    CborParsingError(String),

    /// An error occurred while generating CBOR.
    #[error("error while generating CBOR ({0})")]
    CborGenerationError(String),

    /// The raw signer reported an error.
    #[error(transparent)]
    RawSignerError(#[from] RawSignerError),

    /// The raw signature did not validate.
    #[error(transparent)]
    RawSignatureValidationError(#[from] RawSignatureValidationError),

    /// An unexpected internal error occured.
    #[error("internal error ({0})")]
    InternalError(String),
}
