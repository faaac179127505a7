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

use std::cell::RefCell;

use c2pa_crypto::{
    cose,
    raw_signature::{RawSigner, RawSignerError, SigningAlg},
};
use log::error;

use crate::{Error, Result};

/// The `Signer` trait generates a cryptographic signature over a byte array.
///
/// This trait exists to allow the signature mechanism to be extended. Native
/// credentials and host-language callbacks both implement it.
pub trait Signer {
    /// Returns a new byte array which is a signature over the original.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Returns the algorithm of the Signer.
    fn alg(&self) -> SigningAlg;

    /// Returns the certificates as a Vec containing a Vec of DER bytes for
    /// each certificate, starting with the end-entity certificate.
    fn certs(&self) -> Result<Vec<Vec<u8>>>;

    /// Returns the size in bytes of the largest possible expected signature.
    ///
    /// The manifest reserves exactly this many bytes for the COSE signature
    /// box. Signing fails if the result does not fit.
    fn reserve_size(&self) -> usize;

    /// URL for the time stamp authority, if one was configured.
    ///
    /// It is carried along with the signer; no time stamps are requested.
    fn time_authority_url(&self) -> Option<String> {
        None
    }
}

impl<T: Signer + ?Sized> Signer for Box<T> {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(data)
    }

    fn alg(&self) -> SigningAlg {
        (**self).alg()
    }

    fn certs(&self) -> Result<Vec<Vec<u8>>> {
        (**self).certs()
    }

    fn reserve_size(&self) -> usize {
        (**self).reserve_size()
    }

    fn time_authority_url(&self) -> Option<String> {
        (**self).time_authority_url()
    }
}

/// A [`Signer`] that can be moved to and shared between threads.
pub type BoxedSigner = Box<dyn Signer + Send + Sync>;

/// A [`Signer`] backed by one of the built-in raw signers.
pub(crate) struct RawSignerWrapper(pub(crate) Box<dyn RawSigner + Send + Sync>);

impl Signer for RawSignerWrapper {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.0.sign(data).map_err(|e| e.into())
    }

    fn alg(&self) -> SigningAlg {
        self.0.alg()
    }

    fn certs(&self) -> Result<Vec<Vec<u8>>> {
        self.0.cert_chain().map_err(|e| e.into())
    }

    fn reserve_size(&self) -> usize {
        self.0.reserve_size()
    }

    fn time_authority_url(&self) -> Option<String> {
        self.0.time_stamp_service_url()
    }
}

// Presents any Signer to the COSE layer. The COSE layer only knows raw
// signer errors, so the signer's own error is held here and handed back
// to the caller unchanged.
struct CoseSignerAdapter<'a> {
    signer: &'a dyn Signer,
    failure: RefCell<Option<Error>>,
}

impl<'a> CoseSignerAdapter<'a> {
    fn new(signer: &'a dyn Signer) -> Self {
        Self {
            signer,
            failure: RefCell::new(None),
        }
    }

    fn hold(&self, err: Error) -> RawSignerError {
        let raw = RawSignerError::InternalError(err.to_string());
        self.failure.borrow_mut().get_or_insert(err);
        raw
    }
}

impl RawSigner for CoseSignerAdapter<'_> {
    fn sign(&self, data: &[u8]) -> std::result::Result<Vec<u8>, RawSignerError> {
        self.signer.sign(data).map_err(|e| self.hold(e))
    }

    fn alg(&self) -> SigningAlg {
        self.signer.alg()
    }

    fn cert_chain(&self) -> std::result::Result<Vec<Vec<u8>>, RawSignerError> {
        self.signer.certs().map_err(|e| self.hold(e))
    }

    fn reserve_size(&self) -> usize {
        self.signer.reserve_size()
    }

    fn time_stamp_service_url(&self) -> Option<String> {
        self.signer.time_authority_url()
    }
}

/// Sign `claim_bytes` into a COSE_Sign1 structure of exactly `box_size` bytes.
///
/// The signature is checked against the claim before it is returned.
pub(crate) fn cose_sign(signer: &dyn Signer, claim_bytes: &[u8], box_size: usize) -> Result<Vec<u8>> {
    let adapter = CoseSignerAdapter::new(signer);
    let sig = cose::sign(&adapter, claim_bytes, Some(box_size))
        .map_err(|e| adapter.failure.take().unwrap_or_else(|| e.into()))?;

    if let Err(err) = cose::verify_cose_sign1(&sig, claim_bytes) {
        error!("Signature that was just generated does not validate: {err:#?}");
        return Err(err.into());
    }

    Ok(sig)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::utils::test_signer::test_signer;

    struct Oversized;

    impl Signer for Oversized {
        fn sign(&self, _data: &[u8]) -> Result<Vec<u8>> {
            Ok(vec![1u8; 4096])
        }

        fn alg(&self) -> SigningAlg {
            SigningAlg::Ed25519
        }

        fn certs(&self) -> Result<Vec<Vec<u8>>> {
            Ok(vec![vec![0u8; 16]])
        }

        fn reserve_size(&self) -> usize {
            1024
        }
    }

    #[test]
    fn signature_fills_the_box() {
        let signer = test_signer(SigningAlg::Es256);
        let sig = cose_sign(signer.as_ref(), b"claim", signer.reserve_size()).unwrap();
        assert_eq!(sig.len(), signer.reserve_size());
    }

    #[test]
    fn oversized_signature_is_rejected() {
        let err = cose_sign(&Oversized, b"claim", Oversized.reserve_size()).unwrap_err();
        assert!(matches!(err, Error::CoseSigboxTooSmall));
    }

    struct Refusing;

    impl Signer for Refusing {
        fn sign(&self, _data: &[u8]) -> Result<Vec<u8>> {
            Err(Error::CoseSigboxTooSmall)
        }

        fn alg(&self) -> SigningAlg {
            SigningAlg::Es256
        }

        fn certs(&self) -> Result<Vec<Vec<u8>>> {
            test_signer(SigningAlg::Es256).certs()
        }

        fn reserve_size(&self) -> usize {
            2048
        }
    }

    #[test]
    fn signer_errors_keep_their_kind() {
        let err = cose_sign(&Refusing, b"claim", Refusing.reserve_size()).unwrap_err();
        assert!(matches!(err, Error::CoseSigboxTooSmall));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }
}
