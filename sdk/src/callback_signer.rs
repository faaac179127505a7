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

#![deny(missing_docs)]

//! The `callback_signer` module provides a way to obtain a [`Signer`]
//! using a callback and public signing certificates.

use c2pa_crypto::{
    cose::check_certificate_chain_for_alg,
    raw_signature::{cert_chain_from_pem, SigningAlg},
};

use crate::{Error, Result, Signer};

/// Defines a callback function interface for a [`CallbackSigner`].
///
/// The callback should return a signature for the given data.
/// The callback should return an error if the data cannot be signed.
pub type CallbackFunc =
    dyn Fn(*const (), &[u8]) -> std::result::Result<Vec<u8>, Error> + Send + Sync;

/// Defines a signer that uses a callback to sign data.
///
/// The private key should only be known by the callback.
pub struct CallbackSigner {
    /// An opaque context for the signer (used for C bindings).
    pub context: *const (),

    /// The callback to use to sign data.
    pub callback: Box<CallbackFunc>,

    /// The signing algorithm to use.
    pub alg: SigningAlg,

    /// The DER certificate chain, signer first.
    certs: Vec<Vec<u8>>,

    /// The size of the reserved space for the signature.
    pub reserve_size: usize,

    /// The optional URL of a Time Stamp Authority.
    pub tsa_url: Option<String>,
}

// The context pointer is owned by the caller, who guarantees it stays valid
// and usable from the signing thread for the signer's lifetime.
unsafe impl Send for CallbackSigner {}
unsafe impl Sync for CallbackSigner {}

impl CallbackSigner {
    /// Create a new callback signer.
    ///
    /// `certs` is a PEM certificate chain, signer first. Fails if the chain
    /// does not parse or its signing certificate does not hold a key for
    /// `alg`.
    pub fn new<F, T>(callback: F, alg: SigningAlg, certs: T) -> Result<Self>
    where
        F: Fn(*const (), &[u8]) -> std::result::Result<Vec<u8>, Error> + Send + Sync + 'static,
        T: AsRef<[u8]>,
    {
        let pem = certs.as_ref();
        let certs = cert_chain_from_pem(pem)?;
        check_certificate_chain_for_alg(&certs, alg)?;

        let reserve_size = 10000 + pem.len();

        Ok(Self {
            context: std::ptr::null(),
            callback: Box::new(callback),
            alg,
            certs,
            reserve_size,
            tsa_url: None,
        })
    }

    /// Set the Time Stamp Authority URL.
    ///
    /// The URL is recorded with the signer. No time stamps are requested.
    pub fn set_tsa_url<S: Into<String>>(mut self, url: S) -> Self {
        self.tsa_url = Some(url.into());
        self
    }

    /// Set a context value for the signer.
    ///
    /// This can be used to pass data to the callback function.
    pub fn set_context(mut self, context: *const ()) -> Self {
        self.context = context;
        self
    }

    /// Override the space reserved for the signature box.
    pub fn set_reserve_size(mut self, reserve_size: usize) -> Self {
        self.reserve_size = reserve_size;
        self
    }
}

impl Signer for CallbackSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        (self.callback)(self.context, data)
    }

    fn alg(&self) -> SigningAlg {
        self.alg
    }

    fn certs(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self.certs.clone())
    }

    fn reserve_size(&self) -> usize {
        self.reserve_size
    }

    fn time_authority_url(&self) -> Option<String> {
        self.tsa_url.clone()
    }
}
