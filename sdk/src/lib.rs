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

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

//! This library builds, signs, embeds and reads C2PA manifests in JPEG and
//! PNG images and in detached `.c2pa` manifest stores.
//!
//! Assets are always accessed through `Read + Seek` (and `Write`) streams, so
//! a host can supply files, memory buffers or its own stream callbacks.
//!
//! # Example: Reading a manifest store
//!
//! ```no_run
//! use c2pa_pipeline::{Reader, Result};
//!
//! # fn main() -> Result<()> {
//! let stream = std::fs::File::open("tests/fixtures/signed.jpg")?;
//! let reader = Reader::from_stream("image/jpeg", stream)?;
//! println!("{}", reader.json());
//!
//! if let Some(manifest) = reader.active_manifest() {
//!     for assertion in manifest.assertions() {
//!         println!("{}", assertion.label());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Adding a manifest to a stream
//!
//! ```no_run
//! use std::io::Cursor;
//!
//! use c2pa_pipeline::{create_signer, Builder, Result, SigningAlg};
//!
//! # fn main() -> Result<()> {
//! let mut builder = Builder::from_json(
//!     r#"{"claim_generator": "my_app/0.1", "assertions": [
//!         {"label": "org.contentauth.test", "data": {"my_tag": "Anything I want"}}
//!     ]}"#,
//! )?;
//!
//! let signer = create_signer::from_files("certs/es256.pub", "certs/es256.pem", SigningAlg::Es256, None)?;
//! let mut source = std::fs::File::open("tests/fixtures/sample.jpg")?;
//! let mut dest = Cursor::new(Vec::new());
//! builder.sign(signer.as_ref(), "image/jpeg", &mut source, &mut dest)?;
//! # Ok(())
//! # }
//! ```

/// The internal name of this library
pub const NAME: &str = "c2pa-pipeline";
/// The version of this library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// public modules
pub mod assertions;
pub mod callback_signer;
pub mod create_signer;
pub mod jumbf_io;
pub mod settings;
pub mod stream_adapter;
pub mod validation_status;

// public types
pub use assertion::{Assertion, AssertionBase, AssertionCbor, AssertionJson};
pub use assertions::{DataHash, Relationship};
pub use asset_io::{CAIRead, CAIReadWrite};
pub use builder::Builder;
pub use c2pa_crypto::raw_signature::SigningAlg;
pub use callback_signer::{CallbackFunc, CallbackSigner};
pub use claim_generator_info::ClaimGeneratorInfo;
pub use error::{Error, ErrorKind, Result};
pub use ingredient::Ingredient;
pub use manifest::{Manifest, ManifestAssertion, SignatureInfo};
pub use manifest_definition::{AssertionDefinition, AssertionKind, ManifestDefinition};
pub use reader::{AssetSource, Reader};
pub use resource_store::{ResourceRef, ResourceStore};
pub use signer::{BoxedSigner, Signer};
pub use utils::{hash_utils::HashRange, mime::format_to_mime};
pub use validation_status::ValidationStatus;

// crate private declarations
pub(crate) mod assertion;
pub(crate) mod asset_handlers;
pub(crate) mod asset_io;
pub(crate) mod builder;
pub(crate) mod claim;
pub(crate) mod claim_generator_info;
pub(crate) mod error;
pub(crate) mod hashed_uri;
pub(crate) mod ingredient;
pub(crate) mod jumbf;
pub(crate) mod manifest;
pub(crate) mod manifest_definition;
pub(crate) mod reader;
pub(crate) mod resource_store;
pub(crate) mod signer;
pub(crate) mod store;
pub(crate) mod utils;

/// Returns the supported asset formats as MIME types and extensions.
pub fn supported_formats() -> Vec<String> {
    jumbf_io::get_supported_types()
}
