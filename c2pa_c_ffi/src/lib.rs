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

//! C language binding for c2pa-pipeline.
//!
//! Readers, builders, signers and streams are handed to C as opaque handles
//! registered by id. A handle that is unknown, already freed or of another
//! kind is reported as an error instead of being dereferenced. Failures are
//! latched per thread and read back with `c2pa_error`.

// Declare foundational modules first
mod error;
mod ffi_utils;

// Then macros that depend on them
#[macro_use]
mod ffi_macros;

// Then everything else
mod c2pa_stream;
mod c_api;
#[cfg(feature = "file_io")]
mod json_api;
mod signer_info;

pub use c2pa_pipeline::{
    Builder, Error as C2paPipelineError, Reader, Result as C2paPipelineResult, Signer, SigningAlg,
};
pub use c2pa_stream::*;
pub use c_api::*;
pub use error::{C2paError, Error, Result};
#[doc(hidden)]
pub use ffi_utils::{get_handles, handle_to_ptr, ptr_to_handle, Handle};
pub use signer_info::SignerInfo;
