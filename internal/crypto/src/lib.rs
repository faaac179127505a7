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

//! Cryptography internals for the C2PA manifest pipeline.
//!
//! This crate provides the raw signers and validators for every signing
//! algorithm allowed in a C2PA manifest, plus the COSE_Sign1 wrapper used to
//! sign claims.

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]

pub mod cose;
pub mod raw_signature;

#[cfg(test)]
pub(crate) mod tests;
