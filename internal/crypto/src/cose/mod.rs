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

//! COSE_Sign1 support for C2PA claim signatures.
//!
//! Signatures are produced with a detached payload: the claim bytes live in
//! their own JUMBF box and are supplied again at verification time.

mod certificate_profile;
pub use certificate_profile::{check_certificate_chain_for_alg, CertificateInfo};

mod error;
pub use error::CoseError;

mod sign;
pub use sign::{sign, sign_with_box_size};

pub use coset::CoseSign1;

mod sign1;
pub use sign1::parse_cose_sign1;

mod verify;
pub use verify::{signing_cert_info, verify_cose_sign1};
