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

use crate::raw_signature::{RawSignatureValidator, SigningAlg};

mod ecdsa_validator;
mod ed25519_validator;
mod rsa_validator;

use ecdsa_validator::EcdsaValidator;
use ed25519_validator::Ed25519Validator;
use rsa_validator::RsaValidator;

pub(crate) fn for_alg(alg: SigningAlg) -> Box<dyn RawSignatureValidator> {
    match alg {
        SigningAlg::Ed25519 => Box::new(Ed25519Validator {}),
        SigningAlg::Es256 => Box::new(EcdsaValidator::Es256),
        SigningAlg::Es384 => Box::new(EcdsaValidator::Es384),
        SigningAlg::Es512 => Box::new(EcdsaValidator::Es512),
        SigningAlg::Ps256 => Box::new(RsaValidator::Ps256),
        SigningAlg::Ps384 => Box::new(RsaValidator::Ps384),
        SigningAlg::Ps512 => Box::new(RsaValidator::Ps512),
    }
}
