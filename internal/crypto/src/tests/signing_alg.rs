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

use crate::raw_signature::{SigningAlg, UnknownAlgorithmError};

#[test]
fn alg_from_str() {
    assert_eq!("es256".parse(), Ok(SigningAlg::Es256));
    assert_eq!("es384".parse(), Ok(SigningAlg::Es384));
    assert_eq!("es512".parse(), Ok(SigningAlg::Es512));
    assert_eq!("ps256".parse(), Ok(SigningAlg::Ps256));
    assert_eq!("ps384".parse(), Ok(SigningAlg::Ps384));
    assert_eq!("ps512".parse(), Ok(SigningAlg::Ps512));
    assert_eq!("ed25519".parse(), Ok(SigningAlg::Ed25519));

    // Header constants from C callers are upper case.
    assert_eq!("ES256".parse(), Ok(SigningAlg::Es256));
    assert_eq!("Ed25519".parse(), Ok(SigningAlg::Ed25519));

    let r: Result<SigningAlg, UnknownAlgorithmError> = "bogus".parse();
    assert_eq!(r, Err(UnknownAlgorithmError("bogus".to_string())));
}

#[test]
fn signing_alg_impl_display() {
    assert_eq!(format!("{}", SigningAlg::Es256), "es256");
    assert_eq!(format!("{}", SigningAlg::Ps512), "ps512");
    assert_eq!(format!("{}", SigningAlg::Ed25519), "ed25519");
}

#[test]
fn cose_alg_ids() {
    assert_eq!(SigningAlg::Es256.cose_alg_id(), -7);
    assert_eq!(SigningAlg::Ed25519.cose_alg_id(), -8);
    assert_eq!(SigningAlg::Ps256.cose_alg_id(), -37);

    for alg in SigningAlg::ALL {
        assert_eq!(SigningAlg::from_cose_alg_id(alg.cose_alg_id()), Some(alg));
    }

    assert_eq!(SigningAlg::from_cose_alg_id(-257), None);
}

#[test]
fn serde_uses_lowercase_names() {
    assert_eq!(
        serde_json::to_string(&SigningAlg::Es384).unwrap(),
        "\"es384\""
    );
}

#[test]
fn err_impl_display() {
    assert_eq!(
        format!("{}", UnknownAlgorithmError("bogus".to_owned())),
        "UnknownAlgorithmError(bogus)"
    );
}
