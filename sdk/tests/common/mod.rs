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

#![allow(dead_code)]

use std::{path::PathBuf, sync::Once};

use c2pa_pipeline::{create_signer, BoxedSigner, SigningAlg};

#[allow(unused_macros)]
macro_rules! assert_err {
    ($expression:expr, $($pattern:tt)+) => {
        match $expression {
            $($pattern)+ => (),
            ref e => panic!("expected `{}` but got `{:?}`", stringify!($($pattern)+), e),
        }
    }
}
#[allow(unused_imports)]
pub(super) use assert_err;

pub const SAMPLE_JPEG: &[u8] = include_bytes!("../fixtures/sample.jpg");
pub const SAMPLE_PNG: &[u8] = include_bytes!("../fixtures/sample.png");
pub const THUMBNAIL: &[u8] = include_bytes!("../fixtures/thumbnail.jpg");

static INIT: Once = Once::new();

/// Route `log` output to the test harness; set `RUST_LOG` to see it.
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn fixtures_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(file_name)
}

pub fn cert_and_key(alg: SigningAlg) -> (Vec<u8>, Vec<u8>) {
    let certs = std::fs::read(fixtures_path(&format!("certs/{alg}.pub"))).unwrap();
    let key = std::fs::read(fixtures_path(&format!("certs/{alg}.priv"))).unwrap();
    (certs, key)
}

pub fn test_signer(alg: SigningAlg) -> BoxedSigner {
    let (certs, key) = cert_and_key(alg);
    create_signer::from_keys(&certs, &key, alg, None).unwrap()
}

pub fn manifest_def() -> String {
    serde_json::json!({
        "claim_generator": "test",
        "title": "sample.jpg",
        "thumbnail": {
            "format": "image/jpeg",
            "identifier": "thumbnail.jpg"
        },
        "assertions": [
            {
                "label": "org.test.notes",
                "data": { "note": "integration test" }
            },
            {
                "label": "org.test.binary",
                "kind": "Cbor",
                "data": { "answer": 42 }
            }
        ]
    })
    .to_string()
}
