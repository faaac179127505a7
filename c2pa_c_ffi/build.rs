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

//! Generates `c2pa.h` in the target directory from the exported functions.
//! The crate version is written into the header.
use std::{env, path::Path};

fn main() {
    let version = env::var("CARGO_PKG_VERSION").expect("CARGO_PKG_VERSION is not set");
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is not set");
    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is not set");

    // OUT_DIR is <target>/<profile>/build/<pkg>/out
    let target_dir = Path::new(&out_dir)
        .ancestors()
        .nth(3)
        .expect("unexpected OUT_DIR layout");

    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let mut config = cbindgen::Config::from_file(Path::new(&crate_dir).join("cbindgen.toml"))
        .expect("cbindgen.toml is invalid");
    let version_line = format!("\n// Version: {version}\n");
    config.header = Some(match config.header.take() {
        Some(header) => header + &version_line,
        None => version_line,
    });

    match cbindgen::generate_with_config(&crate_dir, config) {
        Ok(bindings) => {
            bindings.write_to_file(target_dir.join("c2pa.h"));
        }
        // partial sources while editing should not break the build
        Err(cbindgen::Error::ParseSyntaxError { .. }) => {
            println!("cargo:warning=could not parse sources, c2pa.h not generated");
        }
        Err(e) => panic!("{e:?}"),
    }
}
