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

use std::io::{Read, Seek, Write};

use crate::Result;

/// Copies the whole of `source` from its start into `dest` and returns the
/// number of bytes copied.
pub(crate) fn copy_stream<R: Read + Seek + ?Sized, W: Write + ?Sized>(
    source: &mut R,
    dest: &mut W,
) -> Result<u64> {
    source.rewind()?;
    let n = std::io::copy(source, dest)?;
    dest.flush()?;
    Ok(n)
}

/// Turn an untrusted label into a file name that cannot leave its folder.
///
/// Separators, drive and URI punctuation become `_`, and names made only of
/// dots are prefixed so they never mean the current or parent directory.
#[cfg(feature = "file_io")]
pub(crate) fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '#' | '=' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        format!("_{cleaned}")
    } else {
        cleaned
    }
}
