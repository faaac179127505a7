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

use std::io::SeekFrom;

use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::{asset_io::CAIRead, Error, Result};

const MAX_HASH_BUF: usize = 1024 * 1024;

/// A byte range of an asset, used to exclude the manifest store from hashing.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct HashRange {
    start: usize,
    length: usize,
}

impl HashRange {
    pub fn new(start: usize, length: usize) -> Self {
        HashRange { start, length }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn set_start(&mut self, start: usize) {
        self.start = start;
    }

    pub fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    fn end(&self) -> usize {
        self.start + self.length
    }
}

/// True if `alg` names a hash algorithm this crate can compute.
pub fn is_supported_hash_alg(alg: &str) -> bool {
    matches!(alg, "sha256" | "sha384" | "sha512")
}

#[derive(Clone)]
enum Hasher {
    SHA256(Sha256),
    SHA384(Sha384),
    SHA512(Sha512),
}

impl Hasher {
    fn new(alg: &str) -> Result<Self> {
        use Hasher::*;
        match alg {
            "sha256" => Ok(SHA256(Sha256::new())),
            "sha384" => Ok(SHA384(Sha384::new())),
            "sha512" => Ok(SHA512(Sha512::new())),
            _ => Err(Error::UnknownAlgorithm),
        }
    }

    fn update(&mut self, data: &[u8]) {
        use Hasher::*;
        match self {
            SHA256(ref mut d) => d.update(data),
            SHA384(ref mut d) => d.update(data),
            SHA512(ref mut d) => d.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        use Hasher::*;
        match self {
            SHA256(d) => d.finalize().to_vec(),
            SHA384(d) => d.finalize().to_vec(),
            SHA512(d) => d.finalize().to_vec(),
        }
    }
}

// Returns the half-open ranges of `0..data_len` left over after removing the
// exclusions. Exclusions may overlap and be given in any order.
fn included_ranges(data_len: u64, exclusions: &[HashRange]) -> Result<Vec<(u64, u64)>> {
    let mut sorted = exclusions.to_vec();
    sorted.sort_by_key(|e| e.start());

    let mut ranges = Vec::new();
    let mut pos = 0u64;
    for e in sorted.iter().filter(|e| e.length() > 0) {
        if e.end() as u64 > data_len {
            return Err(Error::BadParam(
                "the exclusion range exceeds the data length".to_string(),
            ));
        }
        let start = e.start() as u64;
        if start > pos {
            ranges.push((pos, start));
        }
        pos = pos.max(e.end() as u64);
    }
    if pos < data_len {
        ranges.push((pos, data_len));
    }

    Ok(ranges)
}

/// Return hash bytes for `data` using the named algorithm, skipping the
/// excluded ranges.
pub fn hash_by_alg(alg: &str, data: &[u8], exclusions: &[HashRange]) -> Result<Vec<u8>> {
    let mut hasher = Hasher::new(alg)?;
    for (start, end) in included_ranges(data.len() as u64, exclusions)? {
        hasher.update(&data[start as usize..end as usize]);
    }
    Ok(hasher.finalize())
}

/// Return hash bytes for a stream using the named algorithm, skipping the
/// excluded ranges. The stream position is left undefined.
pub fn hash_stream_by_alg(
    alg: &str,
    data: &mut dyn CAIRead,
    exclusions: &[HashRange],
) -> Result<Vec<u8>> {
    let mut hasher = Hasher::new(alg)?;

    let data_len = data.seek(SeekFrom::End(0))?;
    let ranges = included_ranges(data_len, exclusions)?;
    debug!(
        "hashing {data_len} bytes with {alg} over {} range(s)",
        ranges.len()
    );

    let mut chunk = vec![0u8; MAX_HASH_BUF];
    for (start, end) in ranges {
        data.seek(SeekFrom::Start(start))?;
        let mut left = end - start;
        while left > 0 {
            let n = std::cmp::min(left as usize, MAX_HASH_BUF);
            data.read_exact(&mut chunk[..n])?;
            hasher.update(&chunk[..n]);
            left -= n as u64;
        }
    }

    Ok(hasher.finalize())
}

/// Check `hash` against a stream hashed with the same algorithm and exclusions.
pub fn verify_stream_by_alg(
    alg: &str,
    hash: &[u8],
    data: &mut dyn CAIRead,
    exclusions: &[HashRange],
) -> Result<bool> {
    Ok(hash_stream_by_alg(alg, data, exclusions)? == hash)
}
