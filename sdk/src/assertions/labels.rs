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

#![deny(missing_docs)]

//! Labels for the assertion types this crate writes.
//!
//! See <https://c2pa.org/specifications/specifications/2.2/specs/C2PA_Specification.html#_c2pa_standard_assertions>.

/// Label prefix for a data hash assertion.
///
/// See <https://c2pa.org/specifications/specifications/2.2/specs/C2PA_Specification.html#_data_hash>.
pub const DATA_HASH: &str = "c2pa.hash.data";

/// Label prefix for a claim thumbnail assertion.
///
/// See <https://c2pa.org/specifications/specifications/2.2/specs/C2PA_Specification.html#_thumbnail>.
pub const CLAIM_THUMBNAIL: &str = "c2pa.thumbnail.claim";

/// Label prefix for an ingredient thumbnail assertion.
pub const INGREDIENT_THUMBNAIL: &str = "c2pa.thumbnail.ingredient";

/// Label prefix for an ingredient assertion.
///
/// See <https://c2pa.org/specifications/specifications/2.2/specs/C2PA_Specification.html#_ingredient>.
pub const INGREDIENT: &str = "c2pa.ingredient";

/// Returns the thumbnail label for an image format, such as
/// `c2pa.thumbnail.claim.jpeg`.
pub fn add_thumbnail_format(label: &str, format: &str) -> String {
    match crate::utils::mime::format_to_extension(format) {
        Some(ext) => format!("{label}.{ext}"),
        None => {
            let ext = format.rsplit('/').next().unwrap_or(format);
            format!("{label}.{ext}")
        }
    }
}

/// True for the labels the reader reports through dedicated fields instead of
/// the assertion list.
pub(crate) fn is_internal(label: &str) -> bool {
    let base = crate::jumbf::labels::base_label(label);
    base == DATA_HASH
        || base == INGREDIENT
        || base.starts_with(CLAIM_THUMBNAIL)
        || base.starts_with(INGREDIENT_THUMBNAIL)
}
