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

/// Converts a file extension to a MIME type.
pub fn extension_to_mime(extension: &str) -> Option<&'static str> {
    Some(match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "c2pa" => "application/c2pa",
        "json" => "application/json",
        _ => return None,
    })
}

/// Converts a format hint (extension or MIME type) to the canonical MIME type.
pub fn format_to_mime(format: &str) -> String {
    let format = format.trim_start_matches('.').to_lowercase();
    if format.contains('/') {
        return format;
    }
    extension_to_mime(&format)
        .map(|m| m.to_owned())
        .unwrap_or_else(|| format!("application/{format}"))
}

/// Converts a format hint to the file extension used for resources.
pub fn format_to_extension(format: &str) -> Option<&'static str> {
    Some(match format.trim_start_matches('.').to_lowercase().as_str() {
        "jpg" | "jpeg" | "image/jpeg" => "jpeg",
        "png" | "image/png" => "png",
        "c2pa" | "application/c2pa" => "c2pa",
        _ => return None,
    })
}
