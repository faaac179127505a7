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

use ciborium::value::Value as CborValue;
use serde_json::{Map, Number, Value as JsonValue};

use crate::Result;

/// Decode CBOR bytes into a JSON value.
///
/// Byte strings become arrays of numbers, tags are dropped, and non-string map
/// keys are rendered with their JSON text.
pub(crate) fn cbor_to_json(data: &[u8]) -> Result<JsonValue> {
    let value: CborValue = ciborium::from_reader(data)?;
    Ok(to_json(value))
}

fn to_json(value: CborValue) -> JsonValue {
    match value {
        CborValue::Null => JsonValue::Null,
        CborValue::Bool(b) => JsonValue::Bool(b),
        CborValue::Integer(i) => {
            let i = i128::from(i);
            if let Ok(v) = i64::try_from(i) {
                JsonValue::Number(v.into())
            } else if let Ok(v) = u64::try_from(i) {
                JsonValue::Number(v.into())
            } else {
                JsonValue::String(i.to_string())
            }
        }
        CborValue::Float(f) => Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        CborValue::Text(s) => JsonValue::String(s),
        CborValue::Bytes(b) => JsonValue::Array(b.into_iter().map(JsonValue::from).collect()),
        CborValue::Array(a) => JsonValue::Array(a.into_iter().map(to_json).collect()),
        CborValue::Map(m) => {
            let mut map = Map::new();
            for (k, v) in m {
                let key = match k {
                    CborValue::Text(s) => s,
                    other => to_json(other).to_string(),
                };
                map.insert(key, to_json(v));
            }
            JsonValue::Object(map)
        }
        CborValue::Tag(_, inner) => to_json(*inner),
        _ => JsonValue::Null,
    }
}
