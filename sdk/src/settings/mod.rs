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

/// Settings for configuring the [`Builder`][crate::Builder].
pub mod builder;

use std::cell::RefCell;

use config::{Config, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{
    settings::builder::BuilderSettings, utils::hash_utils::is_supported_hash_alg, Error, Result,
};

const VERSION: u32 = 1;

thread_local!(
    static SETTINGS: RefCell<Config> =
        RefCell::new(Config::try_from(&Settings::default()).unwrap_or_default());
);

pub(crate) trait SettingsValidate {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Settings to configure core features.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Core {
    /// Hash algorithm used for the data hash and the hashed URIs of new claims.
    ///
    /// One of `sha256`, `sha384` or `sha512`. The default is `sha256`.
    pub hash_alg: String,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            hash_alg: "sha256".to_string(),
        }
    }
}

impl SettingsValidate for Core {
    fn validate(&self) -> Result<()> {
        if !is_supported_hash_alg(&self.hash_alg) {
            return Err(Error::BadParam(format!(
                "unsupported hash algorithm: {}",
                self.hash_alg
            )));
        }
        Ok(())
    }
}

/// Settings to configure verification.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Verify {
    /// Whether manifests are verified when they are read.
    ///
    /// The default value is true.
    pub verify_after_reading: bool,
    /// Whether a newly signed asset is read back and verified before `sign`
    /// returns.
    ///
    /// The default value is false.
    pub verify_after_sign: bool,
}

impl Default for Verify {
    fn default() -> Self {
        Self {
            verify_after_reading: true,
            verify_after_sign: false,
        }
    }
}

impl SettingsValidate for Verify {}

/// Settings for configuring the pipeline.
///
/// [Settings::default] will be set thread-locally by default. Anything loaded
/// with [load_settings_from_str] is merged into the thread-local copy.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Version of the configuration.
    pub version: u32,
    /// Settings for configuring core features.
    pub core: Core,
    /// Settings for configuring verification.
    pub verify: Verify,
    /// Settings for configuring the [`Builder`][crate::Builder].
    pub builder: BuilderSettings,
}

fn settings_error(e: config::ConfigError) -> Error {
    Error::SettingsError(e.to_string())
}

fn file_format(format: &str) -> Result<FileFormat> {
    match format.to_lowercase().as_str() {
        "json" | "application/json" => Ok(FileFormat::Json),
        "toml" | "application/toml" => Ok(FileFormat::Toml),
        _ => Err(Error::UnsupportedType),
    }
}

impl Settings {
    /// Merge a configuration string into the thread-local settings.
    ///
    /// Only the keys present in `settings_str` change. Nothing is committed
    /// if the merged result fails to parse or validate.
    pub fn from_string(settings_str: &str, format: &str) -> Result<Self> {
        let overlay = config::File::from_str(settings_str, file_format(format)?);

        let merged = SETTINGS
            .with_borrow(|current| {
                Config::builder()
                    .add_source(current.clone())
                    .add_source(overlay)
                    .build()
            })
            .map_err(settings_error)?;

        let settings: Settings = merged.clone().try_deserialize().map_err(settings_error)?;
        settings.validate()?;

        log::debug!("settings updated: hash_alg = {}", settings.core.hash_alg);
        SETTINGS.set(merged);
        Ok(settings)
    }

    /// Look up one value by its dotted path, for example `core.hash_alg`.
    fn value_at<'de, T: Deserialize<'de>>(path: &str) -> Result<T> {
        SETTINGS.with_borrow(|current| {
            current
                .get::<T>(path)
                .map_err(|e| Error::BadParam(format!("no settings value at {path}: {e}")))
        })
    }

    /// Set the thread-local [Settings] back to the default values.
    pub(crate) fn reset() -> Result<()> {
        SETTINGS.set(Config::try_from(&Settings::default()).map_err(settings_error)?);
        Ok(())
    }
}

impl SettingsValidate for Settings {
    fn validate(&self) -> Result<()> {
        if self.version > VERSION {
            return Err(Error::SettingsError("settings version too new".into()));
        }
        self.core.validate()?;
        self.verify.validate()?;
        self.builder.validate()
    }
}

/// Load settings from a JSON or TOML string into the thread-local settings.
///
/// `format` is `json`, `toml`, `application/json` or `application/toml`.
/// Any other format fails with [`Error::UnsupportedType`].
pub fn load_settings_from_str(settings_str: &str, format: &str) -> Result<()> {
    Settings::from_string(settings_str, format).map(|_| ())
}

/// Snapshot of the current thread's settings, falling back to the defaults
/// if the stored configuration no longer deserializes.
pub fn get_thread_local_settings() -> Settings {
    SETTINGS.with_borrow(|config| {
        config
            .clone()
            .try_deserialize::<Settings>()
            .unwrap_or_default()
    })
}

/// Read a single setting by dotted path, e.g. `verify.verify_after_reading`.
pub fn get_settings_value<'de, T: Deserialize<'de>>(path: &str) -> Result<T> {
    Settings::value_at(path)
}

/// Reset all settings back to default values.
pub fn reset_default_settings() -> Result<()> {
    Settings::reset()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_get_defaults() {
        reset_default_settings().unwrap();
        let settings = get_thread_local_settings();

        assert_eq!(settings.core, Core::default());
        assert_eq!(settings.verify, Verify::default());
        assert_eq!(settings.builder, BuilderSettings::default());
        assert_eq!(get_settings_value::<String>("core.hash_alg").unwrap(), "sha256");
    }

    #[test]
    fn test_partial_loading() {
        reset_default_settings().unwrap();
        load_settings_from_str(r#"{"verify": {"verify_after_sign": true}}"#, "json").unwrap();

        let settings = get_thread_local_settings();
        assert!(settings.verify.verify_after_sign);
        assert!(settings.verify.verify_after_reading);

        load_settings_from_str(
            r#"
            [core]
            hash_alg = "sha512"

            [builder.claim_generator_info]
            name = "my app"
            version = "2.1"
            "#,
            "application/toml",
        )
        .unwrap();

        let settings = get_thread_local_settings();
        assert_eq!(settings.core.hash_alg, "sha512");
        assert!(settings.verify.verify_after_sign);
        assert_eq!(
            get_settings_value::<String>("builder.claim_generator_info.name").unwrap(),
            "my app"
        );

        reset_default_settings().unwrap();
    }

    #[test]
    fn test_bad_settings_are_not_committed() {
        reset_default_settings().unwrap();

        let err = load_settings_from_str(r#"{"core": {"hash_alg": "md5"}}"#, "json").unwrap_err();
        assert!(matches!(err, Error::BadParam(_)));
        assert_eq!(get_thread_local_settings().core.hash_alg, "sha256");

        let err = load_settings_from_str("{not json", "json").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Parse);

        let err = load_settings_from_str("a: b", "yaml").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::FormatNotSupported);
    }
}
