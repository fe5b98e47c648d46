//! Device connection config.
//!
//! A plain `KEY=VALUE` text file, one pair per line, describing how to reach
//! the tablet and where the sleep screen lives on it:
//!
//! ```text
//! REMARKABLE_IP=10.11.99.1
//! REMARKABLE_PASSWORD=<ssh password from Settings → Help → Copyrights>
//! SOURCE_PATH=C:\Users\me\remarkable\staging
//! DESTINATION_DIR=/usr/share/remarkable
//! PUTTY_PATH=C:\Program Files\PuTTY
//! DESTINATION_FILE=suspended.png
//! ```
//!
//! Lines are split on the first `=`, so values may contain `=`. Blank lines
//! and lines starting with `#` are skipped. A repeated key takes its last
//! value. Every key above is required; the first missing one is reported by
//! name.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceConfigError {
    #[error("{} was not found; create it with the keys {}", path.display(), REQUIRED_KEYS.join(", "))]
    NotFound { path: PathBuf },
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config key ({key}) not found in {}", path.display())]
    MissingKey { key: String, path: PathBuf },
    #[error("config key ({key}) in {} is empty", path.display())]
    EmptyValue { key: String, path: PathBuf },
}

pub const REMARKABLE_IP: &str = "REMARKABLE_IP";
pub const REMARKABLE_PASSWORD: &str = "REMARKABLE_PASSWORD";
pub const SOURCE_PATH: &str = "SOURCE_PATH";
pub const DESTINATION_DIR: &str = "DESTINATION_DIR";
pub const PUTTY_PATH: &str = "PUTTY_PATH";
pub const DESTINATION_FILE: &str = "DESTINATION_FILE";

/// Keys validated by [`DeviceConfig::load`], in the order they are checked.
pub const REQUIRED_KEYS: &[&str] = &[
    REMARKABLE_IP,
    REMARKABLE_PASSWORD,
    SOURCE_PATH,
    DESTINATION_DIR,
    PUTTY_PATH,
    DESTINATION_FILE,
];

/// Raw `KEY=VALUE` pairs, remembering which file they came from.
#[derive(Debug, Clone, Default)]
pub struct KeyValueFile {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl KeyValueFile {
    /// Read and parse `path`.
    pub fn load(path: &Path) -> Result<Self, DeviceConfigError> {
        if !path.exists() {
            return Err(DeviceConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|source| DeviceConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content, path))
    }

    /// Parse file contents. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Self {
        let values = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self {
            path: origin.to_path_buf(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or a `MissingKey`/`EmptyValue` error naming it.
    pub fn require(&self, key: &str) -> Result<&str, DeviceConfigError> {
        match self.get(key) {
            None => Err(DeviceConfigError::MissingKey {
                key: key.to_string(),
                path: self.path.clone(),
            }),
            Some("") => Err(DeviceConfigError::EmptyValue {
                key: key.to_string(),
                path: self.path.clone(),
            }),
            Some(v) => Ok(v),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Validated connection and path settings for one tablet.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// `REMARKABLE_IP`: host or address reachable over SSH.
    pub ip: String,
    /// `REMARKABLE_PASSWORD`: root SSH password.
    pub password: String,
    /// `SOURCE_PATH`: local directory the processed image is staged in.
    pub staging_dir: PathBuf,
    /// `DESTINATION_DIR`: directory on the tablet holding the sleep screen.
    pub destination_dir: String,
    /// `PUTTY_PATH`: directory containing `plink` and `pscp`.
    pub putty_dir: PathBuf,
    /// `DESTINATION_FILE`: file name written on the tablet.
    pub destination_file: String,
}

impl DeviceConfig {
    /// Load `path` and require every key in [`REQUIRED_KEYS`].
    pub fn load(path: &Path) -> Result<Self, DeviceConfigError> {
        Self::from_file(&KeyValueFile::load(path)?)
    }

    pub fn from_file(file: &KeyValueFile) -> Result<Self, DeviceConfigError> {
        Ok(Self {
            ip: file.require(REMARKABLE_IP)?.to_string(),
            password: file.require(REMARKABLE_PASSWORD)?.to_string(),
            staging_dir: PathBuf::from(file.require(SOURCE_PATH)?),
            destination_dir: file.require(DESTINATION_DIR)?.to_string(),
            putty_dir: PathBuf::from(file.require(PUTTY_PATH)?),
            destination_file: file.require(DESTINATION_FILE)?.to_string(),
        })
    }

    /// Full path of the sleep screen on the tablet.
    pub fn remote_path(&self) -> String {
        format!(
            "{}/{}",
            self.destination_dir.trim_end_matches('/'),
            self.destination_file
        )
    }
}

// Keep the password out of `{:?}` output and logs.
impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("ip", &self.ip)
            .field("password", &"***")
            .field("staging_dir", &self.staging_dir)
            .field("destination_dir", &self.destination_dir)
            .field("putty_dir", &self.putty_dir)
            .field("destination_file", &self.destination_file)
            .finish()
    }
}
