//! Mount configuration
//!
//! Holds the `[Veracrypt]` section as a name/value map. Values are strings,
//! exactly as written in the file; typed accessors parse them on demand and
//! report malformed values as configuration errors naming the key.
//!
//! The volume password is kept apart from the other values in a zeroizing
//! buffer and never appears in `Debug` output or in the logged entries.

use std::collections::BTreeMap;
use std::fmt;

use zeroize::Zeroizing;

use crate::error::{LaunchError, Result};

/// Recognized configuration keys.
pub mod keys {
    pub const KEYFILE_PATH: &str = "keyfile_path";
    pub const VOLUME_PASSWORD: &str = "volume_password";
    pub const PIM: &str = "personal_iterations_multiplier";
    pub const HIDDEN_PARTITION: &str = "using_hidden_partition";
    pub const SLOT_NUM: &str = "slot_num";
    pub const USE_TRUECRYPT: &str = "use_truecrypt";
    pub const DRIVE_PARTITION: &str = "drive_partition";
    pub const PHYSICAL_DRIVE_NUM: &str = "physical_drive_num";
    pub const WSL_EXE: &str = "wsl_exe";
    pub const WSL_ROOT: &str = "wsl_root";
}

/// Slot used when `slot_num` is not set.
pub const DEFAULT_SLOT: u8 = 1;

/// Highest slot VeraCrypt accepts.
pub const MAX_SLOT: u8 = 64;

/// WSL executable used when `wsl_exe` is not set.
pub const DEFAULT_WSL_EXE: &str = "wsl";

/// Replacement shown wherever the password would be printed.
pub const PASSWORD_MASK: &str = "******";

/// Settings for a single mount, loaded from the `[Veracrypt]` section.
#[derive(Clone, Default)]
pub struct MountConfiguration {
    values: BTreeMap<String, String>,
    password: Option<Zeroizing<String>>,
}

impl MountConfiguration {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from name/value pairs. Names are case-insensitive.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::new();
        for (key, value) in pairs {
            config.set(key.as_ref(), value);
        }
        config
    }

    /// Look up a value. Empty values are treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        if key == keys::VOLUME_PASSWORD {
            return self.password();
        }
        self.values
            .get(&key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Look up a value, falling back to `default` when unset
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether `key` holds a non-empty value
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store a value, replacing any previous one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_ascii_lowercase();
        if key == keys::VOLUME_PASSWORD {
            self.password = Some(Zeroizing::new(value.into()));
        } else {
            self.values.insert(key, value.into());
        }
    }

    /// The resolved volume password, if any.
    pub fn password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }

    /// Store a password obtained at runtime.
    pub fn set_password(&mut self, password: Zeroizing<String>) {
        self.password = Some(password);
    }

    /// Parse a boolean value the way INI files spell them.
    ///
    /// Accepts `1/yes/true/on` and `0/no/false/off`, case-insensitively.
    /// Unset values are `false`.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let Some(raw) = self.get(key) else {
            return Ok(false);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(true),
            "0" | "no" | "false" | "off" => Ok(false),
            _ => Err(LaunchError::config(format!(
                "{} must be a boolean (yes/no, true/false, on/off, 1/0), found '{}'",
                key.to_ascii_uppercase(),
                raw
            ))),
        }
    }

    /// Slot the volume is mounted into (`slot_num`, default 1).
    pub fn slot_num(&self) -> Result<u8> {
        let Some(raw) = self.get(keys::SLOT_NUM) else {
            return Ok(DEFAULT_SLOT);
        };
        match raw.trim().parse::<u8>() {
            Ok(slot) if (1..=MAX_SLOT).contains(&slot) => Ok(slot),
            _ => Err(LaunchError::config(format!(
                "{} must be a number between 1 and {}, found '{}'",
                keys::SLOT_NUM.to_ascii_uppercase(),
                MAX_SLOT,
                raw
            ))),
        }
    }

    /// Slot exactly as configured (trimmed), after checking its range.
    ///
    /// Used wherever the slot is emitted, so `02` stays `02`.
    pub fn slot(&self) -> Result<String> {
        self.slot_num()?;
        Ok(self
            .get(keys::SLOT_NUM)
            .map(|raw| raw.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SLOT.to_string()))
    }

    /// Windows physical drive number (`physical_drive_num`), if set.
    pub fn physical_drive_num(&self) -> Result<Option<u32>> {
        let Some(raw) = self.get(keys::PHYSICAL_DRIVE_NUM) else {
            return Ok(None);
        };
        raw.trim().parse::<u32>().map(Some).map_err(|_| {
            LaunchError::config(format!(
                "{} must be a drive number such as '0' for PHYSICALDRIVE0, found '{}'",
                keys::PHYSICAL_DRIVE_NUM.to_ascii_uppercase(),
                raw
            ))
        })
    }

    /// Whether the volume uses the legacy TrueCrypt format
    pub fn use_truecrypt(&self) -> Result<bool> {
        self.get_bool(keys::USE_TRUECRYPT)
    }

    /// All entries with the password masked, in key order.
    pub fn redacted_entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if self.password.is_some() {
            entries.push((keys::VOLUME_PASSWORD.to_string(), PASSWORD_MASK.to_string()));
            entries.sort();
        }
        entries
    }

    /// Log every entry at debug level with the password masked
    pub fn log_entries(&self) {
        for (key, value) in self.redacted_entries() {
            tracing::debug!("{}={}", key, value);
        }
    }
}

impl fmt::Debug for MountConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.redacted_entries()).finish()
    }
}
