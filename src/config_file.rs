//! Configuration file loading.
//!
//! Configuration lives in a small INI document:
//!
//! ```text
//! [Veracrypt]
//! drive_partition = /dev/sda1
//! slot_num = 2
//! ```
//!
//! Only the `[Veracrypt]` section is consumed. Values in a `[DEFAULT]`
//! section are inherited by every other section unless overridden.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::config::MountConfiguration;
use crate::error::{LaunchError, Result};

/// Section holding the mount settings.
pub const VERACRYPT_SECTION: &str = "Veracrypt";

/// Section whose values every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Parsed INI document: section name to key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    defaults: BTreeMap<String, String>,
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniDocument {
    /// Parse INI text.
    ///
    /// Keys are lowercased; section names keep their case. `#` and `;`
    /// start full-line comments. A line indented deeper than the key that
    /// started the current value continues that value. A section or key
    /// given twice is an error, except that `[DEFAULT]` may be reopened.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut doc = Self::default();
        let mut section: Option<String> = None;
        // Current key and the indent of the line that introduced it.
        let mut last_key: Option<(String, usize)> = None;
        let mut seen_sections: HashSet<String> = HashSet::new();
        let mut seen_keys: HashSet<(String, String)> = HashSet::new();

        for (index, raw_line) in contents.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = raw_line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indent = raw_line.len() - raw_line.trim_start().len();
            if let (Some(name), Some((key, key_indent))) = (section.as_deref(), last_key.as_ref()) {
                if indent > *key_indent {
                    if let Some(value) = doc.entries_mut(name).get_mut(key) {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header.strip_suffix(']').map(str::trim).ok_or_else(|| {
                    LaunchError::config(format!(
                        "Malformed section header on line {}: '{}'",
                        line_no, trimmed
                    ))
                })?;
                if name.is_empty() {
                    return Err(LaunchError::config(format!(
                        "Empty section name on line {}",
                        line_no
                    )));
                }
                if name != DEFAULT_SECTION {
                    if !seen_sections.insert(name.to_string()) {
                        return Err(LaunchError::config(format!(
                            "Duplicate section [{}] on line {}",
                            name, line_no
                        )));
                    }
                    doc.sections.entry(name.to_string()).or_default();
                }
                section = Some(name.to_string());
                last_key = None;
                continue;
            }

            let Some(name) = section.as_deref() else {
                return Err(LaunchError::config(format!(
                    "Line {} appears before any [section] header: '{}'",
                    line_no, trimmed
                )));
            };

            let (key, value) = split_entry(trimmed).ok_or_else(|| {
                LaunchError::config(format!(
                    "Expected 'key = value' on line {}, found '{}'",
                    line_no, trimmed
                ))
            })?;
            let key = key.to_ascii_lowercase();
            if !seen_keys.insert((name.to_string(), key.clone())) {
                return Err(LaunchError::config(format!(
                    "Duplicate key '{}' in section [{}] on line {}",
                    key, name, line_no
                )));
            }
            doc.entries_mut(name).insert(key.clone(), value.to_string());
            last_key = Some((key, indent));
        }

        Ok(doc)
    }

    fn entries_mut(&mut self, section: &str) -> &mut BTreeMap<String, String> {
        if section == DEFAULT_SECTION {
            &mut self.defaults
        } else {
            self.sections.entry(section.to_string()).or_default()
        }
    }

    /// Whether a (non-default) section exists
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Entries of `name` merged over the `[DEFAULT]` values.
    pub fn section(&self, name: &str) -> Option<BTreeMap<String, String>> {
        let entries = self.sections.get(name)?;
        let mut merged = self.defaults.clone();
        merged.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Some(merged)
    }
}

/// Split `key = value` or `key: value` at the first delimiter.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim()))
}

/// Load the `[Veracrypt]` section of the configuration file at `path`.
///
/// A file that cannot be read is reported the same way as one without the
/// section, since either way there is nothing to mount.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<MountConfiguration> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!("Failed to read {:?}: {}", path, e);
            return Err(missing_section_error(Some(&e)));
        }
    };
    let doc = IniDocument::parse(&contents)?;
    let entries = doc
        .section(VERACRYPT_SECTION)
        .ok_or_else(|| missing_section_error(None))?;
    Ok(MountConfiguration::from_pairs(entries))
}

fn missing_section_error(cause: Option<&std::io::Error>) -> LaunchError {
    let mut msg = format!("Section [{}] not found in config file!", VERACRYPT_SECTION);
    if let Some(e) = cause {
        msg.push_str(&format!("\nThe config file could not be read: {}", e));
    }
    LaunchError::config(msg)
}
