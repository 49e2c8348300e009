//! TOML-backed settings profile.
//!
//! The file is a flat table of quoted path keys:
//!
//! ```toml
//! "/guide_algorithm/ra/lr_control_gain" = 0.8
//! "/guide_algorithm/ra/lr_min_points_for_inference" = 25
//! ```
//!
//! Updates stay in memory until `save` is called.
use eyre::WrapErr;
use guide_traits::SettingsStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Default, Clone)]
pub struct Profile {
    path: Option<PathBuf>,
    values: BTreeMap<String, ProfileValue>,
    dirty: bool,
}

impl Profile {
    /// Volatile profile with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Parse a profile from TOML text (no backing file).
    pub fn from_toml_str(s: &str) -> eyre::Result<Self> {
        let values: BTreeMap<String, ProfileValue> =
            toml::from_str(s).wrap_err("parse settings profile")?;
        Ok(Self {
            path: None,
            values,
            dirty: false,
        })
    }

    /// Load the profile at `path`. A missing file yields an empty profile that
    /// will be created on the first `save`.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let mut profile = if path.exists() {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("read settings profile {}", path.display()))?;
            Self::from_toml_str(&text)
                .wrap_err_with(|| format!("settings profile {}", path.display()))?
        } else {
            Self::default()
        };
        profile.path = Some(path.to_path_buf());
        Ok(profile)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<ProfileValue> {
        self.values.get(key).copied()
    }

    /// True when there are unsaved updates.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn to_toml_string(&self) -> eyre::Result<String> {
        toml::to_string(&self.values).wrap_err("serialize settings profile")
    }

    /// Write the profile to its backing file. No-op for in-memory profiles.
    pub fn save(&mut self) -> eyre::Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let text = self.to_toml_string()?;
        std::fs::write(path, text)
            .wrap_err_with(|| format!("write settings profile {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }

    fn insert(&mut self, key: &str, value: ProfileValue) {
        if self.values.get(key) != Some(&value) {
            self.dirty = true;
        }
        self.values.insert(key.to_owned(), value);
    }
}

/// Whole-number floats (`25.0`, as a hand edit might leave them) read as
/// integers; anything with a fractional part or out of range does not.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(v: f64) -> Option<i64> {
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&v);
    (in_range && v.fract() == 0.0).then_some(v as i64)
}

#[allow(clippy::cast_precision_loss)]
impl SettingsStore for Profile {
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key) {
            Some(ProfileValue::Float(v)) => *v,
            Some(ProfileValue::Int(v)) => *v as f64,
            None => default,
        }
    }

    fn set_f64(&mut self, key: &str, value: f64) {
        self.insert(key, ProfileValue::Float(value));
    }

    fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(ProfileValue::Int(v)) => *v,
            Some(ProfileValue::Float(v)) => integral(*v).unwrap_or(default),
            None => default,
        }
    }

    fn set_i64(&mut self, key: &str, value: i64) {
        self.insert(key, ProfileValue::Int(value));
    }
}
