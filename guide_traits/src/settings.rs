//! Key/value settings seam used by guide algorithms to persist their tuning.
//!
//! Keys are full paths such as `"/scope/guider/ra/lr_control_gain"`; the
//! owning algorithm supplies a prefix unique to its guided axis.

use std::collections::BTreeMap;

/// Persisted numeric settings, read at construction and rewritten on update.
pub trait SettingsStore {
    fn get_f64(&self, key: &str, default: f64) -> f64;
    fn set_f64(&mut self, key: &str, value: f64);
    fn get_i64(&self, key: &str, default: i64) -> i64;
    fn set_i64(&mut self, key: &str, value: i64);
}

impl<T: SettingsStore + ?Sized> SettingsStore for &mut T {
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        (**self).get_f64(key, default)
    }
    fn set_f64(&mut self, key: &str, value: f64) {
        (**self).set_f64(key, value);
    }
    fn get_i64(&self, key: &str, default: i64) -> i64 {
        (**self).get_i64(key, default)
    }
    fn set_i64(&mut self, key: &str, value: i64) {
        (**self).set_i64(key, value);
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for Box<T> {
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        (**self).get_f64(key, default)
    }
    fn set_f64(&mut self, key: &str, value: f64) {
        (**self).set_f64(key, value);
    }
    fn get_i64(&self, key: &str, default: i64) -> i64 {
        (**self).get_i64(key, default)
    }
    fn set_i64(&mut self, key: &str, value: i64) {
        (**self).set_i64(key, value);
    }
}

/// A stored setting value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    Float(f64),
    Int(i64),
}

/// Volatile in-process store. Integers read through `get_f64` are widened;
/// floats are never truncated into `get_i64`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, SettingValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key) {
            Some(SettingValue::Float(v)) => *v,
            Some(SettingValue::Int(v)) => *v as f64,
            None => default,
        }
    }

    fn set_f64(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_owned(), SettingValue::Float(value));
    }

    fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(SettingValue::Int(v)) => *v,
            _ => default,
        }
    }

    fn set_i64(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_owned(), SettingValue::Int(value));
    }
}
