use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing a configuration store.
/// 讀寫設定儲存區時可能發生的錯誤。
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("failed to read config store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config store {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value persistence addressed by `(section, key)` pairs.
/// 以 `(section, key)` 定址的鍵值儲存介面。
///
/// Reads fall back to the supplied default when the section or key is
/// missing. Errors are reserved for a store that cannot be opened or written.
pub trait ConfigStore {
    fn read_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfigStoreError>;

    fn write_bool(&mut self, section: &str, key: &str, value: bool)
        -> Result<(), ConfigStoreError>;

    fn read_string(
        &self,
        section: &str,
        key: &str,
        default: &str,
    ) -> Result<String, ConfigStoreError>;

    fn write_string(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigStoreError>;

    /// Writes several string keys of one section as a single update. Stores
    /// that persist on every write override this so the keys change together.
    /// 將同一區段的多個字串鍵一次寫入。
    fn write_strings(
        &mut self,
        section: &str,
        entries: &[(&str, &str)],
    ) -> Result<(), ConfigStoreError> {
        for (key, value) in entries {
            self.write_string(section, key, value)?;
        }
        Ok(())
    }

    /// Lists section names in name order.
    /// 依名稱排序列出所有區段名稱。
    fn sections(&self) -> Result<Vec<String>, ConfigStoreError>;
}

/// A single stored value. Booleans written by other tools as text are still
/// readable through [`ConfigStore::read_bool`].
/// 單一儲存值；以文字寫入的布林值仍可透過 `read_bool` 讀取。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
}

impl ConfigValue {
    /// Interprets the value as a boolean, accepting `1`/`0`, `-1` and
    /// `true`/`false` spellings for text.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            ConfigValue::Text(text) => parse_bool(text),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            ConfigValue::Bool(true) => "1".to_string(),
            ConfigValue::Bool(false) => "0".to_string(),
            ConfigValue::Text(text) => text.clone(),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "-1" || trimmed == "1" {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        Some(false)
    } else {
        None
    }
}

pub(crate) type Section = BTreeMap<String, ConfigValue>;

/// Section table shared by the in-memory and file-backed stores.
/// 記憶體與檔案儲存共用的區段表。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct SectionTable {
    sections: BTreeMap<String, Section>,
}

impl SectionTable {
    pub(crate) fn get(&self, section: &str, key: &str) -> Option<&ConfigValue> {
        self.sections.get(section).and_then(|values| values.get(key))
    }

    pub(crate) fn set(&mut self, section: &str, key: &str, value: ConfigValue) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub(crate) fn remove_section(&mut self, section: &str) -> bool {
        self.sections.remove(section).is_some()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    pub(crate) fn read_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get(section, key)
            .and_then(ConfigValue::as_bool)
            .unwrap_or(default)
    }

    pub(crate) fn read_string(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key)
            .map(ConfigValue::to_text)
            .unwrap_or_else(|| default.to_string())
    }
}

/// Volatile [`ConfigStore`] kept entirely in memory.
/// 完全存放於記憶體中的設定儲存。
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    table: SectionTable,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a whole section; returns `true` when it existed.
    /// 移除整個區段；若存在則回傳 `true`。
    pub fn remove_section(&mut self, section: &str) -> bool {
        self.table.remove_section(section)
    }

    pub fn value(&self, section: &str, key: &str) -> Option<&ConfigValue> {
        self.table.get(section, key)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn read_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfigStoreError> {
        Ok(self.table.read_bool(section, key, default))
    }

    fn write_bool(
        &mut self,
        section: &str,
        key: &str,
        value: bool,
    ) -> Result<(), ConfigStoreError> {
        self.table.set(section, key, ConfigValue::Bool(value));
        Ok(())
    }

    fn read_string(
        &self,
        section: &str,
        key: &str,
        default: &str,
    ) -> Result<String, ConfigStoreError> {
        Ok(self.table.read_string(section, key, default))
    }

    fn write_string(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigStoreError> {
        self.table
            .set(section, key, ConfigValue::Text(value.to_string()));
        Ok(())
    }

    fn sections(&self) -> Result<Vec<String>, ConfigStoreError> {
        Ok(self.table.names())
    }
}
