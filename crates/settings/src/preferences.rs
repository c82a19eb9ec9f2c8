use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::util::write_atomic;

const SETTINGS_VERSION: u32 = 1;

/// Delay before a scheduled restore runs.
pub const DEFAULT_RESTORE_DELAY_MS: u64 = 10;
/// How long an enable/disable toggle keeps suppressing the next exit/ready.
pub const DEFAULT_SUPPRESSION_WINDOW_MS: u64 = 5_000;
/// Remote documents are addressed as `ftp::host/path` by default.
pub const DEFAULT_REMOTE_PATTERN: &str = "^ftp::";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize settings {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Plugin-wide settings. `default_enabled` is the fallback used for projects
/// that never stored their own `WorkspaceMode`.
/// 外掛全域設定；`default_enabled` 為未設定 `WorkspaceMode` 之專案的預設值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub default_enabled: bool,
    #[serde(default = "default_restore_delay")]
    pub restore_delay_ms: u64,
    #[serde(default = "default_suppression_window")]
    pub suppression_window_ms: u64,
    #[serde(default = "default_remote_patterns")]
    pub remote_patterns: Vec<String>,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_restore_delay() -> u64 {
    DEFAULT_RESTORE_DELAY_MS
}

fn default_suppression_window() -> u64 {
    DEFAULT_SUPPRESSION_WINDOW_MS
}

fn default_remote_patterns() -> Vec<String> {
    vec![DEFAULT_REMOTE_PATTERN.to_string()]
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            default_enabled: false,
            restore_delay_ms: default_restore_delay(),
            suppression_window_ms: default_suppression_window(),
            remote_patterns: default_remote_patterns(),
        }
    }
}

impl WorkspaceSettings {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = SETTINGS_VERSION;
        }
        if self.restore_delay_ms == 0 {
            self.restore_delay_ms = default_restore_delay();
        }
        self.restore_delay_ms = self.restore_delay_ms.clamp(1, 1_000);
        if self.suppression_window_ms == 0 {
            self.suppression_window_ms = default_suppression_window();
        }
        self.suppression_window_ms = self.suppression_window_ms.clamp(100, 60_000);

        self.remote_patterns = self
            .remote_patterns
            .iter()
            .map(|pattern| pattern.trim().to_string())
            .filter(|pattern| !pattern.is_empty())
            .collect();
        if self.remote_patterns.is_empty() {
            self.remote_patterns = default_remote_patterns();
        }
    }

    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }

    pub fn suppression_window(&self) -> Duration {
        Duration::from_millis(self.suppression_window_ms)
    }
}

#[derive(Debug)]
pub struct WorkspaceSettingsStore {
    path: PathBuf,
    data: WorkspaceSettings,
}

impl WorkspaceSettingsStore {
    pub fn new(path: impl Into<PathBuf>, settings: WorkspaceSettings) -> Self {
        Self {
            path: path.into(),
            data: settings,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut data = WorkspaceSettings::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: WorkspaceSettings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &WorkspaceSettings {
        &self.data
    }

    pub fn update<F>(&mut self, mut op: F) -> Result<(), SettingsError>
    where
        F: FnMut(&mut WorkspaceSettings),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let payload = serde_json::to_string_pretty(&self.data).map_err(|source| {
            SettingsError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;
        write_atomic(&self.path, payload.as_bytes()).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
