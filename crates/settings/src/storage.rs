use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{ConfigStore, ConfigStoreError, ConfigValue, SectionTable};
use crate::util::write_atomic;

const PROJECTS_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProjectsDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    projects: SectionTable,
}

fn default_version() -> u32 {
    PROJECTS_FILE_VERSION
}

/// 以 JSON 檔案保存每個專案的設定區段。 / Persists one settings section per project in a JSON file.
///
/// The file is read on every access and rewritten atomically on every write,
/// so renames or edits made by the host between calls are always observed.
#[derive(Debug, Clone)]
pub struct ProjectsFile {
    path: PathBuf,
}

impl ProjectsFile {
    /// 指定檔案路徑建立儲存；檔案不存在時視為空白。 / Creates a store backed by `path`; a missing file reads as empty.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 取得檔案路徑。 / Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 移除整個專案區段並立即寫回。 / Removes a project section and persists when it existed.
    pub fn remove_section(&mut self, section: &str) -> Result<bool, ConfigStoreError> {
        let mut document = self.load()?;
        let removed = document.projects.remove_section(section);
        if removed {
            self.persist(&document)?;
        }
        Ok(removed)
    }

    fn load(&self) -> Result<ProjectsDocument, ConfigStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(ProjectsDocument::default()),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| ConfigStoreError::Parse {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ProjectsDocument::default()),
            Err(source) => Err(ConfigStoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn persist(&self, document: &ProjectsDocument) -> Result<(), ConfigStoreError> {
        let payload =
            serde_json::to_vec_pretty(document).map_err(|source| ConfigStoreError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        write_atomic(&self.path, &payload).map_err(|source| ConfigStoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn update<I>(&self, section: &str, values: I) -> Result<(), ConfigStoreError>
    where
        I: IntoIterator<Item = (String, ConfigValue)>,
    {
        let mut document = self.load()?;
        document.version = PROJECTS_FILE_VERSION;
        let mut keys = Vec::new();
        for (key, value) in values {
            document.projects.set(section, &key, value);
            keys.push(key);
        }
        self.persist(&document)?;
        debug!(path = %self.path.display(), section, keys = ?keys, "projects file updated");
        Ok(())
    }
}

impl ConfigStore for ProjectsFile {
    fn read_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfigStoreError> {
        Ok(self.load()?.projects.read_bool(section, key, default))
    }

    fn write_bool(
        &mut self,
        section: &str,
        key: &str,
        value: bool,
    ) -> Result<(), ConfigStoreError> {
        self.update(section, [(key.to_string(), ConfigValue::Bool(value))])
    }

    fn read_string(
        &self,
        section: &str,
        key: &str,
        default: &str,
    ) -> Result<String, ConfigStoreError> {
        Ok(self.load()?.projects.read_string(section, key, default))
    }

    fn write_string(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigStoreError> {
        self.update(section, [(key.to_string(), ConfigValue::Text(value.to_string()))])
    }

    fn write_strings(
        &mut self,
        section: &str,
        entries: &[(&str, &str)],
    ) -> Result<(), ConfigStoreError> {
        self.update(
            section,
            entries
                .iter()
                .map(|(key, value)| (key.to_string(), ConfigValue::Text(value.to_string()))),
        )
    }

    fn sections(&self) -> Result<Vec<String>, ConfigStoreError> {
        Ok(self.load()?.projects.names())
    }
}
