use projws_settings::{ConfigStore, ConfigStoreError};

use crate::codec;

/// Per-project enable flag.
pub const WORKSPACE_MODE_KEY: &str = "WorkspaceMode";
/// Bracketed comma-text list of open files.
pub const OPEN_FILES_KEY: &str = "WorkspaceOpenFiles";
/// File that receives focus after a restore.
pub const SELECTED_DOCUMENT_KEY: &str = "WorkspaceSelectedDocument";

/// Workspace state persisted for one project.
/// 單一專案持久化的工作區狀態。
///
/// Instances are transient: read from a [`ConfigStore`], used, and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkspaceConfig {
    pub enabled: bool,
    pub open_files: Vec<String>,
    pub selected_file: Option<String>,
}

impl WorkspaceConfig {
    /// Reads only the enable flag, falling back to `default_enabled`.
    /// 僅讀取啟用旗標，缺少時使用 `default_enabled`。
    pub fn is_enabled<S>(
        store: &S,
        project: &str,
        default_enabled: bool,
    ) -> Result<bool, ConfigStoreError>
    where
        S: ConfigStore + ?Sized,
    {
        store.read_bool(project, WORKSPACE_MODE_KEY, default_enabled)
    }

    /// Loads the flag and the snapshot for `project`. A missing snapshot
    /// yields an empty file list.
    /// 載入專案的旗標與快照；缺少快照時檔案清單為空。
    pub fn load<S>(store: &S, project: &str, default_enabled: bool) -> Result<Self, ConfigStoreError>
    where
        S: ConfigStore + ?Sized,
    {
        let enabled = Self::is_enabled(store, project, default_enabled)?;
        let (open_files, _) = codec::decode(&store.read_string(project, OPEN_FILES_KEY, "")?);
        let selected_file =
            codec::decode_selected(&store.read_string(project, SELECTED_DOCUMENT_KEY, "")?);
        Ok(Self {
            enabled,
            open_files,
            selected_file,
        })
    }

    pub fn has_snapshot(&self) -> bool {
        !self.open_files.is_empty()
    }

    /// Writes the ordered file list and focused file for `project` in one
    /// store update.
    /// 以單次更新寫入專案的有序檔案清單與焦點檔案。
    pub fn persist_snapshot<S>(
        store: &mut S,
        project: &str,
        open_files: &[String],
        selected: Option<&str>,
    ) -> Result<(), ConfigStoreError>
    where
        S: ConfigStore + ?Sized,
    {
        let encoded = codec::encode(open_files, selected);
        store.write_strings(
            project,
            &[
                (OPEN_FILES_KEY, encoded.open_files.as_str()),
                (SELECTED_DOCUMENT_KEY, encoded.selected.as_str()),
            ],
        )
    }

    pub fn clear_snapshot<S>(store: &mut S, project: &str) -> Result<(), ConfigStoreError>
    where
        S: ConfigStore + ?Sized,
    {
        store.write_strings(project, &[(OPEN_FILES_KEY, ""), (SELECTED_DOCUMENT_KEY, "")])
    }

    pub fn set_enabled<S>(store: &mut S, project: &str, enabled: bool) -> Result<(), ConfigStoreError>
    where
        S: ConfigStore + ?Sized,
    {
        store.write_bool(project, WORKSPACE_MODE_KEY, enabled)
    }
}
