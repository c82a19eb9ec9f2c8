use projws_settings::{ConfigStore, ConfigStoreError};

use crate::config::WorkspaceConfig;

/// One row of the "workspace enabled for projects" checklist.
/// 「啟用工作區的專案」清單中的一列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectToggle {
    pub name: String,
    pub enabled: bool,
}

/// Headless model behind the per-project enable checklist: every known
/// project with its effective flag, the active project preselected.
/// 專案啟用清單的無介面模型：列出所有已知專案與其有效旗標，並預選目前專案。
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSettingsPresenter {
    entries: Vec<ProjectToggle>,
    selected: Option<usize>,
}

impl WorkspaceSettingsPresenter {
    pub fn load<S>(
        store: &S,
        default_enabled: bool,
        active_project: &str,
    ) -> Result<Self, ConfigStoreError>
    where
        S: ConfigStore + ?Sized,
    {
        let mut entries = Vec::new();
        for name in store.sections()? {
            let enabled = WorkspaceConfig::is_enabled(store, &name, default_enabled)?;
            entries.push(ProjectToggle { name, enabled });
        }
        let selected = entries
            .iter()
            .position(|entry| entry.name == active_project);
        Ok(Self { entries, selected })
    }

    pub fn entries(&self) -> &[ProjectToggle] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&ProjectToggle> {
        self.selected.and_then(|index| self.entries.get(index))
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.entry(name).map(|entry| entry.enabled)
    }

    /// Sets the flag for `name`; returns `false` when the project is unknown.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Flips the flag for `name` and returns the new value.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|entry| entry.name == name)?;
        entry.enabled = !entry.enabled;
        Some(entry.enabled)
    }

    /// Writes every row's flag back, the way closing the dialog does.
    /// 將每一列的旗標寫回儲存，如同關閉對話框時的行為。
    pub fn commit<S>(&self, store: &mut S) -> Result<(), ConfigStoreError>
    where
        S: ConfigStore + ?Sized,
    {
        for entry in &self.entries {
            WorkspaceConfig::set_enabled(store, &entry.name, entry.enabled)?;
        }
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<&ProjectToggle> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}
