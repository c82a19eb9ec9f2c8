//! Settings and key-value persistence for Project Workspace.
//! Project Workspace 的設定與鍵值儲存模組。

pub mod preferences;
pub mod storage;
pub mod store;
mod util;

pub use preferences::{SettingsError, WorkspaceSettings, WorkspaceSettingsStore};
pub use storage::ProjectsFile;
pub use store::{ConfigStore, ConfigStoreError, ConfigValue, MemoryConfigStore};
