//! Per-project workspace capture and restore for Project Workspace.
//! 依專案擷取與還原工作區的核心模組。

pub mod codec;
pub mod config;
pub mod controller;
pub mod host;
pub mod presenter;
pub mod restore;
pub mod scheduler;
pub mod signals;

pub use codec::EncodedSnapshot;
pub use config::{
    WorkspaceConfig, OPEN_FILES_KEY, SELECTED_DOCUMENT_KEY, WORKSPACE_MODE_KEY,
};
pub use controller::{
    CaptureReport, ControllerPhase, SkipReason, Transition, WorkspaceController, WorkspaceError,
};
pub use host::{resolve_identity, DocumentHost, DocumentId, HostError, RemoteMatcher};
pub use presenter::{ProjectToggle, WorkspaceSettingsPresenter};
pub use restore::{FileDisposition, PlannedFile, RestorePlan, RestoreReport};
pub use scheduler::{CancellationToken, TaskId, TimerQueue};
pub use signals::{Signal, SignalHandler, SignalTable};
