use tracing::{debug, warn};

use crate::config::WorkspaceConfig;
use crate::host::{DocumentHost, RemoteMatcher};

/// How a recorded file will be treated by a restore.
/// 還原時對已記錄檔案的處理方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDisposition {
    /// Exists on the local filesystem.
    Local,
    /// Matches a remote-address pattern; opened without an existence check.
    Remote,
    /// Neither present locally nor remote; skipped silently.
    Missing,
}

impl FileDisposition {
    pub fn will_open(self) -> bool {
        !matches!(self, FileDisposition::Missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: String,
    pub disposition: FileDisposition,
}

/// Files a restore would open, in open order, plus the document to focus.
/// 還原時預計開啟的檔案（依開啟順序）與要聚焦的文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePlan {
    pub project: String,
    pub files: Vec<PlannedFile>,
    pub selected: Option<String>,
}

impl RestorePlan {
    /// Builds the plan from a loaded snapshot. Captured lists are stored in
    /// reverse open order, so they are walked back to front here.
    /// 由快照建立還原計畫；快照以反向順序儲存，因此由後往前處理。
    pub fn build<F>(
        project: &str,
        config: &WorkspaceConfig,
        remote: &RemoteMatcher,
        exists: F,
    ) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let files = config
            .open_files
            .iter()
            .rev()
            .map(|path| {
                let disposition = if exists(path) {
                    FileDisposition::Local
                } else if remote.is_remote(path) {
                    FileDisposition::Remote
                } else {
                    FileDisposition::Missing
                };
                PlannedFile {
                    path: path.clone(),
                    disposition,
                }
            })
            .collect();

        Self {
            project: project.to_string(),
            files,
            selected: config
                .selected_file
                .clone()
                .filter(|selected| !selected.is_empty()),
        }
    }

    pub fn to_open(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(|file| file.disposition.will_open())
            .map(|file| file.path.as_str())
    }

    /// Issues the open and activate requests. Failures are logged and
    /// skipped; nothing is rolled back.
    /// 送出開啟與啟用請求；失敗時記錄並略過，不做回復。
    pub fn execute(&self, host: &mut dyn DocumentHost) -> RestoreReport {
        let mut report = RestoreReport {
            project: self.project.clone(),
            ..RestoreReport::default()
        };

        for file in &self.files {
            if !file.disposition.will_open() {
                debug!(project = %self.project, path = %file.path, "skipping missing file");
                report.skipped.push(file.path.clone());
                continue;
            }
            match host.open(&file.path) {
                Ok(_) => report.opened.push(file.path.clone()),
                Err(err) => {
                    warn!(project = %self.project, path = %file.path, error = %err, "failed to reopen file");
                    report.failed.push(file.path.clone());
                }
            }
        }

        if let Some(selected) = &self.selected {
            match host.activate(selected) {
                Ok(()) => report.activated = Some(selected.clone()),
                Err(err) => {
                    warn!(project = %self.project, path = %selected, error = %err, "failed to focus restored document");
                }
            }
        }

        report
    }
}

/// Outcome of an executed restore.
/// 還原執行後的結果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub project: String,
    pub opened: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    pub activated: Option<String>,
}
