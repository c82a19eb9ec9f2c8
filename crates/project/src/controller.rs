use std::fmt;
use std::time::Duration;

use projws_settings::{ConfigStore, ConfigStoreError, WorkspaceSettings};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::WorkspaceConfig;
use crate::host::{resolve_identity, DocumentHost, RemoteMatcher};
use crate::restore::{RestorePlan, RestoreReport};
use crate::scheduler::{CancellationToken, TimerQueue};
use crate::signals::Signal;

/// Errors that abort a single controller operation.
/// 會中止單次控制器操作的錯誤。
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace store error: {0}")]
    Store(#[from] ConfigStoreError),
    #[error("invalid remote pattern: {0}")]
    RemotePattern(#[from] regex::Error),
    #[error("unknown signal '{0}'")]
    UnknownSignal(String),
}

/// Conceptual state of the controller.
/// 控制器的概念狀態。
///
/// `Capturing` and `Restoring` only hold for the duration of a single
/// [`WorkspaceController::capture`] or [`WorkspaceController::advance`] call, so
/// [`WorkspaceController::phase`] never reports them between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Capturing,
    RestorePending,
    Restoring,
}

/// Why a capture or restore did nothing.
/// 擷取或還原未執行的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The "previous" project is still the active one.
    SameProject,
    /// No project was active before the switch.
    NoPreviousProject,
    /// No project is active.
    NoActiveProject,
    /// `WorkspaceMode` is off for the project.
    Disabled,
    /// Nothing was captured for the project.
    EmptySnapshot,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::SameProject => "same project",
            SkipReason::NoPreviousProject => "no previous project",
            SkipReason::NoActiveProject => "no active project",
            SkipReason::Disabled => "workspace disabled",
            SkipReason::EmptySnapshot => "no saved workspace",
        };
        f.write_str(text)
    }
}

/// Result of capturing a project's open documents.
/// 擷取專案開啟文件的結果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureReport {
    pub project: String,
    /// Persisted list, in reverse open order.
    pub files: Vec<String>,
    /// Identity of the document that had focus before capture began.
    pub selected: Option<String>,
    /// Documents skipped because they had no name even after saving.
    pub unnamed: usize,
    /// Recorded documents whose save failed; they are still closed.
    pub unsaved: Vec<String>,
    /// Recorded documents the host refused to close.
    pub left_open: Vec<String>,
}

/// Observable effect of a signal.
/// 訊號造成的可觀察效果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    PreviousRecorded { project: String },
    Captured(CaptureReport),
    CaptureSkipped { project: String, reason: SkipReason },
    RestoreScheduled {
        project: String,
        due: Duration,
        token: CancellationToken,
    },
    RestoreSkipped { project: String, reason: SkipReason },
    RestoreCancelled { count: usize },
    SuppressionArmed { signal: Signal, expires: Duration },
    Suppressed(Signal),
    SuppressionExpired { armed_by: Signal },
    Installed { banner: String },
}

#[derive(Debug)]
struct PendingRestore {
    project: String,
}

#[derive(Debug, Clone, Copy)]
struct Suppression {
    armed_by: Signal,
    armed_at: Duration,
}

/// Session-lifetime state machine that captures and restores per-project
/// workspaces.
/// 以工作階段為生命週期、負責擷取與還原專案工作區的狀態機。
///
/// All methods run on the host's UI thread. Deferred restores are held in an
/// internal [`TimerQueue`]; the host drives it through [`advance`], which is
/// also the clock that expires a pending toggle suppression.
///
/// [`advance`]: WorkspaceController::advance
#[derive(Debug)]
pub struct WorkspaceController<S> {
    store: S,
    settings: WorkspaceSettings,
    remote: RemoteMatcher,
    previous_project: String,
    suppression: Option<Suppression>,
    timers: TimerQueue<PendingRestore>,
    phase: ControllerPhase,
}

impl<S: ConfigStore> WorkspaceController<S> {
    pub fn new(store: S, settings: WorkspaceSettings) -> Result<Self, WorkspaceError> {
        let remote = RemoteMatcher::new(&settings.remote_patterns)?;
        Ok(Self {
            store,
            settings,
            remote,
            previous_project: String::new(),
            suppression: None,
            timers: TimerQueue::new(),
            phase: ControllerPhase::Idle,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn settings(&self) -> &WorkspaceSettings {
        &self.settings
    }

    pub fn remote_matcher(&self) -> &RemoteMatcher {
        &self.remote
    }

    /// Project that was active before the most recent switch; empty if none.
    pub fn previous_project(&self) -> &str {
        &self.previous_project
    }

    pub fn phase(&self) -> ControllerPhase {
        match self.phase {
            ControllerPhase::Capturing | ControllerPhase::Restoring => self.phase,
            _ if self.timers.pending() > 0 => ControllerPhase::RestorePending,
            _ => ControllerPhase::Idle,
        }
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn pending_restores(&self) -> usize {
        self.timers.pending()
    }

    /// Earliest clock value at which [`advance`](Self::advance) has work to do:
    /// a due restore or an armed suppression running out. The host should
    /// drive the clock at least this far.
    /// 下一個需要推進時鐘的時間點（到期的還原或抑制旗標逾時）。
    pub fn next_deadline(&self) -> Option<Duration> {
        let suppression = self
            .suppression
            .filter(|suppression| !self.has_expired(suppression))
            .map(|suppression| self.expiry_of(&suppression));
        match (self.timers.next_due(), suppression) {
            (Some(restore), Some(expiry)) => Some(restore.min(expiry)),
            (restore, expiry) => restore.or(expiry),
        }
    }

    /// `true` while an enable/disable toggle is waiting to swallow the next
    /// exit or ready signal.
    pub fn is_suppressing(&self) -> bool {
        self.suppression
            .is_some_and(|suppression| !self.has_expired(&suppression))
    }

    /// `project_before_select`: remembers the outgoing project and drops any
    /// restore that has not run yet.
    pub fn before_select(
        &mut self,
        host: &mut dyn DocumentHost,
    ) -> Result<Vec<Transition>, WorkspaceError> {
        let mut transitions = Vec::new();
        let count = self.timers.cancel_all();
        if count > 0 {
            debug!(count, "cancelled pending restore before project switch");
            transitions.push(Transition::RestoreCancelled { count });
        }
        self.previous_project = host.current_project();
        debug!(project = %self.previous_project, "recorded outgoing project");
        transitions.push(Transition::PreviousRecorded {
            project: self.previous_project.clone(),
        });
        Ok(transitions)
    }

    /// `project_after_select`: captures the outgoing project and schedules a
    /// restore of the incoming one. Nothing is restored when there was no
    /// outgoing project or it is still active.
    pub fn after_select(
        &mut self,
        host: &mut dyn DocumentHost,
    ) -> Result<Vec<Transition>, WorkspaceError> {
        let previous = self.previous_project.clone();
        let current = host.current_project();

        let capture = self.capture(host, &previous, false)?;
        let no_switch = matches!(
            capture,
            Transition::CaptureSkipped {
                reason: SkipReason::SameProject | SkipReason::NoPreviousProject,
                ..
            }
        );
        let mut transitions = vec![capture];
        if !no_switch {
            transitions.push(self.schedule_restore(&current)?);
        }
        Ok(transitions)
    }

    /// `ready`: restores the active project unless a plugin toggle is in
    /// flight.
    pub fn ready(&mut self, host: &mut dyn DocumentHost) -> Result<Vec<Transition>, WorkspaceError> {
        let mut transitions = Vec::new();
        if self.take_suppression(Signal::Ready, &mut transitions) {
            return Ok(transitions);
        }
        let current = host.current_project();
        transitions.push(self.schedule_restore(&current)?);
        Ok(transitions)
    }

    /// `exit`: captures the active project unless a plugin toggle is in
    /// flight. Never schedules a restore.
    pub fn exit(&mut self, host: &mut dyn DocumentHost) -> Result<Vec<Transition>, WorkspaceError> {
        let mut transitions = Vec::new();
        if self.take_suppression(Signal::Exit, &mut transitions) {
            return Ok(transitions);
        }
        let count = self.timers.cancel_all();
        if count > 0 {
            transitions.push(Transition::RestoreCancelled { count });
        }
        self.previous_project = host.current_project();
        let project = self.previous_project.clone();
        transitions.push(self.capture(host, &project, true)?);
        Ok(transitions)
    }

    /// `enabled` / `disabled`: the host follows a toggle with its own exit or
    /// ready signal, which must not be treated as a real session boundary.
    pub fn toggle_plugin(&mut self, signal: Signal) -> Transition {
        let suppression = Suppression {
            armed_by: signal,
            armed_at: self.timers.now(),
        };
        let expires = self.expiry_of(&suppression);
        self.suppression = Some(suppression);
        debug!(signal = %signal, expires_ms = expires.as_millis() as u64, "armed transition suppression");
        Transition::SuppressionArmed { signal, expires }
    }

    pub fn installed(&self) -> Transition {
        let banner = format!(
            "Project Workspace {} installed successfully",
            env!("CARGO_PKG_VERSION")
        );
        info!("{banner}");
        Transition::Installed { banner }
    }

    /// Saves, records and closes the open documents of `project`.
    /// 儲存、記錄並關閉 `project` 的開啟文件。
    pub fn capture(
        &mut self,
        host: &mut dyn DocumentHost,
        project: &str,
        exit_mode: bool,
    ) -> Result<Transition, WorkspaceError> {
        let skipped = |reason: SkipReason| -> Result<Transition, WorkspaceError> {
            debug!(project, %reason, "capture skipped");
            Ok(Transition::CaptureSkipped {
                project: project.to_string(),
                reason,
            })
        };

        if project.is_empty() {
            return skipped(SkipReason::NoPreviousProject);
        }
        if !exit_mode && project == host.current_project() {
            return skipped(SkipReason::SameProject);
        }
        if !WorkspaceConfig::is_enabled(&self.store, project, self.settings.default_enabled)? {
            return skipped(SkipReason::Disabled);
        }

        self.phase = ControllerPhase::Capturing;
        let report = close_documents(host, project);
        let persisted = WorkspaceConfig::persist_snapshot(
            &mut self.store,
            project,
            &report.files,
            report.selected.as_deref(),
        );
        self.phase = ControllerPhase::Idle;
        persisted?;

        info!(
            project,
            files = report.files.len(),
            unnamed = report.unnamed,
            exit_mode,
            "workspace captured"
        );
        Ok(Transition::Captured(report))
    }

    /// Schedules a deferred restore of `project`. The host cannot open
    /// documents from inside some lifecycle callbacks, so the work runs on the
    /// next [`advance`](Self::advance) past the configured delay.
    pub fn schedule_restore(&mut self, project: &str) -> Result<Transition, WorkspaceError> {
        let skipped = |reason: SkipReason| -> Result<Transition, WorkspaceError> {
            debug!(project, %reason, "restore skipped");
            Ok(Transition::RestoreSkipped {
                project: project.to_string(),
                reason,
            })
        };

        if project.is_empty() {
            return skipped(SkipReason::NoActiveProject);
        }
        let config = WorkspaceConfig::load(&self.store, project, self.settings.default_enabled)?;
        if !config.enabled {
            return skipped(SkipReason::Disabled);
        }
        if !config.has_snapshot() {
            return skipped(SkipReason::EmptySnapshot);
        }

        let delay = self.settings.restore_delay();
        let token = self.timers.schedule(
            delay,
            PendingRestore {
                project: project.to_string(),
            },
        );
        debug!(project, delay_ms = delay.as_millis() as u64, "restore scheduled");
        Ok(Transition::RestoreScheduled {
            project: project.to_string(),
            due: self.timers.now() + delay,
            token,
        })
    }

    /// Advances the controller clock and runs every restore that became due.
    /// The flag and snapshot are read again when the task fires, so a toggle
    /// made while the restore was pending is respected.
    /// 推進控制器時鐘並執行所有到期的還原；執行時重新讀取旗標與快照。
    pub fn advance(
        &mut self,
        host: &mut dyn DocumentHost,
        elapsed: Duration,
    ) -> Result<Vec<RestoreReport>, WorkspaceError> {
        let due = self.timers.advance(elapsed);
        let mut reports = Vec::with_capacity(due.len());
        for pending in due {
            let config = match WorkspaceConfig::load(
                &self.store,
                &pending.project,
                self.settings.default_enabled,
            ) {
                Ok(config) => config,
                Err(err) => {
                    self.phase = ControllerPhase::Idle;
                    return Err(err.into());
                }
            };
            if !config.enabled || !config.has_snapshot() {
                debug!(
                    project = %pending.project,
                    enabled = config.enabled,
                    "restore dropped; workspace changed while pending"
                );
                continue;
            }

            self.phase = ControllerPhase::Restoring;
            let plan = RestorePlan::build(&pending.project, &config, &self.remote, |path| {
                host.file_exists(path)
            });
            let report = plan.execute(host);
            info!(
                project = %report.project,
                opened = report.opened.len(),
                skipped = report.skipped.len(),
                failed = report.failed.len(),
                "workspace restored"
            );
            reports.push(report);
        }
        self.phase = ControllerPhase::Idle;
        Ok(reports)
    }

    fn expiry_of(&self, suppression: &Suppression) -> Duration {
        suppression.armed_at + self.settings.suppression_window()
    }

    fn has_expired(&self, suppression: &Suppression) -> bool {
        self.timers.now().saturating_sub(suppression.armed_at) >= self.settings.suppression_window()
    }

    fn take_suppression(&mut self, signal: Signal, transitions: &mut Vec<Transition>) -> bool {
        let Some(suppression) = self.suppression.take() else {
            return false;
        };
        if self.has_expired(&suppression) {
            warn!(
                signal = %signal,
                armed_by = %suppression.armed_by,
                "plugin toggle suppression expired without a matching signal"
            );
            transitions.push(Transition::SuppressionExpired {
                armed_by: suppression.armed_by,
            });
            return false;
        }
        debug!(signal = %signal, armed_by = %suppression.armed_by, "transition suppressed");
        transitions.push(Transition::Suppressed(signal));
        true
    }
}

fn close_documents(host: &mut dyn DocumentHost, project: &str) -> CaptureReport {
    let selected = match host.focused_document() {
        Some(doc) => resolve_identity(&*host, doc),
        None => None,
    };
    let mut report = CaptureReport {
        project: project.to_string(),
        selected,
        ..CaptureReport::default()
    };

    for doc in host.documents().into_iter().rev() {
        let mut name = resolve_identity(&*host, doc);
        let mut saved = true;

        if host.is_modified(doc) {
            if let Err(err) = host.save(doc, name.as_deref()) {
                warn!(project, doc = doc.raw(), error = %err, "failed to save document; closing anyway");
                saved = false;
            }
            if name.is_none() {
                name = resolve_identity(&*host, doc);
            }
        }

        let Some(name) = name else {
            debug!(project, doc = doc.raw(), "skipping document without a file name");
            report.unnamed += 1;
            continue;
        };

        report.files.push(name.clone());
        if !saved {
            report.unsaved.push(name.clone());
        }
        if let Err(err) = host.close(doc, false) {
            warn!(project, path = %name, error = %err, "failed to close document");
            report.left_open.push(name);
        }
    }

    report
}
