use std::fmt;
use std::str::FromStr;

use projws_settings::ConfigStore;

use crate::controller::{Transition, WorkspaceController, WorkspaceError};
use crate::host::DocumentHost;

/// Lifecycle signals delivered by the host.
/// 宿主環境送出的生命週期訊號。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Installed = 0,
    BeforeSelect = 1,
    AfterSelect = 2,
    Ready = 3,
    Exit = 4,
    Disabled = 5,
    Enabled = 6,
}

impl Signal {
    pub const COUNT: usize = 7;

    pub const ALL: [Signal; Signal::COUNT] = [
        Signal::Installed,
        Signal::BeforeSelect,
        Signal::AfterSelect,
        Signal::Ready,
        Signal::Exit,
        Signal::Disabled,
        Signal::Enabled,
    ];

    /// Name the host uses when connecting the signal.
    /// 宿主連接訊號時使用的名稱。
    pub fn name(self) -> &'static str {
        match self {
            Signal::Installed => "installed",
            Signal::BeforeSelect => "project_before_select",
            Signal::AfterSelect => "project_after_select",
            Signal::Ready => "ready",
            Signal::Exit => "exit",
            Signal::Disabled => "disabled",
            Signal::Enabled => "enabled",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Signal {
    type Err = WorkspaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Signal::ALL
            .into_iter()
            .find(|signal| signal.name() == value)
            .ok_or_else(|| WorkspaceError::UnknownSignal(value.to_string()))
    }
}

pub type SignalHandler<S> = fn(
    &mut WorkspaceController<S>,
    &mut dyn DocumentHost,
) -> Result<Vec<Transition>, WorkspaceError>;

/// Fixed dispatch table from [`Signal`] to handler.
/// 由訊號對應至處理函式的固定分派表。
pub struct SignalTable<S> {
    handlers: [SignalHandler<S>; Signal::COUNT],
}

impl<S: ConfigStore> SignalTable<S> {
    /// Table wired to the standard controller handlers.
    pub fn new() -> Self {
        let handlers: [SignalHandler<S>; Signal::COUNT] = [
            on_installed,
            on_before_select,
            on_after_select,
            on_ready,
            on_exit,
            on_disabled,
            on_enabled,
        ];
        Self { handlers }
    }

    /// Replaces the handler for `signal`.
    pub fn register(&mut self, signal: Signal, handler: SignalHandler<S>) {
        self.handlers[signal.index()] = handler;
    }

    pub fn dispatch(
        &self,
        signal: Signal,
        controller: &mut WorkspaceController<S>,
        host: &mut dyn DocumentHost,
    ) -> Result<Vec<Transition>, WorkspaceError> {
        (self.handlers[signal.index()])(controller, host)
    }

    /// Dispatches by host signal name.
    /// 依宿主訊號名稱分派。
    pub fn dispatch_named(
        &self,
        name: &str,
        controller: &mut WorkspaceController<S>,
        host: &mut dyn DocumentHost,
    ) -> Result<Vec<Transition>, WorkspaceError> {
        let signal: Signal = name.parse()?;
        self.dispatch(signal, controller, host)
    }
}

impl<S: ConfigStore> Default for SignalTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn on_installed<S: ConfigStore>(
    controller: &mut WorkspaceController<S>,
    _host: &mut dyn DocumentHost,
) -> Result<Vec<Transition>, WorkspaceError> {
    Ok(vec![controller.installed()])
}

fn on_before_select<S: ConfigStore>(
    controller: &mut WorkspaceController<S>,
    host: &mut dyn DocumentHost,
) -> Result<Vec<Transition>, WorkspaceError> {
    controller.before_select(host)
}

fn on_after_select<S: ConfigStore>(
    controller: &mut WorkspaceController<S>,
    host: &mut dyn DocumentHost,
) -> Result<Vec<Transition>, WorkspaceError> {
    controller.after_select(host)
}

fn on_ready<S: ConfigStore>(
    controller: &mut WorkspaceController<S>,
    host: &mut dyn DocumentHost,
) -> Result<Vec<Transition>, WorkspaceError> {
    controller.ready(host)
}

fn on_exit<S: ConfigStore>(
    controller: &mut WorkspaceController<S>,
    host: &mut dyn DocumentHost,
) -> Result<Vec<Transition>, WorkspaceError> {
    controller.exit(host)
}

fn on_disabled<S: ConfigStore>(
    controller: &mut WorkspaceController<S>,
    _host: &mut dyn DocumentHost,
) -> Result<Vec<Transition>, WorkspaceError> {
    Ok(vec![controller.toggle_plugin(Signal::Disabled)])
}

fn on_enabled<S: ConfigStore>(
    controller: &mut WorkspaceController<S>,
    _host: &mut dyn DocumentHost,
) -> Result<Vec<Transition>, WorkspaceError> {
    Ok(vec![controller.toggle_plugin(Signal::Enabled)])
}
