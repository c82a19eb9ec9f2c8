use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use projws_project::{
    FileDisposition, RemoteMatcher, RestorePlan, WorkspaceConfig, WorkspaceSettingsPresenter,
};
use projws_settings::{ConfigStore, ProjectsFile, WorkspaceSettingsStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PROJWS_LOG";

#[derive(Parser)]
#[command(
    name = "projws",
    about = "Inspect and edit saved per-project workspaces",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    /// 專案設定檔路徑。 / Projects file (defaults to `<workspace>/.projws/projects.json`).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 外掛設定檔路徑。 / Plugin settings file (defaults to `<workspace>/.projws/settings.json`).
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出所有已知專案與啟用狀態。 / List known projects and whether their workspace is enabled.
    List,
    /// 啟用專案的工作區。 / Enable workspace capture/restore for a project.
    Enable(ProjectArgs),
    /// 停用專案的工作區。 / Disable workspace capture/restore for a project.
    Disable(ProjectArgs),
    /// 顯示專案儲存的快照。 / Show the snapshot stored for a project.
    Show(ProjectArgs),
    /// 預覽還原時會開啟或略過的檔案。 / Preview which files a restore would open or skip.
    Plan(ProjectArgs),
    /// 清除專案的快照。 / Clear a project's snapshot.
    Clear(ClearArgs),
    /// 檢視或修改外掛設定。 / View or change plugin settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
struct ProjectArgs {
    /// 專案名稱。 / Project name.
    project: String,
}

#[derive(Args)]
struct ClearArgs {
    /// 專案名稱。 / Project name.
    project: String,
    /// 一併移除啟用旗標與整個區段。 / Remove the whole project section, including its enable flag.
    #[arg(long)]
    forget: bool,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// 以 JSON 顯示目前設定。 / Print the effective settings as JSON.
    Show,
    /// 設定未指定專案的預設啟用狀態。 / Set the fallback enable flag for unconfigured projects.
    SetDefault(SetDefaultArgs),
}

#[derive(Args)]
struct SetDefaultArgs {
    #[arg(value_enum)]
    state: Toggle,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
    #[value(alias = "true")]
    On,
    #[value(alias = "false")]
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        matches!(toggle, Toggle::On)
    }
}

struct Paths {
    projects: PathBuf,
    settings: PathBuf,
}

impl Paths {
    fn resolve(
        workspace: Option<PathBuf>,
        config: Option<PathBuf>,
        settings: Option<PathBuf>,
    ) -> Result<Self> {
        let root = resolve_workspace(workspace)?;
        let projects = match config {
            Some(path) => resolve_input_path(&path)?,
            None => state_dir(&root).join("projects.json"),
        };
        let settings = match settings {
            Some(path) => resolve_input_path(&path)?,
            None => state_dir(&root).join("settings.json"),
        };
        Ok(Self { projects, settings })
    }

    fn projects_file(&self) -> ProjectsFile {
        ProjectsFile::new(&self.projects)
    }

    fn settings_store(&self) -> Result<WorkspaceSettingsStore> {
        WorkspaceSettingsStore::load(&self.settings)
            .with_context(|| format!("failed to load settings from {}", self.settings.display()))
    }
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<()> {
    let Cli {
        workspace,
        config,
        settings,
        command,
    } = Cli::parse();
    let paths = Paths::resolve(workspace, config, settings)?;
    debug!(projects = %paths.projects.display(), settings = %paths.settings.display(), "resolved state files");

    match command {
        Commands::List => list_projects(&paths),
        Commands::Enable(args) => set_project_enabled(&paths, &args.project, true),
        Commands::Disable(args) => set_project_enabled(&paths, &args.project, false),
        Commands::Show(args) => show_project(&paths, &args.project),
        Commands::Plan(args) => plan_restore(&paths, &args.project),
        Commands::Clear(args) => clear_project(&paths, args),
        Commands::Settings(subcommand) => execute_settings_command(subcommand, &paths),
    }
}

fn list_projects(paths: &Paths) -> Result<()> {
    let settings = paths.settings_store()?;
    let store = paths.projects_file();
    let presenter = WorkspaceSettingsPresenter::load(&store, settings.settings().default_enabled, "")
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    if presenter.entries().is_empty() {
        println!("No projects recorded.");
        return Ok(());
    }
    println!("Projects:");
    for entry in presenter.entries() {
        let config = WorkspaceConfig::load(&store, &entry.name, entry.enabled)?;
        println!(
            "  - {} [{}] {} file(s)",
            entry.name,
            if entry.enabled { "on" } else { "off" },
            config.open_files.len()
        );
    }
    Ok(())
}

fn set_project_enabled(paths: &Paths, project: &str, enabled: bool) -> Result<()> {
    let project = require_project(project)?;
    let mut store = paths.projects_file();
    WorkspaceConfig::set_enabled(&mut store, project, enabled)
        .with_context(|| format!("failed to update {}", store.path().display()))?;
    println!(
        "Workspace {} for project '{project}'",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn show_project(paths: &Paths, project: &str) -> Result<()> {
    let project = require_project(project)?;
    let settings = paths.settings_store()?;
    let store = paths.projects_file();
    let config = WorkspaceConfig::load(&store, project, settings.settings().default_enabled)
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    println!("Project: {project}");
    println!("Enabled: {}", if config.enabled { "yes" } else { "no" });
    if config.open_files.is_empty() {
        println!("Open files: (none)");
    } else {
        println!("Open files (saved order):");
        for file in &config.open_files {
            println!("  {file}");
        }
    }
    println!(
        "Selected: {}",
        config.selected_file.as_deref().unwrap_or("(none)")
    );
    Ok(())
}

fn plan_restore(paths: &Paths, project: &str) -> Result<()> {
    let project = require_project(project)?;
    let settings = paths.settings_store()?;
    let store = paths.projects_file();
    let config = WorkspaceConfig::load(&store, project, settings.settings().default_enabled)
        .with_context(|| format!("failed to read {}", store.path().display()))?;
    if !config.enabled {
        println!("Workspace is disabled for project '{project}'; nothing would be restored.");
        return Ok(());
    }
    if !config.has_snapshot() {
        println!("No saved workspace for project '{project}'.");
        return Ok(());
    }

    let remote = RemoteMatcher::new(&settings.settings().remote_patterns)
        .context("invalid remote pattern in settings")?;
    let plan = RestorePlan::build(project, &config, &remote, |path| Path::new(path).is_file());
    println!("Restore plan for '{project}':");
    for file in &plan.files {
        let (action, kind) = match file.disposition {
            FileDisposition::Local => ("open", "local"),
            FileDisposition::Remote => ("open", "remote"),
            FileDisposition::Missing => ("skip", "missing"),
        };
        println!("  {action} {} ({kind})", file.path);
    }
    if let Some(selected) = &plan.selected {
        println!("  focus {selected}");
    }
    Ok(())
}

fn clear_project(paths: &Paths, args: ClearArgs) -> Result<()> {
    let project = require_project(&args.project)?;
    let mut store = paths.projects_file();
    if args.forget {
        if !store
            .remove_section(project)
            .with_context(|| format!("failed to update {}", store.path().display()))?
        {
            bail!("project '{project}' is not recorded");
        }
        println!("Removed project '{project}'");
        return Ok(());
    }

    if !store.sections()?.iter().any(|name| name == project) {
        bail!("project '{project}' is not recorded");
    }
    WorkspaceConfig::clear_snapshot(&mut store, project)
        .with_context(|| format!("failed to update {}", store.path().display()))?;
    println!("Cleared saved workspace for project '{project}'");
    Ok(())
}

fn execute_settings_command(command: SettingsCommand, paths: &Paths) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let store = paths.settings_store()?;
            let rendered = serde_json::to_string_pretty(store.settings())
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        SettingsCommand::SetDefault(args) => {
            let enabled: bool = args.state.into();
            let mut store = paths.settings_store()?;
            store
                .update(|settings| settings.default_enabled = enabled)
                .with_context(|| format!("failed to save {}", store.path().display()))?;
            println!(
                "Workspace is now {} by default",
                if enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
    }
}

fn require_project(project: &str) -> Result<&str> {
    let trimmed = project.trim();
    if trimmed.is_empty() {
        bail!("project name cannot be empty");
    }
    Ok(trimmed)
}

fn state_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".projws")
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
