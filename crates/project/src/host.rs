use std::io;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{RegexSet, RegexSetBuilder};
use thiserror::Error;

/// Opaque handle for a document owned by the host.
/// 由宿主環境擁有之文件的不透明代號。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Errors reported by a [`DocumentHost`] operation.
/// 宿主文件操作回報的錯誤。
#[derive(Debug, Error)]
pub enum HostError {
    #[error("document {0:?} is no longer open")]
    UnknownDocument(DocumentId),
    #[error("no open document matches {0}")]
    NotOpen(String),
    #[error("operation cancelled by the user")]
    Cancelled,
    #[error("host I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Rejected(String),
}

/// The document-management environment the controller drives.
/// 控制器所操作的文件管理環境。
///
/// Documents are reported in open order. A document's identity is its local
/// path, or its remote address when it has no local path.
pub trait DocumentHost {
    /// Name of the active project; empty when none is selected.
    fn current_project(&self) -> String;

    fn documents(&self) -> Vec<DocumentId>;

    fn focused_document(&self) -> Option<DocumentId>;

    fn local_path(&self, doc: DocumentId) -> Option<String>;

    fn remote_path(&self, doc: DocumentId) -> Option<String> {
        let _ = doc;
        None
    }

    fn is_modified(&self, doc: DocumentId) -> bool;

    /// Saves the document. `path` is `None` for a document that was never
    /// saved, in which case the host may prompt for a destination.
    fn save(&mut self, doc: DocumentId, path: Option<&str>) -> Result<(), HostError>;

    /// Closes the document; `confirm == false` closes without prompting.
    fn close(&mut self, doc: DocumentId, confirm: bool) -> Result<(), HostError>;

    fn open(&mut self, path: &str) -> Result<DocumentId, HostError>;

    /// Brings the open document whose identity is `path` to the front.
    fn activate(&mut self, path: &str) -> Result<(), HostError>;

    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }
}

/// Returns the document's local path, falling back to its remote address.
/// 取得文件的本機路徑；若無則使用遠端位址。
pub fn resolve_identity(host: &dyn DocumentHost, doc: DocumentId) -> Option<String> {
    host.local_path(doc)
        .filter(|path| !path.is_empty())
        .or_else(|| host.remote_path(doc).filter(|path| !path.is_empty()))
}

static DEFAULT_REMOTE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSetBuilder::new(["^ftp::"])
        .case_insensitive(true)
        .build()
        .expect("built-in remote pattern is valid")
});

/// Recognises remote-file addresses, which restore opens without checking
/// the local filesystem. Patterns match case-insensitively.
/// 判斷遠端檔案位址；比對時不分大小寫。
#[derive(Debug, Clone)]
pub struct RemoteMatcher {
    patterns: RegexSet,
}

impl RemoteMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()?;
        Ok(Self { patterns })
    }

    pub fn is_remote(&self, path: &str) -> bool {
        self.patterns.is_match(path)
    }
}

impl Default for RemoteMatcher {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_REMOTE_PATTERNS.clone(),
        }
    }
}
