#![allow(dead_code)]

use std::collections::HashSet;

use projws_project::{DocumentHost, DocumentId, HostError};
use projws_settings::{ConfigStore, ConfigStoreError, ConfigValue, MemoryConfigStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Save(String),
    Close(String),
    Open(String),
    Activate(String),
}

#[derive(Debug, Clone)]
struct FakeDocument {
    id: DocumentId,
    local: Option<String>,
    remote: Option<String>,
    modified: bool,
    save_as: Option<String>,
    fail_save: bool,
}

impl FakeDocument {
    fn identity(&self) -> Option<&str> {
        self.local.as_deref().or(self.remote.as_deref())
    }

    fn label(&self) -> String {
        self.identity()
            .map(str::to_string)
            .unwrap_or_else(|| format!("<untitled {}>", self.id.raw()))
    }
}

/// In-memory editor used to drive the controller.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub project: String,
    pub existing: HashSet<String>,
    docs: Vec<FakeDocument>,
    focused: Option<DocumentId>,
    next_id: u64,
    calls: Vec<HostCall>,
}

impl FakeHost {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            ..Self::default()
        }
    }

    pub fn with_files(mut self, files: &[&str]) -> Self {
        for file in files {
            self.existing.insert(file.to_string());
        }
        self
    }

    pub fn select_project(&mut self, project: &str) {
        self.project = project.to_string();
    }

    fn push(&mut self, local: Option<&str>, remote: Option<&str>) -> DocumentId {
        self.next_id += 1;
        let id = DocumentId::new(self.next_id);
        self.docs.push(FakeDocument {
            id,
            local: local.map(str::to_string),
            remote: remote.map(str::to_string),
            modified: false,
            save_as: None,
            fail_save: false,
        });
        self.focused = Some(id);
        id
    }

    /// Opens a local document without logging a host call.
    pub fn seed_local(&mut self, path: &str) -> DocumentId {
        self.existing.insert(path.to_string());
        self.push(Some(path), None)
    }

    pub fn seed_remote(&mut self, address: &str) -> DocumentId {
        self.push(None, Some(address))
    }

    /// A never-saved buffer; `save_as` is what the save dialog would return.
    pub fn seed_untitled(&mut self, save_as: Option<&str>) -> DocumentId {
        let id = self.push(None, None);
        let doc = self.doc_mut(id).expect("seeded document");
        doc.modified = true;
        doc.save_as = save_as.map(str::to_string);
        id
    }

    pub fn mark_modified(&mut self, id: DocumentId) {
        if let Some(doc) = self.doc_mut(id) {
            doc.modified = true;
        }
    }

    pub fn fail_saves(&mut self, id: DocumentId) {
        if let Some(doc) = self.doc_mut(id) {
            doc.fail_save = true;
        }
    }

    pub fn focus(&mut self, id: DocumentId) {
        self.focused = Some(id);
    }

    pub fn open_paths(&self) -> Vec<String> {
        self.docs.iter().map(FakeDocument::label).collect()
    }

    pub fn focused_path(&self) -> Option<String> {
        let id = self.focused?;
        self.docs
            .iter()
            .find(|doc| doc.id == id)
            .map(FakeDocument::label)
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn opened(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Open(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Close(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    fn doc(&self, id: DocumentId) -> Option<&FakeDocument> {
        self.docs.iter().find(|doc| doc.id == id)
    }

    fn doc_mut(&mut self, id: DocumentId) -> Option<&mut FakeDocument> {
        self.docs.iter_mut().find(|doc| doc.id == id)
    }
}

impl DocumentHost for FakeHost {
    fn current_project(&self) -> String {
        self.project.clone()
    }

    fn documents(&self) -> Vec<DocumentId> {
        self.docs.iter().map(|doc| doc.id).collect()
    }

    fn focused_document(&self) -> Option<DocumentId> {
        self.focused
    }

    fn local_path(&self, doc: DocumentId) -> Option<String> {
        self.doc(doc).and_then(|doc| doc.local.clone())
    }

    fn remote_path(&self, doc: DocumentId) -> Option<String> {
        self.doc(doc).and_then(|doc| doc.remote.clone())
    }

    fn is_modified(&self, doc: DocumentId) -> bool {
        self.doc(doc).map(|doc| doc.modified).unwrap_or(false)
    }

    fn save(&mut self, id: DocumentId, path: Option<&str>) -> Result<(), HostError> {
        let doc = self.doc_mut(id).ok_or(HostError::UnknownDocument(id))?;
        if doc.fail_save {
            return Err(HostError::Rejected("disk full".into()));
        }
        let target = match path {
            Some(path) => path.to_string(),
            None => doc.save_as.clone().ok_or(HostError::Cancelled)?,
        };
        if doc.local.is_none() && doc.remote.is_none() {
            doc.local = Some(target.clone());
        }
        doc.modified = false;
        self.existing.insert(target.clone());
        self.calls.push(HostCall::Save(target));
        Ok(())
    }

    fn close(&mut self, id: DocumentId, confirm: bool) -> Result<(), HostError> {
        assert!(!confirm, "capture must close without prompting");
        let index = self
            .docs
            .iter()
            .position(|doc| doc.id == id)
            .ok_or(HostError::UnknownDocument(id))?;
        let doc = self.docs.remove(index);
        if self.focused == Some(id) {
            self.focused = self.docs.last().map(|doc| doc.id);
        }
        self.calls.push(HostCall::Close(doc.label()));
        Ok(())
    }

    fn open(&mut self, path: &str) -> Result<DocumentId, HostError> {
        self.calls.push(HostCall::Open(path.to_string()));
        let id = if path.to_ascii_lowercase().starts_with("ftp::") {
            self.push(None, Some(path))
        } else {
            self.push(Some(path), None)
        };
        Ok(id)
    }

    fn activate(&mut self, path: &str) -> Result<(), HostError> {
        let id = self
            .docs
            .iter()
            .find(|doc| doc.identity() == Some(path))
            .map(|doc| doc.id)
            .ok_or_else(|| HostError::NotOpen(path.to_string()))?;
        self.focused = Some(id);
        self.calls.push(HostCall::Activate(path.to_string()));
        Ok(())
    }

    fn file_exists(&self, path: &str) -> bool {
        self.existing.contains(path)
    }
}

/// Memory store that counts writes.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: MemoryConfigStore,
    pub writes: usize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(projects: &[&str]) -> Self {
        let mut store = Self::new();
        for project in projects {
            store
                .inner
                .write_bool(project, projws_project::WORKSPACE_MODE_KEY, true)
                .expect("memory store write");
        }
        store
    }

    pub fn text(&self, section: &str, key: &str) -> Option<String> {
        match self.inner.value(section, key)? {
            ConfigValue::Text(text) => Some(text.clone()),
            ConfigValue::Bool(_) => None,
        }
    }
}

impl ConfigStore for RecordingStore {
    fn read_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfigStoreError> {
        self.inner.read_bool(section, key, default)
    }

    fn write_bool(
        &mut self,
        section: &str,
        key: &str,
        value: bool,
    ) -> Result<(), ConfigStoreError> {
        self.writes += 1;
        self.inner.write_bool(section, key, value)
    }

    fn read_string(
        &self,
        section: &str,
        key: &str,
        default: &str,
    ) -> Result<String, ConfigStoreError> {
        self.inner.read_string(section, key, default)
    }

    fn write_string(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigStoreError> {
        self.writes += 1;
        self.inner.write_string(section, key, value)
    }

    fn write_strings(
        &mut self,
        section: &str,
        entries: &[(&str, &str)],
    ) -> Result<(), ConfigStoreError> {
        self.writes += 1;
        self.inner.write_strings(section, entries)
    }

    fn sections(&self) -> Result<Vec<String>, ConfigStoreError> {
        self.inner.sections()
    }
}

/// Store whose backing file cannot be opened.
#[derive(Debug, Default)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn error() -> ConfigStoreError {
        ConfigStoreError::Unavailable("projects file is locked".into())
    }
}

impl ConfigStore for UnavailableStore {
    fn read_bool(&self, _: &str, _: &str, _: bool) -> Result<bool, ConfigStoreError> {
        Err(Self::error())
    }

    fn write_bool(&mut self, _: &str, _: &str, _: bool) -> Result<(), ConfigStoreError> {
        Err(Self::error())
    }

    fn read_string(&self, _: &str, _: &str, _: &str) -> Result<String, ConfigStoreError> {
        Err(Self::error())
    }

    fn write_string(&mut self, _: &str, _: &str, _: &str) -> Result<(), ConfigStoreError> {
        Err(Self::error())
    }

    fn sections(&self) -> Result<Vec<String>, ConfigStoreError> {
        Err(Self::error())
    }
}
