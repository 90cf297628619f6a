//! Fakes for driving `SessionManager` without a GUI or a real document format.
//!
//! Fake document format: plain text. A line `FATAL` makes decoding fail, each
//! line starting with `warn:` becomes a recoverable diagnostic.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use cropdesk_core::{
    converted_path, Config, Decoded, Document, DocumentCodec, GroupId, ImportAdapter,
    MemoryMruStore, MessageLevel, MruRegistry, ParseDiagnostic, SaveChoice, SavePrompt, Script,
    ScriptLoader, SessionId, SessionManager, UiHost,
};

// === Documents ===

/// Test-side view of a document the codec produced
#[derive(Clone, Default)]
pub struct DocHandle {
    pub dirty: Arc<AtomicBool>,
    pub detached: Arc<AtomicBool>,
    pub fail_save: Arc<AtomicBool>,
    pub saved_to: Arc<Mutex<Vec<PathBuf>>>,
}

impl DocHandle {
    pub fn edit(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

struct FakeDocument {
    handle: DocHandle,
}

impl Document for FakeDocument {
    fn is_dirty(&self) -> bool {
        self.handle.dirty.load(Ordering::SeqCst)
    }

    fn save_to(&mut self, path: &Path) -> anyhow::Result<()> {
        if self.handle.fail_save.load(Ordering::SeqCst) {
            anyhow::bail!("write protected");
        }
        self.handle.saved_to.lock().push(path.to_path_buf());
        self.handle.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn detach(&mut self) {
        self.handle.detached.store(true, Ordering::SeqCst);
    }
}

/// Codec over the plain-text fake format. Clones share state.
#[derive(Clone, Default)]
pub struct FakeCodec {
    pub documents: Arc<Mutex<Vec<DocHandle>>>,
    pub decodes: Arc<AtomicUsize>,
}

impl FakeCodec {
    fn decode(&self, text: &str) -> anyhow::Result<Decoded> {
        self.decodes.fetch_add(1, Ordering::SeqCst);

        if text.lines().any(|line| line.trim() == "FATAL") {
            anyhow::bail!("unreadable simulation document");
        }

        let diagnostics = text
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                line.strip_prefix("warn:")
                    .map(|msg| ParseDiagnostic::at_line(msg.trim(), i + 1))
            })
            .collect();

        let handle = DocHandle::default();
        self.documents.lock().push(handle.clone());

        Ok(Decoded {
            document: Box::new(FakeDocument { handle }),
            diagnostics,
        })
    }

    /// Handle of the n-th document decoded
    pub fn doc(&self, n: usize) -> DocHandle {
        self.documents.lock()[n].clone()
    }

    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }
}

impl DocumentCodec for FakeCodec {
    fn decode_from_path(&self, path: &Path) -> anyhow::Result<Decoded> {
        let text = std::fs::read_to_string(path)?;
        self.decode(&text)
    }

    fn decode_from_text(&self, text: &str) -> anyhow::Result<Decoded> {
        self.decode(text)
    }
}

/// Importer that copies the legacy text into `<stem>.sim`, failing on any
/// file containing `broken`.
#[derive(Clone, Default)]
pub struct FakeImporter {
    pub calls: Arc<AtomicUsize>,
}

impl ImportAdapter for FakeImporter {
    fn convert(&self, legacy_path: &Path) -> anyhow::Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = std::fs::read_to_string(legacy_path)?;
        if text.contains("broken") {
            anyhow::bail!("unsupported legacy schema");
        }
        let target = converted_path(legacy_path, "sim");
        std::fs::write(&target, text)?;
        Ok(target)
    }
}

// === UI ===

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Message(String, MessageLevel),
    AddTab(String, SessionId, GroupId),
    RemoveTab(GroupId, usize),
    SelectTab(SessionId, GroupId),
    Busy(bool),
    Recent(Vec<PathBuf>),
    Prompt(String),
    AskSaveName,
}

/// Records every command and answers prompts from a queue (default: Cancel)
#[derive(Default)]
pub struct RecordingUi {
    pub events: Mutex<Vec<UiEvent>>,
    pub choices: Mutex<VecDeque<SaveChoice>>,
    pub save_name: Mutex<Option<PathBuf>>,
}

impl RecordingUi {
    pub fn answer(&self, choices: &[SaveChoice]) {
        self.choices.lock().extend(choices.iter().copied());
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn messages(&self, level: MessageLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Message(text, l) if l == level => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Prompt(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    pub fn tabs_added(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, UiEvent::AddTab(..)))
            .count()
    }

    pub fn busy_calls(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Busy(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn last_recent(&self) -> Option<Vec<PathBuf>> {
        self.events().into_iter().rev().find_map(|e| match e {
            UiEvent::Recent(list) => Some(list),
            _ => None,
        })
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().push(event);
    }
}

impl SavePrompt for RecordingUi {
    fn prompt_save_discard_cancel(&self, label: &str) -> SaveChoice {
        self.push(UiEvent::Prompt(label.to_string()));
        self.choices.lock().pop_front().unwrap_or(SaveChoice::Cancel)
    }

    fn ask_save_file_name(&self, _suggested: Option<&Path>) -> Option<PathBuf> {
        self.push(UiEvent::AskSaveName);
        self.save_name.lock().clone()
    }
}

impl UiHost for RecordingUi {
    fn show_message(&self, text: &str, level: MessageLevel) {
        self.push(UiEvent::Message(text.to_string(), level));
    }

    fn add_tab(&self, label: &str, session: SessionId, group: GroupId) {
        self.push(UiEvent::AddTab(label.to_string(), session, group));
    }

    fn remove_tab(&self, group: GroupId, index: usize) {
        self.push(UiEvent::RemoveTab(group, index));
    }

    fn select_tab(&self, session: SessionId, group: GroupId) {
        self.push(UiEvent::SelectTab(session, group));
    }

    fn set_busy(&self, busy: bool) {
        self.push(UiEvent::Busy(busy));
    }

    fn refresh_recent_files(&self, entries: &[PathBuf]) {
        self.push(UiEvent::Recent(entries.to_vec()));
    }
}

// === Scripts ===

/// Scripts are one command per line: `open <path>` or `fail <reason>`
pub struct LineScriptLoader;

struct LineScript {
    commands: Vec<String>,
}

impl Script for LineScript {
    fn execute(&self, manager: &mut SessionManager) -> anyhow::Result<()> {
        for command in &self.commands {
            if let Some(path) = command.strip_prefix("open ") {
                manager.open_file(path.trim(), GroupId::Secondary)?;
            } else if let Some(reason) = command.strip_prefix("fail ") {
                anyhow::bail!("{}", reason.trim());
            }
        }
        Ok(())
    }
}

impl ScriptLoader for LineScriptLoader {
    fn load(&self, source: &str) -> anyhow::Result<Box<dyn Script>> {
        if source.trim().is_empty() {
            anyhow::bail!("empty script");
        }
        Ok(Box::new(LineScript {
            commands: source.lines().map(str::to_string).collect(),
        }))
    }
}

// === Harness ===

pub struct Harness {
    pub manager: SessionManager,
    pub ui: Arc<RecordingUi>,
    pub codec: FakeCodec,
    pub importer: FakeImporter,
    pub store: MemoryMruStore,
    /// Resolved path of `dir`, the form the manager records
    pub root: PathBuf,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_capacity(5)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_store(capacity, MemoryMruStore::new())
    }

    pub fn with_store(capacity: usize, store: MemoryMruStore) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        let ui = Arc::new(RecordingUi::default());
        let codec = FakeCodec::default();
        let importer = FakeImporter::default();

        let mut config = Config::new(dir.path().to_path_buf());
        config.mru_capacity = capacity;
        let mru = MruRegistry::load(capacity, Box::new(store.clone()));

        let manager = SessionManager::new(
            config,
            mru,
            Box::new(codec.clone()),
            Box::new(importer.clone()),
            ui.clone(),
        );

        Self {
            manager,
            ui,
            codec,
            importer,
            store,
            root,
            dir,
        }
    }

    /// Write `content` to `name` inside the temp directory
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}
