//! Session manager
//!
//! The single entry point for UI events. Owns both workspace groups and the
//! recent-file registry, so the one-session-per-file rule and the
//! recent-list-matches-disk rule are enforced here and nowhere else.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use cropdesk_documents::{
    Decoded, DocumentCodec, DocumentSession, GroupId, SessionId, WorkspaceGroup,
};
use cropdesk_recent::{DatabaseMruStore, MemoryMruStore, MruRegistry, MruStore, RecentError};
use cropdesk_storage::Database;

use crate::config::Config;
use crate::error::CoreError;
use crate::import::ImportAdapter;
use crate::script::ScriptLoader;
use crate::ui::{BusyGuard, MessageLevel, UiHost};
use crate::Result;

pub struct SessionManager {
    config: Config,
    /// Indexed by `GroupId::index`
    groups: [WorkspaceGroup; 2],
    mru: MruRegistry,
    codec: Box<dyn DocumentCodec>,
    importer: Box<dyn ImportAdapter>,
    ui: Arc<dyn UiHost>,
    busy_depth: Arc<AtomicUsize>,
    /// Whether the secondary group is shown
    split_visible: bool,
}

impl SessionManager {
    pub fn new(
        config: Config,
        mru: MruRegistry,
        codec: Box<dyn DocumentCodec>,
        importer: Box<dyn ImportAdapter>,
        ui: Arc<dyn UiHost>,
    ) -> Self {
        Self {
            config,
            groups: [
                WorkspaceGroup::new(GroupId::Primary),
                WorkspaceGroup::new(GroupId::Secondary),
            ],
            mru,
            codec,
            importer,
            ui,
            busy_depth: Arc::new(AtomicUsize::new(0)),
            split_visible: false,
        }
    }

    /// Open the configuration database named by `config` and load the
    /// recent-file list from it.
    ///
    /// A database that cannot be opened is reported as a warning and the
    /// recent list is kept in memory for this run only.
    pub fn open(
        config: Config,
        codec: Box<dyn DocumentCodec>,
        importer: Box<dyn ImportAdapter>,
        ui: Arc<dyn UiHost>,
    ) -> Self {
        let store: Box<dyn MruStore> = match Database::open(&config.database_path) {
            Ok(db) => Box::new(DatabaseMruStore::new(db)),
            Err(e) => {
                tracing::warn!(
                    database = %config.database_path.display(),
                    error = %e,
                    "Configuration database unavailable, recent files will not be saved"
                );
                ui.show_message(
                    &format!(
                        "Could not open the configuration database {}: {}",
                        config.database_path.display(),
                        e
                    ),
                    MessageLevel::Warning,
                );
                Box::new(MemoryMruStore::new())
            }
        };
        let mru = MruRegistry::load(config.mru_capacity, store);

        tracing::info!(
            database = %config.database_path.display(),
            recent_files = mru.len(),
            "Session manager ready"
        );

        Self::new(config, mru, codec, importer, ui)
    }

    /// Prepare the workbench after the window is shown.
    ///
    /// Drops recent files that no longer exist, publishes the list, then
    /// handles command-line arguments in order: documents open in the
    /// primary group, legacy files are imported, scripts run through
    /// `scripts`. A failing script stops startup with its error; documents
    /// that fail to open have already been reported and are skipped.
    pub fn startup(&mut self, args: &[PathBuf], scripts: Option<&dyn ScriptLoader>) -> Result<()> {
        match self.mru.clean() {
            Ok(0) => {}
            Ok(dropped) => tracing::info!(dropped, "Removed missing files from recent list"),
            Err(e) => self.report_persist_failure(e),
        }
        self.publish_recent();

        for arg in args {
            if Config::has_extension(arg, &self.config.script_extension) {
                let source = std::fs::read_to_string(arg)
                    .map_err(|e| CoreError::file_system("read", arg, e))?;
                let loader = scripts.ok_or_else(|| {
                    CoreError::Script(format!(
                        "no script loader available for {}",
                        arg.display()
                    ))
                })?;
                self.run_script(loader, &source)?;
            } else if Config::has_extension(arg, &self.config.document_extension) {
                if let Err(e) = self.open_file(arg, GroupId::Primary) {
                    tracing::warn!(path = %arg.display(), error = %e, "Skipping command-line document");
                }
            } else if Config::has_extension(arg, &self.config.legacy_extension) {
                if let Err(e) = self.import_legacy_file(arg, GroupId::Primary) {
                    tracing::warn!(path = %arg.display(), error = %e, "Skipping command-line import");
                }
            } else {
                tracing::warn!(path = %arg.display(), "Ignoring unrecognised command-line argument");
            }
        }

        Ok(())
    }

    // === Lookup ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn group(&self, id: GroupId) -> &WorkspaceGroup {
        &self.groups[id.index()]
    }

    fn group_mut(&mut self, id: GroupId) -> &mut WorkspaceGroup {
        &mut self.groups[id.index()]
    }

    /// Group and tab index of an open session
    pub fn locate(&self, id: SessionId) -> Option<(GroupId, usize)> {
        GroupId::ALL.into_iter().find_map(|group| {
            self.group(group)
                .position_of(id)
                .map(|index| (group, index))
        })
    }

    pub fn session(&self, id: SessionId) -> Option<&DocumentSession> {
        let (group, index) = self.locate(id)?;
        self.group(group).get(index).ok()
    }

    pub fn session_count(&self) -> usize {
        self.groups.iter().map(WorkspaceGroup::len).sum()
    }

    /// Session backed by `path` in either group, target group first
    fn find_open(&self, path: &Path, preferred: GroupId) -> Option<(GroupId, SessionId)> {
        [preferred, preferred.other()].into_iter().find_map(|group| {
            self.group(group)
                .find_by_path(path)
                .map(|session| (group, session.id()))
        })
    }

    pub fn split_visible(&self) -> bool {
        self.split_visible
    }

    /// Show or hide the secondary group. Returns the new visibility.
    pub fn toggle_split(&mut self) -> bool {
        self.split_visible = !self.split_visible;
        tracing::debug!(visible = self.split_visible, "Toggled split view");
        self.split_visible
    }

    // === Opening ===

    /// Open the document at `path` in `group`.
    ///
    /// A file that is already open is activated rather than decoded again,
    /// and the existing session's id is returned. Recoverable parse problems
    /// are shown one message each and the document still opens.
    pub fn open_file(&mut self, path: impl AsRef<Path>, group: GroupId) -> Result<SessionId> {
        let path = normalize_path(path.as_ref());

        if let Some((owner, id)) = self.find_open(&path, group) {
            tracing::debug!(session_id = %id, group = %owner, path = %path.display(), "Document already open");
            self.ui.select_tab(id, owner);
            return Ok(id);
        }

        let _busy = self.busy();

        let decoded = match self.codec.decode_from_path(&path) {
            Ok(decoded) => decoded,
            Err(e) => {
                return Err(self.fail(CoreError::FatalLoad {
                    name: path.display().to_string(),
                    reason: format!("{:#}", e),
                }));
            }
        };

        let Decoded {
            document,
            diagnostics,
        } = decoded;
        let id = self.install(
            DocumentSession::from_file(path.clone(), document),
            diagnostics,
            group,
        )?;

        self.remember(path.clone());

        tracing::info!(session_id = %id, group = %group, path = %path.display(), "Opened document");

        Ok(id)
    }

    /// Open `content` as an unsaved document labelled `label`.
    /// Memory documents are never added to the recent-file list.
    pub fn open_from_memory(&mut self, label: &str, content: &str, group: GroupId) -> Result<SessionId> {
        let _busy = self.busy();

        let decoded = match self.codec.decode_from_text(content) {
            Ok(decoded) => decoded,
            Err(e) => {
                return Err(self.fail(CoreError::FatalLoad {
                    name: label.to_string(),
                    reason: format!("{:#}", e),
                }));
            }
        };

        let Decoded {
            document,
            diagnostics,
        } = decoded;
        let id = self.install(DocumentSession::in_memory(label, document), diagnostics, group)?;

        tracing::info!(session_id = %id, group = %group, label = %label, "Opened document from memory");

        Ok(id)
    }

    /// Open a copy of an example file so the original is never saved over.
    pub fn open_example(&mut self, path: &Path, group: GroupId) -> Result<SessionId> {
        let _busy = self.busy();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Err(self.fail(CoreError::file_system("read", path, e))),
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let label = format!("{} (example)", stem);

        self.open_from_memory(&label, &content, group)
    }

    /// Convert a legacy file and open the result.
    ///
    /// A failed conversion creates no session and leaves the recent list alone.
    pub fn import_legacy_file(&mut self, path: &Path, group: GroupId) -> Result<SessionId> {
        let _busy = self.busy();

        let converted = match self.importer.convert(path) {
            Ok(converted) => converted,
            Err(e) => {
                return Err(self.fail(CoreError::Conversion {
                    path: path.to_path_buf(),
                    reason: format!("{:#}", e),
                }));
            }
        };

        tracing::info!(
            legacy = %path.display(),
            converted = %converted.display(),
            "Imported legacy file"
        );

        self.open_file(&converted, group)
    }

    fn install(
        &mut self,
        mut session: DocumentSession,
        diagnostics: Vec<cropdesk_documents::ParseDiagnostic>,
        group: GroupId,
    ) -> Result<SessionId> {
        session.mark_open()?;
        let id = session.id();
        let label = session.label().to_string();

        self.group_mut(group).insert(session)?;

        for diagnostic in &diagnostics {
            tracing::warn!(session_id = %id, diagnostic = %diagnostic, "Recoverable parse error");
            self.ui
                .show_message(&format!("{}: {}", label, diagnostic), MessageLevel::Warning);
        }

        self.ui.add_tab(&label, id, group);

        Ok(id)
    }

    // === Closing ===

    /// Close the tab at `index` in `group` if its document may be closed.
    ///
    /// Returns `Ok(false)` when the user keeps the document open; the tab must
    /// stay. On `Ok(true)` the session is detached and gone from the group.
    pub fn close_session(&mut self, group: GroupId, index: usize) -> Result<bool> {
        let ui = Arc::clone(&self.ui);
        let session = self.group_mut(group).get_mut(index)?;

        session.begin_close()?;
        let allowed = match session.save_if_changed(ui.as_ref()) {
            Ok(allowed) => allowed,
            Err(e) => {
                report_to(ui.as_ref(), &CoreError::from(e));
                false
            }
        };

        if !allowed {
            session.abort_close()?;
            tracing::debug!(session_id = %session.id(), "Close refused");
            return Ok(false);
        }

        let mut session = self.group_mut(group).remove_at(index)?;
        session.detach()?;

        Ok(true)
    }

    /// Close a session by id and remove its tab.
    pub fn request_close(&mut self, id: SessionId) -> Result<bool> {
        let (group, index) = self.locate(id).ok_or(CoreError::SessionNotFound(id))?;

        let closed = self.close_session(group, index)?;
        if closed {
            self.ui.remove_tab(group, index);
        }
        Ok(closed)
    }

    /// Ask every open session whether it may close.
    ///
    /// Every session is asked exactly once, even after one has refused, so
    /// the user sees each unsaved document. Only if all agree are the
    /// sessions detached; otherwise all of them stay open.
    pub fn close_all(&mut self) -> bool {
        let ui = Arc::clone(&self.ui);
        let mut allowed = true;

        for group in self.groups.iter_mut() {
            for session in group.iter_mut() {
                if let Err(e) = session.begin_close() {
                    tracing::error!(session_id = %session.id(), error = %e, "Cannot start close");
                    allowed = false;
                    continue;
                }

                let ok = match session.save_if_changed(ui.as_ref()) {
                    Ok(ok) => ok,
                    Err(e) => {
                        report_to(ui.as_ref(), &CoreError::from(e));
                        false
                    }
                };
                allowed = ok && allowed;
            }
        }

        if !allowed {
            for session in self.groups.iter_mut().flat_map(|g| g.iter_mut()) {
                if let Err(e) = session.abort_close() {
                    tracing::error!(session_id = %session.id(), error = %e, "Cannot reopen session");
                }
            }
            tracing::info!("Close all refused");
            return false;
        }

        for group in self.groups.iter_mut() {
            for mut session in group.drain() {
                if let Err(e) = session.detach() {
                    tracing::error!(session_id = %session.id(), error = %e, "Failed to detach session");
                }
            }
        }

        tracing::info!("All sessions closed");
        true
    }

    /// Shutdown gate. On `true` every session is closed and the recent list
    /// has been flushed; the process may exit.
    pub fn app_close_requested(&mut self) -> bool {
        if !self.close_all() {
            return false;
        }

        if let Err(e) = self.mru.flush() {
            self.report_persist_failure(e);
        }

        tracing::info!("Workbench may exit");
        true
    }

    // === Recent files ===

    /// Recent files, most recent first
    pub fn recent_files(&self) -> Vec<PathBuf> {
        self.mru.list()
    }

    pub fn mru(&self) -> &MruRegistry {
        &self.mru
    }

    /// Suggested destination when copying `path`: "Copy of <name>" beside it
    pub fn default_copy_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let copy_name = format!("Copy of {}", name);
        match path.parent() {
            Some(dir) => dir.join(copy_name),
            None => PathBuf::from(copy_name),
        }
    }

    /// Rename a recent file on disk, then in the list.
    /// An existing destination is never overwritten.
    pub fn rename_mru_entry(&mut self, old_path: &Path, new_path: &Path) -> Result<()> {
        let old_path = normalize_path(old_path);
        let new_path = normalize_path(new_path);
        if old_path == new_path {
            return Ok(());
        }

        if new_path.symlink_metadata().is_ok() {
            let e = io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", new_path.display()),
            );
            return Err(self.fail(CoreError::file_system("rename", &old_path, e)));
        }

        if let Err(e) = std::fs::rename(&old_path, &new_path) {
            return Err(self.fail(CoreError::file_system("rename", &old_path, e)));
        }

        tracing::info!(old = %old_path.display(), new = %new_path.display(), "Renamed file");

        if let Err(e) = self.mru.rename(&old_path, new_path) {
            self.report_persist_failure(e);
        }
        self.publish_recent();
        Ok(())
    }

    /// Copy a recent file on disk and list the copy as most recent.
    /// An existing destination is never overwritten.
    pub fn copy_mru_entry(&mut self, path: &Path, copy_path: &Path) -> Result<()> {
        let path = normalize_path(path);
        let copy_path = normalize_path(copy_path);

        if let Err(e) = copy_new(&path, &copy_path) {
            return Err(self.fail(CoreError::file_system("copy", &path, e)));
        }

        tracing::info!(from = %path.display(), to = %copy_path.display(), "Copied file");

        // Resolve again now that the copy exists
        self.remember(normalize_path(&copy_path));
        Ok(())
    }

    /// Delete a recent file from disk, then from the list.
    pub fn delete_mru_entry(&mut self, path: &Path) -> Result<()> {
        let path = normalize_path(path);
        if let Err(e) = std::fs::remove_file(&path) {
            return Err(self.fail(CoreError::file_system("delete", &path, e)));
        }

        tracing::info!(path = %path.display(), "Deleted file");

        if let Err(e) = self.mru.remove(&path) {
            self.report_persist_failure(e);
        }
        self.publish_recent();
        Ok(())
    }

    /// Forget a recent file without touching the disk
    pub fn remove_mru_entry(&mut self, path: &Path) -> bool {
        let path = normalize_path(path);
        let removed = match self.mru.remove(&path) {
            Ok(removed) => removed,
            Err(e) => {
                self.report_persist_failure(e);
                true
            }
        };
        self.publish_recent();
        removed
    }

    pub fn clear_mru(&mut self) {
        if let Err(e) = self.mru.clear() {
            self.report_persist_failure(e);
        }
        self.publish_recent();
    }

    fn remember(&mut self, path: PathBuf) {
        if let Err(e) = self.mru.add(path) {
            self.report_persist_failure(e);
        }
        self.publish_recent();
    }

    fn publish_recent(&self) {
        self.ui.refresh_recent_files(&self.mru.list());
    }

    // === Scripts ===

    /// Load and execute a script against this manager.
    pub fn run_script(&mut self, loader: &dyn ScriptLoader, source: &str) -> Result<()> {
        let script = loader
            .load(source)
            .map_err(|e| CoreError::Script(format!("{:#}", e)))?;

        tracing::info!("Running script");

        script
            .execute(self)
            .map_err(|e| CoreError::Script(format!("{:#}", e)))
    }

    // === Reporting ===

    fn busy(&self) -> BusyGuard {
        BusyGuard::new(Arc::clone(&self.ui), Arc::clone(&self.busy_depth))
    }

    /// Show `err` to the user and hand it back for propagation
    fn fail(&self, err: CoreError) -> CoreError {
        report_to(self.ui.as_ref(), &err);
        err
    }

    fn report_persist_failure(&self, err: RecentError) {
        tracing::warn!(error = %err, "Recent file list not saved");
        self.ui.show_message(
            &format!("Could not save the recent file list: {}", err),
            MessageLevel::Warning,
        );
    }
}

fn report_to(ui: &dyn UiHost, err: &CoreError) {
    tracing::error!(error = %err, "Operation failed");
    ui.show_message(&err.to_string(), MessageLevel::Error);
}

/// Identity of a file for duplicate detection and the recent list.
///
/// Existing files resolve through the file system. A missing file keeps its
/// name under its resolved parent, or failing that a lexically cleaned
/// absolute path.
fn normalize_path(path: &Path) -> PathBuf {
    let absolute = lexical_absolute(path);
    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return canonical;
    }

    match (absolute.parent(), absolute.file_name()) {
        (Some(dir), Some(name)) => match std::fs::canonicalize(dir) {
            Ok(dir) => dir.join(name),
            Err(_) => absolute,
        },
        _ => absolute,
    }
}

/// Absolute form of `path` with `.` and `..` folded away
fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

/// Copy `from` into a file that must not exist yet. The destination is
/// created atomically, so a file appearing concurrently is never overwritten.
fn copy_new(from: &Path, to: &Path) -> io::Result<u64> {
    let mut source = File::open(from)?;
    let mut target = OpenOptions::new().write(true).create_new(true).open(to)?;

    let copied = io::copy(&mut source, &mut target)
        .and_then(|n| target.set_permissions(source.metadata()?.permissions()).map(|_| n));
    if copied.is_err() {
        // Partial copy; the destination was ours to create
        let _ = std::fs::remove_file(to);
    }
    copied
}
