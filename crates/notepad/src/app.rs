use mononote_core::{
    ApplyError, CommandError, DEFAULT_FILE_NAME, Decoration, Document, Editor, Key, KeyEvent,
    NoteFile, RenderedBlock, SessionRecord, SessionRow, render_document, session_rows,
};
use serde_json::Value;

use crate::config::AppConfig;
use crate::file_service::{FileError, FileHandle};

/// Transient message for the user; the latest one replaces any earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub detail: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// Write to the bound file, asking for a location only when unbound.
    Save,
    /// Always ask for a location and rebind to it.
    SaveAs,
}

/// A finished save, reported back to the event loop.
#[derive(Debug)]
pub struct SaveOutcome {
    pub kind: SaveKind,
    /// [`NoteApp::note_seq`] when the save started.
    pub note_seq: u64,
    pub started_at: i64,
    pub result: Result<Option<FileHandle>, FileError>,
}

/// Platform+S. Handled by the app rather than the editor.
pub fn is_save_shortcut(event: &KeyEvent) -> bool {
    event.modifiers.platform() && matches!(event.key, Key::Char('s' | 'S'))
}

/// Everything the note window shows: the editor, the file it is bound to and
/// the session history.
pub struct NoteApp {
    config: AppConfig,
    editor: Editor,
    handle: Option<FileHandle>,
    file_name: String,
    sessions: Vec<SessionRecord>,
    session: SessionRecord,
    notice: Option<Notice>,
    saves_in_flight: usize,
    last_saved_at: Option<i64>,
    /// Bumped whenever a different note is loaded; save results from an
    /// older note must not rebind the current one.
    note_seq: u64,
}

impl NoteApp {
    pub fn new(config: AppConfig, now_ms: i64) -> Self {
        let config = config.with_defaults();
        Self {
            editor: Editor::notepad(Document::empty(), config.editor_config()),
            config,
            handle: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            sessions: Vec::new(),
            session: SessionRecord::start(now_ms),
            notice: None,
            saves_in_flight: 0,
            last_saved_at: None,
            note_seq: 0,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn doc(&self) -> &Document {
        self.editor.doc()
    }

    pub fn handle(&self) -> Option<&FileHandle> {
        self.handle.as_ref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn session(&self) -> &SessionRecord {
        &self.session
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn is_saving(&self) -> bool {
        self.saves_in_flight > 0
    }

    /// Snapshot time of the last successful save of this note.
    pub fn last_saved_at(&self) -> Option<i64> {
        self.last_saved_at
    }

    pub fn note_seq(&self) -> u64 {
        self.note_seq
    }

    /// Whether an edit right now should arm the autosave timer.
    pub fn autosaves(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns whether the document content changed.
    pub fn key_down(&mut self, event: &KeyEvent) -> Result<bool, ApplyError> {
        let before = self.editor.doc().clone();
        self.editor.key_down(event)?;
        Ok(self.note_edit(&before))
    }

    pub fn type_text(&mut self, text: &str) -> Result<bool, ApplyError> {
        let before = self.editor.doc().clone();
        self.editor.type_text(text)?;
        Ok(self.note_edit(&before))
    }

    pub fn paste(&mut self, text: &str) -> Result<bool, ApplyError> {
        let before = self.editor.doc().clone();
        self.editor.insert_plain_text(text)?;
        Ok(self.note_edit(&before))
    }

    /// Toolbar actions go through the same command registry as shortcuts.
    pub fn run_command(&mut self, id: &str, args: Option<Value>) -> Result<bool, CommandError> {
        let before = self.editor.doc().clone();
        self.editor.run_command(id, args)?;
        Ok(self.note_edit(&before))
    }

    pub fn move_to_end(&mut self) {
        self.editor.move_to_end();
    }

    pub fn undo(&mut self) -> bool {
        let before = self.editor.doc().clone();
        self.editor.undo() && self.note_edit(&before)
    }

    pub fn redo(&mut self) -> bool {
        let before = self.editor.doc().clone();
        self.editor.redo() && self.note_edit(&before)
    }

    fn note_edit(&mut self, before: &Document) -> bool {
        let changed = self.editor.doc() != before;
        if changed {
            self.session.mark_modified();
        }
        changed
    }

    /// Unbound, empty note with no past sessions.
    pub fn new_note(&mut self, now_ms: i64) {
        self.replace_note(
            Editor::notepad(Document::empty(), self.config.editor_config()),
            None,
            Vec::new(),
            now_ms,
        );
    }

    /// Replaces the current note with an opened file and starts a new session.
    pub fn load(&mut self, handle: FileHandle, file: NoteFile, now_ms: i64) {
        let history = file.history();
        let mut editor = Editor::notepad(file.content, self.config.editor_config());
        if let Some(history) = history {
            editor.set_history(history);
        }
        self.replace_note(editor, Some(handle), file.sessions, now_ms);
    }

    fn replace_note(
        &mut self,
        editor: Editor,
        handle: Option<FileHandle>,
        sessions: Vec<SessionRecord>,
        now_ms: i64,
    ) {
        self.editor = editor;
        self.file_name = handle
            .as_ref()
            .map(FileHandle::name)
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        self.handle = handle;
        self.sessions = sessions;
        self.session = SessionRecord::start(now_ms);
        self.last_saved_at = None;
        self.note_seq = self.note_seq.wrapping_add(1);
    }

    pub fn fail_open(&mut self, err: &FileError) {
        tracing::error!("open failed: {err}");
        self.notice = Some(Notice::new("Open failed", err.to_string()));
    }

    /// The file as it would be written now: past sessions plus the live one
    /// closed at `now_ms`.
    pub fn snapshot(&self, now_ms: i64) -> NoteFile {
        let mut sessions = self.sessions.clone();
        sessions.push(self.session.closed_at(now_ms));
        NoteFile::new(
            self.editor.doc().clone(),
            &self.editor.history(),
            sessions,
            now_ms,
        )
    }

    pub fn begin_save(&mut self, now_ms: i64) -> NoteFile {
        self.saves_in_flight += 1;
        self.snapshot(now_ms)
    }

    pub fn finish_save(&mut self, outcome: SaveOutcome) {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
        match outcome.result {
            Ok(None) => tracing::debug!("save cancelled"),
            Ok(Some(handle)) => {
                if outcome.note_seq != self.note_seq {
                    tracing::debug!("save finished for a note that is no longer open");
                    return;
                }
                self.last_saved_at = Some(outcome.started_at);
                if outcome.kind == SaveKind::SaveAs || self.handle.is_none() {
                    self.file_name = handle.name();
                    self.handle = Some(handle);
                }
            }
            Err(err) => {
                tracing::error!("save failed: {err}");
                self.notice = Some(Notice::new("Save failed", err.to_string()));
            }
        }
    }

    pub fn tick(&mut self, now_ms: i64) {
        self.session.tick(now_ms);
    }

    pub fn decorations(&self) -> Vec<Decoration> {
        self.editor.decorations()
    }

    pub fn rendered(&self) -> Vec<RenderedBlock> {
        render_document(self.editor.doc(), &self.decorations())
    }

    /// Rows for the session history view, newest first.
    pub fn history_rows(&self) -> Vec<SessionRow> {
        session_rows(&self.sessions, Some(&self.session))
    }
}
