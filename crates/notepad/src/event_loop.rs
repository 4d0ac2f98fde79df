use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use mononote_core::{KeyEvent, now_millis};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::app::{NoteApp, SaveKind, SaveOutcome, is_save_shortcut};
use crate::file_service::{FilePicker, FileService};

const EVENT_BUFFER: usize = 64;

pub enum AppEvent {
    Key(KeyEvent),
    /// Typed text; `\n` presses Enter.
    Type(String),
    Paste(String),
    Command {
        id: String,
        args: Option<Value>,
    },
    Undo,
    Redo,
    CaretToEnd,
    New,
    Open,
    Save,
    SaveAs,
    /// Read access to the current state, e.g. to draw it.
    Inspect(Box<dyn FnOnce(&NoteApp) + Send>),
    Shutdown,
}

impl AppEvent {
    pub fn command(id: impl Into<String>, args: Option<Value>) -> Self {
        Self::Command {
            id: id.into(),
            args,
        }
    }

    pub fn inspect(f: impl FnOnce(&NoteApp) + Send + 'static) -> Self {
        Self::Inspect(Box::new(f))
    }
}

/// Unix milliseconds that advance with the tokio clock, so the loop's notion
/// of "now" follows paused and advanced time.
#[derive(Debug, Clone, Copy)]
pub struct LoopClock {
    base_ms: i64,
    base: Instant,
}

impl LoopClock {
    pub fn start() -> Self {
        Self::starting_at(now_millis())
    }

    pub fn starting_at(base_ms: i64) -> Self {
        Self {
            base_ms,
            base: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.base.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.base_ms.saturating_add(elapsed)
    }
}

/// Starts the loop on its own task. The task ends on [`AppEvent::Shutdown`]
/// or when every sender is dropped, and hands the app back.
pub fn spawn<P>(
    app: NoteApp,
    files: FileService<P>,
    clock: LoopClock,
) -> (mpsc::Sender<AppEvent>, JoinHandle<NoteApp>)
where
    P: FilePicker + 'static,
{
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let task = tokio::spawn(run(app, Arc::new(files), rx, clock));
    (tx, task)
}

/// Owns `app` until shutdown. A pending autosave is flushed and in-flight
/// saves are awaited before returning.
pub async fn run<P>(
    app: NoteApp,
    files: Arc<FileService<P>>,
    mut events: mpsc::Receiver<AppEvent>,
    clock: LoopClock,
) -> NoteApp
where
    P: FilePicker + 'static,
{
    let (saves_tx, mut saves_rx) = mpsc::unbounded_channel();
    let mut state = LoopState {
        app,
        files,
        clock,
        autosave_at: None,
        saves_tx,
    };
    let mut ticker_seq = state.app.note_seq();
    let mut ticker = session_ticker(state.app.config().session_tick);

    loop {
        let autosave_at = state.autosave_at;
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if state.handle(event).await.is_break() {
                    break;
                }
            }
            () = deadline(autosave_at) => {
                state.autosave_at = None;
                tracing::debug!("autosave");
                state.start_save(SaveKind::Save);
            }
            _ = ticker.tick() => {
                let now = state.clock.now_ms();
                state.app.tick(now);
            }
            Some(outcome) = saves_rx.recv() => state.app.finish_save(outcome),
        }

        // A new session restarts the ticker so it counts from the new open time.
        if state.app.note_seq() != ticker_seq {
            ticker_seq = state.app.note_seq();
            ticker = session_ticker(state.app.config().session_tick);
        }
    }

    if state.autosave_at.take().is_some() {
        state.start_save(SaveKind::Save);
    }
    while state.app.is_saving() {
        match saves_rx.recv().await {
            Some(outcome) => state.app.finish_save(outcome),
            None => break,
        }
    }
    state.app
}

struct LoopState<P> {
    app: NoteApp,
    files: Arc<FileService<P>>,
    clock: LoopClock,
    autosave_at: Option<Instant>,
    saves_tx: mpsc::UnboundedSender<SaveOutcome>,
}

impl<P: FilePicker + 'static> LoopState<P> {
    async fn handle(&mut self, event: AppEvent) -> ControlFlow<()> {
        match event {
            AppEvent::Key(key) if is_save_shortcut(&key) => self.start_save(SaveKind::Save),
            AppEvent::Key(key) => match self.app.key_down(&key) {
                Ok(changed) => self.edited(changed),
                Err(err) => tracing::warn!("key {key:?} failed: {err:?}"),
            },
            AppEvent::Type(text) => match self.app.type_text(&text) {
                Ok(changed) => self.edited(changed),
                Err(err) => tracing::warn!("typing failed: {err:?}"),
            },
            AppEvent::Paste(text) => match self.app.paste(&text) {
                Ok(changed) => self.edited(changed),
                Err(err) => tracing::warn!("paste failed: {err:?}"),
            },
            AppEvent::Command { id, args } => match self.app.run_command(&id, args) {
                Ok(changed) => self.edited(changed),
                Err(err) => tracing::warn!("command {id} failed: {}", err.message()),
            },
            AppEvent::Undo => {
                let changed = self.app.undo();
                self.edited(changed);
            }
            AppEvent::Redo => {
                let changed = self.app.redo();
                self.edited(changed);
            }
            AppEvent::CaretToEnd => self.app.move_to_end(),
            AppEvent::New => {
                self.autosave_at = None;
                self.app.new_note(self.clock.now_ms());
            }
            AppEvent::Open => match self.files.open().await {
                Ok(Some((handle, file))) => {
                    self.autosave_at = None;
                    self.app.load(handle, file, self.clock.now_ms());
                }
                Ok(None) => tracing::debug!("open cancelled"),
                Err(err) => self.app.fail_open(&err),
            },
            AppEvent::Save => self.start_save(SaveKind::Save),
            AppEvent::SaveAs => self.start_save(SaveKind::SaveAs),
            AppEvent::Inspect(f) => f(&self.app),
            AppEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Every content change pushes the autosave deadline out again, but only
    /// for notes that already have a file.
    fn edited(&mut self, changed: bool) {
        if changed && self.app.autosaves() {
            self.autosave_at = Some(Instant::now() + self.app.config().autosave_delay);
        }
    }

    /// Snapshots now and writes on a separate task; the outcome comes back
    /// through `saves_tx`.
    fn start_save(&mut self, kind: SaveKind) {
        if kind == SaveKind::Save {
            self.autosave_at = None;
        }
        let started_at = self.clock.now_ms();
        let file = self.app.begin_save(started_at);
        let handle = self.app.handle().cloned();
        let suggested_name = self.app.file_name().to_string();
        let note_seq = self.app.note_seq();
        let files = Arc::clone(&self.files);
        let done = self.saves_tx.clone();

        tokio::spawn(async move {
            let result = match kind {
                SaveKind::Save => files.save(handle.as_ref(), &file, &suggested_name).await,
                SaveKind::SaveAs => files.save_as(&file, &suggested_name).await,
            };
            let outcome = SaveOutcome {
                kind,
                note_seq,
                started_at,
                result,
            };
            if done.send(outcome).is_err() {
                tracing::debug!("save finished after the event loop stopped");
            }
        });
    }
}

fn session_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
