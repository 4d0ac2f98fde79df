use std::path::{Path, PathBuf};

use mononote_core::{NOTE_FILE_EXTENSIONS, NoteFile};

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a note file: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode note: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A file the note is bound to; autosave writes go here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    path: PathBuf,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name with extension, as shown in the header.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// User-driven file choice. `None` means the user cancelled.
pub trait FilePicker: Send + Sync {
    fn pick_open(&self) -> Option<PathBuf>;
    fn pick_save(&self, suggested_name: &str) -> Option<PathBuf>;
}

/// Always answers with the same path; used by the command line.
#[derive(Debug, Clone)]
pub struct FixedPathPicker {
    path: PathBuf,
}

impl FixedPathPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FilePicker for FixedPathPicker {
    fn pick_open(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn pick_save(&self, _suggested_name: &str) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

pub struct FileService<P> {
    picker: P,
}

impl<P: FilePicker> FileService<P> {
    pub fn new(picker: P) -> Self {
        Self { picker }
    }

    pub async fn open(&self) -> Result<Option<(FileHandle, NoteFile)>, FileError> {
        let Some(path) = self.picker.pick_open() else {
            return Ok(None);
        };
        let handle = FileHandle::new(path);
        let file = read_note(handle.path()).await?;
        tracing::info!("opened {}", handle.path().display());
        Ok(Some((handle, file)))
    }

    /// Writes to `handle`, or asks for a location first when there is none.
    pub async fn save(
        &self,
        handle: Option<&FileHandle>,
        file: &NoteFile,
        suggested_name: &str,
    ) -> Result<Option<FileHandle>, FileError> {
        let handle = match handle {
            Some(handle) => handle.clone(),
            None => match self.picker.pick_save(suggested_name) {
                Some(path) => FileHandle::new(with_note_extension(path)),
                None => return Ok(None),
            },
        };
        write_note(handle.path(), file).await?;
        tracing::info!("saved {}", handle.path().display());
        Ok(Some(handle))
    }

    pub async fn save_as(
        &self,
        file: &NoteFile,
        suggested_name: &str,
    ) -> Result<Option<FileHandle>, FileError> {
        self.save(None, file, suggested_name).await
    }
}

pub async fn read_note(path: &Path) -> Result<NoteFile, FileError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    NoteFile::from_json_str(&text).map_err(|source| FileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn write_note(path: &Path, file: &NoteFile) -> Result<(), FileError> {
    let text = file.to_json_pretty().map_err(FileError::Encode)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Picked paths without a note extension get `.mnote`.
fn with_note_extension(path: PathBuf) -> PathBuf {
    let known = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            NOTE_FILE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        });
    if known {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(".");
        name.push(NOTE_FILE_EXTENSIONS[0]);
        PathBuf::from(name)
    }
}
