use std::path::PathBuf;

use crate::api::{ApiError, DocumentFile, UploadReceipt, UPLOAD_FAILED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Dragging,
    Selected,
    Transferring,
    Succeeded,
    Failed,
}

/// Terminal result of the last transfer. A receipt and an error detail can
/// never be held at the same time.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded(UploadReceipt),
    Failed(String),
}

/// Single-slot upload pipeline: pick a file, send it, show how it went.
///
/// A failed transfer keeps the file in the slot so the user can send it
/// again by hand; a successful one empties the slot.
#[derive(Debug, Default)]
pub struct Ingestion {
    file: Option<DocumentFile>,
    outcome: Option<Outcome>,
    transferring: bool,
    dragging: bool,
}

impl Ingestion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.transferring {
            Phase::Transferring
        } else if self.dragging {
            Phase::Dragging
        } else {
            match (&self.outcome, &self.file) {
                (Some(Outcome::Succeeded(_)), _) => Phase::Succeeded,
                (Some(Outcome::Failed(_)), _) => Phase::Failed,
                (None, Some(_)) => Phase::Selected,
                (None, None) => Phase::Empty,
            }
        }
    }

    pub fn file(&self) -> Option<&DocumentFile> {
        self.file.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    #[allow(dead_code)]
    pub fn receipt(&self) -> Option<&UploadReceipt> {
        match &self.outcome {
            Some(Outcome::Succeeded(receipt)) => Some(receipt),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn error_detail(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Failed(detail)) => Some(detail),
            _ => None,
        }
    }

    pub fn can_upload(&self) -> bool {
        self.file.is_some() && !self.transferring && !self.dragging
    }

    pub fn drag_enter(&mut self) {
        if !self.transferring {
            self.dragging = true;
        }
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// Puts `file` in the slot, replacing whatever was there along with any
    /// previous outcome. Ignored while a transfer is running.
    pub fn select_file(&mut self, file: DocumentFile) {
        self.dragging = false;
        if self.transferring {
            tracing::warn!(name = %file.name, "selection ignored: upload in progress");
            return;
        }

        tracing::info!(name = %file.name, size = file.size, mime = %file.mime_type, "document selected");
        self.file = Some(file);
        self.outcome = None;
    }

    /// Selects the file at `path`, reading its metadata. An unreadable path
    /// is reported as a failed outcome and leaves the slot as it was.
    pub fn select_path(&mut self, path: impl Into<PathBuf>) {
        if self.transferring {
            self.dragging = false;
            tracing::warn!("selection ignored: upload in progress");
            return;
        }

        match DocumentFile::from_path(path) {
            Ok(file) => self.select_file(file),
            Err(e) => {
                self.dragging = false;
                tracing::warn!("cannot select document: {e:#}");
                self.outcome = Some(Outcome::Failed(format!("{e:#}")));
            }
        }
    }

    /// Starts the transfer and returns the file to send, or `None` when
    /// there is nothing to send right now.
    pub fn begin_upload(&mut self) -> Option<DocumentFile> {
        if !self.can_upload() {
            return None;
        }

        let file = self.file.clone()?;
        self.transferring = true;
        self.outcome = None;
        tracing::info!(name = %file.name, "upload started");
        Some(file)
    }

    pub fn resolve(&mut self, outcome: Result<UploadReceipt, ApiError>) {
        if !self.transferring {
            tracing::warn!("upload result arrived with no transfer running; dropped");
            return;
        }
        self.transferring = false;

        match outcome {
            Ok(receipt) => {
                tracing::info!(
                    filename = %receipt.filename,
                    chunks = receipt.chunks_processed,
                    "document ingested"
                );
                self.file = None;
                self.outcome = Some(Outcome::Succeeded(receipt));
            }
            Err(e) => {
                tracing::warn!("upload failed: {e}");
                let detail = e.detail().unwrap_or(UPLOAD_FAILED).to_string();
                self.outcome = Some(Outcome::Failed(detail));
            }
        }
    }
}
