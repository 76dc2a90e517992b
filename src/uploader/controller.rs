//! The UI controller behind the admin upload panel.
//!
//! Owns the staged selection, keeps the native file-input mirror in sync
//! after every mutation, rebuilds previews wholesale, and runs the one
//! explicit upload action. There is no lock against a second in-flight
//! upload; the `&mut self` receivers are the only serialization, and two
//! back-to-back uploads simply resolve last-response-wins.

use crate::errors::AppError;
use crate::preview::{PreviewBlock, PreviewRenderer};
use crate::staging::{FileInputMirror, StagedFile, StagedSelection};
use crate::uploader::relay_client::RelayClient;

pub const EMPTY_SELECTION_ERROR: &str = "Please select images to upload.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network or server error.";

/// Message surfaced next to the upload controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Error(String),
    Success(String),
}

pub struct StagingController {
    selection: StagedSelection,
    mirror: FileInputMirror,
    renderer: PreviewRenderer,
    previews: Vec<PreviewBlock>,
    messages: Vec<StatusMessage>,
    busy: bool,
    client: RelayClient,
}

impl StagingController {
    pub fn new(client: RelayClient) -> Self {
        Self {
            selection: StagedSelection::new(),
            mirror: FileInputMirror::new(),
            renderer: PreviewRenderer::new(),
            previews: Vec::new(),
            messages: Vec::new(),
            busy: false,
            client,
        }
    }

    /// Drag-drop: append to whatever is already staged.
    pub async fn add_via_drop(&mut self, files: Vec<StagedFile>) {
        self.selection.add(files);
        self.sync_and_render().await;
    }

    /// File picker: discard the prior selection and adopt the new one.
    pub async fn replace_via_picker(&mut self, files: Vec<StagedFile>) {
        self.selection.replace(files);
        self.sync_and_render().await;
    }

    /// Remove by position. Out-of-bounds is a silent no-op, but the mirror
    /// and previews are rebuilt either way.
    pub async fn remove_at(&mut self, index: usize) {
        self.selection.remove_at(index);
        self.sync_and_render().await;
    }

    /// The explicit "Upload All" action. Guarded by a non-empty selection;
    /// shows the busy indicator for the duration of the request; never
    /// retries.
    pub async fn upload_all(&mut self) -> bool {
        self.messages.clear();

        if self.selection.is_empty() {
            self.messages
                .push(StatusMessage::Error(EMPTY_SELECTION_ERROR.to_string()));
            return false;
        }

        self.busy = true;
        let result = self.client.upload(self.selection.files()).await;
        self.busy = false;

        match result {
            Ok(urls) => {
                self.messages.push(StatusMessage::Success(format!(
                    "Images uploaded! URLs: {}",
                    urls.join(", ")
                )));
                self.selection.clear();
                self.sync_and_render().await;
                true
            }
            Err(AppError::Network(e)) => {
                log::warn!("Upload transport failure: {}", e);
                self.messages
                    .push(StatusMessage::Error(NETWORK_ERROR_MESSAGE.to_string()));
                false
            }
            Err(AppError::UploadFailed { reason }) => {
                self.messages.push(StatusMessage::Error(reason));
                false
            }
            Err(e) => {
                self.messages.push(StatusMessage::Error(e.to_string()));
                false
            }
        }
    }

    async fn sync_and_render(&mut self) {
        self.mirror.sync(&self.selection);
        self.previews = self.renderer.render(&self.selection).await;
    }

    pub fn selection(&self) -> &StagedSelection {
        &self.selection
    }

    pub fn mirror(&self) -> &FileInputMirror {
        &self.mirror
    }

    pub fn previews(&self) -> &[PreviewBlock] {
        &self.previews
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}
