use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file chosen for upload but not yet sent.
///
/// The `id` is assigned when the file enters the selection and never changes,
/// so previews rendered while the list mutates can still name the exact file
/// they belong to. Positional indices are only valid within a single render
/// pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedFile {
    pub id: Uuid,
    pub name: String,
    pub media_type: String,
    #[serde(skip, default)]
    pub bytes: Bytes,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Only files with an `image/*` media type get a preview.
    pub fn is_previewable(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// The ordered staged selection behind the admin upload panel.
///
/// Drag-drop appends, the file picker replaces, removal is positional, and
/// the whole list is cleared after a successful upload.
#[derive(Debug, Default)]
pub struct StagedSelection {
    files: Vec<StagedFile>,
}

impl StagedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append dropped files to the existing selection.
    pub fn add(&mut self, files: impl IntoIterator<Item = StagedFile>) {
        let before = self.files.len();
        self.files.extend(files);
        log::debug!(
            "Staged selection grew from {} to {} files",
            before,
            self.files.len()
        );
    }

    /// Adopt exactly the files chosen through the picker, discarding the
    /// prior selection. An empty choice is a no-op, matching the native
    /// control, which does not fire a replacement for zero files.
    pub fn replace(&mut self, files: Vec<StagedFile>) {
        if files.is_empty() {
            return;
        }
        self.files = files;
    }

    /// Remove the file at `index`. Out-of-bounds indices are a silent no-op;
    /// the removal button that produced them belonged to a render pass that
    /// has since been superseded.
    pub fn remove_at(&mut self, index: usize) {
        if index < self.files.len() {
            let removed = self.files.remove(index);
            log::debug!("Removed staged file {} ({})", index, removed.name);
        } else {
            log::debug!(
                "Ignoring removal at index {} (selection holds {} files)",
                index,
                self.files.len()
            );
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StagedFile> {
        self.files.get(index)
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }
}

/// Stand-in for the native file-input control backing the upload form.
///
/// The control cannot be mutated in place, only rebuilt wholesale, so the
/// controller resynchronizes it after every selection mutation. Invariant:
/// its file set always mirrors the staged selection exactly.
#[derive(Debug, Default)]
pub struct FileInputMirror {
    entries: Vec<(Uuid, String)>,
}

impl FileInputMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the control's file set from the current selection.
    pub fn sync(&mut self, selection: &StagedSelection) {
        self.entries = selection
            .files()
            .iter()
            .map(|f| (f.id, f.name.clone()))
            .collect();
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, name)| name.as_str()).collect()
    }

    /// True when the control holds the same files, in the same order, as the
    /// selection.
    pub fn matches(&self, selection: &StagedSelection) -> bool {
        self.entries.len() == selection.len()
            && self
                .entries
                .iter()
                .zip(selection.files())
                .all(|((id, _), file)| *id == file.id)
    }
}
