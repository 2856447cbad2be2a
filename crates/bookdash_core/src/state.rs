use crate::download::DownloadJob;
use crate::search::SearchJob;
use crate::view_model::{self, AppViewModel};

/// Whole-application state: one job per kind, no hidden shared globals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) download: DownloadJob,
    pub(crate) search: SearchJob,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn download(&self) -> &DownloadJob {
        &self.download
    }

    pub fn search(&self) -> &SearchJob {
        &self.search
    }

    /// Builds the immutable render snapshot for the presentation layer.
    pub fn view(&self) -> AppViewModel {
        view_model::build(self)
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}
