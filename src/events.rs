use crate::artwork::LoadedImage;
use crate::query::Media;

/// Identifies one search from trigger to outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchId(pub u64);

/// Identifies one run of the slideshow timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Work handed to the UI loop from background tasks.
#[derive(Debug)]
pub enum UiEvent {
    Progress { search: SearchId, fraction: f64 },
    SearchFinished { search: SearchId, outcome: SearchOutcome },
    SlideshowTick { session: SessionId },
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// Enough distinct artworks; handles are in locator order.
    Loaded(Vec<LoadedImage>),
    /// Fewer than the required number of distinct artworks.
    Insufficient { found: usize },
    /// Transport or parse failure, rendered for the user.
    Failed(String),
}

/// Input from whatever drives the controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Search { term: String, media: Media },
    TogglePlay,
    ShowGrid,
    Quit,
}
