//! Search lifecycle: Idle -> Searching -> {Loaded, Insufficient, Failed} -> Idle.
//!
//! `begin` and `finish` run on the UI loop. The network and handle creation run
//! on a spawned worker that reports back only through the dispatcher.

use tracing::{debug, info, warn};

use crate::client::ArtworkClient;
use crate::dispatch::UiDispatcher;
use crate::error::QueryError;
use crate::events::{SearchId, SearchOutcome, UiEvent};
use crate::gallery::{GalleryState, MIN_RESULTS};
use crate::query::{Media, SearchQuery};
use crate::surface::{Notice, NoticeKind, UiSurface};
use crate::tasks::loader::ImageLoader;
use crate::tasks::slideshow::SlideshowScheduler;

pub const MSG_EMPTY_TERM: &str = "Please enter a search term.";
pub const MSG_SEARCHING: &str = "Searching...";
pub const MSG_LOADED: &str = "Images loaded.";
pub const MSG_TOO_FEW: &str = "Found fewer than 21 images. Try another search.";
pub const MSG_FAILED: &str = "Error: could not load images.";

pub struct SearchController {
    client: ArtworkClient,
    loader: ImageLoader,
    next_id: u64,
    in_flight: Option<SearchId>,
}

impl SearchController {
    pub fn new(client: ArtworkClient, loader: ImageLoader) -> Self {
        Self {
            client,
            loader,
            next_id: 0,
            in_flight: None,
        }
    }

    pub fn in_flight(&self) -> Option<SearchId> {
        self.in_flight
    }

    /// Validates the input, stops a running slideshow, locks the trigger and
    /// spawns the worker. An empty term only updates the status line.
    ///
    /// Must be called from within a tokio runtime.
    pub fn begin(
        &mut self,
        term: &str,
        media: Media,
        slideshow: &mut SlideshowScheduler,
        ui: &mut dyn UiSurface,
        dispatcher: &UiDispatcher,
    ) -> Result<SearchId, QueryError> {
        let query = match SearchQuery::new(term, media) {
            Ok(query) => query,
            Err(err) => {
                debug!("search rejected: {err}");
                ui.set_status(MSG_EMPTY_TERM);
                return Err(err);
            }
        };

        // The timer must be gone before the worker can touch the network.
        slideshow.stop(ui);

        self.next_id += 1;
        let search = SearchId(self.next_id);
        self.in_flight = Some(search);

        ui.set_trigger_enabled(false);
        ui.set_progress(0.0);
        ui.set_status(MSG_SEARCHING);
        info!(
            search = search.0,
            term = query.term(),
            media = %query.media(),
            "search started"
        );

        tokio::spawn(supervise(
            search,
            query,
            self.client.clone(),
            self.loader.clone(),
            dispatcher.clone(),
        ));
        Ok(search)
    }

    pub fn on_progress(&self, search: SearchId, fraction: f64, ui: &mut dyn UiSurface) {
        if self.in_flight == Some(search) {
            ui.set_progress(fraction);
        }
    }

    /// Applies a worker outcome. Outcomes of searches that are no longer in
    /// flight are discarded; returns whether this one was applied.
    pub fn finish(
        &mut self,
        search: SearchId,
        outcome: SearchOutcome,
        gallery: &mut GalleryState,
        ui: &mut dyn UiSurface,
    ) -> bool {
        if self.in_flight != Some(search) {
            debug!(search = search.0, "discarding outcome of superseded search");
            return false;
        }
        self.in_flight = None;
        ui.set_trigger_enabled(true);

        match outcome {
            SearchOutcome::Loaded(images) => {
                let total = images.len();
                let changed = gallery.replace_all(images);
                for index in changed {
                    if let Some(image) = gallery.slot(index) {
                        ui.show_slot(index, image);
                    }
                }
                ui.set_progress(1.0);
                ui.set_status(MSG_LOADED);
                info!(
                    search = search.0,
                    total,
                    surplus = gallery.surplus().len(),
                    "search loaded"
                );
            }
            SearchOutcome::Insufficient { found } => {
                ui.set_progress(0.0);
                ui.set_status(MSG_TOO_FEW);
                ui.show_notice(Notice {
                    kind: NoticeKind::Info,
                    title: "Not enough images".to_string(),
                    body: format!(
                        "This search returned {found} distinct image(s); at least {MIN_RESULTS} are needed.\n\
                         Please try a different term or media type."
                    ),
                });
                info!(search = search.0, found, "search returned too few images");
            }
            SearchOutcome::Failed(detail) => {
                ui.set_progress(0.0);
                ui.set_status(MSG_FAILED);
                ui.show_notice(Notice {
                    kind: NoticeKind::Error,
                    title: "Problem contacting the search service".to_string(),
                    body: format!(
                        "There was a problem getting data from the search API.\n\
                         Please try again.\n\nDetails: {detail}"
                    ),
                });
                warn!(search = search.0, %detail, "search failed");
            }
        }
        true
    }
}

/// Runs the worker and always reports an outcome, even if the worker panics.
async fn supervise(
    search: SearchId,
    query: SearchQuery,
    client: ArtworkClient,
    loader: ImageLoader,
    dispatcher: UiDispatcher,
) {
    let worker = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move {
            fetch_outcome(&client, &loader, &query, |fraction| {
                dispatcher.dispatch(UiEvent::Progress { search, fraction });
            })
            .await
        }
    });
    let outcome = match worker.await {
        Ok(outcome) => outcome,
        Err(err) => SearchOutcome::Failed(format!("search worker failed: {err}")),
    };
    dispatcher.dispatch(UiEvent::SearchFinished { search, outcome });
}

/// Background half of a search. Never touches gallery or surface state.
pub async fn fetch_outcome(
    client: &ArtworkClient,
    loader: &ImageLoader,
    query: &SearchQuery,
    on_progress: impl FnMut(f64),
) -> SearchOutcome {
    let locators = match client.search(query).await {
        Ok(locators) => locators,
        Err(err) => return SearchOutcome::Failed(err.to_string()),
    };
    if locators.len() < MIN_RESULTS {
        return SearchOutcome::Insufficient {
            found: locators.len(),
        };
    }
    SearchOutcome::Loaded(loader.load(&locators, on_progress))
}
