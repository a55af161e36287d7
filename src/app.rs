//! Application context and UI loop.
//!
//! [`App`] owns every piece of state the UI can observe: the gallery, the
//! slideshow session, the search controller, the random source and the
//! surface. Nothing else holds a reference to them; background work reaches the
//! app only through [`UiDispatcher`].

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::artwork::LoadedImage;
use crate::client::ArtworkClient;
use crate::config::Configuration;
use crate::dispatch::{self, UiDispatcher, UiReceiver};
use crate::events::{UiEvent, UserCommand};
use crate::gallery::GalleryState;
use crate::query::Media;
use crate::surface::UiSurface;
use crate::tasks::loader::ImageLoader;
use crate::tasks::search::SearchController;
use crate::tasks::slideshow::SlideshowScheduler;

pub struct App<S: UiSurface> {
    gallery: GalleryState,
    slideshow: SlideshowScheduler,
    search: SearchController,
    rng: StdRng,
    surface: S,
    dispatcher: UiDispatcher,
}

impl<S: UiSurface> App<S> {
    pub fn new(
        search: SearchController,
        placeholder: LoadedImage,
        rng: StdRng,
        surface: S,
    ) -> (Self, UiReceiver) {
        let (dispatcher, events) = dispatch::channel();
        let app = Self {
            gallery: GalleryState::new(placeholder),
            slideshow: SlideshowScheduler::new(),
            search,
            rng,
            surface,
            dispatcher,
        };
        (app, events)
    }

    /// Wires the real HTTP client, loader and placeholder from configuration.
    /// `seed` makes the slideshow's choices reproducible.
    pub fn from_config(
        cfg: &Configuration,
        seed: Option<u64>,
        surface: S,
    ) -> Result<(Self, UiReceiver)> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = cfg.request_timeout {
            http = http.timeout(timeout);
        }
        let http = http.build()?;

        let client = ArtworkClient::from_config(http.clone(), cfg)?;
        let loader = ImageLoader::new(http, cfg.max_concurrent_fetches);
        let placeholder = match &cfg.placeholder_path {
            Some(path) => LoadedImage::placeholder_from_file(path)?,
            None => LoadedImage::placeholder(),
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self::new(
            SearchController::new(client, loader),
            placeholder,
            rng,
            surface,
        ))
    }

    pub fn gallery(&self) -> &GalleryState {
        &self.gallery
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_playing(&self) -> bool {
        self.slideshow.is_running()
    }

    pub fn is_searching(&self) -> bool {
        self.search.in_flight().is_some()
    }

    pub fn dispatcher(&self) -> &UiDispatcher {
        &self.dispatcher
    }

    /// "Get Images". Ignored while a search is in flight, matching a disabled trigger.
    pub fn get_images(&mut self, term: &str, media: Media) {
        if self.is_searching() {
            debug!("search trigger disabled; ignoring request");
            return;
        }
        let _ = self.search.begin(
            term,
            media,
            &mut self.slideshow,
            &mut self.surface,
            &self.dispatcher,
        );
    }

    /// "Play"/"Pause".
    pub fn toggle_play(&mut self) {
        self.slideshow
            .toggle(&self.gallery, &mut self.surface, &self.dispatcher);
    }

    pub fn show_grid(&mut self) {
        self.surface.show_grid(&self.gallery);
    }

    /// Applies one dispatched event. This is the only place background results
    /// reach gallery or surface state.
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Progress { search, fraction } => {
                self.search.on_progress(search, fraction, &mut self.surface);
            }
            UiEvent::SearchFinished { search, outcome } => {
                self.search
                    .finish(search, outcome, &mut self.gallery, &mut self.surface);
            }
            UiEvent::SlideshowTick { session } => {
                self.slideshow.apply_tick(
                    session,
                    &mut self.gallery,
                    &mut self.rng,
                    &mut self.surface,
                );
            }
        }
    }

    /// Returns `false` when the command asks the loop to end.
    pub fn command(&mut self, command: UserCommand) -> bool {
        match command {
            UserCommand::Search { term, media } => self.get_images(&term, media),
            UserCommand::TogglePlay => self.toggle_play(),
            UserCommand::ShowGrid => self.show_grid(),
            UserCommand::Quit => return false,
        }
        true
    }

    /// Single-threaded UI loop. Runs until the user quits, the command source
    /// closes, or `cancel` fires; the slideshow timer is torn down on exit.
    pub async fn run(
        mut self,
        mut events: UiReceiver,
        mut commands: Receiver<UserCommand>,
        cancel: CancellationToken,
    ) -> Result<()> {
        loop {
            select! {
                _ = cancel.cancelled() => break,
                Some(event) = events.recv() => self.handle(event),
                maybe_cmd = commands.recv() => match maybe_cmd {
                    Some(cmd) => {
                        if !self.command(cmd) {
                            break;
                        }
                    }
                    None => {
                        debug!("command source closed");
                        break;
                    }
                },
            }
        }
        self.slideshow.stop(&mut self.surface);
        info!("ui loop exited");
        Ok(())
    }
}
