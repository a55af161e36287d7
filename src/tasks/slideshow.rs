//! Slideshow timer and its Stopped/Running state machine.
//!
//! The timer task only dispatches [`UiEvent::SlideshowTick`]; the grid mutation
//! itself happens in [`SlideshowScheduler::apply_tick`] on the UI loop.

use std::time::Duration;

use rand::Rng;
use tokio::select;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::dispatch::UiDispatcher;
use crate::events::{SessionId, UiEvent};
use crate::gallery::GalleryState;
use crate::surface::{ToggleLabel, UiSurface};

pub const TICK_PERIOD: Duration = Duration::from_millis(1000);

pub const MSG_NOTHING_TO_PLAY: &str = "Load images first before starting slideshow.";
pub const MSG_PLAYING: &str = "Slideshow playing...";
pub const MSG_PAUSED: &str = "Slideshow paused.";

struct Session {
    id: SessionId,
    cancel: CancellationToken,
    timer: JoinHandle<()>,
}

impl Session {
    fn shut_down(self) {
        self.cancel.cancel();
        self.timer.abort();
    }
}

/// At most one timer exists at a time; `session` is `Some` exactly while running.
pub struct SlideshowScheduler {
    session: Option<Session>,
    next_id: u64,
    period: Duration,
}

impl Default for SlideshowScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideshowScheduler {
    pub fn new() -> Self {
        Self {
            session: None,
            next_id: 0,
            period: TICK_PERIOD,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Starts a fresh timer. Refused when the surplus pool is empty; a timer
    /// that is already running is shut down first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        gallery: &GalleryState,
        ui: &mut dyn UiSurface,
        dispatcher: &UiDispatcher,
    ) -> Option<SessionId> {
        if !gallery.has_surplus() {
            debug!("slideshow start refused: surplus pool empty");
            ui.set_status(MSG_NOTHING_TO_PLAY);
            return None;
        }

        if let Some(previous) = self.session.take() {
            debug!(session = previous.id.0, "replacing running slideshow timer");
            previous.shut_down();
        }

        self.next_id += 1;
        let id = SessionId(self.next_id);
        let cancel = CancellationToken::new();
        let timer = tokio::spawn(run_timer(id, self.period, dispatcher.clone(), cancel.clone()));
        self.session = Some(Session { id, cancel, timer });

        info!(
            session = id.0,
            surplus = gallery.surplus().len(),
            period_ms = self.period.as_millis() as u64,
            "slideshow started"
        );
        ui.set_toggle_label(ToggleLabel::Pause);
        ui.set_status(MSG_PLAYING);
        Some(id)
    }

    /// Cancels the timer. Returns `false`, touching nothing, when already stopped.
    pub fn stop(&mut self, ui: &mut dyn UiSurface) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        info!(session = session.id.0, "slideshow stopped");
        session.shut_down();
        ui.set_toggle_label(ToggleLabel::Play);
        ui.set_status(MSG_PAUSED);
        true
    }

    pub fn toggle(
        &mut self,
        gallery: &GalleryState,
        ui: &mut dyn UiSurface,
        dispatcher: &UiDispatcher,
    ) {
        if self.is_running() {
            self.stop(ui);
        } else {
            self.start(gallery, ui, dispatcher);
        }
    }

    /// Swaps one uniformly chosen slot for one uniformly chosen surplus image.
    /// Ticks from a session that is no longer current are ignored. Returns the
    /// reassigned slot index.
    pub fn apply_tick<R: Rng>(
        &self,
        session: SessionId,
        gallery: &mut GalleryState,
        rng: &mut R,
        ui: &mut dyn UiSurface,
    ) -> Option<usize> {
        if self.current_session() != Some(session) {
            trace!(session = session.0, "dropping tick from stale slideshow session");
            return None;
        }
        let slot_count = gallery.slots().len();
        let pool_size = gallery.surplus().len();
        if slot_count == 0 || pool_size == 0 {
            return None;
        }

        let slot = rng.random_range(0..slot_count);
        let pick = rng.random_range(0..pool_size);
        let image = gallery.surplus()[pick].clone();
        if let Err(err) = gallery.set_slot(slot, image) {
            warn!("slideshow tick rejected: {err}");
            return None;
        }
        trace!(session = session.0, slot, pick, "slideshow swapped slot");
        if let Some(image) = gallery.slot(slot) {
            ui.show_slot(slot, image);
        }
        Some(slot)
    }
}

impl Drop for SlideshowScheduler {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.shut_down();
        }
    }
}

/// Fixed-rate ticks, first one a full period after start. Ticks missed while
/// the runtime was stalled are dropped rather than replayed back to back.
fn tick_interval(period: Duration) -> Interval {
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticks
}

async fn run_timer(
    session: SessionId,
    period: Duration,
    dispatcher: UiDispatcher,
    cancel: CancellationToken,
) {
    let mut ticks = tick_interval(period);
    loop {
        select! {
            _ = cancel.cancelled() => break,
            _ = ticks.tick() => {
                if !dispatcher.dispatch(UiEvent::SlideshowTick { session }) {
                    break;
                }
            }
        }
    }
    trace!(session = session.0, "slideshow timer exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::LoadedImage;
    use crate::dispatch;
    use crate::gallery::GalleryState;
    use crate::query::ArtworkLocator;
    use crate::surface::Notice;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Default)]
    struct Labels {
        status: Vec<String>,
        toggles: Vec<ToggleLabel>,
        shown: Vec<usize>,
    }

    impl UiSurface for Labels {
        fn set_status(&mut self, message: &str) {
            self.status.push(message.to_string());
        }
        fn set_progress(&mut self, _fraction: f64) {}
        fn set_trigger_enabled(&mut self, _enabled: bool) {}
        fn set_toggle_label(&mut self, label: ToggleLabel) {
            self.toggles.push(label);
        }
        fn show_notice(&mut self, _notice: Notice) {}
        fn show_slot(&mut self, index: usize, _image: &LoadedImage) {
            self.shown.push(index);
        }
        fn show_grid(&mut self, _gallery: &GalleryState) {}
    }

    fn gallery_with_surplus(surplus: usize) -> GalleryState {
        let mut gallery = GalleryState::new(LoadedImage::placeholder());
        let images = (0..20 + surplus)
            .map(|i| LoadedImage::pending(ArtworkLocator::new(format!("https://a.test/{i}.jpg"))).0)
            .collect();
        gallery.replace_all(images);
        gallery
    }

    #[tokio::test]
    async fn start_without_surplus_is_refused() {
        let (dispatcher, _rx) = dispatch::channel();
        let mut ui = Labels::default();
        let mut slideshow = SlideshowScheduler::new();

        let started = slideshow.start(&gallery_with_surplus(0), &mut ui, &dispatcher);

        assert_eq!(started, None);
        assert!(!slideshow.is_running());
        assert!(ui.toggles.is_empty());
        assert_eq!(ui.status, [MSG_NOTHING_TO_PLAY]);
    }

    #[tokio::test]
    async fn restart_replaces_session() {
        let (dispatcher, _rx) = dispatch::channel();
        let mut ui = Labels::default();
        let mut slideshow = SlideshowScheduler::new();
        let gallery = gallery_with_surplus(3);

        let first = slideshow.start(&gallery, &mut ui, &dispatcher).unwrap();
        let first_cancel = slideshow.session.as_ref().unwrap().cancel.clone();
        let second = slideshow.start(&gallery, &mut ui, &dispatcher).unwrap();

        assert_ne!(first, second);
        assert!(first_cancel.is_cancelled());
        assert_eq!(slideshow.current_session(), Some(second));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (dispatcher, _rx) = dispatch::channel();
        let mut ui = Labels::default();
        let mut slideshow = SlideshowScheduler::new();
        slideshow.start(&gallery_with_surplus(1), &mut ui, &dispatcher);

        assert!(slideshow.stop(&mut ui));
        assert!(!slideshow.stop(&mut ui));

        assert_eq!(ui.toggles, [ToggleLabel::Pause, ToggleLabel::Play]);
        assert_eq!(ui.status, [MSG_PLAYING, MSG_PAUSED]);
    }

    #[tokio::test]
    async fn tick_swaps_exactly_one_slot_from_surplus() {
        let (dispatcher, _rx) = dispatch::channel();
        let mut ui = Labels::default();
        let mut slideshow = SlideshowScheduler::new();
        let mut gallery = gallery_with_surplus(5);
        let before: Vec<String> = gallery
            .slots()
            .iter()
            .map(|s| s.locator().to_string())
            .collect();
        let surplus: Vec<String> = gallery
            .surplus()
            .iter()
            .map(|s| s.locator().to_string())
            .collect();
        let session = slideshow.start(&gallery, &mut ui, &dispatcher).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let slot = slideshow
            .apply_tick(session, &mut gallery, &mut rng, &mut ui)
            .expect("tick applied");

        let after: Vec<String> = gallery.slots().iter().map(|s| s.locator().to_string()).collect();
        let changed: Vec<usize> = (0..20).filter(|&i| before[i] != after[i]).collect();
        assert_eq!(changed, [slot]);
        assert!(surplus.contains(&after[slot]));
        assert_eq!(gallery.surplus().len(), 5, "surplus images are copied, not moved");
        assert_eq!(ui.shown, [slot]);
    }

    #[tokio::test]
    async fn stale_or_stopped_ticks_are_ignored() {
        let (dispatcher, _rx) = dispatch::channel();
        let mut ui = Labels::default();
        let mut slideshow = SlideshowScheduler::new();
        let mut gallery = gallery_with_surplus(2);
        let mut rng = StdRng::seed_from_u64(1);

        let old = slideshow.start(&gallery, &mut ui, &dispatcher).unwrap();
        slideshow.start(&gallery, &mut ui, &dispatcher).unwrap();
        assert_eq!(slideshow.apply_tick(old, &mut gallery, &mut rng, &mut ui), None);

        let current = slideshow.current_session().unwrap();
        slideshow.stop(&mut ui);
        assert_eq!(slideshow.apply_tick(current, &mut gallery, &mut rng, &mut ui), None);
        assert!(ui.shown.is_empty());
    }

    #[tokio::test]
    async fn uniform_choice_covers_all_slots_and_surplus() {
        let (dispatcher, _rx) = dispatch::channel();
        let mut ui = Labels::default();
        let mut slideshow = SlideshowScheduler::new();
        let mut gallery = gallery_with_surplus(5);
        let session = slideshow.start(&gallery, &mut ui, &dispatcher).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut slots = std::collections::HashSet::new();
        for _ in 0..2000 {
            slots.insert(
                slideshow
                    .apply_tick(session, &mut gallery, &mut rng, &mut ui)
                    .unwrap(),
            );
        }
        assert_eq!(slots.len(), 20);
        let distinct: std::collections::HashSet<String> =
            gallery.slots().iter().map(|s| s.locator().to_string()).collect();
        assert!(distinct.len() <= 5);
    }

    #[tokio::test]
    async fn timer_skips_missed_ticks_at_fixed_period() {
        let ticks = tick_interval(TICK_PERIOD);
        assert_eq!(ticks.period(), TICK_PERIOD);
        assert_eq!(ticks.missed_tick_behavior(), MissedTickBehavior::Skip);
    }
}
