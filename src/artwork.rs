use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use tokio::sync::watch;

use crate::query::ArtworkLocator;

const PLACEHOLDER_LOCATOR: &str = "placeholder:default";
const PLACEHOLDER_EDGE: u32 = 100;
const PLACEHOLDER_GREY: Rgba<u8> = Rgba([0xd0, 0xd0, 0xd0, 0xff]);

/// Decode progress of a single artwork.
#[derive(Debug, Clone)]
pub enum ImageState {
    Pending,
    Ready(Arc<RgbaImage>),
    Broken(String),
}

impl ImageState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Display handle for one artwork.
///
/// The handle exists before its pixels do: the loader hands it out immediately
/// and fills in the state from a background task. Clones share that state.
#[derive(Clone)]
pub struct LoadedImage {
    locator: ArtworkLocator,
    state: watch::Receiver<ImageState>,
}

impl LoadedImage {
    /// Creates a pending handle together with the sender that resolves it.
    pub fn pending(locator: ArtworkLocator) -> (Self, watch::Sender<ImageState>) {
        let (tx, rx) = watch::channel(ImageState::Pending);
        (Self { locator, state: rx }, tx)
    }

    pub fn ready(locator: ArtworkLocator, pixels: RgbaImage) -> Self {
        let (_tx, rx) = watch::channel(ImageState::Ready(Arc::new(pixels)));
        Self { locator, state: rx }
    }

    /// Flat grey tile used before any search has completed.
    pub fn placeholder() -> Self {
        let pixels = RgbaImage::from_pixel(PLACEHOLDER_EDGE, PLACEHOLDER_EDGE, PLACEHOLDER_GREY);
        Self::ready(ArtworkLocator::from(PLACEHOLDER_LOCATOR), pixels)
    }

    pub fn placeholder_from_file(path: &Path) -> Result<Self> {
        let pixels = image::open(path)
            .with_context(|| format!("failed to decode placeholder {}", path.display()))?
            .to_rgba8();
        let locator = ArtworkLocator::new(format!("file:{}", path.display()));
        Ok(Self::ready(locator, pixels))
    }

    pub fn locator(&self) -> &ArtworkLocator {
        &self.locator
    }

    /// Snapshot of the current decode state.
    pub fn state(&self) -> ImageState {
        self.state.borrow().clone()
    }

    /// Waits until the background decode has settled and returns the final state.
    pub async fn settled(&self) -> ImageState {
        let mut rx = self.state.clone();
        match rx.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.clone(),
            // Sender dropped without resolving the handle.
            Err(_) => ImageState::Broken("loader went away".to_string()),
        }
    }
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            ImageState::Pending => "pending",
            ImageState::Ready(_) => "ready",
            ImageState::Broken(_) => "broken",
        };
        f.debug_struct("LoadedImage")
            .field("locator", &self.locator)
            .field("state", &state)
            .finish()
    }
}
