use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::select;
use tokio::sync::{Semaphore, watch};
use tracing::debug;

use crate::artwork::{ImageState, LoadedImage};
use crate::query::ArtworkLocator;

// Decodes whatever format the bytes sniff as into RGBA8.
fn decode_rgba8(bytes: &[u8]) -> Result<image::RgbaImage> {
    let img = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(img.to_rgba8())
}

/// Turns locators into display handles.
///
/// `load` returns as soon as every handle exists; downloads and decodes keep
/// running on the tokio runtime and resolve each handle independently.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    http: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl ImageLoader {
    pub fn new(http: reqwest::Client, max_in_flight: usize) -> Self {
        Self {
            http,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Creates one handle per locator, in order, calling `on_progress` after
    /// each with the completed fraction. The final call reports exactly 1.0.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(
        &self,
        locators: &[ArtworkLocator],
        mut on_progress: impl FnMut(f64),
    ) -> Vec<LoadedImage> {
        let total = locators.len();
        let mut images = Vec::with_capacity(total);
        for (i, locator) in locators.iter().enumerate() {
            let (handle, tx) = LoadedImage::pending(locator.clone());
            tokio::spawn(resolve(
                self.http.clone(),
                Arc::clone(&self.permits),
                locator.clone(),
                tx,
            ));
            images.push(handle);
            on_progress((i + 1) as f64 / total as f64);
        }
        images
    }
}

async fn resolve(
    http: reqwest::Client,
    permits: Arc<Semaphore>,
    locator: ArtworkLocator,
    tx: watch::Sender<ImageState>,
) {
    let state = select! {
        // every handle was dropped (e.g. a newer search replaced the grid)
        _ = tx.closed() => {
            debug!(%locator, "artwork no longer displayed; skipping fetch");
            return;
        }
        res = fetch_and_decode(&http, &permits, &locator) => match res {
            Ok(pixels) => {
                debug!(
                    %locator,
                    width = pixels.width(),
                    height = pixels.height(),
                    "artwork decoded"
                );
                ImageState::Ready(Arc::new(pixels))
            }
            Err(err) => {
                debug!(%locator, "artwork failed to load: {err:#}");
                ImageState::Broken(format!("{err:#}"))
            }
        }
    };
    tx.send_replace(state);
}

async fn fetch_and_decode(
    http: &reqwest::Client,
    permits: &Semaphore,
    locator: &ArtworkLocator,
) -> Result<image::RgbaImage> {
    let bytes = {
        let _permit = permits.acquire().await.context("loader shut down")?;
        http.get(locator.as_str())
            .send()
            .await
            .context("request failed")?
            .error_for_status()?
            .bytes()
            .await
            .context("body transfer failed")?
    };
    tokio::task::spawn_blocking(move || decode_rgba8(&bytes))
        .await
        .context("decode task panicked")?
        .context("decode failed")
}
