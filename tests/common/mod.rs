#![allow(dead_code)]

use std::io::Cursor;
use std::time::Duration;

use artwork_gallery::app::App;
use artwork_gallery::artwork::LoadedImage;
use artwork_gallery::config::Configuration;
use artwork_gallery::dispatch::UiReceiver;
use artwork_gallery::events::UiEvent;
use artwork_gallery::gallery::GalleryState;
use artwork_gallery::surface::{Notice, ToggleLabel, UiSurface};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Surface that records every call for assertions.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub status: Vec<String>,
    pub progress: Vec<f64>,
    pub trigger: Vec<bool>,
    pub toggles: Vec<ToggleLabel>,
    pub notices: Vec<Notice>,
    pub shown: Vec<usize>,
}

impl RecordingSurface {
    pub fn last_status(&self) -> Option<&str> {
        self.status.last().map(String::as_str)
    }

    pub fn last_progress(&self) -> Option<f64> {
        self.progress.last().copied()
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger.last().copied().unwrap_or(true)
    }
}

impl UiSurface for RecordingSurface {
    fn set_status(&mut self, message: &str) {
        self.status.push(message.to_string());
    }

    fn set_progress(&mut self, fraction: f64) {
        self.progress.push(fraction);
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.trigger.push(enabled);
    }

    fn set_toggle_label(&mut self, label: ToggleLabel) {
        self.toggles.push(label);
    }

    fn show_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn show_slot(&mut self, index: usize, _image: &LoadedImage) {
        self.shown.push(index);
    }

    fn show_grid(&mut self, _gallery: &GalleryState) {}
}

pub fn artwork_urls(server: &MockServer, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{}/art/{i}.png", server.uri()))
        .collect()
}

/// A search response body listing `urls` as `artworkUrl100` values.
pub fn results_body(urls: &[String]) -> Value {
    let results: Vec<Value> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| json!({ "wrapperType": "track", "trackId": i, "artworkUrl100": url }))
        .collect();
    json!({ "resultCount": results.len(), "results": results })
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png fixture");
    out.into_inner()
}

pub async fn mount_search(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_artwork(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/art/\d+\.png$"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png_bytes()),
        )
        .mount(server)
        .await;
}

pub fn config_for(server: &MockServer) -> Configuration {
    Configuration {
        search_endpoint: format!("{}/search", server.uri()),
        ..Configuration::default()
    }
    .validated()
    .expect("valid test configuration")
}

pub fn app_for(server: &MockServer) -> (App<RecordingSurface>, UiReceiver) {
    App::from_config(&config_for(server), Some(7), RecordingSurface::default())
        .expect("app builds")
}

/// Feeds dispatched events into the app until a search outcome has been handled.
pub async fn drive_until_finished(app: &mut App<RecordingSurface>, events: &mut UiReceiver) {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for search outcome")
            .expect("ui channel closed");
        let finished = matches!(event, UiEvent::SearchFinished { .. });
        app.handle(event);
        if finished {
            return;
        }
    }
}

/// Feeds events until the next slideshow tick has been handled.
pub async fn drive_until_tick(app: &mut App<RecordingSurface>, events: &mut UiReceiver) {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(3), events.recv())
            .await
            .expect("timed out waiting for slideshow tick")
            .expect("ui channel closed");
        let tick = matches!(event, UiEvent::SlideshowTick { .. });
        app.handle(event);
        if tick {
            return;
        }
    }
}

pub fn slot_locators(app: &App<RecordingSurface>) -> Vec<String> {
    app.gallery()
        .slots()
        .iter()
        .map(|s| s.locator().to_string())
        .collect()
}

pub fn surplus_locators(app: &App<RecordingSurface>) -> Vec<String> {
    app.gallery()
        .surplus()
        .iter()
        .map(|s| s.locator().to_string())
        .collect()
}
