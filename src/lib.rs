pub mod app;
pub mod artwork;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod gallery;
pub mod input;
pub mod query;
pub mod surface;
pub mod tasks {
    pub mod loader;
    pub mod search;
    pub mod slideshow;
}
