//! Grid assignment and surplus pool.
//!
//! `GalleryState` carries no locking: it is owned by the UI loop and every
//! mutation happens there. Background tasks reach it only through
//! [`UiDispatcher`](crate::dispatch::UiDispatcher).

use crate::artwork::LoadedImage;
use crate::error::GalleryError;

pub const GRID_COLUMNS: usize = 5;
pub const GRID_ROWS: usize = 4;
pub const SLOT_COUNT: usize = GRID_COLUMNS * GRID_ROWS;

/// Minimum distinct artworks a search needs: a full grid plus one image the
/// slideshow can rotate in.
pub const MIN_RESULTS: usize = SLOT_COUNT + 1;

#[derive(Debug, Clone)]
pub struct GalleryState {
    slots: Vec<LoadedImage>,
    surplus: Vec<LoadedImage>,
}

impl GalleryState {
    /// Every slot starts on `placeholder`; the surplus pool starts empty.
    pub fn new(placeholder: LoadedImage) -> Self {
        Self {
            slots: vec![placeholder; SLOT_COUNT],
            surplus: Vec::new(),
        }
    }

    /// Puts the first `SLOT_COUNT` images into the grid in order and the rest
    /// into the surplus pool, replacing the previous pool. Returns the indices
    /// of the slots that were reassigned.
    pub fn replace_all(&mut self, images: Vec<LoadedImage>) -> std::ops::Range<usize> {
        let mut images = images.into_iter();
        let mut filled = 0;
        while filled < self.slots.len() {
            let Some(image) = images.next() else { break };
            self.slots[filled] = image;
            filled += 1;
        }
        self.surplus = images.collect();
        0..filled
    }

    pub fn set_slot(&mut self, index: usize, image: LoadedImage) -> Result<(), GalleryError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(GalleryError::SlotOutOfRange { index, len })?;
        *slot = image;
        Ok(())
    }

    pub fn slots(&self) -> &[LoadedImage] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&LoadedImage> {
        self.slots.get(index)
    }

    pub fn surplus(&self) -> &[LoadedImage] {
        &self.surplus
    }

    pub fn has_surplus(&self) -> bool {
        !self.surplus.is_empty()
    }
}
