//! Local image captioning.
//!
//! The captioning model is expensive to load, so it lives behind
//! [`CaptionerHandle`]: a lazily-initialized, thread-safe holder that loads
//! the model on first access and hands out the cached instance afterwards.

mod blip;

pub use blip::{BLIP_MODEL_ID, BlipCaptioner};

use crate::error::CaptionError;
use crate::image::OutfitImage;
use std::sync::{Arc, Mutex, PoisonError};

/// Produces a text description of an image.
pub trait Captioner: Send + Sync {
    /// Generate a caption for the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded or generation fails.
    fn caption(&self, photo: &OutfitImage) -> Result<String, CaptionError>;
}

type Loader = dyn Fn() -> Result<Arc<dyn Captioner>, CaptionError> + Send + Sync;

/// Lazily-initialized holder for a captioning model.
///
/// The loader runs at most once per successful load; every later access
/// returns the same cached instance. A failed load is not cached, so a
/// later access retries.
pub struct CaptionerHandle {
    loader: Box<Loader>,
    cached: Mutex<Option<Arc<dyn Captioner>>>,
}

impl std::fmt::Debug for CaptionerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loaded = self
            .cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("CaptionerHandle")
            .field("loaded", &loaded)
            .finish()
    }
}

impl CaptionerHandle {
    /// Create a handle with a custom loader.
    #[must_use]
    pub fn new(
        loader: impl Fn() -> Result<Arc<dyn Captioner>, CaptionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            loader: Box::new(loader),
            cached: Mutex::new(None),
        }
    }

    /// Handle that loads the default BLIP captioning model on first use.
    #[must_use]
    pub fn blip() -> Self {
        Self::new(|| Ok(Arc::new(BlipCaptioner::load()?) as Arc<dyn Captioner>))
    }

    /// Get the captioner, loading it on first access.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if loading fails; nothing is cached in
    /// that case.
    pub fn get(&self) -> Result<Arc<dyn Captioner>, CaptionError> {
        let mut slot = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(captioner) = slot.as_ref() {
            return Ok(Arc::clone(captioner));
        }
        let captioner = (self.loader)()?;
        *slot = Some(Arc::clone(&captioner));
        Ok(captioner)
    }
}
