//! Description-resolution strategies.
//!
//! The two historical pipeline variants survive as two named strategies
//! over the same contract: given an image, produce the signal the advice
//! model will see. They intentionally keep their own downstream model ids
//! and prompt wording.

use crate::caption::CaptionerHandle;
use crate::image::OutfitImage;
use tracing::debug;

/// How the pipeline turns an uploaded photo into a signal the advice model
/// can use.
#[derive(Debug)]
pub enum DescriptionResolver {
    /// Forward the encoded image to a vision-capable chat model, which
    /// describes and advises in one call.
    RemoteMultimodal,
    /// Caption the image locally and send only the caption text. Visual
    /// detail the captioner does not verbalize never reaches the advice
    /// model.
    LocalCaption(CaptionerHandle),
}

/// Outcome of resolving an image.
#[derive(Debug, Clone)]
pub enum ImageSignal {
    /// The image passes through to a multimodal request.
    Image(OutfitImage),
    /// A local caption replaces the image, which is discarded here.
    Caption(String),
}

impl DescriptionResolver {
    /// Default chat model id for this strategy.
    #[must_use]
    pub const fn default_model_id(&self) -> &'static str {
        match self {
            Self::RemoteMultimodal => "llama-3.2-11b-vision-preview",
            Self::LocalCaption(_) => "llama-3.1-8b-instant",
        }
    }

    /// Resolve the uploaded image into the signal sent downstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the local captioner fails to load or generate.
    pub fn resolve(&self, image: OutfitImage) -> crate::Result<ImageSignal> {
        match self {
            Self::RemoteMultimodal => Ok(ImageSignal::Image(image)),
            Self::LocalCaption(handle) => {
                let captioner = handle.get()?;
                let caption = captioner.caption(&image)?;
                debug!(%caption, "resolved image to caption");
                Ok(ImageSignal::Caption(caption))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::caption::Captioner;
    use crate::error::CaptionError;
    use crate::image::ImageFormat;
    use std::sync::Arc;

    struct StubCaptioner(&'static str);

    impl Captioner for StubCaptioner {
        fn caption(&self, _photo: &OutfitImage) -> Result<String, CaptionError> {
            Ok(self.0.to_string())
        }
    }

    fn jpeg_stub() -> OutfitImage {
        OutfitImage::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0], ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn remote_multimodal_passes_the_image_through() {
        let resolver = DescriptionResolver::RemoteMultimodal;
        match resolver.resolve(jpeg_stub()).unwrap() {
            ImageSignal::Image(image) => assert_eq!(image.format(), ImageFormat::Jpeg),
            ImageSignal::Caption(_) => panic!("expected image passthrough"),
        }
    }

    #[test]
    fn local_caption_replaces_the_image_with_text() {
        let handle = CaptionerHandle::new(|| {
            Ok(Arc::new(StubCaptioner("a person in a red jacket")) as Arc<dyn Captioner>)
        });
        let resolver = DescriptionResolver::LocalCaption(handle);

        match resolver.resolve(jpeg_stub()).unwrap() {
            ImageSignal::Caption(caption) => assert_eq!(caption, "a person in a red jacket"),
            ImageSignal::Image(_) => panic!("expected caption"),
        }
    }

    #[test]
    fn strategies_keep_their_own_model_ids() {
        assert_eq!(
            DescriptionResolver::RemoteMultimodal.default_model_id(),
            "llama-3.2-11b-vision-preview"
        );
        let handle = CaptionerHandle::new(|| {
            Ok(Arc::new(StubCaptioner("x")) as Arc<dyn Captioner>)
        });
        assert_eq!(
            DescriptionResolver::LocalCaption(handle).default_model_id(),
            "llama-3.1-8b-instant"
        );
    }
}
