//! The image-to-advice pipeline.
//!
//! One request runs straight through: gate on upload presence, resolve the
//! image, build the variant's message list, make a single completion call,
//! and return the first candidate's text verbatim. Nothing is retried or
//! cached across requests.

use crate::error::{LlmError, Result};
use crate::image::OutfitImage;
use crate::message::{ChatMessage, MessageContent, MessageRole};
use crate::occasion::Occasion;
use crate::prompt::{STYLIST_SYSTEM_PROMPT, StylePrompt};
use crate::providers::{ChatModel, GenerateOptions, TokenUsage};
use crate::resolver::{DescriptionResolver, ImageSignal};
use tracing::{debug, info};

/// Maximum number of tokens requested from the completion service.
pub const MAX_ADVICE_TOKENS: u32 = 800;

/// Free-text advice returned by the completion service, unparsed.
#[derive(Debug, Clone)]
pub struct StyleAdvice {
    /// The generated advice, verbatim.
    pub text: String,
    /// The model that produced it.
    pub model_id: String,
    /// Token usage reported by the service, when available.
    pub token_usage: Option<TokenUsage>,
}

/// One-shot advice pipeline over a resolution strategy and a chat model.
#[derive(Debug)]
pub struct StylePipeline<M> {
    resolver: DescriptionResolver,
    model: M,
}

impl<M: ChatModel> StylePipeline<M> {
    /// Create a pipeline from a resolution strategy and a chat model.
    #[must_use]
    pub const fn new(resolver: DescriptionResolver, model: M) -> Self {
        Self { resolver, model }
    }

    /// Get the resolution strategy in use.
    #[must_use]
    pub const fn resolver(&self) -> &DescriptionResolver {
        &self.resolver
    }

    /// Generate style advice for an uploaded photo and occasion.
    ///
    /// Returns `Ok(None)` without contacting any model when no image was
    /// uploaded.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution or the completion call fails.
    pub async fn advise(
        &self,
        image: Option<OutfitImage>,
        occasion: Occasion,
    ) -> Result<Option<StyleAdvice>> {
        let Some(image) = image else {
            debug!("no image uploaded, skipping advice generation");
            return Ok(None);
        };

        let messages = self.build_messages(image, occasion)?;
        let options = GenerateOptions::new().with_max_tokens(MAX_ADVICE_TOKENS);

        info!(%occasion, model = self.model.model_id(), "requesting style advice");
        let response = self.model.generate(messages, options).await?;

        let text = response
            .text()
            .ok_or_else(|| LlmError::response_format("text content", "choice without text"))?;

        Ok(Some(StyleAdvice {
            text,
            model_id: self.model.model_id().to_string(),
            token_usage: response.token_usage,
        }))
    }

    /// Build the message list for the resolved signal.
    fn build_messages(&self, image: OutfitImage, occasion: Occasion) -> Result<Vec<ChatMessage>> {
        let prompt = StylePrompt::new(occasion);
        let messages = match self.resolver.resolve(image)? {
            ImageSignal::Image(image) => vec![ChatMessage::with_contents(
                MessageRole::User,
                vec![
                    MessageContent::text(prompt.render_multimodal()),
                    MessageContent::from_outfit_image(&image),
                ],
            )],
            ImageSignal::Caption(caption) => vec![
                ChatMessage::system(STYLIST_SYSTEM_PROMPT),
                ChatMessage::user(prompt.render_with_caption(&caption)),
            ],
        };
        Ok(messages)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::caption::{Captioner, CaptionerHandle};
    use crate::error::CaptionError;
    use crate::providers::MockModel;
    use std::sync::Arc;

    struct StubCaptioner(&'static str);

    impl Captioner for StubCaptioner {
        fn caption(&self, _photo: &OutfitImage) -> std::result::Result<String, CaptionError> {
            Ok(self.0.to_string())
        }
    }

    /// Encode a real JPEG in memory for end-to-end runs.
    fn jpeg_fixture(width: u32, height: u32) -> OutfitImage {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([180, 40, 40]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .expect("encode jpeg");
        OutfitImage::from_bytes(buf, crate::image::ImageFormat::Jpeg).unwrap()
    }

    #[tokio::test]
    async fn no_upload_means_no_model_call() {
        let model = MockModel::new(vec!["unused".to_string()]);
        let pipeline = StylePipeline::new(DescriptionResolver::RemoteMultimodal, model);

        let advice = pipeline.advise(None, Occasion::Interview).await.unwrap();

        assert!(advice.is_none());
        assert_eq!(pipeline.model.call_count(), 0);
    }

    #[tokio::test]
    async fn multimodal_end_to_end() {
        let model = MockModel::new(vec!["wear a navy suit".to_string()]);
        let pipeline = StylePipeline::new(DescriptionResolver::RemoteMultimodal, model);

        let advice = pipeline
            .advise(Some(jpeg_fixture(100, 100)), Occasion::Interview)
            .await
            .unwrap()
            .expect("advice should be generated");

        // Output is the model's text, unmodified.
        assert_eq!(advice.text, "wear a navy suit");
        assert_eq!(advice.model_id, "mock-model");

        // Exactly one call, with a single user message mixing text and image.
        assert_eq!(pipeline.model.call_count(), 1);
        let calls = pipeline.model.recorded_calls();
        let messages = &calls[0];
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
        assert!(messages[0].has_image());
        let prompt_text = messages[0].text_content().unwrap();
        assert!(prompt_text.contains("Interview"));
    }

    #[tokio::test]
    async fn caption_end_to_end() {
        let caption = "a person wearing a red jacket";
        let handle =
            CaptionerHandle::new(move || Ok(Arc::new(StubCaptioner(caption)) as Arc<dyn Captioner>));
        let model = MockModel::new(vec!["sequins and loafers".to_string()]);
        let pipeline = StylePipeline::new(DescriptionResolver::LocalCaption(handle), model);

        let advice = pipeline
            .advise(Some(jpeg_fixture(64, 64)), Occasion::Party)
            .await
            .unwrap()
            .expect("advice should be generated");

        assert_eq!(advice.text, "sequins and loafers");

        // Text-only message list of length 2: system framing, then the user
        // prompt embedding the exact caption and the occasion.
        let calls = pipeline.model.recorded_calls();
        let messages = &calls[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].role, MessageRole::User);
        assert!(!messages[0].has_image());
        assert!(!messages[1].has_image());

        let user_text = messages[1].text_content().unwrap();
        assert!(user_text.contains(caption));
        assert!(user_text.contains("Party"));
    }

    #[tokio::test]
    async fn caption_strategy_loads_the_model_once_across_requests() {
        let loads = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let handle = CaptionerHandle::new(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Arc::new(StubCaptioner("a caption")) as Arc<dyn Captioner>)
        });
        let model = MockModel::new(vec!["advice".to_string()]);
        let pipeline = StylePipeline::new(DescriptionResolver::LocalCaption(handle), model);

        for _ in 0..3 {
            pipeline
                .advise(Some(jpeg_fixture(32, 32)), Occasion::Wedding)
                .await
                .unwrap();
        }

        assert_eq!(loads.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(pipeline.model.call_count(), 3);
    }
}
