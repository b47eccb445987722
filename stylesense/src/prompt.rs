//! Prompt construction for the advice request.
//!
//! The template is static and occasion-parameterized. It always requests
//! the same six advice categories, in the same order, as a numbered list.
//! The two resolution strategies kept their historically divergent wording,
//! so each has its own rendering.

use crate::occasion::Occasion;
use std::fmt::Write as _;

/// The six advice categories every prompt requests, in fixed order.
pub const ADVICE_CATEGORIES: [&str; 6] = [
    "Outfit recommendations",
    "Best color combinations",
    "Footwear suggestion",
    "Accessories suggestion",
    "Grooming tips",
    "Confidence/body language tips",
];

/// System-role framing used by the caption-based strategy.
pub const STYLIST_SYSTEM_PROMPT: &str =
    "You are an expert fashion stylist. Give practical, specific advice in clean bullet points.";

/// Style-advice prompt for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePrompt {
    occasion: Occasion,
}

impl StylePrompt {
    /// Create a prompt for the given occasion.
    #[must_use]
    pub const fn new(occasion: Occasion) -> Self {
        Self { occasion }
    }

    /// Get the occasion this prompt is parameterized with.
    #[must_use]
    pub const fn occasion(&self) -> Occasion {
        self.occasion
    }

    /// Prompt text for the multimodal strategy, where the model sees the
    /// image alongside this text.
    #[must_use]
    pub fn render_multimodal(&self) -> String {
        format!(
            "You are a professional fashion stylist.\n\n\
             Analyze the person in the image and give personalized fashion advice \
             for a {}.\n\n\
             Provide:\n{}\n\
             Answer in clean bullet points.",
            self.occasion,
            categories_block()
        )
    }

    /// Prompt text for the caption strategy, where the caption stands in
    /// for the image.
    #[must_use]
    pub fn render_with_caption(&self, caption: &str) -> String {
        format!(
            "The person in the photo is described as: \"{caption}\".\n\n\
             Based on that description, give personalized fashion advice \
             for a {}.\n\n\
             Provide:\n{}\n\
             Answer in clean bullet points.",
            self.occasion,
            categories_block()
        )
    }
}

/// Render the category list as a numbered block.
fn categories_block() -> String {
    let mut block = String::new();
    for (i, category) in ADVICE_CATEGORIES.iter().enumerate() {
        let _ = writeln!(block, "{}. {category}", i + 1);
    }
    block
}
