//! StyleSense - personal fashion advice from a photo.
//!
//! This crate turns an uploaded photo and an occasion into free-text outfit
//! advice. The photo is resolved into a signal the advice model can use in
//! one of two ways: forwarded as-is to a vision-capable chat model, or
//! captioned locally by a pretrained model so only text leaves the machine.
//! Either way, a single chat-completion call produces the advice.

pub mod caption;
pub mod error;
pub mod image;
pub mod message;
pub mod occasion;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod resolver;

pub use error::{CaptionError, Error, ImageError, LlmError, Result};
pub use occasion::Occasion;
pub use self::image::{ImageFormat, OutfitImage};
pub use pipeline::{StyleAdvice, StylePipeline};
pub use resolver::{DescriptionResolver, ImageSignal};
