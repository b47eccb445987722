//! BLIP caption generation with candle.
//!
//! Loads the pretrained model and its matching tokenizer from the Hugging
//! Face hub, preprocesses the photo into the vision tower's expected input
//! tensor, and greedily decodes a caption. Greedy decoding keeps captions
//! stable across calls for the same photo.

use super::Captioner;
use crate::error::CaptionError;
use crate::image::OutfitImage;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::blip::{self, BlipForConditionalGeneration};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use std::sync::{Mutex, PoisonError};
use tokenizers::Tokenizer;
use tracing::{debug, info};

/// Model repository for the pretrained captioning weights.
pub const BLIP_MODEL_ID: &str = "Salesforce/blip-image-captioning-large";

// The safetensors conversion lives on a PR revision of the upstream repo.
const BLIP_REVISION: &str = "refs/pr/18";

const BOS_TOKEN_ID: u32 = 30522;
const SEP_TOKEN_ID: u32 = 102;

/// Input resolution expected by the vision tower.
const IMAGE_SIZE: usize = 384;

// CLIP normalization constants.
const MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
const STD: [f32; 3] = [0.268_629_54, 0.261_302_6, 0.275_777_1];

/// Upper bound on generated caption length, in tokens.
const MAX_CAPTION_TOKENS: usize = 60;

/// BLIP image-captioning model and its matching tokenizer.
///
/// Load once per process via [`super::CaptionerHandle`]; generation holds
/// an internal lock because the decoder's KV cache is mutable state.
pub struct BlipCaptioner {
    model: Mutex<BlipForConditionalGeneration>,
    tokenizer: Tokenizer,
    device: Device,
}

impl std::fmt::Debug for BlipCaptioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipCaptioner")
            .field("model", &BLIP_MODEL_ID)
            .field("device", &self.device)
            .finish()
    }
}

impl BlipCaptioner {
    /// Fetch (or reuse from the local cache) and load the pretrained
    /// model/tokenizer pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifacts cannot be fetched or the weights
    /// fail to load.
    pub fn load() -> Result<Self, CaptionError> {
        let device = Device::cuda_if_available(0)?;

        let api = Api::new().map_err(|e| CaptionError::Fetch(e.to_string()))?;
        let weights = api
            .repo(Repo::with_revision(
                BLIP_MODEL_ID.to_string(),
                RepoType::Model,
                BLIP_REVISION.to_string(),
            ))
            .get("model.safetensors")
            .map_err(|e| CaptionError::Fetch(e.to_string()))?;
        let tokenizer_file = api
            .model(BLIP_MODEL_ID.to_string())
            .get("tokenizer.json")
            .map_err(|e| CaptionError::Fetch(e.to_string()))?;

        let tokenizer = Tokenizer::from_file(tokenizer_file)
            .map_err(|e| CaptionError::Tokenizer(e.to_string()))?;

        let config = blip::Config::image_captioning_large();
        #[allow(unsafe_code)]
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device)? };
        let model = BlipForConditionalGeneration::new(&config, vb)?;

        info!(model = BLIP_MODEL_ID, device = ?device, "captioning model loaded");

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
        })
    }

    /// Decode the photo and convert it into the model's input tensor:
    /// three-channel RGB at the expected resolution, CLIP-normalized.
    fn preprocess(&self, photo: &OutfitImage) -> Result<Tensor, CaptionError> {
        let img = image::load_from_memory(photo.as_bytes())
            .map_err(|e| CaptionError::Decode(e.to_string()))?
            .resize_to_fill(
                IMAGE_SIZE as u32,
                IMAGE_SIZE as u32,
                image::imageops::FilterType::Triangle,
            )
            .to_rgb8();

        let data = img.into_raw();
        let pixels = Tensor::from_vec(data, (IMAGE_SIZE, IMAGE_SIZE, 3), &self.device)?
            .permute((2, 0, 1))?;
        let mean = Tensor::new(&MEAN, &self.device)?.reshape((3, 1, 1))?;
        let std = Tensor::new(&STD, &self.device)?.reshape((3, 1, 1))?;

        let pixels = (pixels.to_dtype(DType::F32)? / 255.)?
            .broadcast_sub(&mean)?
            .broadcast_div(&std)?;
        Ok(pixels)
    }
}

impl Captioner for BlipCaptioner {
    fn caption(&self, photo: &OutfitImage) -> Result<String, CaptionError> {
        let pixels = self.preprocess(photo)?;

        let mut model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        model.reset_kv_cache();

        let image_embeds = pixels.unsqueeze(0)?.apply(model.vision_model())?;

        let mut logits_processor = LogitsProcessor::from_sampling(0, Sampling::ArgMax);
        let mut token_ids = vec![BOS_TOKEN_ID];
        for index in 0..MAX_CAPTION_TOKENS {
            let context_size = if index > 0 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let input_ids = Tensor::new(&token_ids[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = model.text_decoder().forward(&input_ids, &image_embeds)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;
            let token = logits_processor.sample(&logits)?;
            if token == SEP_TOKEN_ID {
                break;
            }
            token_ids.push(token);
        }

        let caption = self
            .tokenizer
            .decode(&token_ids[1..], true)
            .map_err(|e| CaptionError::Tokenizer(e.to_string()))?;
        let caption = caption.trim().to_string();

        if caption.is_empty() {
            return Err(CaptionError::EmptyCaption);
        }

        debug!(%caption, "generated caption");
        Ok(caption)
    }
}
