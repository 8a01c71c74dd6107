use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use serde_json::{Value, json};

use crate::llm::provider::{Prompt, ProviderError};

/// A single block of a multipart user message.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    /// Base64-encoded image with its detected media type.
    Image {
        media_type: &'static str,
        data: String,
    },
}

impl ContentBlock {
    /// Detects the media type of `bytes` and wraps them as an image block.
    ///
    /// `index` is the position of the image in the prompt and only feeds the
    /// error message.
    pub fn image(index: usize, bytes: &[u8]) -> Result<Self, ProviderError> {
        let format = image::guess_format(bytes).map_err(|err| ProviderError::InvalidImage {
            index,
            reason: err.to_string(),
        })?;
        let media_type = media_type(format).ok_or_else(|| ProviderError::InvalidImage {
            index,
            reason: format!("{format:?} images are not accepted; use png, jpeg, gif or webp"),
        })?;

        Ok(Self::Image {
            media_type,
            data: STANDARD.encode(bytes),
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => json!({"type": "text", "text": text}),
            Self::Image { media_type, data } => json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": media_type,
                    "data": data,
                },
            }),
        }
    }
}

/// User message payload: plain text, or blocks when images are attached.
#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl UserContent {
    /// Images come first, followed by the prompt text.
    pub fn from_prompt(prompt: &Prompt) -> Result<Self, ProviderError> {
        if prompt.images.is_empty() {
            return Ok(Self::Text(prompt.text.clone()));
        }

        let mut blocks = prompt
            .images
            .iter()
            .enumerate()
            .map(|(index, bytes)| ContentBlock::image(index, bytes))
            .collect::<Result<Vec<_>, _>>()?;
        blocks.push(ContentBlock::Text(prompt.text.clone()));
        Ok(Self::Blocks(blocks))
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Blocks(blocks) => Value::Array(blocks.iter().map(ContentBlock::to_json).collect()),
        }
    }
}

fn media_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}
