use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image encoding failed: {0}")]
    Encode(String),
}

/// Turns raw image bytes plus a declared MIME type into a self-contained
/// string that can be embedded in the settings record.
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    async fn encode(&self, bytes: Vec<u8>, mime: &str) -> Result<String, ImageError>;
}

/// Default encoder: `data:<mime>;base64,<payload>`.
pub struct DataUriEncoder;

#[async_trait]
impl ImageEncoder for DataUriEncoder {
    async fn encode(&self, bytes: Vec<u8>, mime: &str) -> Result<String, ImageError> {
        let mime = mime.to_string();
        // Encoding a multi-megabyte logo happens off the runtime threads.
        tokio::task::spawn_blocking(move || {
            format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
        })
        .await
        .map_err(|e| ImageError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn encodes_to_a_data_uri() {
        let encoded = DataUriEncoder
            .encode(vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(encoded, "data:image/png;base64,AQID");
    }
}
