use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use curator_logging::curator_warn;
use thiserror::Error;

/// Model whose BPE vocabulary the primary tokenizer loads.
pub const TOKENIZER_MODEL: &str = "gpt-4";

/// Divisor of the character-based fallback estimate.
pub const CHARS_PER_TOKEN: usize = 4;

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("tokenizer unavailable: {0}")]
    Unavailable(String),
    #[error("tokenizer failed: {0}")]
    Failed(String),
}

pub trait Tokenizer: Send + Sync {
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError>;
}

/// BPE tokenizer from `tiktoken-rs`.
pub struct TiktokenTokenizer {
    bpe: tiktoken_rs::CoreBPE,
}

impl TiktokenTokenizer {
    pub fn for_model(model: &str) -> Result<Self, TokenizerError> {
        tiktoken_rs::get_bpe_from_model(model)
            .map(|bpe| Self { bpe })
            .map_err(|err| TokenizerError::Unavailable(err.to_string()))
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.bpe.encode_with_special_tokens(text).len()
        }))
        .map_err(|_| TokenizerError::Failed("encoder panicked".to_string()))
    }
}

/// Token counts for text blobs: the tokenizer when it works, otherwise
/// `ceil(chars / 4)`.
#[derive(Clone, Default)]
pub struct TokenEstimator {
    tokenizer: Option<Arc<dyn Tokenizer>>,
}

impl TokenEstimator {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer: Some(tokenizer),
        }
    }

    /// Estimator that never tokenizes, only applies the character estimate.
    pub fn character_based() -> Self {
        Self { tokenizer: None }
    }

    /// Loads the BPE for `model`; falls back to the character estimate when
    /// the vocabulary cannot be loaded.
    pub fn for_model(model: &str) -> Self {
        match TiktokenTokenizer::for_model(model) {
            Ok(tokenizer) => Self::new(Arc::new(tokenizer)),
            Err(err) => {
                curator_warn!("Using character-based token estimate: {}", err);
                Self::character_based()
            }
        }
    }

    pub fn has_tokenizer(&self) -> bool {
        self.tokenizer.is_some()
    }

    pub fn estimate(&self, text: &str) -> u64 {
        if text.is_empty() {
            return 0;
        }
        let Some(tokenizer) = self.tokenizer.as_deref() else {
            return character_estimate(text);
        };
        match tokenizer.count_tokens(text) {
            Ok(count) => count as u64,
            Err(err) => {
                curator_warn!("Token counting failed, using character estimate: {}", err);
                character_estimate(text)
            }
        }
    }
}

pub fn character_estimate(text: &str) -> u64 {
    text.chars().count().div_ceil(CHARS_PER_TOKEN) as u64
}
