//! Token encoding used for chunk windowing

use ragkb_core::{Error, Result};
use tiktoken_rs::CoreBPE;

/// Ordinary `cl100k_base` ranks are `0..ORDINARY_VOCAB`
const ORDINARY_VOCAB: u32 = 100_256;

/// Deterministic text tokenizer
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Vec<u32>;

    fn decode(&self, tokens: &[u32]) -> Result<String>;

    fn count_tokens(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// `cl100k_base` byte-pair encoding, as used by the OpenAI embedding models
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| Error::Tokenizer(format!("failed to load cl100k_base: {}", e)))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        // Special-token markup in documents is plain text here.
        self.bpe
            .encode_ordinary(text)
            .into_iter()
            .map(|t| t as u32)
            .collect()
    }

    /// Decode a token window, replacing bytes of a character cut at either edge with U+FFFD
    fn decode(&self, tokens: &[u32]) -> Result<String> {
        if let Some(&token) = tokens.iter().find(|&&t| t >= ORDINARY_VOCAB) {
            return Err(Error::Tokenizer(format!("unknown token {}", token)));
        }

        let bytes: Vec<u8> = self
            .bpe
            ._decode_native_and_split(tokens.iter().map(|&t| t as _).collect())
            .flatten()
            .collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
