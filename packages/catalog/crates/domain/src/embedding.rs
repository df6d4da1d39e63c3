use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Output width of the sentence-transformers text model (all-MiniLM-L6-v2).
pub const TEXT_DIMENSIONS: usize = 384;

/// Width of the CLIP ViT-B/32 joint image/text space.
pub const MULTIMODAL_DIMENSIONS: usize = 512;

/// Which model family produced an embedding.
///
/// Two embeddings are only comparable when they share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    Text,
    Multimodal,
}

impl EmbeddingKind {
    pub const ALL: [EmbeddingKind; 2] = [EmbeddingKind::Text, EmbeddingKind::Multimodal];

    pub fn dimensions(self) -> usize {
        match self {
            EmbeddingKind::Text => TEXT_DIMENSIONS,
            EmbeddingKind::Multimodal => MULTIMODAL_DIMENSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmbeddingKind::Text => "text",
            EmbeddingKind::Multimodal => "multimodal",
        }
    }
}

impl fmt::Display for EmbeddingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingKind {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(EmbeddingKind::Text),
            "multimodal" => Ok(EmbeddingKind::Multimodal),
            other => Err(EmbeddingError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("embedding has no components")]
    Empty,
    #[error("embedding component {index} is not a finite number")]
    NonFinite { index: usize },
    #[error("{kind} embedding must have {expected} dimensions, got {found}")]
    WrongDimension {
        kind: EmbeddingKind,
        expected: usize,
        found: usize,
    },
    #[error("cannot combine embeddings of {left} and {right} dimensions")]
    Incompatible { left: usize, right: usize },
    #[error("unknown embedding kind: {0}")]
    UnknownKind(String),
}

/// A dense, finite, non-empty vector.
///
/// Validation happens once, at construction. Everything downstream (storage,
/// ranking) can rely on the values being well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Result<Self, EmbeddingError> {
        if values.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(EmbeddingError::NonFinite { index });
        }
        Ok(Self(values))
    }

    /// Builds an embedding and checks it against the kind's fixed width.
    pub fn for_kind(kind: EmbeddingKind, values: Vec<f32>) -> Result<Self, EmbeddingError> {
        let expected = kind.dimensions();
        if values.len() != expected {
            return Err(EmbeddingError::WrongDimension {
                kind,
                expected,
                found: values.len(),
            });
        }
        Self::new(values)
    }

    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Component-wise mean of two embeddings of equal width.
    ///
    /// Used to fuse the CLIP text and image vectors of one product.
    pub fn average(&self, other: &Embedding) -> Result<Embedding, EmbeddingError> {
        if self.dimensions() != other.dimensions() {
            return Err(EmbeddingError::Incompatible {
                left: self.dimensions(),
                right: other.dimensions(),
            });
        }
        let values = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a + b) / 2.0)
            .collect();
        Embedding::new(values)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = EmbeddingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Embedding::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.0
    }
}
