//! Generation port abstraction.
//!
//! The [`Generator`] trait decouples the debate from the text-generation
//! backend (an Ollama server or a local command). Tests use scripted
//! generators that return predetermined replies without any network access.

use anyhow::Result;

/// One blocking generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest<'a> {
    /// Backend model identifier.
    pub model: &'a str,
    /// Role instruction, sent as system content.
    pub system: &'a str,
    /// Serialized context transcript, sent as user content.
    pub prompt: &'a str,
}

/// Abstraction over text-generation backends.
pub trait Generator {
    /// Return the full generated text. Streaming, if any, is reported through
    /// the implementation's own progress channel, never through the result.
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        (**self).generate(request)
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        (**self).generate(request)
    }
}
