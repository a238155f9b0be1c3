//! Test-only generators that record every request and replay scripted replies.

use std::cell::RefCell;

use anyhow::{Result, anyhow};

use crate::io::generator::{GenerationRequest, Generator};

/// Owned copy of one [`GenerationRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub model: String,
    pub system: String,
    pub prompt: String,
}

type Responder = Box<dyn Fn(&GenerationRequest<'_>, usize) -> Result<String>>;

/// Generator driven by a closure receiving the request and its 0-based call index.
pub struct ScriptedGenerator {
    responder: Responder,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&GenerationRequest<'_>, usize) -> Result<String> + 'static,
    {
        Self {
            responder: Box::new(respond),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Reply with `replies` in order; calls beyond the script fail.
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies: Vec<String> = replies.into_iter().map(Into::into).collect();
        Self::new(move |_, index| {
            replies
                .get(index)
                .cloned()
                .ok_or_else(|| anyhow!("scripted generator exhausted after {index} calls"))
        })
    }

    /// Reply `chal-<round>` / `def-<round>` to debaters and `summary` to anything else.
    pub fn debaters() -> Self {
        Self::new(|request, index| Ok(debate_reply(request, index)))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

/// Reply used by [`ScriptedGenerator::debaters`], keyed on the system text's role line.
pub fn debate_reply(request: &GenerationRequest<'_>, index: usize) -> String {
    let round = index / 2 + 1;
    if request.system.starts_with("challenger") {
        format!("chal-{round}")
    } else if request.system.starts_with("defender") {
        format!("def-{round}")
    } else {
        "summary".to_string()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let index = {
            let mut calls = self.calls.borrow_mut();
            calls.push(RecordedCall {
                model: request.model.to_string(),
                system: request.system.to_string(),
                prompt: request.prompt.to_string(),
            });
            calls.len() - 1
        };
        (self.responder)(request, index)
    }
}
