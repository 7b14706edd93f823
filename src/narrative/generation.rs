//! Boundary to the external narrative text generator.
//!
//! The generator itself lives outside this crate. This module builds the
//! request (role-alternating history plus a token budget) and defines the
//! blocking streaming trait a backend implements.

use serde::{Deserialize, Serialize};

use crate::core::balance::BalanceConfig;
use crate::error::NarrativeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Joins consecutive messages with the same role so roles strictly alternate.
/// Empty messages are dropped.
pub fn merge_consecutive_roles(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut merged: Vec<ChatMessage> = Vec::with_capacity(messages.len());
    for message in messages {
        if message.content.trim().is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => merged.push(message),
        }
    }
    merged
}

pub fn validate_token_budget(requested: u32, config: &BalanceConfig) -> Result<u32, NarrativeError> {
    let (min, max) = (config.narrative.min_tokens, config.narrative.max_tokens);
    if !(min..=max).contains(&requested) {
        return Err(NarrativeError::InvalidTokenBudget {
            requested,
            min,
            max,
        });
    }
    Ok(requested)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl NarrativeRequest {
    pub fn new(
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        config: &BalanceConfig,
    ) -> Result<Self, NarrativeError> {
        let max_tokens = validate_token_budget(max_tokens, config)?;
        let messages = merge_consecutive_roles(messages);
        if messages.is_empty() {
            return Err(NarrativeError::EmptyConversation);
        }
        Ok(Self {
            messages,
            max_tokens,
        })
    }
}

/// A text generator. `stream` blocks until generation finishes, calling
/// `on_update` with the cumulative text so far each time more arrives, and
/// returns the final text.
pub trait NarrativeBackend {
    fn stream(
        &mut self,
        request: &NarrativeRequest,
        on_update: &mut dyn FnMut(&str),
    ) -> Result<String, NarrativeError>;
}
