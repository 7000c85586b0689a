//! External collaborators for the negotiation service.
//!
//! Everything here sits behind the narrow traits defined in
//! `haggle-core`:
//!
//! - `sentiment` - remote polarity scoring (`SentimentSource`), plus the
//!   neutral local source used when no endpoint is configured
//! - `llm` - provider-agnostic completion client (OpenAI, Anthropic,
//!   Ollama wire formats)
//! - `formatter` - LLM-backed counteroffer wording
//!   (`CounterofferFormatter`)
//!
//! # Safety principle
//!
//! Collaborators never decide prices. The accept/reject/counter decision
//! and every session write happen in `haggle-core` before any code in
//! this crate runs; a collaborator failure can only degrade the wording
//! or the discount tier of a reply, never its numbers.

pub mod formatter;
pub mod llm;
pub mod sentiment;
