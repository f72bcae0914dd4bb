//! Farming assistant for Smart Crop Advisor.
//!
//! Keyword matching of farming questions to canned advice, the choice between
//! local and remote answers, and the chat history a user sees.

pub mod chat;
pub mod error;
pub mod matcher;
pub mod source;

pub use chat::ChatService;
pub use error::ChatError;
pub use matcher::{match_question, AdvisoryCategory, AdvisoryMatcher, AdvisoryRule, ADVISORY_RULES};
pub use source::{answer_source_for, AnswerSource, LocalAnswerSource, RemoteAnswerSource};
