//! Conversational booking capture.
//!
//! [`ConversationalExtractor`] drives an LLM collaborator to pull booking
//! fields out of a multi-turn chat, tracks which of the seven required
//! fields are still missing, and produces exactly one clarifying question
//! per turn. The collaborator is treated as unreliable: malformed JSON gets
//! one stricter retry and then degrades to an all-fields-missing record —
//! extraction never errors to the caller.

pub mod error;
pub mod extractor;
pub mod gate;
pub mod llm;

pub use error::ChatError;
pub use extractor::{ChatExtraction, ConversationalExtractor};
pub use gate::{address_is_complete, infer_vehicle, REQUIRED_FIELDS};
pub use llm::{ChatMessage, ChatModel, OpenAiChatModel, Role};
