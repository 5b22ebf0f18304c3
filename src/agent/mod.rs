pub mod instructions;
pub mod orchestrator;
pub mod transcript;

pub use orchestrator::Orchestrator;
pub use transcript::{ConversationTurn, Transcript};
