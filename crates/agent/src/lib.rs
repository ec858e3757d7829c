//! The assistant side of trustlens.
//!
//! Everything that talks to a language model lives here:
//!
//! 1. **Narratives**: one short comment per dashboard chart, cached against
//!    the aggregate's fingerprint with a fresh → previous → static fallback
//! 2. **Page context**: typed facts about the current page plus a fresh
//!    read of the roster
//! 3. **Prompt**: the page context rendered into a deterministic system
//!    prompt
//! 4. **Conversation**: the persisted message log and its single-flight
//!    send gate
//!
//! [`Runtime`] assembles all of it from configuration.

pub mod context;
pub mod conversation;
pub mod llm;
pub mod narrative;
pub mod prompt;
pub mod runtime;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{
    ClientDetailsFacts, ClientsFacts, DashboardFacts, PageContext, PageContextComposer, PageFacts,
};
pub use conversation::{APOLOGY, ConversationLog, SendPermit};
pub use llm::{LlmAssistant, LlmNarrativeGenerator, ModelSettings};
pub use narrative::{Category, NarrativeCache, NarrativeCacheEntry, Narratives, RequestStrategy};
pub use runtime::{PageRequest, Runtime, RuntimeError};
