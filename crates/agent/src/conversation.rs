//! Persisted assistant conversation with a single-flight send gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use trustlens_core::store::{read_json, write_json};
use trustlens_core::{AssistantClient, AssistantQuery, KeyValueStore, Message, StoreKey};

use crate::context::PageContext;
use crate::prompt;

/// Appended in place of a reply when the assistant fails or times out.
pub const APOLOGY: &str = "I apologize, but I encountered an error. Please try again.";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The only send slot of one [`ConversationLog`].
///
/// Sending goes through the permit, so a message always lands in the log
/// that issued it. Dropping the permit releases the slot.
#[must_use = "the send slot is released as soon as the permit is dropped"]
pub struct SendPermit<'a> {
    log: &'a ConversationLog,
}

impl SendPermit<'_> {
    /// Send `text` and return the message appended in response: the
    /// assistant's reply, or [`APOLOGY`] when the query fails.
    pub async fn send(self, text: &str, context: &PageContext) -> Message {
        self.log.exchange(text, context).await
    }
}

impl Drop for SendPermit<'_> {
    fn drop(&mut self) {
        self.log.busy.store(false, Ordering::Release);
    }
}

/// Ordered message history, rewritten to the store after every append.
pub struct ConversationLog {
    store: Arc<dyn KeyValueStore>,
    assistant: Arc<dyn AssistantClient>,
    messages: Mutex<Vec<Message>>,
    busy: AtomicBool,
    timeout: Duration,
}

impl ConversationLog {
    /// Open the log, restoring any persisted history.
    pub fn new(store: Arc<dyn KeyValueStore>, assistant: Arc<dyn AssistantClient>) -> Self {
        let messages = match read_json::<Vec<Message>>(store.as_ref(), StoreKey::Conversation) {
            Ok(messages) => messages.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable conversation history");
                Vec::new()
            }
        };
        Self {
            store,
            assistant,
            messages: Mutex::new(messages),
            busy: AtomicBool::new(false),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Claim the send slot, or `None` while another send is in flight.
    pub fn try_acquire(&self) -> Option<SendPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SendPermit { log: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the history, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    async fn exchange(&self, text: &str, context: &PageContext) -> Message {
        let history = self.messages();
        self.append(Message::user(text));

        let query = AssistantQuery {
            prompt: prompt::compose(context),
            message: text.to_string(),
            conversation_history: history,
        };
        tracing::debug!(page = context.page_name(), "Sending assistant query");

        let reply = match tokio::time::timeout(self.timeout, self.assistant.query(query)).await {
            Ok(Ok(content)) => Message::assistant(content),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Assistant query failed");
                Message::assistant(APOLOGY)
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "Assistant query timed out");
                Message::assistant(APOLOGY)
            }
        };
        self.append(reply.clone());
        reply
    }

    /// Empty the history and remove the persisted copy.
    pub fn clear(&self) {
        self.lock().clear();
        if let Err(e) = self.store.remove(StoreKey::Conversation.as_str()) {
            tracing::warn!(error = %e, "Failed to remove conversation history");
        }
    }

    fn append(&self, message: Message) {
        let snapshot = {
            let mut messages = self.lock();
            messages.push(message);
            messages.clone()
        };
        if let Err(e) = write_json(self.store.as_ref(), StoreKey::Conversation, &snapshot) {
            tracing::warn!(error = %e, "Failed to persist conversation history");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
