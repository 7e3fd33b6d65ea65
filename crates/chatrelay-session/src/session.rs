use std::sync::Arc;

use chatrelay_llm::{CompletionGateway, GatewayError};
use chatrelay_persist::{MessageStore, PersistError, Settings};
use chatrelay_types::{Message, Origin, Phase, SessionConfig, SessionStatus};
use chrono::Utc;
use futures::Stream;
use tokio::sync::{watch, RwLock};

use crate::error::Result;
use crate::history::{build_history, derive_processing};
use crate::types::{ChatViewState, IgnoreReason, SubmitOutcome};
use crate::view::ViewStateProjector;

/// Shared collaborators of every session
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Arc<dyn MessageStore>,
    pub gateway: Arc<dyn CompletionGateway>,
    pub settings: Settings,
    pub config: Arc<SessionConfig>,
}

/// State machine for one open chat.
///
/// At most one completion request is outstanding per session. The phase is
/// held in a `watch` channel, so claiming `AwaitingReply` and observing it
/// are the same atomic step.
///
/// Once retired by a chat deletion the session never writes again, so a
/// reply still in flight cannot land in a chat reopened under the same id.
pub struct ChatSession {
    chat_id: String,
    deps: SessionDeps,
    status: watch::Sender<SessionStatus>,
    // Read-held across every write; set under the write lock
    retired: RwLock<bool>,
}

impl ChatSession {
    /// Open a chat, creating it if absent.
    ///
    /// A log ending in an unanswered user message marks the session stalled.
    pub async fn open(chat_id: impl Into<String>, deps: SessionDeps) -> Result<Self> {
        let chat_id = chat_id.into();
        deps.store.create_chat(&chat_id).await?;

        let messages = deps.store.messages_for_chat(&chat_id).await?;
        let stalled = derive_processing(&messages);
        if stalled {
            tracing::info!(chat_id = %chat_id, "Chat opened with an unanswered message");
        }

        let (status, _) = watch::channel(SessionStatus {
            phase: Phase::Idle,
            stalled,
            last_error: None,
        });

        Ok(Self {
            chat_id,
            deps,
            status,
            retired: RwLock::new(false),
        })
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn current_status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn processing(&self) -> bool {
        self.status.borrow().processing()
    }

    /// Send a user message and wait for the reply.
    ///
    /// Blank input, an outstanding request or a stalled chat make this a
    /// no-op. Failures return the session to `Idle`, are recorded as the
    /// latest error and are returned to the caller.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SubmitOutcome::Ignored(IgnoreReason::BlankInput));
        }
        self.ensure_active().await?;
        if let Err(reason) = self.claim(false) {
            tracing::debug!(chat_id = %self.chat_id, ?reason, "Submit ignored");
            return Ok(SubmitOutcome::Ignored(reason));
        }

        let guard = InFlight::new(&self.status);
        let result = self.send_new(text).await;
        self.finish(guard, result)
    }

    /// Re-issue the request for the current log without adding a message.
    ///
    /// Allowed whenever the session is idle and the log ends with a user
    /// message, which includes stalled chats and failed attempts.
    pub async fn retry_last(&self) -> Result<SubmitOutcome> {
        self.ensure_active().await?;
        if let Err(reason) = self.claim(true) {
            return Ok(SubmitOutcome::Ignored(reason));
        }
        let guard = InFlight::new(&self.status);

        let ends_with_user = match self.deps.store.last_message(&self.chat_id).await {
            Ok(last) => last.map(|m| m.is_from_user()).unwrap_or(false),
            Err(err) => return self.finish(guard, Err(err.into())),
        };
        if !ends_with_user {
            guard.release();
            return Ok(SubmitOutcome::Ignored(IgnoreReason::NothingToRetry));
        }

        tracing::debug!(chat_id = %self.chat_id, "Retrying last message");
        let result = self.request_reply().await;
        self.finish(guard, result)
    }

    pub fn clear_error(&self) {
        self.status
            .send_if_modified(|status| status.last_error.take().is_some());
    }

    /// Snapshots of this chat, one per store change or status change
    pub fn view_states(&self) -> impl Stream<Item = ChatViewState> + Send + 'static {
        ViewStateProjector::new(self.deps.store.clone()).watch(self.chat_id.clone(), self.status())
    }

    /// Move `Idle -> AwaitingReply`, or report why not
    fn claim(&self, retry: bool) -> std::result::Result<(), IgnoreReason> {
        let mut refused = None;
        self.status.send_if_modified(|status| {
            if status.phase == Phase::AwaitingReply {
                refused = Some(IgnoreReason::InFlight);
                return false;
            }
            if status.stalled && !retry {
                refused = Some(IgnoreReason::Stalled);
                return false;
            }
            status.phase = Phase::AwaitingReply;
            status.stalled = false;
            true
        });

        match refused {
            Some(reason) => Err(reason),
            None => {
                tracing::debug!(chat_id = %self.chat_id, "Idle -> AwaitingReply");
                Ok(())
            }
        }
    }

    async fn send_new(&self, text: &str) -> Result<Message> {
        let message = Message::new(text, Origin::User, self.next_timestamp().await?);
        self.persist(message, true).await?;
        self.request_reply().await
    }

    async fn request_reply(&self) -> Result<Message> {
        let messages = self.deps.store.messages_for_chat(&self.chat_id).await?;
        let history = build_history(&self.deps.config.system_prompt, &messages);
        let credentials = self.deps.settings.credentials().await?;
        let model = self.deps.settings.model().await?;

        let reply = self
            .deps
            .gateway
            .send_message(&history, &credentials, model.as_deref())
            .await?;
        if reply.text.trim().is_empty() {
            return Err(GatewayError::EmptyResponse.into());
        }

        let message = Message::new(reply.text, Origin::Assistant, self.next_timestamp().await?);
        self.persist(message.clone(), false).await?;
        Ok(message)
    }

    /// Append to this chat unless the session has been retired.
    ///
    /// `recreate` brings back a chat deleted behind the session's back, which
    /// only a new user message may do.
    async fn persist(&self, message: Message, recreate: bool) -> Result<()> {
        let retired = self.retired.read().await;
        if *retired {
            return Err(PersistError::NotFound(self.chat_id.clone()).into());
        }
        if recreate {
            self.deps.store.create_chat(&self.chat_id).await?;
        }
        self.deps.store.append_message(&self.chat_id, message).await?;
        Ok(())
    }

    async fn ensure_active(&self) -> Result<()> {
        if *self.retired.read().await {
            return Err(PersistError::NotFound(self.chat_id.clone()).into());
        }
        Ok(())
    }

    /// Stop all further writes from this session.
    ///
    /// Waits for a write already in progress, which the caller's delete then
    /// removes with the rest of the chat.
    pub(crate) async fn retire(&self) {
        *self.retired.write().await = true;
        tracing::debug!(chat_id = %self.chat_id, "Session retired");
    }

    pub async fn is_retired(&self) -> bool {
        *self.retired.read().await
    }

    /// Now, or the latest timestamp in the chat if the clock went backwards
    async fn next_timestamp(&self) -> Result<chrono::DateTime<Utc>> {
        let now = Utc::now();
        let last = self.deps.store.last_message(&self.chat_id).await?;
        Ok(last.map_or(now, |m| m.timestamp.max(now)))
    }

    fn finish(&self, guard: InFlight<'_>, result: Result<Message>) -> Result<SubmitOutcome> {
        guard.disarm();
        match result {
            Ok(message) => {
                self.status.send_modify(|status| {
                    status.phase = Phase::Idle;
                    status.last_error = None;
                });
                tracing::debug!(chat_id = %self.chat_id, "AwaitingReply -> Idle (replied)");
                Ok(SubmitOutcome::Replied(message))
            }
            Err(err) => {
                let detail = err.to_string();
                self.status.send_modify(|status| {
                    status.phase = Phase::Idle;
                    status.last_error = Some(detail.clone());
                });
                tracing::warn!(chat_id = %self.chat_id, error = %detail, "AwaitingReply -> Idle (failed)");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("chat_id", &self.chat_id)
            .field("status", &*self.status.borrow())
            .finish()
    }
}

/// Returns the session to `Idle` if a request future is dropped mid-flight
struct InFlight<'a> {
    status: &'a watch::Sender<SessionStatus>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(status: &'a watch::Sender<SessionStatus>) -> Self {
        Self {
            status,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }

    /// Back to `Idle` without touching the latest error
    fn release(mut self) {
        self.reset();
        self.armed = false;
    }

    fn reset(&self) {
        self.status.send_modify(|status| status.phase = Phase::Idle);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.reset();
        }
    }
}
