use std::sync::Arc;

use async_stream::stream;
use chatrelay_persist::{watch_messages, MessageStore};
use chatrelay_types::{Message, SessionStatus};
use futures::{Stream, StreamExt};
use tokio::sync::watch;

use crate::types::ChatViewState;

/// Read-only projection of the message log plus session status into
/// [`ChatViewState`] snapshots.
#[derive(Clone)]
pub struct ViewStateProjector {
    store: Arc<dyn MessageStore>,
}

impl ViewStateProjector {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// One snapshot from the current log and status
    pub async fn snapshot(&self, chat_id: &str, status: &SessionStatus) -> ChatViewState {
        match self.store.messages_for_chat(chat_id).await {
            Ok(messages) => ChatViewState::from_parts(chat_id, messages, status),
            Err(err) => ChatViewState {
                error: Some(err.to_string()),
                ..ChatViewState::loading(chat_id)
            },
        }
    }

    /// Starts with a loading snapshot, then emits a new snapshot after every
    /// log change and every status change. Ends when the session is dropped.
    pub fn watch(
        &self,
        chat_id: String,
        mut status: watch::Receiver<SessionStatus>,
    ) -> impl Stream<Item = ChatViewState> + Send + 'static {
        let store = self.store.clone();
        stream! {
            yield ChatViewState::loading(chat_id.clone());

            let mut log = Box::pin(watch_messages(store, chat_id.clone()));
            let mut messages: Option<Vec<Message>> = None;
            let mut load_error: Option<String> = None;

            loop {
                tokio::select! {
                    next = log.next() => match next {
                        Some(Ok(latest)) => {
                            messages = Some(latest);
                            load_error = None;
                        }
                        Some(Err(err)) => load_error = Some(err.to_string()),
                        None => break,
                    },
                    changed = status.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let current = status.borrow_and_update().clone();
                let mut state = match &messages {
                    Some(list) => ChatViewState::from_parts(chat_id.clone(), list.clone(), &current),
                    None => ChatViewState::loading(chat_id.clone()),
                };
                if load_error.is_some() {
                    state.error = load_error.clone();
                }
                yield state;
            }
        }
    }
}
