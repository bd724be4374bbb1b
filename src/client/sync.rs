use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::api::MessagingApi;
use crate::api::dtos::{ConversationSummaryResponse, MessageResponse, SendMessageRequest};
use crate::config::SyncConfig;
use crate::domain::ConversationId;
use crate::error::{AppError, AppResult};

/// Snapshot of the selected conversation as last fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagesView {
    pub conversation_id: Option<ConversationId>,
    pub messages: Vec<MessageResponse>,
}

/// Observable state of a [`SyncClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Polling { conversation_id: ConversationId },
}

enum Selection {
    Idle,
    Polling {
        conversation_id: ConversationId,
        generation: u64,
        task: JoinHandle<()>,
    },
}

struct Shared {
    api: Arc<dyn MessagingApi>,
    generation: AtomicU64,
    messages: watch::Sender<MessagesView>,
    inbox: watch::Sender<Vec<ConversationSummaryResponse>>,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn publish_messages(
        &self,
        generation: u64,
        conversation_id: &ConversationId,
        messages: Vec<MessageResponse>,
    ) -> bool {
        if !self.is_current(generation) {
            debug!(
                conversation_id = %conversation_id,
                generation,
                "discarding result for a superseded selection"
            );
            return false;
        }

        self.messages.send_replace(MessagesView {
            conversation_id: Some(conversation_id.clone()),
            messages,
        });
        true
    }

    async fn refresh(&self, conversation_id: &ConversationId, generation: u64) {
        match self.api.peek_conversation(conversation_id).await {
            Ok(messages) => {
                self.publish_messages(generation, conversation_id, messages);
            }
            Err(e) => {
                warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    transient = e.is_transient(),
                    "poll tick failed, retrying on next tick"
                );
            }
        }
    }
}

/// Keeps one selected conversation fresh by polling the messaging API.
///
/// At most one polling interval runs per client. Selecting another
/// conversation, calling [`SyncClient::leave`], or dropping the client stops
/// it first.
pub struct SyncClient {
    shared: Arc<Shared>,
    poll_interval: Duration,
    selection: Mutex<Selection>,
}

impl SyncClient {
    pub fn new(api: Arc<dyn MessagingApi>, poll_interval: Duration) -> Self {
        let (messages, _) = watch::channel(MessagesView::default());
        let (inbox, _) = watch::channel(Vec::new());

        Self {
            shared: Arc::new(Shared {
                api,
                generation: AtomicU64::new(0),
                messages,
                inbox,
            }),
            poll_interval,
            selection: Mutex::new(Selection::Idle),
        }
    }

    pub fn from_config(api: Arc<dyn MessagingApi>, config: &SyncConfig) -> Self {
        Self::new(api, config.poll_interval())
    }

    pub fn state(&self) -> SyncState {
        match &*self.lock_selection() {
            Selection::Idle => SyncState::Idle,
            Selection::Polling {
                conversation_id, ..
            } => SyncState::Polling {
                conversation_id: conversation_id.clone(),
            },
        }
    }

    pub fn subscribe_messages(&self) -> watch::Receiver<MessagesView> {
        self.shared.messages.subscribe()
    }

    pub fn subscribe_inbox(&self) -> watch::Receiver<Vec<ConversationSummaryResponse>> {
        self.shared.inbox.subscribe()
    }

    /// Opens `conversation_id` (marking it read) and starts polling it.
    ///
    /// On failure the client is left idle with an empty message view.
    pub async fn select(&self, conversation_id: ConversationId) -> AppResult<()> {
        let generation = self.stop();

        let messages = match self.shared.api.open_conversation(&conversation_id).await {
            Ok(messages) => messages,
            Err(e) => {
                if self.shared.is_current(generation) {
                    self.shared.messages.send_replace(MessagesView::default());
                }
                return Err(e);
            }
        };

        if !self.shared.publish_messages(generation, &conversation_id, messages) {
            return Ok(());
        }

        let task = self.spawn_poller(conversation_id.clone(), generation);
        let mut selection = self.lock_selection();
        if !self.shared.is_current(generation) {
            task.abort();
            return Ok(());
        }

        info!(
            conversation_id = %conversation_id,
            interval = ?self.poll_interval,
            "polling conversation"
        );
        *selection = Selection::Polling {
            conversation_id,
            generation,
            task,
        };
        Ok(())
    }

    /// Stops polling and returns to idle.
    pub fn leave(&self) {
        self.stop();
        self.shared.messages.send_replace(MessagesView::default());
    }

    /// Fetches the inbox and, when nothing is selected yet, opens the most
    /// recent conversation.
    pub async fn load_inbox(&self) -> AppResult<Vec<ConversationSummaryResponse>> {
        let summaries = self.shared.api.list_conversations().await?;
        self.shared.inbox.send_replace(summaries.clone());

        let idle = matches!(*self.lock_selection(), Selection::Idle);
        if idle {
            if let Some(first) = summaries.first() {
                self.select(first.conversation_id.clone()).await?;
            }
        }

        Ok(summaries)
    }

    /// Sends `body` into the selected conversation, then refreshes the
    /// message view and the inbox.
    pub async fn send(&self, body: impl Into<String>) -> AppResult<MessageResponse> {
        let (conversation_id, generation) = match &*self.lock_selection() {
            Selection::Polling {
                conversation_id,
                generation,
                ..
            } => (conversation_id.clone(), *generation),
            Selection::Idle => {
                return Err(AppError::validation_error("no conversation selected"));
            }
        };

        let request = SendMessageRequest::in_conversation(&conversation_id, body);
        let message = self.shared.api.send_message(&request).await?;

        self.shared.refresh(&conversation_id, generation).await;
        match self.shared.api.list_conversations().await {
            Ok(summaries) => {
                self.shared.inbox.send_replace(summaries);
            }
            Err(e) => warn!(error = %e, "inbox refresh after send failed"),
        }

        Ok(message)
    }

    fn spawn_poller(&self, conversation_id: ConversationId, generation: u64) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let period = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately and select has just fetched.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let shared = Arc::clone(&shared);
                let conversation_id = conversation_id.clone();
                tokio::spawn(async move {
                    shared.refresh(&conversation_id, generation).await;
                });
            }
        })
    }

    /// Aborts the running interval, invalidates in-flight ticks and returns
    /// the generation for the next selection.
    fn stop(&self) -> u64 {
        let mut selection = self.lock_selection();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Selection::Polling {
            conversation_id,
            generation: previous,
            task,
        } = std::mem::replace(&mut *selection, Selection::Idle)
        {
            task.abort();
            debug!(
                conversation_id = %conversation_id,
                generation = previous,
                "stopped polling"
            );
        }

        generation
    }

    fn lock_selection(&self) -> MutexGuard<'_, Selection> {
        self.selection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.stop();
    }
}
