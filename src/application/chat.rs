use crate::infrastructure::error::StoreError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration as TokioDuration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Canned study assistant. Replies are keyword-matched locally after a
/// short typing delay, no network involved.
pub struct ChatAssistant {
    reply_delay_ms: u64,
    history: Mutex<Vec<ChatMessage>>,
    next_id: AtomicU64,
    now_provider: NowProvider,
}

impl ChatAssistant {
    pub fn new(reply_delay_ms: u64) -> Self {
        Self {
            reply_delay_ms,
            history: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub async fn send(&self, content: &str) -> Result<ChatMessage, StoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        let user_message = self.record(ChatRole::User, content)?;
        sleep(TokioDuration::from_millis(self.reply_delay_ms)).await;

        let reply = compose_reply(&user_message.content);
        self.record(ChatRole::Assistant, &reply)
    }

    pub fn history(&self) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.lock_history()?.clone())
    }

    fn record(&self, role: ChatRole, content: &str) -> Result<ChatMessage, StoreError> {
        let message = ChatMessage {
            id: format!("msg-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            role,
            content: content.to_string(),
            sent_at: (self.now_provider)(),
        };
        self.lock_history()?.push(message.clone());
        Ok(message)
    }

    fn lock_history(&self) -> Result<std::sync::MutexGuard<'_, Vec<ChatMessage>>, StoreError> {
        self.history
            .lock()
            .map_err(|error| StoreError::Backend(format!("chat history lock poisoned: {error}")))
    }
}

fn compose_reply(message: &str) -> String {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("math") || lowered.contains("calculus") || lowered.contains("equation") {
        "Break the problem into the smallest step you can solve, write it out, then build from there. \
         Want to walk through one together?"
            .to_string()
    } else if lowered.contains("study plan") || lowered.contains("schedule") {
        "Try blocking 25-minute focus sessions with 5-minute breaks, hardest subject first. \
         Three blocks a day beats one marathon."
            .to_string()
    } else if lowered.contains("motivat") || lowered.contains("tired") || lowered.contains("stress")
    {
        "Progress counts even when it feels slow. Finish one small task now, then take a real break."
            .to_string()
    } else {
        "Tell me what you are working on and I can help you plan it, or ask me about math, \
         study plans, or staying motivated."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_assistant() -> ChatAssistant {
        ChatAssistant::new(0)
    }

    #[tokio::test]
    async fn send_records_user_message_and_reply() {
        let assistant = instant_assistant();
        let reply = assistant.send("Help me with calculus").await.unwrap();

        assert_eq!(reply.role, ChatRole::Assistant);
        assert!(reply.content.contains("smallest step"));

        let history = assistant.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "Help me with calculus");
        assert_eq!(history[1], reply);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_without_touching_history() {
        let assistant = instant_assistant();
        assert!(matches!(
            assistant.send("   ").await,
            Err(StoreError::InvalidInput(_))
        ));
        assert!(assistant.history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn message_ids_are_unique_and_ordered() {
        let assistant = instant_assistant();
        assistant.send("first").await.unwrap();
        assistant.send("second").await.unwrap();

        let history = assistant.history().unwrap();
        let ids: Vec<&str> = history.iter().map(|message| message.id.as_str()).collect();
        assert_eq!(ids, vec!["msg-1", "msg-2", "msg-3", "msg-4"]);
    }

    #[tokio::test]
    async fn messages_carry_the_injected_clock_time() {
        let fixed = "2026-03-01T09:00:00Z"
            .parse::<DateTime<Utc>>()
            .expect("valid datetime");
        let assistant = instant_assistant().with_now_provider(Arc::new(move || fixed));

        assistant.send("hello").await.unwrap();
        let history = assistant.history().unwrap();
        assert!(history.iter().all(|message| message.sent_at == fixed));
    }

    #[test]
    fn keyword_routing_covers_each_topic() {
        assert!(compose_reply("my STUDY PLAN is a mess").contains("focus sessions"));
        assert!(compose_reply("feeling tired today").contains("small task"));
        assert!(compose_reply("hello").contains("Tell me what you are working on"));
    }
}
