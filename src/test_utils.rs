//! Test utilities for Vaidya
//!
//! Scripted providers, a store with switchable failures, and assertion
//! helpers shared by the unit tests.

use crate::config::Config;
use crate::error::{Result, UpstreamKind, VaidyaError};
use crate::providers::{Message, Provider};
use crate::storage::{DocumentStore, InMemoryStorage, MessagePair, Session, SessionUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Provider that answers from a script and records every request
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<Vec<Message>>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    /// Replies handed out in order; an exhausted script answers "ok"
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// A provider whose first call fails with the given category
    pub fn failing(kind: UpstreamKind) -> Self {
        let provider = Self::new(Vec::<String>::new());
        provider
            .replies
            .lock()
            .unwrap()
            .push_back(Err(VaidyaError::upstream(kind, "scripted failure")));
        provider
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every message list sent so far
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> String {
        "scripted-model".to_string()
    }
}

/// In-memory store whose writes can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStorage,
    fail_updates: AtomicBool,
    fail_pair_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `update_session` fail until switched back
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Make `create_pair` fail until switched back
    pub fn fail_pair_writes(&self, fail: bool) {
        self.fail_pair_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    fn backend(&self) -> &'static str {
        "flaky"
    }

    async fn create_session(
        &self,
        owner_id: &str,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        self.inner.create_session(owner_id, title, now).await
    }

    async fn get_session(&self, owner_id: &str, session_id: &str) -> Result<Option<Session>> {
        self.inner.get_session(owner_id, session_id).await
    }

    async fn update_session(
        &self,
        owner_id: &str,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<Option<Session>> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(VaidyaError::Storage("injected update failure".into()));
        }
        self.inner.update_session(owner_id, session_id, update).await
    }

    async fn delete_session(&self, owner_id: &str, session_id: &str) -> Result<bool> {
        self.inner.delete_session(owner_id, session_id).await
    }

    async fn query_sessions(&self, owner_id: &str) -> Result<Vec<Session>> {
        self.inner.query_sessions(owner_id).await
    }

    async fn create_pair(
        &self,
        owner_id: &str,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
        now: DateTime<Utc>,
    ) -> Result<MessagePair> {
        if self.fail_pair_writes.load(Ordering::SeqCst) {
            return Err(VaidyaError::Storage("injected pair write failure".into()));
        }
        self.inner
            .create_pair(owner_id, session_id, user_text, assistant_text, now)
            .await
    }

    async fn query_pairs(&self, owner_id: &str, session_id: &str) -> Result<Vec<MessagePair>> {
        self.inner.query_pairs(owner_id, session_id).await
    }

    async fn delete_pairs(&self, owner_id: &str, session_id: &str) -> Result<usize> {
        self.inner.delete_pairs(owner_id, session_id).await
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration for tests: in-memory storage and a fixed owner
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.storage.backend = "memory".to_string();
    config.identity.owner_id = "tester".to_string();
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_provider_replies_in_order() {
        let provider = ScriptedProvider::new(["first", "second"]);
        assert_eq!(provider.complete(&[Message::user("a")]).await.unwrap(), "first");
        assert_eq!(provider.complete(&[Message::user("b")]).await.unwrap(), "second");
        assert_eq!(provider.complete(&[Message::user("c")]).await.unwrap(), "ok");
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = ScriptedProvider::failing(UpstreamKind::Quota);
        assert_error_contains(provider.complete(&[]).await, "quota");
    }

    #[tokio::test]
    async fn test_flaky_store_injects_failures() {
        let store = FlakyStore::new();
        let session = store
            .create_session("alice", "New Chat", Utc::now())
            .await
            .unwrap();

        store.fail_pair_writes(true);
        let result = store
            .create_pair("alice", &session.id, "q", "a", Utc::now())
            .await;
        assert_error_contains(result, "injected");

        store.fail_pair_writes(false);
        assert!(store
            .create_pair("alice", &session.id, "q", "a", Utc::now())
            .await
            .is_ok());
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(VaidyaError::Config("different error".to_string()));
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_is_valid() {
        let config = test_config();
        assert_eq!(config.storage.backend, "memory");
        assert!(config.validate().is_ok());
    }
}
