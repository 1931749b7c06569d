//! Idempotent event dispatch backed by the `processed_events` ledger.

use crate::db::Repository;
use crate::domain::Event;
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Application logic invoked once per distinct event id.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handler ran and the event was recorded.
    Processed,
    /// The event id was already in the ledger; the handler was not called.
    Duplicate,
}

#[derive(Clone)]
pub struct Dispatcher {
    repo: Arc<Repository>,
    handler: Arc<dyn EventHandler>,
}

impl Dispatcher {
    pub fn new(repo: Arc<Repository>, handler: Arc<dyn EventHandler>) -> Self {
        Self { repo, handler }
    }

    /// Run the handler unless the event was already processed.
    ///
    /// The ledger row is written only after the handler succeeds, so a failed
    /// event can be retried.
    pub async fn dispatch(&self, event: &Event) -> Result<DispatchOutcome, AppError> {
        if self.repo.is_event_processed(&event.event_id).await? {
            debug!(event_id = %event.event_id, event_type = %event.event_type, "Duplicate event skipped");
            return Ok(DispatchOutcome::Duplicate);
        }

        if let Err(e) = self.handler.handle(event).await {
            warn!(event_id = %event.event_id, event_type = %event.event_type, error = %e, "Event handler failed");
            return Err(AppError::Handler(e));
        }

        let recorded = self
            .repo
            .mark_event_processed(&event.event_id, Some(event.event_type.as_str()))
            .await?;
        if !recorded {
            // another dispatcher recorded it while the handler was running
            warn!(event_id = %event.event_id, "Event recorded concurrently");
        }

        info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            source = %event.source,
            "Event processed"
        );
        Ok(DispatchOutcome::Processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::test_support::setup_test_db;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: &Event) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(&self, _event: &Event) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    #[tokio::test]
    async fn test_duplicate_event_id_is_skipped() {
        let (repo, _temp) = setup_test_db().await;
        let repo = Arc::new(repo);
        let handler = Arc::new(CountingHandler::default());
        let dispatcher = Dispatcher::new(repo.clone(), handler.clone());

        let event = Event::new("ListOpportunities", "test", json!({})).with_id("evt-dup-1");

        assert_eq!(dispatcher.dispatch(&event).await.unwrap(), DispatchOutcome::Processed);
        assert_eq!(dispatcher.dispatch(&event).await.unwrap(), DispatchOutcome::Duplicate);

        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        assert!(repo.is_event_processed("evt-dup-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_handler_is_not_marked_processed() {
        let (repo, _temp) = setup_test_db().await;
        let repo = Arc::new(repo);
        let dispatcher = Dispatcher::new(repo.clone(), Arc::new(FailingHandler));

        let event = Event::new("ListOpportunities", "test", json!({})).with_id("evt-fail-1");

        match dispatcher.dispatch(&event).await {
            Err(AppError::Handler(e)) => assert_eq!(e.to_string(), "boom"),
            other => panic!("Expected handler error, got {:?}", other),
        }
        assert!(!repo.is_event_processed("evt-fail-1").await.unwrap());
    }
}
