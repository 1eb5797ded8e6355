//! Bootstrap retry behavior against a scripted connector.
//!
//! These run on a paused tokio clock, so the exponential backoff
//! schedule (1s, then 2s, ...) is asserted exactly rather than within a
//! tolerance.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_test::assert_ok;

use acp_bridge::{
    Account, AcpClient, BootstrapError, ClientConnector, ClientError, Deliverable, Job, MemoKind,
    Phase, SigningMemo, connect_with_backoff,
};

/// Client handed back on success. Nothing on it is exercised here;
/// bootstrap only cares that construction succeeded.
#[derive(Debug)]
struct StubClient;

#[async_trait]
impl AcpClient for StubClient {
    async fn accept_job(&self, _job_id: u64, _reason: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn reject_job(&self, _job_id: u64, _reason: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn create_requirement(&self, _job_id: u64, _text: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn sign_memo(&self, _job_id: u64, _memo_id: u64) -> Result<(), ClientError> {
        Ok(())
    }

    async fn deliver(&self, _job_id: u64, _deliverable: Deliverable) -> Result<(), ClientError> {
        Ok(())
    }

    async fn active_jobs(&self, _page: u32, _page_size: u32) -> Result<Vec<Job>, ClientError> {
        Ok(Vec::new())
    }

    async fn completed_jobs(&self, _page: u32, _page_size: u32) -> Result<Vec<Job>, ClientError> {
        Ok(Vec::new())
    }

    async fn cancelled_jobs(&self, _page: u32, _page_size: u32) -> Result<Vec<Job>, ClientError> {
        Ok(Vec::new())
    }

    async fn job_by_id(&self, job_id: u64) -> Result<Job, ClientError> {
        Ok(Job::new(job_id, Phase::Request, "0x0"))
    }

    async fn memo_by_id(&self, _job_id: u64, memo_id: u64) -> Result<SigningMemo, ClientError> {
        Ok(SigningMemo::message(memo_id, Phase::Negotiation, "stub"))
    }

    async fn account(&self, address: &str) -> Result<Account, ClientError> {
        Ok(Account {
            address: address.to_string(),
            entity_id: None,
            name: None,
        })
    }

    async fn create_notification(&self, _job_id: u64, _message: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn create_memo(
        &self,
        _job_id: u64,
        _content: &str,
        _kind: MemoKind,
        _next_phase: Phase,
    ) -> Result<u64, ClientError> {
        Ok(0)
    }
}

/// Connector that fails its first `failures` calls, then succeeds with a
/// fresh `StubClient` each time.
struct ScriptedConnector {
    calls: AtomicU32,
    failures: u32,
}

impl ScriptedConnector {
    fn failing_first(failures: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures,
        }
    }
}

#[async_trait]
impl ClientConnector for ScriptedConnector {
    async fn connect(&self) -> Result<Arc<dyn AcpClient>, ClientError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            Err(ClientError::Connect {
                reason: "connection refused".to_string(),
            })
        } else {
            Ok(Arc::new(StubClient))
        }
    }
}

#[tokio::test(start_paused = true)]
async fn fail_twice_then_succeed_makes_three_attempts_in_three_seconds() {
    let connector = ScriptedConnector::failing_first(2);
    let start = Instant::now();

    let result = connect_with_backoff(&connector, "acp", 3).await;
    let _client = tokio_test::assert_ok!(result);

    // One construction per attempt, never a reused instance.
    assert_eq!(connector.calls.load(Ordering::SeqCst), 3);
    // 1s after the first failure, 2s after the second: exactly 3s total.
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_the_configured_attempts_naming_the_service() {
    let connector = ScriptedConnector::failing_first(u32::MAX);

    let err = connect_with_backoff(&connector, "price-oracle", 3)
        .await
        .unwrap_err();

    assert_eq!(connector.calls.load(Ordering::SeqCst), 3);
    assert!(
        err.to_string().contains("price-oracle"),
        "error must name the registered service: {err}"
    );

    let BootstrapError::AttemptsExhausted {
        service,
        attempts,
        reason,
    } = err;
    assert_eq!(service, "price-oracle");
    assert_eq!(attempts, 3);
    assert!(reason.contains("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn first_attempt_success_never_sleeps() {
    let connector = ScriptedConnector::failing_first(0);
    let start = Instant::now();

    let result = connect_with_backoff(&connector, "acp", 3).await;
    tokio_test::assert_ok!(result);

    assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn zero_attempts_clamps_to_a_single_attempt() {
    let connector = ScriptedConnector::failing_first(u32::MAX);

    let err = connect_with_backoff(&connector, "acp", 0).await.unwrap_err();

    assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
    assert!(matches!(
        err,
        BootstrapError::AttemptsExhausted { attempts: 1, .. }
    ));
}
