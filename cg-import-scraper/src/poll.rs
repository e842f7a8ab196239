//! Import status polling.
//!
//! After a batch is submitted, Kamaitachi processes it as an asynchronous
//! job. The poller drives the job's status URL until it reaches a terminal
//! state, with a bounded attempt budget and backoff so a wedged import
//! cannot hold the pipeline forever.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::Duration;

use crate::error::ScrapeError;
use crate::types::{ImportErrorDetail, PollResponse};

/// Pacing and budget for one poll chain.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before the second poll.
    pub initial_interval: Duration,
    /// Each wait grows by this factor, up to `max_interval`.
    pub backoff: f64,
    pub max_interval: Duration,
    /// Give up after this many status checks.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff: 1.5,
            max_interval: Duration::from_secs(10),
            max_attempts: 120,
        }
    }
}

/// What one status response means for the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    /// Still running; poll again.
    Ongoing,
    /// Terminal: the import finished. A non-empty error list is still a
    /// completed import; the listed scores simply did not go in.
    Completed {
        imported: usize,
        errors: Vec<ImportErrorDetail>,
        description: String,
    },
    /// Terminal: the envelope reported failure.
    Rejected { description: String },
    /// Terminal: a status value this tool does not model. The description
    /// is surfaced verbatim.
    Unrecognized { description: String },
}

impl PollStep {
    pub fn from_response(resp: PollResponse) -> Self {
        if !resp.success {
            return Self::Rejected {
                description: resp.description,
            };
        }

        let Some(body) = resp.body else {
            return Self::Unrecognized {
                description: resp.description,
            };
        };

        match body.import_status.as_str() {
            "ongoing" => Self::Ongoing,
            "completed" => {
                let (imported, errors) = match body.import {
                    Some(import) => (import.score_ids.len(), import.errors),
                    None => (0, Vec::new()),
                };
                Self::Completed {
                    imported,
                    errors,
                    description: resp.description,
                }
            }
            _ => Self::Unrecognized {
                description: resp.description,
            },
        }
    }
}

/// Poll until the job reaches a terminal state.
///
/// `fetch` performs one status request; `on_attempt` is called with the
/// attempt number before each one. The returned step is never `Ongoing`.
pub async fn poll_until_terminal<F, Fut>(
    mut fetch: F,
    policy: &PollPolicy,
    cancel: &AtomicBool,
    mut on_attempt: impl FnMut(u32),
) -> Result<PollStep, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollResponse, ScrapeError>>,
{
    let mut interval = policy.initial_interval;

    for attempt in 1..=policy.max_attempts {
        if cancel.load(Ordering::Relaxed) {
            return Err(ScrapeError::Cancelled);
        }

        on_attempt(attempt);
        let resp = fetch().await?;

        match PollStep::from_response(resp) {
            PollStep::Ongoing => {
                log::debug!("import ongoing, next poll in {:?}", interval);
                tokio::time::sleep(interval).await;
                interval = interval.mul_f64(policy.backoff).min(policy.max_interval);
            }
            terminal => return Ok(terminal),
        }
    }

    Err(ScrapeError::PollBudgetExhausted {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::types::{ImportSummary, PollBody};

    fn response(status: &str, import: Option<ImportSummary>) -> PollResponse {
        PollResponse {
            success: true,
            description: "status".to_string(),
            body: Some(PollBody {
                import_status: status.to_string(),
                import,
            }),
        }
    }

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_millis(1),
            backoff: 2.0,
            max_interval: Duration::from_millis(4),
            max_attempts,
        }
    }

    fn completed_summary() -> ImportSummary {
        ImportSummary {
            score_ids: vec![serde_json::json!("s"); 5],
            errors: vec![ImportErrorDetail {
                kind: "KTDataNotFound".to_string(),
                message: "chart not found".to_string(),
            }],
        }
    }

    #[test]
    fn envelope_failure_is_rejected() {
        let resp = PollResponse {
            success: false,
            description: "bad key".to_string(),
            body: None,
        };
        assert_eq!(
            PollStep::from_response(resp),
            PollStep::Rejected {
                description: "bad key".to_string()
            }
        );
    }

    #[test]
    fn unknown_status_is_unrecognized() {
        let resp = response("paused", None);
        assert_eq!(
            PollStep::from_response(resp),
            PollStep::Unrecognized {
                description: "status".to_string()
            }
        );
    }

    #[test]
    fn completed_without_import_block_counts_zero() {
        match PollStep::from_response(response("completed", None)) {
            PollStep::Completed {
                imported, errors, ..
            } => {
                assert_eq!(imported, 0);
                assert!(errors.is_empty());
            }
            step => panic!("unexpected step: {step:?}"),
        }
    }

    #[tokio::test]
    async fn reaches_completed_after_exactly_three_polls() {
        let calls = Cell::new(0u32);
        let cancel = AtomicBool::new(false);
        let mut attempts = Vec::new();

        let step = poll_until_terminal(
            || {
                let n = calls.get() + 1;
                calls.set(n);
                async move {
                    if n <= 2 {
                        Ok(response("ongoing", None))
                    } else {
                        Ok(response("completed", Some(completed_summary())))
                    }
                }
            },
            &fast_policy(10),
            &cancel,
            |attempt| attempts.push(attempt),
        )
        .await
        .unwrap();

        assert_eq!(calls.get(), 3);
        assert_eq!(attempts, vec![1, 2, 3]);
        match step {
            PollStep::Completed {
                imported, errors, ..
            } => {
                assert_eq!(imported, 5);
                assert_eq!(errors.len(), 1);
            }
            step => panic!("unexpected step: {step:?}"),
        }
    }

    #[tokio::test]
    async fn budget_exhaustion_is_an_error() {
        let cancel = AtomicBool::new(false);
        let result = poll_until_terminal(
            || async { Ok(response("ongoing", None)) },
            &fast_policy(3),
            &cancel,
            |_| {},
        )
        .await;

        assert!(matches!(
            result,
            Err(ScrapeError::PollBudgetExhausted { attempts: 3 })
        ));
    }

    #[tokio::test]
    async fn cancellation_stops_the_chain() {
        let cancel = AtomicBool::new(true);
        let result = poll_until_terminal(
            || async { Ok(response("ongoing", None)) },
            &fast_policy(10),
            &cancel,
            |_| {},
        )
        .await;

        assert!(matches!(result, Err(ScrapeError::Cancelled)));
    }
}
