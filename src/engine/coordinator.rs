use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::invocation::Invocation;
use crate::error::ExecutionError;
use crate::testing::TestResult;

/// Runs invocations concurrently and returns their results in launch order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinator {
    /// Cap on invocations in flight; `None` launches everything at once.
    concurrency: Option<NonZeroUsize>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: Option<NonZeroUsize>) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Run every invocation and wait for all of them to settle.
    ///
    /// The first invocation that errors or panics fails the whole group: the
    /// remaining ones are aborted and no partial results are returned.
    pub async fn run_all(&self, invocations: Vec<Invocation>) -> Result<Vec<TestResult>, ExecutionError> {
        let total = invocations.len();
        info!(
            invocations = total,
            concurrency = self.concurrency.map(NonZeroUsize::get),
            "launching invocations"
        );

        let permits = self.concurrency.map(|limit| Arc::new(Semaphore::new(limit.get())));
        let mut labels = Vec::with_capacity(total);
        let mut tasks = JoinSet::new();

        for (index, invocation) in invocations.into_iter().enumerate() {
            labels.push(invocation.label().to_string());
            let permits = permits.clone();

            tasks.spawn(async move {
                // Held until the invocation settles.
                let _permit = match permits {
                    Some(permits) => permits.acquire_owned().await.ok(),
                    None => None,
                };
                (index, AssertUnwindSafe(invocation.run()).catch_unwind().await)
            });
        }

        let mut slots: Vec<Option<TestResult>> = (0..total).map(|_| None).collect();

        // Returning early drops `tasks`, which aborts everything still in flight.
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined
                .map_err(|err| ExecutionError::new("<unknown>", format!("task failed: {err}")))?;

            match outcome {
                Ok(Ok(result)) => {
                    debug!(test = %labels[index], passed = result.passed, "invocation settled");
                    slots[index] = Some(result);
                }
                Ok(Err(err)) => {
                    warn!(test = %labels[index], error = %err.message, "invocation failed to execute");
                    return Err(err);
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    warn!(test = %labels[index], error = %message, "invocation panicked");
                    return Err(ExecutionError::new(labels[index].clone(), message));
                }
            }
        }

        slots
            .into_iter()
            .zip(labels)
            .map(|(slot, label)| {
                slot.ok_or_else(|| ExecutionError::new(label, "invocation produced no result"))
            })
            .collect()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
