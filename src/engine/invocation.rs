use std::future::Future;

use futures::future::BoxFuture;

use crate::config::Config;
use crate::error::{BuildError, ExecutionError};
use crate::suite::{SuiteTemplates, Test};
use crate::testing::TestResult;

/// One test, fully prepared and ready to run exactly once.
///
/// A failed test is still `Ok`; `Err` is reserved for the invocation itself
/// breaking down.
pub struct Invocation {
    label: String,
    task: BoxFuture<'static, Result<TestResult, ExecutionError>>,
}

impl Invocation {
    pub fn new<F>(label: impl Into<String>, task: F) -> Self
    where
        F: Future<Output = Result<TestResult, ExecutionError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            task: Box::pin(task),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub async fn run(self) -> Result<TestResult, ExecutionError> {
        self.task.await
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation").field("label", &self.label).finish_non_exhaustive()
    }
}

/// Turns one test description plus the suite's shared context into an
/// [`Invocation`]. Called once per selected test; never retried.
pub trait InvocationBuilder: Send + Sync {
    fn build(&self, test: &Test, templates: &SuiteTemplates, config: &Config) -> Result<Invocation, BuildError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_yields_the_task_output() {
        let invocation = Invocation::new("login", async { Ok(TestResult::new(false, vec![])) });
        assert_eq!(invocation.label(), "login");
        let result = invocation.run().await.unwrap();
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn task_is_lazy_until_run() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();
        let invocation = Invocation::new("lazy", async move {
            flag.store(true, Ordering::SeqCst);
            Ok(TestResult::new(true, vec![]))
        });

        assert!(!started.load(Ordering::SeqCst));
        invocation.run().await.unwrap();
        assert!(started.load(Ordering::SeqCst));
    }
}
