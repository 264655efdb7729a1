//! Single-call outcome capture.
//!
//! The executor runs a callable exactly once and turns whatever happens into a
//! [`ResultBox`]: an `Err` return or an unwinding panic becomes a failure, a
//! pending computation is boxed when it settles, anything else is a success.
//! Nothing is ever raised past the executor.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::{self, BoxFuture, FutureExt};

use boxit_config::{ExecutorConfig, OutcomeTrace};
use boxit_types::{ResultBox, Thrown};

use crate::outcome::{Deferred, Outcome, Produced, SyncOutcome};

const TRACE_TARGET: &str = "boxit::executor";

/// Where a result was settled, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Immediate,
    Deferred,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Immediate => "immediate",
            Phase::Deferred => "deferred",
        }
    }
}

/// Result of [`Executor::execute`]: boxed now, or boxed once the pending
/// computation settles.
///
/// Both shapes can be awaited.
#[derive(Debug)]
#[must_use = "an execution carries the outcome of the call"]
pub enum Execution<T> {
    Ready(ResultBox<T>),
    Deferred(DeferredBox<T>),
}

impl<T> Execution<T> {
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Execution::Deferred(_))
    }

    /// The immediate result, or the pending one back.
    pub fn try_ready(self) -> Result<ResultBox<T>, DeferredBox<T>> {
        match self {
            Execution::Ready(boxed) => Ok(boxed),
            Execution::Deferred(pending) => Err(pending),
        }
    }
}

impl<T: Send + 'static> IntoFuture for Execution<T> {
    type Output = ResultBox<T>;
    type IntoFuture = DeferredBox<T>;

    fn into_future(self) -> DeferredBox<T> {
        match self {
            Execution::Ready(boxed) => DeferredBox::ready(boxed),
            Execution::Deferred(pending) => pending,
        }
    }
}

impl<T: Send + 'static> Outcome for Execution<T> {
    type Value = T;

    fn into_produced(self) -> Produced<T> {
        match self {
            Execution::Ready(boxed) => boxed.into_produced(),
            Execution::Deferred(pending) => pending.into_produced(),
        }
    }
}

/// A future resolving to a [`ResultBox`].
///
/// Resolves exactly once. Panics while polling the underlying computation
/// settle as a failure instead of unwinding into the caller.
#[must_use = "futures do nothing unless awaited"]
pub struct DeferredBox<T>(BoxFuture<'static, ResultBox<T>>);

impl<T: Send + 'static> DeferredBox<T> {
    pub fn ready(boxed: ResultBox<T>) -> Self {
        Self(Box::pin(future::ready(boxed)))
    }
}

impl<T> Future for DeferredBox<T> {
    type Output = ResultBox<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for DeferredBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredBox").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Outcome for DeferredBox<T> {
    type Value = T;

    fn into_produced(self) -> Produced<T> {
        Produced::Pending(Deferred::new(self))
    }
}

/// Runs callables and captures their outcome.
///
/// Holds no per-call state; copies are interchangeable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Executor {
    trace: OutcomeTrace,
}

impl Executor {
    #[must_use]
    pub fn new(trace: OutcomeTrace) -> Self {
        Self { trace }
    }

    #[must_use]
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.trace)
    }

    #[must_use]
    pub fn trace(self) -> OutcomeTrace {
        self.trace
    }

    /// Invoke `callable` once and box its outcome.
    ///
    /// A synchronous raise always yields [`Execution::Ready`], whatever the
    /// callable would have produced. Only a successfully produced pending
    /// computation yields [`Execution::Deferred`].
    ///
    /// The value must be `Send + 'static` because it may be produced on
    /// another task. Callables that never defer and return a non-`Send`
    /// value (an `Rc`, say) go through [`Executor::execute_sync`].
    pub fn execute<F, O>(self, callable: F) -> Execution<O::Value>
    where
        F: FnOnce() -> O,
        O: Outcome,
        O::Value: Send + 'static,
    {
        let produced = panic::catch_unwind(AssertUnwindSafe(|| callable().into_produced()))
            .unwrap_or_else(|payload| Produced::Raised(Thrown::from_panic(payload)));

        match produced {
            Produced::Value(value) => {
                Execution::Ready(self.record(ResultBox::success(value), Phase::Immediate))
            }
            Produced::Raised(error) => {
                Execution::Ready(self.record(ResultBox::failure(error), Phase::Immediate))
            }
            Produced::Pending(pending) => Execution::Deferred(self.defer(pending)),
        }
    }

    /// Like [`Executor::execute`] for callables that can never be pending.
    pub fn execute_sync<F, O>(self, callable: F) -> ResultBox<O::Value>
    where
        F: FnOnce() -> O,
        O: SyncOutcome,
    {
        let settled = panic::catch_unwind(AssertUnwindSafe(|| callable().into_settled()))
            .unwrap_or_else(|payload| Err(Thrown::from_panic(payload)));
        self.record(settled.into(), Phase::Immediate)
    }

    /// Box the eventual outcome of an already created future.
    pub fn execute_async<Fut>(self, future: Fut) -> DeferredBox<<Fut::Output as Outcome>::Value>
    where
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        <Fut::Output as Outcome>::Value: Send + 'static,
    {
        self.defer(Deferred::new(future))
    }

    fn defer<T: Send + 'static>(self, pending: Deferred<T>) -> DeferredBox<T> {
        DeferredBox(Box::pin(async move {
            let settled = match AssertUnwindSafe(pending).catch_unwind().await {
                Ok(settled) => settled,
                Err(payload) => Err(Thrown::from_panic(payload)),
            };
            self.record(settled.into(), Phase::Deferred)
        }))
    }

    fn record<T>(self, boxed: ResultBox<T>, phase: Phase) -> ResultBox<T> {
        match &boxed {
            ResultBox::Failure { error } if self.trace.failures() => {
                tracing::debug!(
                    target: TRACE_TARGET,
                    phase = phase.as_str(),
                    error_type = error.type_name(),
                    %error,
                    "Captured failure"
                );
            }
            ResultBox::Success { .. } if self.trace.successes() => {
                tracing::trace!(target: TRACE_TARGET, phase = phase.as_str(), "Captured success");
            }
            _ => {}
        }
        boxed
    }
}

/// Invoke `callable` once with the default [`Executor`] and box its outcome.
///
/// Needs a `Send + 'static` value; see [`execute_sync`] for values that are
/// not `Send`.
///
/// ```
/// use boxit_core::{execute, ResultBox};
///
/// let boxed = execute(|| 3).try_ready().unwrap();
/// assert!(matches!(boxed, ResultBox::Success { value: 3 }));
/// ```
pub fn execute<F, O>(callable: F) -> Execution<O::Value>
where
    F: FnOnce() -> O,
    O: Outcome,
    O::Value: Send + 'static,
{
    Executor::default().execute(callable)
}

pub fn execute_sync<F, O>(callable: F) -> ResultBox<O::Value>
where
    F: FnOnce() -> O,
    O: SyncOutcome,
{
    Executor::default().execute_sync(callable)
}

pub fn execute_async<Fut>(future: Fut) -> DeferredBox<<Fut::Output as Outcome>::Value>
where
    Fut: Future + Send + 'static,
    Fut::Output: Outcome,
    <Fut::Output as Outcome>::Value: Send + 'static,
{
    Executor::default().execute_async(future)
}
