//! Wrapping existing callables so they return tagged results.
//!
//! The execution mode is declared when wrapping:
//!
//! - [`boxify`]: the callable returns a settled value; calls yield [`ResultBox`].
//! - [`boxify_async`]: the callable returns a future; calls yield [`DeferredBox`].
//! - [`boxify_dynamic`]: each call yields an [`Execution`] shaped by whatever
//!   the callable produced that time.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;

use boxit_types::{ExecutionMode, ResultBox};

use crate::executor::{DeferredBox, Execution, Executor};
use crate::invoke::Invoke;
use crate::outcome::{Deferred, Outcome, SyncOutcome};
use crate::record::{BoxedRecord, Record, boxify_record};

mod sealed {
    pub trait Sealed {}
}

/// Type-level execution mode of a [`Boxified`] callable.
pub trait Mode: sealed::Sealed {
    const MODE: ExecutionMode;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AsyncMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynamicMode;

impl sealed::Sealed for SyncMode {}
impl sealed::Sealed for AsyncMode {}
impl sealed::Sealed for DynamicMode {}

impl Mode for SyncMode {
    const MODE: ExecutionMode = ExecutionMode::Sync;
}

impl Mode for AsyncMode {
    const MODE: ExecutionMode = ExecutionMode::Async;
}

impl Mode for DynamicMode {
    const MODE: ExecutionMode = ExecutionMode::Dynamic;
}

/// A callable whose invocations go through the [`Executor`].
///
/// Takes exactly the arguments of the wrapped callable, as a tuple.
pub struct Boxified<F, M> {
    func: F,
    executor: Executor,
    mode: PhantomData<fn() -> M>,
}

impl<F, M: Mode> Boxified<F, M> {
    fn new(func: F) -> Self {
        Self {
            func,
            executor: Executor::default(),
            mode: PhantomData,
        }
    }

    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        M::MODE
    }

    #[must_use]
    pub fn executor(&self) -> Executor {
        self.executor
    }

    #[must_use]
    pub fn inner(&self) -> &F {
        &self.func
    }

    #[must_use]
    pub fn into_inner(self) -> F {
        self.func
    }
}

impl<F: Clone, M> Clone for Boxified<F, M> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
            executor: self.executor,
            mode: PhantomData,
        }
    }
}

impl<F, M: Mode> fmt::Debug for Boxified<F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boxified")
            .field("mode", &M::MODE)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl<F> Boxified<F, SyncMode> {
    pub fn call<Args>(&self, args: Args) -> ResultBox<<F::Output as Outcome>::Value>
    where
        F: Invoke<Args>,
        F::Output: SyncOutcome,
    {
        self.executor.execute_sync(|| self.func.invoke(args))
    }
}

impl<F> Boxified<F, AsyncMode> {
    pub fn call<Args, Fut>(&self, args: Args) -> DeferredBox<<Fut::Output as Outcome>::Value>
    where
        F: Invoke<Args, Output = Fut>,
        Fut: Future + Send + 'static,
        Fut::Output: Outcome,
        <Fut::Output as Outcome>::Value: Send + 'static,
    {
        // A raise before the future exists still comes back as a future.
        self.executor
            .execute(|| Deferred::new(self.func.invoke(args)))
            .into_future()
    }
}

impl<F> Boxified<F, DynamicMode> {
    pub fn call<Args>(&self, args: Args) -> Execution<<F::Output as Outcome>::Value>
    where
        F: Invoke<Args>,
        F::Output: Outcome,
        <F::Output as Outcome>::Value: Send + 'static,
    {
        self.executor.execute(|| self.func.invoke(args))
    }
}

// Wrapped callables are callables too, so wrapping composes without nesting
// one tagged result inside another.

impl<F, Args> Invoke<Args> for Boxified<F, SyncMode>
where
    F: Invoke<Args>,
    F::Output: SyncOutcome,
{
    type Output = ResultBox<<F::Output as Outcome>::Value>;

    fn invoke(&self, args: Args) -> Self::Output {
        self.call(args)
    }
}

impl<F, Args, Fut> Invoke<Args> for Boxified<F, AsyncMode>
where
    F: Invoke<Args, Output = Fut>,
    Fut: Future + Send + 'static,
    Fut::Output: Outcome,
    <Fut::Output as Outcome>::Value: Send + 'static,
{
    type Output = DeferredBox<<Fut::Output as Outcome>::Value>;

    fn invoke(&self, args: Args) -> Self::Output {
        self.call(args)
    }
}

impl<F, Args> Invoke<Args> for Boxified<F, DynamicMode>
where
    F: Invoke<Args>,
    F::Output: Outcome,
    <F::Output as Outcome>::Value: Send + 'static,
{
    type Output = Execution<<F::Output as Outcome>::Value>;

    fn invoke(&self, args: Args) -> Self::Output {
        self.call(args)
    }
}

/// Wrap a callable that returns a settled value.
///
/// ```
/// use boxit_core::boxify;
///
/// fn ding(dong: &str, dang: u32) -> Result<u32, String> {
///     if dong.is_empty() {
///         return Err("no dong".to_string());
///     }
///     Ok(dang * 2)
/// }
///
/// let boxed = boxify(ding);
/// assert_eq!(boxed.call(("s", 21)).into_value(), Some(42));
/// assert!(boxed.call(("", 1)).is_failure());
/// ```
///
/// A callable that hands back a pending computation does not type-check in
/// sync mode; it needs [`boxify_async`] or [`boxify_dynamic`].
pub fn boxify<F>(func: F) -> Boxified<F, SyncMode> {
    Boxified::new(func)
}

/// Wrap a callable that returns a future.
pub fn boxify_async<F>(func: F) -> Boxified<F, AsyncMode> {
    Boxified::new(func)
}

/// Wrap a callable whose result shape is decided per call.
pub fn boxify_dynamic<F>(func: F) -> Boxified<F, DynamicMode> {
    Boxified::new(func)
}

/// Selects the [`Wrap`] impl for callables.
#[derive(Debug)]
pub struct CallableKind<Args>(PhantomData<fn(Args)>);

/// Selects the [`Wrap`] impl for records.
#[derive(Debug)]
pub struct RecordKind;

/// Things [`wrap`] accepts: callables and records of callables.
///
/// A [`Record`] is never callable, so a record can never take the callable
/// branch or the other way round.
pub trait Wrap<Kind> {
    type Wrapped;

    fn wrap(self) -> Self::Wrapped;
}

impl<F, Args> Wrap<CallableKind<Args>> for F
where
    F: Invoke<Args>,
    F::Output: SyncOutcome,
{
    type Wrapped = Boxified<F, SyncMode>;

    fn wrap(self) -> Self::Wrapped {
        boxify(self)
    }
}

impl<C> Wrap<RecordKind> for Record<C>
where
    C: Send + Sync + 'static,
{
    type Wrapped = BoxedRecord<C>;

    fn wrap(self) -> Self::Wrapped {
        boxify_record(self, None)
    }
}

/// Box a callable (sync mode) or every method of a record.
///
/// ```
/// use boxit_core::wrap;
///
/// let parse = wrap(|s: &str| s.parse::<i32>());
/// assert_eq!(parse.call(("12",)).into_value(), Some(12));
/// assert!(parse.call(("twelve",)).is_failure());
/// ```
///
/// `wrap` takes no receiver. To call against one, bind the method with
/// [`bind`](crate::bind) before wrapping, or box a record against another
/// receiver with [`boxify_record`]:
///
/// ```
/// use std::sync::Arc;
///
/// use boxit_core::{Record, bind, boxify_record, wrap};
/// use serde_json::json;
///
/// struct Shelf {
///     count: u32,
/// }
///
/// impl Shelf {
///     fn count(&self) -> u32 {
///         self.count
///     }
/// }
///
/// let shelf = Arc::new(Shelf { count: 4 });
/// let count = wrap(bind(Arc::clone(&shelf), Shelf::count));
/// assert_eq!(count.call(()).into_value(), Some(4));
///
/// let record = Record::new(shelf).method("count", |s: &Shelf, _| json!(s.count));
/// let boxed = boxify_record(record, Some(Arc::new(Shelf { count: 9 })));
/// let counted = boxed.call("count", vec![]).unwrap().try_ready().unwrap();
/// assert_eq!(counted.into_value(), Some(json!(9)));
/// ```
pub fn wrap<T, Kind>(thing: T) -> T::Wrapped
where
    T: Wrap<Kind>,
{
    thing.wrap()
}
