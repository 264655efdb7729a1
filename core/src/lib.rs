//! Tagged-result boxing for functions, bound methods and records.
//!
//! Every boxed call yields a [`ResultBox`] instead of propagating errors or
//! panics. Calls that produce a pending computation yield a [`DeferredBox`]
//! that settles to a [`ResultBox`] when awaited.

#![allow(clippy::must_use_candidate)]

mod executor;
mod invoke;
mod object;
mod outcome;
mod record;
mod wrap;

pub use boxit_config::{
    BoxitConfig, CONFIG_ENV_VAR, ConfigError, ExecutorConfig, OutcomeTrace, RecordConfig,
};
pub use boxit_types::{ExecutionMode, ResultBox, Thrown};

pub use executor::{DeferredBox, Execution, Executor, execute, execute_async, execute_sync};
pub use invoke::{Bound, Invoke, bind};
pub use outcome::{Deferred, Outcome, Produced, Returned, SyncOutcome};
pub use record::{
    BoxedMethod, BoxedProperty, BoxedRecord, Properties, Property, Record, RecordError,
    boxify_record, boxify_record_with,
};
pub use wrap::{
    AsyncMode, Boxified, CallableKind, DynamicMode, Mode, RecordKind, SyncMode, Wrap, boxify,
    boxify_async, boxify_dynamic, wrap,
};
