//! Classification of what a callable produced.
//!
//! [`Outcome`] is how the executor tells an immediate value from a pending
//! computation: every type a boxed callable may return sorts itself into a
//! [`Produced`], and [`Produced::is_deferred`] is the predicate the executor
//! branches on.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use serde_json::Value;

use boxit_types::{ResultBox, Thrown};

/// What a callable produced, before any boxing.
pub enum Produced<T> {
    /// Settled with a value.
    Value(T),
    /// Raised synchronously.
    Raised(Thrown),
    /// A computation that settles later.
    Pending(Deferred<T>),
}

impl<T> Produced<T> {
    /// Whether the produced value is still pending.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Produced::Pending(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for Produced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Produced::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Produced::Raised(error) => f.debug_tuple("Raised").field(error).finish(),
            Produced::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A value a boxed callable can return.
pub trait Outcome {
    type Value;

    fn into_produced(self) -> Produced<Self::Value>;
}

/// An [`Outcome`] that is never pending.
///
/// Callables wrapped in sync mode must return one of these, so a sync-wrapped
/// call can never hand back an unresolved computation.
#[diagnostic::on_unimplemented(
    message = "`{Self}` may still be pending, so it cannot be boxed in sync mode",
    label = "sync-wrapped call returns a value that may be pending",
    note = "wrap the callable with `boxify_async` or `boxify_dynamic` instead"
)]
pub trait SyncOutcome: Outcome {
    fn into_settled(self) -> Result<Self::Value, Thrown>;
}

/// A pending computation that settles with a value or a raised [`Thrown`].
///
/// Built from any `Send + 'static` future whose output is itself an
/// [`Outcome`]. If that output is pending again, the chain is followed until
/// something settles.
#[must_use = "a deferred computation does nothing unless awaited or boxed"]
pub struct Deferred<T>(BoxFuture<'static, Result<T, Thrown>>);

impl<T: Send + 'static> Deferred<T> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future + Send + 'static,
        F::Output: Outcome<Value = T>,
    {
        Self(Box::pin(async move {
            let produced = future.await.into_produced();
            match produced {
                Produced::Value(value) => Ok(value),
                Produced::Raised(error) => Err(error),
                Produced::Pending(next) => next.await,
            }
        }))
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, Thrown>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

/// Marks an arbitrary value as a plain successful return.
///
/// For return types that have no [`Outcome`] impl of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Returned<T>(pub T);

impl<T> Outcome for Produced<T> {
    type Value = T;

    fn into_produced(self) -> Produced<T> {
        self
    }
}

impl<T> Outcome for Deferred<T> {
    type Value = T;

    fn into_produced(self) -> Produced<T> {
        Produced::Pending(self)
    }
}

impl<T, E> Outcome for Result<T, E>
where
    E: fmt::Debug + Send + 'static,
{
    type Value = T;

    fn into_produced(self) -> Produced<T> {
        match self {
            Ok(value) => Produced::Value(value),
            Err(error) => Produced::Raised(Thrown::new(error)),
        }
    }
}

impl<T, E> SyncOutcome for Result<T, E>
where
    E: fmt::Debug + Send + 'static,
{
    fn into_settled(self) -> Result<T, Thrown> {
        self.map_err(Thrown::new)
    }
}

impl<T> Outcome for ResultBox<T> {
    type Value = T;

    fn into_produced(self) -> Produced<T> {
        match self {
            ResultBox::Success { value } => Produced::Value(value),
            ResultBox::Failure { error } => Produced::Raised(error),
        }
    }
}

impl<T> SyncOutcome for ResultBox<T> {
    fn into_settled(self) -> Result<T, Thrown> {
        self.into_result()
    }
}

macro_rules! plain_outcome {
    ($([$($generics:tt)*] $ty:ty),* $(,)?) => {
        $(
            impl<$($generics)*> Outcome for $ty {
                type Value = $ty;

                fn into_produced(self) -> Produced<Self::Value> {
                    Produced::Value(self)
                }
            }

            impl<$($generics)*> SyncOutcome for $ty {
                fn into_settled(self) -> Result<Self::Value, Thrown> {
                    Ok(self)
                }
            }
        )*
    };
}

plain_outcome!(
    [] (),
    [] bool,
    [] char,
    [] u8,
    [] u16,
    [] u32,
    [] u64,
    [] u128,
    [] usize,
    [] i8,
    [] i16,
    [] i32,
    [] i64,
    [] i128,
    [] isize,
    [] f32,
    [] f64,
    [] String,
    [] &'static str,
    [] Value,
    [T] Vec<T>,
    [T] Option<T>,
    [T: ?Sized] Box<T>,
    [T: ?Sized] Arc<T>,
    [K, V, S] HashMap<K, V, S>,
);

impl<T> Outcome for Returned<T> {
    type Value = T;

    fn into_produced(self) -> Produced<T> {
        Produced::Value(self.0)
    }
}

impl<T> SyncOutcome for Returned<T> {
    fn into_settled(self) -> Result<T, Thrown> {
        Ok(self.0)
    }
}
