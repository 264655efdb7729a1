//! A uniform call interface over closures, functions and bound methods.
//!
//! Arguments travel as a tuple, so `f(1, "s")` becomes `f.invoke((1, "s"))`.

use std::fmt;
use std::sync::Arc;

/// Something callable with the argument tuple `Args`.
pub trait Invoke<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

/// A method paired with the receiver it is invoked against.
///
/// `method` takes the receiver as its first argument, so unbound methods such
/// as `Counter::add` can be used directly.
pub struct Bound<C, F> {
    receiver: Arc<C>,
    method: F,
}

impl<C, F> Bound<C, F> {
    #[must_use]
    pub fn receiver(&self) -> &Arc<C> {
        &self.receiver
    }
}

impl<C, F: Clone> Clone for Bound<C, F> {
    fn clone(&self) -> Self {
        Self {
            receiver: Arc::clone(&self.receiver),
            method: self.method.clone(),
        }
    }
}

impl<C: fmt::Debug, F> fmt::Debug for Bound<C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

/// Bind `method` to `receiver`.
///
/// ```
/// use std::sync::Arc;
///
/// use boxit_core::{bind, Invoke};
///
/// struct Counter(u32);
///
/// impl Counter {
///     fn plus(&self, n: u32) -> u32 {
///         self.0 + n
///     }
/// }
///
/// let plus = bind(Arc::new(Counter(40)), Counter::plus);
/// assert_eq!(plus.invoke((2,)), 42);
/// ```
pub fn bind<C, F>(receiver: Arc<C>, method: F) -> Bound<C, F> {
    Bound { receiver, method }
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> Invoke<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Recv, Func, Ret, $($arg,)*> Invoke<($($arg,)*)> for Bound<Recv, Func>
        where
            Func: Fn(&Recv, $($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self.method)(&*self.receiver, $($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);
impl_invoke!(A, B, C, D, E);
impl_invoke!(A, B, C, D, E, F);
impl_invoke!(A, B, C, D, E, F, G);
impl_invoke!(A, B, C, D, E, F, G, H);
