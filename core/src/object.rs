//! Boxed facades over a known set of methods.

/// Declare a facade that boxes a fixed set of methods of a receiver type.
///
/// Each listed `fn` becomes a method returning [`ResultBox`](crate::ResultBox);
/// each listed `async fn` returns a [`DeferredBox`](crate::DeferredBox). The
/// facade holds the receiver in an `Arc` and dereferences to it, so fields
/// and unlisted items read through unchanged.
///
/// ```
/// use boxit_core::boxify_object;
///
/// struct Counter {
///     label: &'static str,
///     start: u32,
/// }
///
/// impl Counter {
///     fn ding(&self) -> u32 {
///         self.start
///     }
///
///     fn checked(&self, by: u32) -> Result<u32, &'static str> {
///         self.start.checked_sub(by).ok_or("underflow")
///     }
///
///     async fn later(&self) -> Result<u32, &'static str> {
///         Ok(self.start + 1)
///     }
/// }
///
/// boxify_object! {
///     struct BoxedCounter for Counter {
///         fn ding(&self) -> u32;
///         fn checked(&self, by: u32) -> Result<u32, &'static str>;
///         async fn later(&self) -> Result<u32, &'static str>;
///     }
/// }
///
/// let boxed = BoxedCounter::new(Counter { label: "c", start: 3 });
/// assert_eq!(boxed.ding().into_value(), Some(3));
/// assert!(boxed.checked(4).is_failure());
/// assert_eq!(boxed.label, "c");
/// let _pending = boxed.later();
/// ```
#[macro_export]
macro_rules! boxify_object {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident for $target:ty {
            $($body:tt)*
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            receiver: ::std::sync::Arc<$target>,
            executor: $crate::Executor,
        }

        #[allow(dead_code)]
        impl $name {
            /// Box the listed methods of `receiver`, bound to it.
            $vis fn new(receiver: $target) -> Self {
                Self::from_arc(::std::sync::Arc::new(receiver))
            }

            /// Box the listed methods, bound to a shared receiver.
            $vis fn from_arc(receiver: ::std::sync::Arc<$target>) -> Self {
                Self {
                    receiver,
                    executor: $crate::Executor::default(),
                }
            }

            $vis fn with_executor(mut self, executor: $crate::Executor) -> Self {
                self.executor = executor;
                self
            }

            $vis fn receiver(&self) -> &::std::sync::Arc<$target> {
                &self.receiver
            }

            $crate::boxify_object!(@methods [$vis] $($body)*);
        }

        impl ::std::ops::Deref for $name {
            type Target = $target;

            fn deref(&self) -> &Self::Target {
                &self.receiver
            }
        }
    };

    (@methods [$vis:vis]) => {};

    (@methods [$vis:vis]
        $(#[$meta:meta])*
        async fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)* $(,)?) -> $ret:ty;
        $($rest:tt)*
    ) => {
        $(#[$meta])*
        $vis fn $method(
            &self
            $(, $arg: $arg_ty)*
        ) -> $crate::DeferredBox<<$ret as $crate::Outcome>::Value> {
            let receiver = ::std::sync::Arc::clone(&self.receiver);
            self.executor
                .execute_async(async move { receiver.$method($($arg),*).await })
        }

        $crate::boxify_object!(@methods [$vis] $($rest)*);
    };

    (@methods [$vis:vis]
        $(#[$meta:meta])*
        fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)* $(,)?) -> $ret:ty;
        $($rest:tt)*
    ) => {
        $(#[$meta])*
        $vis fn $method(
            &self
            $(, $arg: $arg_ty)*
        ) -> $crate::ResultBox<<$ret as $crate::Outcome>::Value> {
            self.executor
                .execute_sync(|| self.receiver.$method($($arg),*))
        }

        $crate::boxify_object!(@methods [$vis] $($rest)*);
    };
}
