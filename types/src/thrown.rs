//! Opaque error payload for captured failures.
//!
//! Whatever a callable raises (an `Err` value or a panic payload) lands here
//! verbatim. Nothing is normalized: the original value can always be recovered
//! with [`Thrown::downcast`] or [`Thrown::downcast_ref`].

use std::any::{Any, type_name};
use std::error::Error;
use std::fmt;
use std::panic;

type Render = fn(&(dyn Any + Send), &mut fmt::Formatter<'_>) -> fmt::Result;

const PANIC_PAYLOAD: &str = "<panic payload>";

/// An existential wrapper around a raised or rejected value.
///
/// # Invariants
///
/// - A `Thrown` never wraps another `Thrown`. Constructing one from an existing
///   `Thrown` (directly or through a panic payload) returns the original.
/// - The payload is exactly the value that was raised.
pub struct Thrown {
    payload: Box<dyn Any + Send>,
    type_name: &'static str,
    render: Render,
}

impl Thrown {
    /// Capture a raised value, rendering it through its `Debug` impl.
    pub fn new<E>(error: E) -> Self
    where
        E: fmt::Debug + Send + 'static,
    {
        Self::capture(error, render_debug::<E>)
    }

    /// Capture a raised `std::error::Error`, rendering it through `Display`.
    pub fn from_error<E>(error: E) -> Self
    where
        E: Error + Send + 'static,
    {
        Self::capture(error, render_display::<E>)
    }

    /// Capture a value that has no useful rendering.
    pub fn opaque<E>(error: E) -> Self
    where
        E: Send + 'static,
    {
        Self::capture(error, render_opaque)
    }

    /// Capture the payload of an unwinding panic.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Thrown>() {
            Ok(thrown) => return *thrown,
            Err(payload) => payload,
        };
        let type_name = if payload.is::<&'static str>() {
            type_name::<&'static str>()
        } else if payload.is::<String>() {
            type_name::<String>()
        } else {
            PANIC_PAYLOAD
        };
        Self {
            payload,
            type_name,
            render: render_panic,
        }
    }

    fn capture<E>(error: E, render: Render) -> Self
    where
        E: Send + 'static,
    {
        let payload: Box<dyn Any + Send> = Box::new(error);
        match payload.downcast::<Thrown>() {
            Ok(thrown) => *thrown,
            Err(payload) => Self {
                payload,
                type_name: type_name::<E>(),
                render,
            },
        }
    }

    /// Type name of the captured value, as reported by `std::any::type_name`.
    ///
    /// Panic payloads of unknown type report `"<panic payload>"`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn is<E: Any>(&self) -> bool {
        self.payload.is::<E>()
    }

    #[must_use]
    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }

    /// Recover the original value, or get `self` back if the type is wrong.
    pub fn downcast<E: Any>(self) -> Result<E, Self> {
        let Self {
            payload,
            type_name,
            render,
        } = self;
        match payload.downcast::<E>() {
            Ok(value) => Ok(*value),
            Err(payload) => Err(Self {
                payload,
                type_name,
                render,
            }),
        }
    }

    /// Text of a string payload (`panic!("...")`, `Err("...")`, `Err(String)`).
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        if let Some(message) = self.payload.downcast_ref::<&'static str>() {
            return Some(message);
        }
        self.payload.downcast_ref::<String>().map(String::as_str)
    }

    #[must_use]
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }

    /// Raise the captured value again as a panic.
    ///
    /// Panic payloads resume with their original payload, so an outer
    /// `catch_unwind` sees exactly what the callable panicked with.
    pub fn resume_unwind(self) -> ! {
        panic::resume_unwind(self.payload)
    }
}

fn render_debug<E: fmt::Debug + 'static>(
    payload: &(dyn Any + Send),
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match payload.downcast_ref::<E>() {
        Some(error) => fmt::Debug::fmt(error, f),
        None => render_opaque(payload, f),
    }
}

fn render_display<E: fmt::Display + 'static>(
    payload: &(dyn Any + Send),
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match payload.downcast_ref::<E>() {
        Some(error) => fmt::Display::fmt(error, f),
        None => render_opaque(payload, f),
    }
}

fn render_panic(payload: &(dyn Any + Send), f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        f.write_str(message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        f.write_str(message)
    } else {
        render_opaque(payload, f)
    }
}

fn render_opaque(_payload: &(dyn Any + Send), f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("<opaque value>")
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // String payloads print bare, even when captured through `new`.
        match self.message() {
            Some(message) => f.write_str(message),
            None => (self.render)(self.payload.as_ref(), f),
        }
    }
}

impl fmt::Debug for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Payload<'a>(&'a Thrown);

        impl fmt::Debug for Payload<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                (self.0.render)(self.0.payload.as_ref(), f)
            }
        }

        f.debug_struct("Thrown")
            .field("type_name", &self.type_name)
            .field("payload", &Payload(self))
            .finish()
    }
}

impl Error for Thrown {}
