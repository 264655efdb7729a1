//! The tagged result of a boxed call.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::Thrown;

/// Outcome of a single boxed invocation: success with a value or failure with
/// whatever was raised.
///
/// The payloads are only reachable after checking the tag. There is no
/// `value` field to read out of a failure by mistake:
///
/// ```
/// use boxit_types::ResultBox;
///
/// let boxed = ResultBox::success(3);
/// match boxed {
///     ResultBox::Success { value } => assert_eq!(value, 3),
///     ResultBox::Failure { error } => panic!("unexpected failure: {error}"),
/// }
/// ```
///
/// # Serde
///
/// Serializes as `{"ok": true, "value": ...}` or `{"ok": false, "error": "..."}`.
/// The error is written through [`Thrown`]'s `Display` since its payload is opaque.
#[derive(Debug)]
#[must_use = "a boxed result carries the failure that would otherwise have been raised"]
pub enum ResultBox<T> {
    Success { value: T },
    Failure { error: Thrown },
}

impl<T> ResultBox<T> {
    pub fn success(value: T) -> Self {
        Self::Success { value }
    }

    pub fn failure(error: Thrown) -> Self {
        Self::Failure { error }
    }

    /// The `ok` tag.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_ok()
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&Thrown> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn into_error(self) -> Option<Thrown> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Borrow the payload of either variant.
    pub fn as_ref(&self) -> Result<&T, &Thrown> {
        match self {
            Self::Success { value } => Ok(value),
            Self::Failure { error } => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultBox<U> {
        match self {
            Self::Success { value } => ResultBox::Success { value: f(value) },
            Self::Failure { error } => ResultBox::Failure { error },
        }
    }

    /// Convert back into a `Result` so the caller can raise with `?`.
    pub fn into_result(self) -> Result<T, Thrown> {
        match self {
            Self::Success { value } => Ok(value),
            Self::Failure { error } => Err(error),
        }
    }
}

impl<T> From<ResultBox<T>> for Result<T, Thrown> {
    fn from(boxed: ResultBox<T>) -> Self {
        boxed.into_result()
    }
}

impl<T> From<Result<T, Thrown>> for ResultBox<T> {
    fn from(result: Result<T, Thrown>) -> Self {
        match result {
            Ok(value) => Self::Success { value },
            Err(error) => Self::Failure { error },
        }
    }
}

impl<T: Serialize> Serialize for ResultBox<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResultBox", 2)?;
        match self {
            Self::Success { value } => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("value", value)?;
            }
            Self::Failure { error } => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("error", &error.to_string())?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_matches_variant() {
        let ok: ResultBox<i32> = ResultBox::success(3);
        assert!(ok.is_ok());
        assert!(!ok.is_failure());
        assert_eq!(ok.value(), Some(&3));
        assert!(ok.error().is_none());

        let failed: ResultBox<i32> = ResultBox::failure(Thrown::new("fail"));
        assert!(failed.is_failure());
        assert!(failed.value().is_none());
        assert_eq!(failed.error().and_then(Thrown::message), Some("fail"));
        assert!(failed.as_ref().is_err());
        assert_eq!(ok.as_ref().ok(), Some(&3));
    }

    #[test]
    fn map_leaves_failure_alone() {
        let doubled = ResultBox::success(21).map(|v| v * 2);
        assert_eq!(doubled.into_value(), Some(42));

        let failed: ResultBox<i32> = ResultBox::failure(Thrown::new(5_u8));
        let mapped = failed.map(|v| v * 2);
        assert_eq!(mapped.into_error().and_then(|e| e.downcast::<u8>().ok()), Some(5));
    }

    #[test]
    fn into_result_round_trips_tag() {
        let ok: Result<&str, Thrown> = ResultBox::success("cool").into();
        assert_eq!(ok.ok(), Some("cool"));

        let err = ResultBox::<()>::failure(Thrown::new("fail")).into_result();
        assert_eq!(err.unwrap_err().message(), Some("fail"));
    }

    #[test]
    fn serializes_wire_shape() {
        let ok = serde_json::to_value(ResultBox::success(3)).unwrap();
        assert_eq!(ok, json!({"ok": true, "value": 3}));

        let failed = ResultBox::<i32>::failure(Thrown::new("fail"));
        let failed = serde_json::to_value(failed).unwrap();
        assert_eq!(failed, json!({"ok": false, "error": "fail"}));
    }
}
