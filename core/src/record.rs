//! Records of named properties whose methods get boxed together.
//!
//! Property sets are registered explicitly instead of being discovered from a
//! live object. A [`Record`] owns its receiver, its own properties and a chain
//! of inherited [`Properties`]; [`boxify_record`] turns it into a
//! [`BoxedRecord`] where every method returns a tagged result.

use std::collections::HashSet;
use std::fmt;
use std::iter;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use boxit_config::{BoxitConfig, RecordConfig};

use crate::executor::{Execution, Executor};
use crate::invoke::{Bound, bind};
use crate::outcome::{Outcome, Produced};
use crate::wrap::{Boxified, DynamicMode, boxify_dynamic};

type SharedMethod<C> = Arc<dyn Fn(&C, Vec<Value>) -> Produced<Value> + Send + Sync>;
type ErasedMethod<C> = Box<dyn Fn(&C, Vec<Value>) -> Produced<Value> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has no property named `{0}`")]
    Missing(String),
    #[error("record property `{0}` is not callable")]
    NotCallable(String),
}

/// A single named property: a method taking the receiver and JSON arguments,
/// or a plain value.
pub enum Property<C> {
    Method(SharedMethod<C>),
    Value(Value),
}

impl<C> Property<C> {
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Property::Method(_))
    }
}

impl<C> Clone for Property<C> {
    fn clone(&self) -> Self {
        match self {
            Property::Method(method) => Property::Method(Arc::clone(method)),
            Property::Value(value) => Property::Value(value.clone()),
        }
    }
}

impl<C> fmt::Debug for Property<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Method(_) => f.write_str("Method(..)"),
            Property::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// An insertion-ordered set of uniquely named properties.
pub struct Properties<C> {
    entries: Vec<(String, Property<C>)>,
}

impl<C> Default for Properties<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> Clone for Properties<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<C> fmt::Debug for Properties<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, property)| (key, property)))
            .finish()
    }
}

impl<C: 'static> Properties<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method. Re-registering a name replaces it in place.
    pub fn method<F, O>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&C, Vec<Value>) -> O + Send + Sync + 'static,
        O: Outcome<Value = Value>,
    {
        let shared: SharedMethod<C> =
            Arc::new(move |target: &C, args: Vec<Value>| method(target, args).into_produced());
        self.insert(name.into(), Property::Method(shared));
        self
    }

    /// Register a plain value. Re-registering a name replaces it in place.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name.into(), Property::Value(value.into()));
        self
    }

    fn insert(&mut self, name: String, property: Property<C>) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = property,
            None => self.entries.push((name, property)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property<C>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, property)| property)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A receiver with its own properties and an inherited property chain.
///
/// Lookup and enumeration see own properties first, then each inherited set in
/// the order it was added. A name already seen shadows later ones.
pub struct Record<C> {
    receiver: Arc<C>,
    own: Properties<C>,
    chain: Vec<Properties<C>>,
}

impl<C: fmt::Debug> fmt::Debug for Record<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("receiver", &self.receiver)
            .field("own", &self.own)
            .field("chain", &self.chain)
            .finish()
    }
}

impl<C: 'static> Record<C> {
    #[must_use]
    pub fn new(receiver: Arc<C>) -> Self {
        Self {
            receiver,
            own: Properties::new(),
            chain: Vec::new(),
        }
    }

    pub fn method<F, O>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&C, Vec<Value>) -> O + Send + Sync + 'static,
        O: Outcome<Value = Value>,
    {
        self.own = self.own.method(name, method);
        self
    }

    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.own = self.own.value(name, value);
        self
    }

    /// Append an inherited property set behind everything added so far.
    pub fn inherit(mut self, properties: Properties<C>) -> Self {
        self.chain.push(properties);
        self
    }

    #[must_use]
    pub fn receiver(&self) -> &Arc<C> {
        &self.receiver
    }

    /// Own and inherited properties, shadowed names removed, in lookup order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property<C>)> {
        let mut seen = HashSet::new();
        iter::once(&self.own)
            .chain(&self.chain)
            .flat_map(|properties| properties.entries.iter())
            .filter(move |(key, _)| seen.insert(key.as_str()))
            .map(|(key, property)| (key.as_str(), property))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property<C>> {
        iter::once(&self.own)
            .chain(&self.chain)
            .find_map(|properties| properties.get(name))
    }
}

/// A record method boxed in dynamic mode and bound to its receiver.
pub struct BoxedMethod<C> {
    inner: Boxified<Bound<C, ErasedMethod<C>>, DynamicMode>,
}

impl<C: 'static> BoxedMethod<C> {
    fn new(receiver: Arc<C>, method: &SharedMethod<C>, executor: Executor) -> Self {
        let method = Arc::clone(method);
        let erased: ErasedMethod<C> =
            Box::new(move |target: &C, args: Vec<Value>| method(target, args));
        Self {
            inner: boxify_dynamic(bind(receiver, erased)).with_executor(executor),
        }
    }

    pub fn call(&self, args: Vec<Value>) -> Execution<Value> {
        self.inner.call((args,))
    }

    #[must_use]
    pub fn receiver(&self) -> &Arc<C> {
        self.inner.inner().receiver()
    }
}

impl<C> fmt::Debug for BoxedMethod<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedMethod").finish_non_exhaustive()
    }
}

/// A property of a [`BoxedRecord`].
pub enum BoxedProperty<C> {
    Method(BoxedMethod<C>),
    Value(Value),
}

impl<C> fmt::Debug for BoxedProperty<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxedProperty::Method(method) => f.debug_tuple("Method").field(method).finish(),
            BoxedProperty::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// A record whose methods return tagged results.
pub struct BoxedRecord<C> {
    receiver: Arc<C>,
    entries: Vec<(String, BoxedProperty<C>)>,
}

impl<C> fmt::Debug for BoxedRecord<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, property)| (key, property)))
            .finish()
    }
}

impl<C: 'static> BoxedRecord<C> {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoxedProperty<C>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, property)| property)
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&BoxedMethod<C>> {
        match self.get(name)? {
            BoxedProperty::Method(method) => Some(method),
            BoxedProperty::Value(_) => None,
        }
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            BoxedProperty::Method(_) => None,
            BoxedProperty::Value(value) => Some(value),
        }
    }

    /// Call the boxed method `name`.
    ///
    /// The outcome of the method itself is always in the returned
    /// [`Execution`]. An error here means there was nothing to call.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Execution<Value>, RecordError> {
        match self.get(name) {
            Some(BoxedProperty::Method(method)) => Ok(method.call(args)),
            Some(BoxedProperty::Value(_)) => Err(RecordError::NotCallable(name.to_string())),
            None => Err(RecordError::Missing(name.to_string())),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// The receiver methods are bound to.
    #[must_use]
    pub fn receiver(&self) -> &Arc<C> {
        &self.receiver
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Box every method of `record`, copying values through.
///
/// Methods are bound to `context` when given, otherwise to the record's own
/// receiver. Uses the default configuration.
pub fn boxify_record<C>(record: Record<C>, context: Option<Arc<C>>) -> BoxedRecord<C>
where
    C: Send + Sync + 'static,
{
    boxify_record_with(record, context, &BoxitConfig::default())
}

pub fn boxify_record_with<C>(
    record: Record<C>,
    context: Option<Arc<C>>,
    config: &BoxitConfig,
) -> BoxedRecord<C>
where
    C: Send + Sync + 'static,
{
    let executor = Executor::from_config(&config.executor);
    let receiver = context.unwrap_or_else(|| Arc::clone(&record.receiver));
    let entries = boxed_entries(&record, &receiver, &config.record, executor);
    tracing::trace!(properties = entries.len(), "Boxed record");
    BoxedRecord { receiver, entries }
}

fn boxed_entries<C: 'static>(
    record: &Record<C>,
    receiver: &Arc<C>,
    config: &RecordConfig,
    executor: Executor,
) -> Vec<(String, BoxedProperty<C>)> {
    record
        .properties()
        .filter(|(key, _)| !config.is_excluded(key))
        .map(|(key, property)| {
            let boxed = match property {
                Property::Method(method) => BoxedProperty::Method(BoxedMethod::new(
                    Arc::clone(receiver),
                    method,
                    executor,
                )),
                Property::Value(value) => BoxedProperty::Value(value.clone()),
            };
            (key.to_string(), boxed)
        })
        .collect()
}
