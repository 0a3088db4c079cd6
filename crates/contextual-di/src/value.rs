use crate::helpers::ArcAny;
use crate::reflection::Class;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

pub trait Resolvable: Clone + Send + Sync + 'static {}

impl<T> Resolvable for T where T: Clone + Send + Sync + 'static {}

/// A resolved, type-erased object.
///
/// Cloning a `Value` never clones the object itself, so two clones of a cached
/// singleton are [`Value::ptr_eq`]. Objects built from a registered [`Class`]
/// remember that class, which is what `instanceof`-style callback matching and
/// trait-object upcasts are driven by.
#[derive(Clone)]
pub struct Value {
    inner: ArcAny,
    type_name: &'static str,
    class: Option<Arc<Class>>,
}

impl Value {
    /// Wraps `value`. Wrapping a `Value` returns it unchanged.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        match boxed.downcast::<Value>() {
            Ok(value) => *value,
            Err(boxed) => Value {
                inner: Arc::from(boxed),
                type_name: type_name::<T>(),
                class: None,
            },
        }
    }

    pub fn null() -> Self {
        Value::new(())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::new(items)
    }

    pub(crate) fn with_class(mut self, class: Arc<Class>) -> Self {
        self.class = Some(class);
        self
    }

    pub fn is_null(&self) -> bool {
        self.inner.is::<()>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn class(&self) -> Option<&Arc<Class>> {
        self.class.as_ref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class.as_ref().map(|class| class.name())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        self.downcast_ref::<Vec<Value>>()
    }

    /// Clones the object out as `T`, falling back to the upcasts declared by
    /// the object's class (e.g. `Arc<FileLogger>` as `Arc<dyn Logger>`).
    pub fn get<T: Resolvable>(&self) -> Option<T> {
        if let Some(value) = self.inner.downcast_ref::<T>() {
            return Some(value.clone());
        }
        self.class
            .as_ref()?
            .upcast(self.inner.as_ref())
    }

    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type_name", &self.type_name)
            .field("class", &self.class_name())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKey {
    Name(String),
    Position(usize),
}

/// Per-call overrides handed to `make_with`, `build` and `call`.
///
/// Entries may be keyed by parameter name or by position; positional entries
/// are re-keyed to the constructor's parameter names before injection.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    entries: Vec<(ParameterKey, Value)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let name = name.into();
        self.entries.retain(|(key, _)| *key != ParameterKey::Name(name.clone()));
        self.entries.push((ParameterKey::Name(name), Value::new(value)));
        self
    }

    pub fn push<T>(mut self, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let position = self
            .entries
            .iter()
            .filter(|(key, _)| matches!(key, ParameterKey::Position(_)))
            .count();
        self.entries
            .push((ParameterKey::Position(position), Value::new(value)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find_map(|(key, value)| match key {
            ParameterKey::Name(key) if key == name => Some(value),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ParameterKey, Value)> {
        self.entries.iter()
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<Value> {
        let index = self
            .entries
            .iter()
            .position(|(key, _)| matches!(key, ParameterKey::Name(key) if key == name))?;
        Some(self.entries.remove(index).1)
    }

    /// Positional entry `i` becomes named `names[i]`, unless that name is
    /// already supplied explicitly.
    pub(crate) fn rekey<'a, I>(&mut self, names: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<&str> = names.into_iter().collect();
        let named: Vec<String> = self
            .entries
            .iter()
            .filter_map(|(key, _)| match key {
                ParameterKey::Name(name) => Some(name.clone()),
                ParameterKey::Position(_) => None,
            })
            .collect();
        for (key, _) in self.entries.iter_mut() {
            if let ParameterKey::Position(position) = *key {
                if let Some(name) = names.get(position) {
                    if !named.iter().any(|named| named == name) {
                        *key = ParameterKey::Name(name.to_string());
                    }
                }
            }
        }
    }

    pub(crate) fn into_positional(self) -> Vec<Value> {
        self.entries
            .into_iter()
            .filter_map(|(key, value)| match key {
                ParameterKey::Position(_) => Some(value),
                ParameterKey::Name(_) => None,
            })
            .collect()
    }
}
