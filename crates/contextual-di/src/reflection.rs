//! A runtime class table standing in for constructor reflection.
//!
//! Rust has no runtime reflection, so constructible types describe themselves
//! once through a [`Class`]: the constructor parameters the builder should
//! inject, the parents the type counts as an instance of, the trait-object
//! upcasts it supports, and the methods the invoker may call on it.

use crate::error::Error;
use crate::provider::ProvideResult;
use crate::value::{Resolvable, Value};
use serde::de::DeserializeOwned;
use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Method name used when a class is called without one.
pub const INVOKE: &str = "__invoke";

/// Declaring class reported for closures in resolution errors.
pub const CLOSURE: &str = "Closure";

pub(crate) type Constructor = Arc<dyn Fn(&Arguments) -> ProvideResult<Value> + Send + Sync>;
pub(crate) type MethodBody =
    Arc<dyn Fn(Option<&Value>, &Arguments) -> ProvideResult<Value> + Send + Sync>;
type Cast = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<Box<dyn Any>> + Send + Sync>;

struct Upcast {
    target: TypeId,
    cast: Cast,
}

#[derive(Clone)]
pub struct Parameter {
    name: String,
    hint: Option<String>,
    variadic: bool,
    default: Option<Value>,
}

impl Parameter {
    /// A parameter without a class hint (a scalar, string, list...).
    pub fn new(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            hint: None,
            variadic: false,
            default: None,
        }
    }

    /// A parameter hinted with the abstract the container should resolve.
    pub fn typed(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Parameter {
            hint: Some(hint.into()),
            ..Parameter::new(name)
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn with_default<T>(mut self, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.default = Some(Value::new(value));
        self
    }

    pub fn nullable(self) -> Self {
        self.with_default(Value::null())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.variadic || self.default.is_some()
    }

    pub(crate) fn describe(&self, position: usize) -> String {
        format!("Parameter #{} [ {} ]", position, self)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let required = if self.is_optional() {
            "<optional>"
        } else {
            "<required>"
        };
        write!(f, "{} ", required)?;
        if let Some(hint) = &self.hint {
            write!(f, "{} ", hint)?;
        }
        if self.variadic {
            write!(f, "...")?;
        }
        write!(f, "${}", self.name)
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({})", self)
    }
}

#[derive(Clone)]
pub struct Method {
    name: String,
    parameters: Vec<Parameter>,
    body: MethodBody,
}

impl Method {
    /// A free-standing callable, the equivalent of a closure.
    pub fn closure<R, F>(parameters: Vec<Parameter>, body: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&Arguments) -> ProvideResult<R> + Send + Sync + 'static,
    {
        Method {
            name: CLOSURE.to_string(),
            parameters,
            body: Arc::new(move |_: Option<&Value>, arguments: &Arguments| {
                body(arguments).map(Value::new)
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn body(&self) -> &MethodBody {
        &self.body
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// The description of one constructible (or abstract) type.
pub struct Class {
    name: String,
    parents: Vec<String>,
    parameters: Vec<Parameter>,
    constructor: Option<Constructor>,
    upcasts: Vec<Upcast>,
    methods: HashMap<String, Method>,
}

impl Class {
    /// An instantiable class whose objects are stored as `Arc<T>`.
    pub fn new<T, F>(name: impl Into<String>, constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> ProvideResult<T> + Send + Sync + 'static,
    {
        Class {
            name: name.into(),
            parents: Vec::new(),
            parameters: Vec::new(),
            constructor: Some(Arc::new(move |arguments: &Arguments| {
                constructor(arguments).map(|object| Value::new(Arc::new(object)))
            })),
            upcasts: Vec::new(),
            methods: HashMap::new(),
        }
    }

    /// Like [`Class::new`], named after the Rust type.
    pub fn of<T, F>(constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> ProvideResult<T> + Send + Sync + 'static,
    {
        Class::new(type_name::<T>(), constructor)
    }

    /// An interface or abstract class: it can be bound to, but not built.
    pub fn interface(name: impl Into<String>) -> Self {
        Class {
            name: name.into(),
            parents: Vec::new(),
            parameters: Vec::new(),
            constructor: None,
            upcasts: Vec::new(),
            methods: HashMap::new(),
        }
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn implements(self, interface: impl Into<String>) -> Self {
        self.extends(interface)
    }

    /// Declares `interface` as a parent and teaches [`Value::get`] to hand
    /// out this class's objects as `U`.
    pub fn implements_as<T, U, F>(mut self, interface: impl Into<String>, cast: F) -> Self
    where
        T: Send + Sync + 'static,
        U: Resolvable,
        F: Fn(Arc<T>) -> U + Send + Sync + 'static,
    {
        self.upcasts.push(Upcast {
            target: TypeId::of::<U>(),
            cast: Arc::new(move |object: &(dyn Any + Send + Sync)| {
                object
                    .downcast_ref::<Arc<T>>()
                    .map(|object| Box::new(cast(object.clone())) as Box<dyn Any>)
            }),
        });
        self.extends(interface)
    }

    pub fn method<T, R, F>(mut self, name: impl Into<String>, parameters: Vec<Parameter>, body: F) -> Self
    where
        T: Send + Sync + 'static,
        R: Any + Send + Sync,
        F: Fn(Arc<T>, &Arguments) -> ProvideResult<R> + Send + Sync + 'static,
    {
        let name = name.into();
        let class = self.name.clone();
        let method = name.clone();
        let body: MethodBody = Arc::new(move |this: Option<&Value>, arguments: &Arguments| -> ProvideResult<Value> {
            let this = this
                .and_then(|this| this.get::<Arc<T>>())
                .ok_or_else(|| Error::MethodNotFound {
                    class: class.clone(),
                    method: method.clone(),
                })?;
            body(this, arguments).map(Value::new)
        });
        self.methods.insert(
            name.clone(),
            Method {
                name,
                parameters,
                body,
            },
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn get_method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub(crate) fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub(crate) fn upcast<U: Resolvable>(&self, object: &(dyn Any + Send + Sync)) -> Option<U> {
        self.upcasts
            .iter()
            .filter(|upcast| upcast.target == TypeId::of::<U>())
            .find_map(|upcast| (upcast.cast)(object))
            .and_then(|boxed| boxed.downcast::<U>().ok())
            .map(|boxed| *boxed)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("parents", &self.parents)
            .field("parameters", &self.parameters)
            .field("instantiable", &self.is_instantiable())
            .finish()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Reflector {
    classes: HashMap<String, Arc<Class>>,
}

impl Reflector {
    pub fn register(&mut self, class: Class) {
        self.classes.insert(class.name.clone(), Arc::new(class));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.get(name).cloned()
    }

    /// Whether `name` inherits from `parent`, directly or through registered
    /// intermediate classes. A class is not a subclass of itself.
    pub fn is_subclass_of(&self, name: &str, parent: &str) -> bool {
        let mut seen = HashSet::new();
        let mut pending: Vec<&str> = match self.classes.get(name) {
            Some(class) => class.parents.iter().map(String::as_str).collect(),
            None => return false,
        };
        while let Some(current) = pending.pop() {
            if current == parent {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(class) = self.classes.get(current) {
                pending.extend(class.parents.iter().map(String::as_str));
            }
        }
        false
    }

    pub fn is_instance_of(&self, object: &Value, ty: &str) -> bool {
        if object.type_name() == ty {
            return true;
        }
        match object.class_name() {
            Some(class) => class == ty || self.is_subclass_of(class, ty),
            None => false,
        }
    }
}

/// The argument list assembled for a constructor or a method body.
///
/// Each declared parameter contributes one entry under its name, or any
/// number for a variadic parameter. Unconsumed positional overrides of a
/// method call follow unnamed.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    entries: Vec<(Option<String>, Value)>,
}

impl Arguments {
    pub(crate) fn push(&mut self, name: Option<&str>, value: Value) {
        self.entries.push((name.map(str::to_string), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn value<'a>(&'a self, name: &'a str) -> Option<&'a Value> {
        self.named(name).next()
    }

    pub fn get<T: Resolvable>(&self, name: &str) -> Result<T, Error> {
        let value = self
            .value(name)
            .ok_or_else(|| Error::MissingArgument(name.to_string()))?;
        downcast(value, name)
    }

    /// `None` when the argument is missing or was injected as null.
    pub fn optional<T: Resolvable>(&self, name: &str) -> Result<Option<T>, Error> {
        match self.value(name) {
            Some(value) if !value.is_null() => downcast(value, name).map(Some),
            _ => Ok(None),
        }
    }

    /// Every entry injected for a variadic parameter.
    pub fn all<T: Resolvable>(&self, name: &str) -> Result<Vec<T>, Error> {
        self.named(name).map(|value| downcast(value, name)).collect()
    }

    pub fn deserialize<T: DeserializeOwned>(&self, name: &str) -> ProvideResult<T> {
        let json: serde_json::Value = self.get(name)?;
        Ok(serde_json::from_value(json)?)
    }

    pub fn positional(&self) -> impl Iterator<Item = &Value> {
        self.entries
            .iter()
            .filter(|(name, _)| name.is_none())
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.as_deref() == Some(name))
            .map(|(_, value)| value)
    }
}

pub(crate) fn downcast<T: Resolvable>(value: &Value, target: &str) -> Result<T, Error> {
    value.get::<T>().ok_or_else(|| Error::TypeMismatch {
        target: target.to_string(),
        expected: type_name::<T>(),
        found: value.type_name(),
    })
}
