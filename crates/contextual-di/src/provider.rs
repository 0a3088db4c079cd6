use std::fmt;
use std::any::Any;
use std::sync::Arc;
use crate::Container;
use crate::value::{Parameters, Resolvable, Value};

pub type ProvideResult<T> = anyhow::Result<T>;

pub type Factory = Arc<dyn Fn(&Container, &Parameters) -> ProvideResult<Value> + Send + Sync>;

/// How an abstract is produced: a factory closure, or the name of another
/// abstract or class to resolve in its place.
#[derive(Clone)]
pub enum Concrete {
  Factory(Factory),
  Class(String),
}

impl Concrete {
  pub fn factory<T, F>(factory: F) -> Self
    where T: Any + Send + Sync,
          F: Fn(&Container, &Parameters) -> ProvideResult<T> + Send + Sync + 'static
  {
    Concrete::Factory(Arc::new(move |container: &Container, parameters: &Parameters| {
      factory(container, parameters).map(Value::new)
    }))
  }

  /// A factory that hands out clones of `value`.
  pub fn value<T>(value: T) -> Self
    where T: Resolvable
  {
    Concrete::Factory(Arc::new(move |_: &Container, _: &Parameters| -> ProvideResult<Value> {
      Ok(Value::new(value.clone()))
    }))
  }

  pub fn class(name: impl Into<String>) -> Self {
    Concrete::Class(name.into())
  }
}

impl From<&str> for Concrete {
  fn from(name: &str) -> Self {
    Concrete::Class(name.to_string())
  }
}

impl From<String> for Concrete {
  fn from(name: String) -> Self {
    Concrete::Class(name)
  }
}

impl From<Factory> for Concrete {
  fn from(factory: Factory) -> Self {
    Concrete::Factory(factory)
  }
}

impl fmt::Debug for Concrete {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Concrete::Factory(_) => f.write_str("Concrete::Factory"),
      Concrete::Class(name) => write!(f, "Concrete::Class({})", name),
    }
  }
}

#[derive(Clone)]
pub(crate) struct Binding {
  pub concrete: Factory,
  pub shared: bool,
}

impl Binding {
  /// Class names are wrapped into a factory at bind time: a self-binding
  /// builds the class, anything else resolves the concrete without firing
  /// resolution events a second time.
  pub fn new(abstract_: &str, concrete: Concrete, shared: bool) -> Self {
    let concrete = match concrete {
      Concrete::Factory(factory) => factory,
      Concrete::Class(concrete) => {
        let abstract_ = abstract_.to_string();
        Arc::new(move |container: &Container, parameters: &Parameters| -> ProvideResult<Value> {
          let object = if abstract_ == concrete {
            container.build_class(&concrete, parameters.clone())
          } else {
            container.resolve(&concrete, parameters.clone(), false)
          };
          Ok(object?)
        }) as Factory
      }
    };
    Binding { concrete, shared }
  }
}

impl fmt::Debug for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Binding")
      .field("shared", &self.shared)
      .finish()
  }
}
