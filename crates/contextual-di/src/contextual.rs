use crate::config::{Repository, CONFIG};
use crate::provider::ProvideResult;
use crate::value::Value;
use crate::Container;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub type ContextualFactory = Arc<dyn Fn(&Container) -> ProvideResult<Value> + Send + Sync>;

/// What a contextual binding hands to the class it is scoped to.
#[derive(Clone)]
pub enum Implementation {
    /// An abstract or class name, resolved through the container.
    Class(String),
    /// Several names, each resolved and injected into a variadic parameter.
    Classes(Vec<String>),
    /// Invoked with the container at injection time.
    Factory(ContextualFactory),
    /// Injected as-is. Used for primitive parameters.
    Value(Value),
}

impl Implementation {
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> ProvideResult<T> + Send + Sync + 'static,
    {
        Implementation::Factory(Arc::new(move |container: &Container| {
            factory(container).map(Value::new)
        }))
    }

    pub fn value<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Implementation::Value(Value::new(value))
    }
}

impl From<&str> for Implementation {
    fn from(name: &str) -> Self {
        Implementation::Class(name.to_string())
    }
}

impl From<String> for Implementation {
    fn from(name: String) -> Self {
        Implementation::Class(name)
    }
}

impl From<Vec<String>> for Implementation {
    fn from(names: Vec<String>) -> Self {
        Implementation::Classes(names)
    }
}

impl From<Vec<&str>> for Implementation {
    fn from(names: Vec<&str>) -> Self {
        Implementation::Classes(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Implementation {
    fn from(names: [&str; N]) -> Self {
        Implementation::Classes(names.iter().map(|name| name.to_string()).collect())
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Class(name) => write!(f, "Implementation::Class({})", name),
            Implementation::Classes(names) => write!(f, "Implementation::Classes({:?})", names),
            Implementation::Factory(_) => f.write_str("Implementation::Factory"),
            Implementation::Value(value) => write!(f, "Implementation::Value({:?})", value),
        }
    }
}

/// `container.when(..)`: the classes a contextual binding is scoped to.
#[must_use = "a contextual binding is only registered by `give`"]
pub struct ContextualBindingBuilder<'c> {
    container: &'c Container,
    concrete: Vec<String>,
}

impl<'c> ContextualBindingBuilder<'c> {
    pub(crate) fn new(container: &'c Container, concrete: Vec<String>) -> Self {
        ContextualBindingBuilder {
            container,
            concrete,
        }
    }

    /// The abstract, or `$name` of a primitive parameter, being overridden.
    pub fn needs(self, abstract_: impl Into<String>) -> ContextualBinding<'c> {
        ContextualBinding {
            container: self.container,
            concrete: self.concrete,
            needs: abstract_.into(),
        }
    }
}

#[must_use = "a contextual binding is only registered by `give`"]
pub struct ContextualBinding<'c> {
    container: &'c Container,
    concrete: Vec<String>,
    needs: String,
}

impl<'c> ContextualBinding<'c> {
    pub fn give(self, implementation: impl Into<Implementation>) {
        let implementation = implementation.into();
        for concrete in &self.concrete {
            self.container
                .add_contextual_binding(concrete, &self.needs, implementation.clone());
        }
    }

    /// Injects every abstract tagged with `tag`, resolved at injection time.
    pub fn give_tagged(self, tag: impl Into<String>) {
        let tag = tag.into();
        self.give(Implementation::Factory(Arc::new(move |container: &Container| -> ProvideResult<Value> {
            let objects = container
                .tagged(&tag)
                .iter()
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::list(objects))
        })));
    }

    /// Injects the configuration value at `key`, read at injection time.
    pub fn give_config(self, key: impl Into<String>, default: Option<serde_json::Value>) {
        let key = key.into();
        self.give(Implementation::Factory(Arc::new(move |container: &Container| -> ProvideResult<Value> {
            let config: Repository = container.make(CONFIG)?;
            let value = config
                .get(&key)
                .or_else(|| default.clone())
                .unwrap_or(serde_json::Value::Null);
            Ok(Value::new(value))
        })));
    }
}
