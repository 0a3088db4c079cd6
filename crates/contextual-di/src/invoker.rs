use crate::error::Error;
use crate::provider::ProvideResult;
use crate::reflection::{Arguments, Method, Parameter, CLOSURE, INVOKE};
use crate::value::{Parameters, Value};
use crate::Container;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub type MethodBinding = Arc<dyn Fn(&Value, &Container) -> ProvideResult<Value> + Send + Sync>;

/// Something [`Container::call`] can invoke.
#[derive(Clone)]
pub enum Callback {
    /// A closure with declared parameters.
    Closure(Method),
    /// `"Class@method"`, or a class name called through its default method.
    Named(String),
    /// A method on an already resolved object.
    Bound(Value, String),
}

impl Callback {
    pub fn closure<R, F>(parameters: Vec<Parameter>, body: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&Arguments) -> ProvideResult<R> + Send + Sync + 'static,
    {
        Callback::Closure(Method::closure(parameters, body))
    }

    pub fn bound(instance: Value, method: impl Into<String>) -> Self {
        Callback::Bound(instance, method.into())
    }
}

impl From<&str> for Callback {
    fn from(target: &str) -> Self {
        Callback::Named(target.to_string())
    }
}

impl From<String> for Callback {
    fn from(target: String) -> Self {
        Callback::Named(target)
    }
}

impl From<Method> for Callback {
    fn from(method: Method) -> Self {
        Callback::Closure(method)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Closure(method) => write!(f, "Callback::{}({:?})", method.name(), method.parameters()),
            Callback::Named(target) => write!(f, "Callback::Named({})", target),
            Callback::Bound(instance, method) => write!(f, "Callback::Bound({:?}, {})", instance, method),
        }
    }
}

impl Container {
    /// Calls `callback`, injecting every parameter not supplied in `parameters`.
    pub fn call(&self, callback: impl Into<Callback>, parameters: Parameters) -> Result<Value, Error> {
        self.call_callback(callback.into(), parameters, None)
    }

    /// Like [`Container::call`]; a class name without `@method` calls `default_method`.
    pub fn call_with_default(
        &self,
        callback: impl Into<Callback>,
        parameters: Parameters,
        default_method: &str,
    ) -> Result<Value, Error> {
        self.call_callback(callback.into(), parameters, Some(default_method))
    }

    /// A closure performing the call when invoked.
    pub fn wrap(&self, callback: impl Into<Callback>, parameters: Parameters) -> impl Fn() -> Result<Value, Error> + '_ {
        let callback = callback.into();
        move || self.call(callback.clone(), parameters.clone())
    }

    /// Replaces calls to `method` (`"Class@method"`) on any object of that class.
    pub fn bind_method<T, F>(&self, method: &str, callback: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Value, &Container) -> ProvideResult<T> + Send + Sync + 'static,
    {
        let callback: MethodBinding =
            Arc::new(move |instance: &Value, container: &Container| callback(instance, container).map(Value::new));
        self.write(|r| r.method_bindings.insert(method.to_string(), callback));
    }

    pub fn has_method_binding(&self, method: &str) -> bool {
        self.read(|r| r.method_bindings.contains_key(method))
    }

    pub fn call_method_binding(&self, method: &str, instance: &Value) -> Result<Value, Error> {
        let _lock = self.lock();
        let binding = self
            .read(|r| r.method_bindings.get(method).cloned())
            .ok_or_else(|| match method.split_once('@') {
                Some((class, name)) => Error::MethodNotFound {
                    class: class.to_string(),
                    method: name.to_string(),
                },
                None => Error::MethodNotProvided(method.to_string()),
            })?;
        Ok(binding(instance, self)?)
    }

    fn call_callback(
        &self,
        callback: Callback,
        parameters: Parameters,
        default_method: Option<&str>,
    ) -> Result<Value, Error> {
        let _lock = self.lock();
        tracing::trace!(?callback, "call");
        match callback {
            Callback::Named(target) => {
                let default_method = match default_method {
                    Some(method) => Some(method.to_string()),
                    None if !target.contains('@') => self
                        .get_class(&target)
                        .filter(|class| class.get_method(INVOKE).is_some())
                        .map(|_| INVOKE.to_string()),
                    None => None,
                };
                self.call_class(&target, parameters, default_method.as_deref())
            }
            Callback::Bound(instance, method) => self.call_bound_method(instance, &method, parameters),
            Callback::Closure(method) => {
                let arguments = self.method_dependencies(CLOSURE, method.parameters(), parameters)?;
                Ok((method.body())(None, &arguments)?)
            }
        }
    }

    fn call_class(&self, target: &str, parameters: Parameters, default_method: Option<&str>) -> Result<Value, Error> {
        let (class, method) = match target.split_once('@') {
            Some((class, method)) => (class, Some(method)),
            None => (target, default_method),
        };
        let method = method.ok_or_else(|| Error::MethodNotProvided(target.to_string()))?;
        let instance = self.make_any(class, Parameters::new())?;
        self.call_bound_method(instance, method, parameters)
    }

    fn call_bound_method(&self, instance: Value, method: &str, parameters: Parameters) -> Result<Value, Error> {
        let class_name = instance
            .class_name()
            .unwrap_or_else(|| instance.type_name())
            .to_string();

        let key = format!("{}@{}", class_name, method);
        if let Some(binding) = self.read(|r| r.method_bindings.get(&key).cloned()) {
            tracing::trace!(method = key.as_str(), "bound method");
            return Ok(binding(&instance, self)?);
        }

        let not_found = || Error::MethodNotFound {
            class: class_name.clone(),
            method: method.to_string(),
        };
        let class = instance.class().cloned().ok_or_else(not_found)?;
        let target = class.get_method(method).cloned().ok_or_else(not_found)?;

        let arguments = self.method_dependencies(class.name(), target.parameters(), parameters)?;
        Ok((target.body())(Some(&instance), &arguments)?)
    }

    fn method_dependencies(
        &self,
        class: &str,
        declared: &[Parameter],
        mut parameters: Parameters,
    ) -> Result<Arguments, Error> {
        let mut arguments = Arguments::default();
        for (position, parameter) in declared.iter().enumerate() {
            let name = Some(parameter.name());

            if let Some(value) = parameters.take(parameter.name()) {
                arguments.push(name, value);
                continue;
            }

            match parameter.hint() {
                Some(hint) => {
                    if let Some(value) = parameters.take(hint) {
                        arguments.push(name, value);
                    } else if parameter.is_variadic() {
                        let object = self.make_any(hint, Parameters::new())?;
                        match object.as_list() {
                            Some(objects) => {
                                for object in objects {
                                    arguments.push(name, object.clone());
                                }
                            }
                            None => arguments.push(name, object),
                        }
                    } else {
                        arguments.push(name, self.make_any(hint, Parameters::new())?);
                    }
                }
                None => {
                    if let Some(default) = parameter.default_value() {
                        arguments.push(name, default.clone());
                    } else if !parameter.is_optional() {
                        return Err(Error::unresolvable(format!(
                            "Unable to resolve dependency [{}] in class {}",
                            parameter.describe(position),
                            class
                        )));
                    }
                }
            }
        }

        for value in parameters.into_positional() {
            arguments.push(None, value);
        }
        Ok(arguments)
    }
}
