use crate::contextual::Implementation;
use crate::error::Error;
use crate::provider::{Concrete, Factory};
use crate::reflection::{downcast, Arguments, Class, Parameter};
use crate::value::{Parameters, Resolvable, Value};
use crate::Container;
use std::sync::Arc;

/// Keeps a class on the build stack for as long as its dependencies are
/// being resolved, and pops it on every way out.
struct BuildFrame<'c> {
    container: &'c Container,
}

impl<'c> BuildFrame<'c> {
    fn push(container: &'c Container, concrete: &str) -> Self {
        container.write(|r| r.build_stack.push(concrete.to_string()));
        tracing::trace!(concrete, "build stack push");
        BuildFrame { container }
    }
}

impl Drop for BuildFrame<'_> {
    fn drop(&mut self) {
        let popped = self.container.write(|r| r.build_stack.pop());
        tracing::trace!(concrete = ?popped, "build stack pop");
    }
}

impl Container {
    /// Resolves `abstract_` and clones the result out as `T`.
    pub fn make<T>(&self, abstract_: &str) -> Result<T, Error>
    where
        T: Resolvable,
    {
        self.make_with(abstract_, Parameters::new())
    }

    /// Resolves `abstract_` with explicit constructor overrides. Overrides
    /// always produce a fresh object, even for shared abstracts.
    pub fn make_with<T>(&self, abstract_: &str, parameters: Parameters) -> Result<T, Error>
    where
        T: Resolvable,
    {
        let object = self.make_any(abstract_, parameters)?;
        downcast(&object, abstract_)
    }

    pub fn make_any(&self, abstract_: &str, parameters: Parameters) -> Result<Value, Error> {
        self.resolve(abstract_, parameters, true)
    }

    /// Container-interface lookup: failures for identifiers the container has
    /// never heard of are reported as [`Error::EntryNotFound`].
    pub fn get(&self, id: &str) -> Result<Value, Error> {
        match self.resolve(id, Parameters::new(), true) {
            Ok(object) => Ok(object),
            Err(err @ Error::CircularDependency { .. }) => Err(err),
            Err(err) if self.has(id) => Err(err),
            Err(err) => Err(Error::EntryNotFound {
                id: id.to_string(),
                source: Box::new(err),
            }),
        }
    }

    /// A closure resolving `abstract_` on every call.
    pub fn factory(&self, abstract_: &str) -> impl Fn() -> Result<Value, Error> + '_ {
        let abstract_ = abstract_.to_string();
        move || self.make_any(&abstract_, Parameters::new())
    }

    pub(crate) fn resolve(
        &self,
        abstract_: &str,
        parameters: Parameters,
        raise_events: bool,
    ) -> Result<Value, Error> {
        let _lock = self.lock();
        let abstract_ = self.get_alias(abstract_);

        if raise_events {
            self.fire_before_resolving(&abstract_, &parameters);
        }

        let contextual = self.read(|r| r.contextual_concrete(&abstract_));
        let needs_contextual_build = !parameters.is_empty() || contextual.is_some();

        if !needs_contextual_build {
            if let Some(instance) = self.read(|r| r.instances.get(&abstract_).cloned()) {
                tracing::trace!(abstract_ = abstract_.as_str(), "shared instance");
                return Ok(instance);
            }
        }

        let object = match contextual {
            Some(implementation) => {
                tracing::trace!(abstract_ = abstract_.as_str(), ?implementation, "contextual concrete");
                self.resolve_implementation(&abstract_, implementation, parameters)?
            }
            None => match self.read(|r| r.bindings.get(&abstract_).map(|b| b.concrete.clone())) {
                Some(factory) => self.invoke_factory(&factory, &parameters)?,
                None => self.build_class(&abstract_, parameters)?,
            },
        };

        let mut object = object;
        for extender in self.read(|r| r.extenders_for(&abstract_)) {
            object = extender(object, self)?;
        }

        if !needs_contextual_build && self.is_shared(&abstract_) {
            self.write(|r| r.instances.insert(abstract_.clone(), object.clone()));
        }

        if raise_events {
            self.fire_resolving(&abstract_, &object);
        }

        self.write(|r| r.resolved.insert(abstract_.clone()));
        tracing::trace!(abstract_ = abstract_.as_str(), type_name = object.type_name(), "resolved");
        Ok(object)
    }

    /// Builds `concrete` directly: factories are invoked, class names are
    /// instantiated from the class table, bypassing bindings.
    pub fn build(&self, concrete: impl Into<Concrete>, parameters: Parameters) -> Result<Value, Error> {
        match concrete.into() {
            Concrete::Factory(factory) => self.invoke_factory(&factory, &parameters),
            Concrete::Class(name) => self.build_class(&name, parameters),
        }
    }

    fn invoke_factory(&self, factory: &Factory, parameters: &Parameters) -> Result<Value, Error> {
        Ok(factory(self, parameters)?)
    }

    pub(crate) fn build_class(&self, concrete: &str, parameters: Parameters) -> Result<Value, Error> {
        let _lock = self.lock();
        let class = self
            .read(|r| r.reflector.get(concrete))
            .ok_or_else(|| Error::unresolvable(format!("Target class [{}] does not exist.", concrete)))?;

        let constructor = match class.constructor() {
            Some(constructor) => constructor.clone(),
            None => return Err(self.not_instantiable(concrete)),
        };

        let stack = self.read(|r| r.build_stack.clone());
        if stack.iter().any(|building| building == concrete) {
            let mut chain = stack;
            chain.push(concrete.to_string());
            return Err(Error::CircularDependency {
                target: concrete.to_string(),
                chain,
            });
        }

        let arguments = {
            let _frame = BuildFrame::push(self, concrete);
            self.resolve_dependencies(&class, parameters)?
        };

        let object = constructor(&arguments)?;
        Ok(object.with_class(class))
    }

    fn not_instantiable(&self, concrete: &str) -> Error {
        let stack = self.read(|r| r.build_stack.clone());
        if stack.is_empty() {
            Error::unresolvable(format!("Target [{}] is not instantiable.", concrete))
        } else {
            Error::unresolvable(format!(
                "Target [{}] is not instantiable while building [{}].",
                concrete,
                stack.join(", ")
            ))
        }
    }

    fn resolve_dependencies(&self, class: &Arc<Class>, mut overrides: Parameters) -> Result<Arguments, Error> {
        overrides.rekey(class.parameters().iter().map(Parameter::name));

        let mut arguments = Arguments::default();
        for (position, parameter) in class.parameters().iter().enumerate() {
            let name = Some(parameter.name());

            if let Some(value) = overrides.take(parameter.name()) {
                for value in spread(parameter, value) {
                    arguments.push(name, value);
                }
                continue;
            }

            let values = match parameter.hint() {
                Some(hint) => self.resolve_class(parameter, hint)?,
                None => self.resolve_primitive(class.name(), position, parameter)?,
            };
            for value in values {
                arguments.push(name, value);
            }
        }
        Ok(arguments)
    }

    fn resolve_class(&self, parameter: &Parameter, hint: &str) -> Result<Vec<Value>, Error> {
        let result = if parameter.is_variadic() {
            self.resolve_variadic_class(hint)
        } else {
            self.make_any(hint, Parameters::new()).map(|object| vec![object])
        };

        match result {
            Err(err) if err.is_binding_resolution() => {
                if let Some(default) = parameter.default_value() {
                    return Ok(vec![default.clone()]);
                }
                if parameter.is_variadic() {
                    return Ok(Vec::new());
                }
                Err(err)
            }
            result => result,
        }
    }

    fn resolve_variadic_class(&self, hint: &str) -> Result<Vec<Value>, Error> {
        let abstract_ = self.get_alias(hint);
        match self.read(|r| r.contextual_concrete(&abstract_)) {
            Some(Implementation::Classes(concretes)) => concretes
                .iter()
                .map(|concrete| self.make_any(concrete, Parameters::new()))
                .collect(),
            _ => {
                let object = self.make_any(hint, Parameters::new())?;
                Ok(match object.as_list() {
                    Some(objects) => objects.clone(),
                    None => vec![object],
                })
            }
        }
    }

    fn resolve_primitive(&self, class: &str, position: usize, parameter: &Parameter) -> Result<Vec<Value>, Error> {
        let key = format!("${}", parameter.name());
        if let Some(implementation) = self.read(|r| r.contextual_concrete(&key)) {
            let value = match implementation {
                Implementation::Factory(factory) => factory(self)?,
                Implementation::Value(value) => value,
                Implementation::Class(name) => Value::new(name),
                Implementation::Classes(names) => Value::list(names.into_iter().map(Value::new).collect()),
            };
            return Ok(spread(parameter, value));
        }

        if let Some(default) = parameter.default_value() {
            return Ok(vec![default.clone()]);
        }
        if parameter.is_variadic() {
            return Ok(Vec::new());
        }

        Err(Error::unresolvable(format!(
            "Unresolvable dependency resolving [{}] in class {}",
            parameter.describe(position),
            class
        )))
    }

    fn resolve_implementation(
        &self,
        abstract_: &str,
        implementation: Implementation,
        parameters: Parameters,
    ) -> Result<Value, Error> {
        match implementation {
            Implementation::Class(concrete) if concrete == abstract_ => self.build_class(&concrete, parameters),
            Implementation::Class(concrete) => self.make_any(&concrete, parameters),
            Implementation::Classes(concretes) => concretes
                .iter()
                .map(|concrete| self.make_any(concrete, Parameters::new()))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::list),
            Implementation::Factory(factory) => Ok(factory(self)?),
            Implementation::Value(value) => Ok(value),
        }
    }
}

/// A list handed to a variadic parameter is injected element by element.
fn spread(parameter: &Parameter, value: Value) -> Vec<Value> {
    if parameter.is_variadic() {
        if let Some(values) = value.as_list() {
            return values.clone();
        }
    }
    vec![value]
}
