use crate::callbacks::Extender;
use crate::contextual::{ContextualBindingBuilder, Implementation};
use crate::error::Error;
use crate::provider::{Binding, Concrete, ProvideResult};
use crate::reflection::Class;
use crate::registry::Registry;
use crate::tagged::Tagged;
use crate::value::{Resolvable, Value};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// The service container.
///
/// All state sits behind one re-entrant lock: a resolution holds it from the
/// first `make` to the last nested one, so resolutions on other threads wait
/// while factories running on this thread may call back into the container.
pub struct Container {
    state: ReentrantMutex<RefCell<Registry>>,
}

impl Default for Container {
    fn default() -> Self {
        Container {
            state: ReentrantMutex::new(RefCell::new(Registry::default())),
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.bindings())
            .finish()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a container and lets `config` register its services.
    pub fn configure<F>(config: F) -> Result<Self, Error>
    where
        F: FnOnce(&Container) -> Result<(), Error>,
    {
        let container = Container::new();
        config(&container)?;
        Ok(container)
    }

    pub(crate) fn lock(&self) -> ReentrantMutexGuard<'_, RefCell<Registry>> {
        self.state.lock()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        let guard = self.state.lock();
        let registry = guard.borrow();
        f(&registry)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        let guard = self.state.lock();
        let mut registry = guard.borrow_mut();
        f(&mut registry)
    }

    pub fn register_class(&self, class: Class) {
        tracing::trace!(class = class.name(), "registered class");
        self.write(|r| r.reflector.register(class));
    }

    pub fn get_class(&self, name: &str) -> Option<Arc<Class>> {
        self.read(|r| r.reflector.get(name))
    }

    pub fn bind(&self, abstract_: &str, concrete: impl Into<Concrete>) -> Result<(), Error> {
        self.register(abstract_, Some(concrete.into()), false)
    }

    pub fn singleton(&self, abstract_: &str, concrete: impl Into<Concrete>) -> Result<(), Error> {
        self.register(abstract_, Some(concrete.into()), true)
    }

    /// Binds the class `abstract_` to itself.
    pub fn bind_self(&self, abstract_: &str) -> Result<(), Error> {
        self.register(abstract_, None, false)
    }

    pub fn singleton_self(&self, abstract_: &str) -> Result<(), Error> {
        self.register(abstract_, None, true)
    }

    /// A singleton dropped again by [`Container::forget_scoped_instances`].
    pub fn scoped(&self, abstract_: &str, concrete: impl Into<Concrete>) -> Result<(), Error> {
        let _lock = self.lock();
        self.write(|r| r.scoped_instances.push(abstract_.to_string()));
        self.singleton(abstract_, concrete)
    }

    pub fn bind_if(&self, abstract_: &str, concrete: impl Into<Concrete>) -> Result<(), Error> {
        let _lock = self.lock();
        if self.bound(abstract_) {
            return Ok(());
        }
        self.bind(abstract_, concrete)
    }

    pub fn singleton_if(&self, abstract_: &str, concrete: impl Into<Concrete>) -> Result<(), Error> {
        let _lock = self.lock();
        if self.bound(abstract_) {
            return Ok(());
        }
        self.singleton(abstract_, concrete)
    }

    pub fn scoped_if(&self, abstract_: &str, concrete: impl Into<Concrete>) -> Result<(), Error> {
        let _lock = self.lock();
        if self.bound(abstract_) {
            return Ok(());
        }
        self.scoped(abstract_, concrete)
    }

    /// Registers (or replaces) the binding for `abstract_`; without a
    /// concrete, `abstract_` is built as its own class.
    ///
    /// Any instance or alias under `abstract_` is dropped. When `abstract_`
    /// was already resolved, it is resolved again for its rebinding callbacks.
    pub fn register(&self, abstract_: &str, concrete: Option<Concrete>, shared: bool) -> Result<(), Error> {
        let _lock = self.lock();
        let concrete = concrete.unwrap_or_else(|| Concrete::class(abstract_));
        let binding = Binding::new(abstract_, concrete, shared);
        let resolved = self.write(|r| {
            r.drop_stale_instances(abstract_);
            r.bindings.insert(abstract_.to_string(), binding);
            r.resolved(abstract_)
        });
        tracing::debug!(abstract_, shared, "bound");
        if resolved {
            self.rebound(abstract_)?;
        }
        Ok(())
    }

    /// Registers `value` as the shared instance of `abstract_`.
    pub fn instance<T>(&self, abstract_: &str, value: T) -> Result<Value, Error>
    where
        T: Any + Send + Sync,
    {
        let _lock = self.lock();
        let value = Value::new(value);
        let bound = self.write(|r| {
            r.remove_abstract_alias(abstract_);
            let bound = r.bound(abstract_);
            r.aliases.remove(abstract_);
            r.instances.insert(abstract_.to_string(), value.clone());
            bound
        });
        tracing::debug!(abstract_, type_name = value.type_name(), "instance registered");
        if bound {
            self.rebound(abstract_)?;
        }
        Ok(value)
    }

    pub fn alias(&self, abstract_: &str, alias: &str) -> Result<(), Error> {
        if alias == abstract_ {
            return Err(Error::AliasedToItself(abstract_.to_string()));
        }
        self.write(|r| {
            r.aliases.insert(alias.to_string(), abstract_.to_string());
            r.abstract_aliases
                .entry(abstract_.to_string())
                .or_default()
                .push(alias.to_string());
        });
        tracing::debug!(abstract_, alias, "aliased");
        Ok(())
    }

    pub fn get_alias(&self, abstract_: &str) -> String {
        self.read(|r| r.alias_of(abstract_))
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.read(|r| r.is_alias(name))
    }

    /// Decorates `abstract_`. An existing shared instance is decorated right
    /// away; otherwise `extender` runs on every future build.
    pub fn extend<F>(&self, abstract_: &str, extender: F) -> Result<(), Error>
    where
        F: Fn(Value, &Container) -> ProvideResult<Value> + Send + Sync + 'static,
    {
        let _lock = self.lock();
        let abstract_ = self.get_alias(abstract_);
        let extender: Extender = Arc::new(extender);
        match self.read(|r| r.instances.get(&abstract_).cloned()) {
            Some(instance) => {
                let extended = extender(instance, self)?;
                self.write(|r| r.instances.insert(abstract_.clone(), extended));
                self.rebound(&abstract_)?;
            }
            None => {
                let resolved = self.write(|r| {
                    r.extenders
                        .entry(abstract_.clone())
                        .or_default()
                        .push(extender);
                    r.resolved(&abstract_)
                });
                if resolved {
                    self.rebound(&abstract_)?;
                }
            }
        }
        tracing::debug!(abstract_ = abstract_.as_str(), "extended");
        Ok(())
    }

    pub fn forget_extenders(&self, abstract_: &str) {
        self.write(|r| {
            let abstract_ = r.alias_of(abstract_);
            r.extenders.remove(&abstract_);
        });
    }

    /// Appends each abstract to each tag. Tagging the same pair twice lists it twice.
    pub fn tag<A, T>(&self, abstracts: A, tags: T)
    where
        A: IntoIterator,
        A::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let abstracts: Vec<String> = abstracts.into_iter().map(Into::into).collect();
        self.write(|r| {
            for tag in tags {
                r.tags
                    .entry(tag.into())
                    .or_default()
                    .extend(abstracts.iter().cloned());
            }
        });
    }

    pub fn tagged(&self, tag: &str) -> Tagged<'_> {
        Tagged::new(self, tag)
    }

    /// Starts a contextual binding scoped to `concrete`.
    pub fn when(&self, concrete: &str) -> ContextualBindingBuilder<'_> {
        self.when_any([concrete])
    }

    /// Starts a contextual binding scoped to each of `concrete`.
    pub fn when_any<I>(&self, concrete: I) -> ContextualBindingBuilder<'_>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let concrete: Vec<String> = self.read(|r| {
            concrete
                .into_iter()
                .map(|concrete| r.alias_of(concrete.as_ref()))
                .collect()
        });
        ContextualBindingBuilder::new(self, concrete)
    }

    pub fn add_contextual_binding(&self, concrete: &str, abstract_: &str, implementation: Implementation) {
        tracing::debug!(concrete, needs = abstract_, ?implementation, "contextual binding");
        self.write(|r| {
            let abstract_ = r.alias_of(abstract_);
            r.contextual
                .entry(concrete.to_string())
                .or_default()
                .insert(abstract_, implementation);
        });
    }

    pub fn bound(&self, abstract_: &str) -> bool {
        self.read(|r| r.bound(abstract_))
    }

    pub fn has(&self, id: &str) -> bool {
        self.bound(id)
    }

    pub fn resolved(&self, abstract_: &str) -> bool {
        self.read(|r| r.resolved(abstract_))
    }

    pub fn is_shared(&self, abstract_: &str) -> bool {
        self.read(|r| r.is_shared(abstract_))
    }

    /// Bound abstracts, sorted.
    pub fn bindings(&self) -> Vec<String> {
        let mut bindings: Vec<String> = self.read(|r| r.bindings.keys().cloned().collect());
        bindings.sort();
        bindings
    }

    pub fn build_stack_depth(&self) -> usize {
        self.read(|r| r.build_stack.len())
    }

    /// Binds `key` to a factory handing out clones of `value`.
    pub fn set<T>(&self, key: &str, value: T) -> Result<(), Error>
    where
        T: Resolvable,
    {
        self.bind(key, Concrete::value(value))
    }

    pub fn unset(&self, key: &str) {
        self.write(|r| {
            r.bindings.remove(key);
            r.instances.remove(key);
            r.resolved.remove(key);
        });
    }

    pub fn forget_instance(&self, abstract_: &str) {
        self.write(|r| r.instances.remove(abstract_));
    }

    pub fn forget_instances(&self) {
        self.write(|r| r.instances.clear());
    }

    pub fn forget_scoped_instances(&self) {
        self.write(|r| {
            for scoped in r.scoped_instances.clone() {
                r.instances.remove(&scoped);
            }
        });
    }

    /// Drops bindings, instances, aliases and resolved markers. Registered
    /// classes, tags, extenders, contextual bindings and callbacks survive.
    pub fn flush(&self) {
        self.write(|r| {
            r.aliases.clear();
            r.abstract_aliases.clear();
            r.resolved.clear();
            r.bindings.clear();
            r.instances.clear();
            r.scoped_instances.clear();
        });
        tracing::debug!("flushed");
    }
}
