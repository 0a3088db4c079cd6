use crate::error::Error;
use crate::helpers::NamedLists;
use crate::provider::ProvideResult;
use crate::value::{Parameters, Value};
use crate::Container;
use std::collections::HashMap;
use std::sync::Arc;

pub type BeforeResolvingCallback = Arc<dyn Fn(&str, &Parameters, &Container) + Send + Sync>;
pub type ResolvingCallback = Arc<dyn Fn(&Value, &Container) + Send + Sync>;
pub type ReboundCallback = Arc<dyn Fn(&Container, &Value) + Send + Sync>;
pub type Extender = Arc<dyn Fn(Value, &Container) -> ProvideResult<Value> + Send + Sync>;

#[derive(Default)]
pub(crate) struct Callbacks {
    global_before_resolving: Vec<BeforeResolvingCallback>,
    before_resolving: NamedLists<BeforeResolvingCallback>,
    global_resolving: Vec<ResolvingCallback>,
    resolving: NamedLists<ResolvingCallback>,
    global_after_resolving: Vec<ResolvingCallback>,
    after_resolving: NamedLists<ResolvingCallback>,
    rebound: HashMap<String, Vec<ReboundCallback>>,
}

impl Container {
    /// Fires `callback` before any abstract is resolved.
    pub fn before_resolving_any<F>(&self, callback: F)
    where
        F: Fn(&str, &Parameters, &Container) + Send + Sync + 'static,
    {
        self.write(|r| r.callbacks.global_before_resolving.push(Arc::new(callback)));
    }

    /// Fires `callback` before `abstract_`, or any class extending it, is resolved.
    pub fn before_resolving<F>(&self, abstract_: &str, callback: F)
    where
        F: Fn(&str, &Parameters, &Container) + Send + Sync + 'static,
    {
        self.write(|r| {
            let abstract_ = r.alias_of(abstract_);
            r.callbacks.before_resolving.push(&abstract_, Arc::new(callback));
        });
    }

    pub fn resolving_any<F>(&self, callback: F)
    where
        F: Fn(&Value, &Container) + Send + Sync + 'static,
    {
        self.write(|r| r.callbacks.global_resolving.push(Arc::new(callback)));
    }

    /// Fires `callback` whenever `abstract_` is resolved, or any object that
    /// is an instance of it.
    pub fn resolving<F>(&self, abstract_: &str, callback: F)
    where
        F: Fn(&Value, &Container) + Send + Sync + 'static,
    {
        self.write(|r| {
            let abstract_ = r.alias_of(abstract_);
            r.callbacks.resolving.push(&abstract_, Arc::new(callback));
        });
    }

    pub fn after_resolving_any<F>(&self, callback: F)
    where
        F: Fn(&Value, &Container) + Send + Sync + 'static,
    {
        self.write(|r| r.callbacks.global_after_resolving.push(Arc::new(callback)));
    }

    pub fn after_resolving<F>(&self, abstract_: &str, callback: F)
    where
        F: Fn(&Value, &Container) + Send + Sync + 'static,
    {
        self.write(|r| {
            let abstract_ = r.alias_of(abstract_);
            r.callbacks.after_resolving.push(&abstract_, Arc::new(callback));
        });
    }

    /// Registers a callback for when `abstract_` is bound again after it was
    /// resolved. Returns the current object when `abstract_` is already bound.
    pub fn rebinding<F>(&self, abstract_: &str, callback: F) -> Result<Option<Value>, Error>
    where
        F: Fn(&Container, &Value) + Send + Sync + 'static,
    {
        let _lock = self.lock();
        let (abstract_, bound) = self.write(|r| {
            let abstract_ = r.alias_of(abstract_);
            r.callbacks
                .rebound
                .entry(abstract_.clone())
                .or_default()
                .push(Arc::new(callback));
            let bound = r.bound(&abstract_);
            (abstract_, bound)
        });
        if bound {
            return self.make_any(&abstract_, Parameters::new()).map(Some);
        }
        Ok(None)
    }

    pub(crate) fn fire_before_resolving(&self, abstract_: &str, parameters: &Parameters) {
        let callbacks = self.read(|r| {
            let mut callbacks = r.callbacks.global_before_resolving.clone();
            callbacks.extend(r.callbacks.before_resolving.matching(|ty| {
                ty == abstract_ || r.reflector.is_subclass_of(abstract_, ty)
            }));
            callbacks
        });
        for callback in callbacks {
            callback(abstract_, parameters, self);
        }
    }

    /// Resolving callbacks (global, then by type) followed by the
    /// after-resolving callbacks in the same order.
    pub(crate) fn fire_resolving(&self, abstract_: &str, object: &Value) {
        let callbacks = self.read(|r| {
            let matches = |ty: &str| ty == abstract_ || r.reflector.is_instance_of(object, ty);
            let mut callbacks = r.callbacks.global_resolving.clone();
            callbacks.extend(r.callbacks.resolving.matching(matches));
            callbacks.extend(r.callbacks.global_after_resolving.iter().cloned());
            callbacks.extend(r.callbacks.after_resolving.matching(matches));
            callbacks
        });
        for callback in callbacks {
            callback(object, self);
        }
    }

    /// Re-resolves `abstract_` and hands the new object to its rebinding callbacks.
    pub(crate) fn rebound(&self, abstract_: &str) -> Result<(), Error> {
        let _lock = self.lock();
        let object = self.make_any(abstract_, Parameters::new())?;
        let callbacks = self.read(|r| r.callbacks.rebound.get(abstract_).cloned().unwrap_or_default());
        tracing::debug!(abstract_, listeners = callbacks.len(), "rebound");
        for callback in callbacks {
            callback(self, &object);
        }
        Ok(())
    }
}
