use crate::callbacks::{Callbacks, Extender};
use crate::contextual::Implementation;
use crate::provider::Binding;
use crate::reflection::Reflector;
use crate::invoker::MethodBinding;
use crate::value::Value;
use std::collections::{HashMap, HashSet};

/// Everything the container knows. Only ever touched through short borrows
/// that never span a call back into user code.
#[derive(Default)]
pub(crate) struct Registry {
    pub bindings: HashMap<String, Binding>,
    pub method_bindings: HashMap<String, MethodBinding>,
    pub instances: HashMap<String, Value>,
    pub scoped_instances: Vec<String>,
    pub aliases: HashMap<String, String>,
    pub abstract_aliases: HashMap<String, Vec<String>>,
    pub extenders: HashMap<String, Vec<Extender>>,
    pub tags: HashMap<String, Vec<String>>,
    pub build_stack: Vec<String>,
    pub contextual: HashMap<String, HashMap<String, Implementation>>,
    pub resolved: HashSet<String>,
    pub callbacks: Callbacks,
    pub reflector: Reflector,
}

impl Registry {
    /// Follows the alias chain to the canonical abstract.
    pub fn alias_of(&self, abstract_: &str) -> String {
        let mut current = abstract_;
        // Only self-aliases are rejected up front; a longer cycle stops once
        // every alias has been visited.
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(next) => current = next.as_str(),
                None => break,
            }
        }
        current.to_string()
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn bound(&self, abstract_: &str) -> bool {
        self.bindings.contains_key(abstract_)
            || self.instances.contains_key(abstract_)
            || self.is_alias(abstract_)
    }

    pub fn resolved(&self, abstract_: &str) -> bool {
        let abstract_ = if self.is_alias(abstract_) {
            self.alias_of(abstract_)
        } else {
            abstract_.to_string()
        };
        self.resolved.contains(&abstract_) || self.instances.contains_key(&abstract_)
    }

    pub fn is_shared(&self, abstract_: &str) -> bool {
        self.instances.contains_key(abstract_)
            || self
                .bindings
                .get(abstract_)
                .map(|binding| binding.shared)
                .unwrap_or(false)
    }

    pub fn drop_stale_instances(&mut self, abstract_: &str) {
        self.instances.remove(abstract_);
        self.aliases.remove(abstract_);
    }

    /// Removes `searched` from the reverse alias map when it is an alias.
    pub fn remove_abstract_alias(&mut self, searched: &str) {
        if !self.is_alias(searched) {
            return;
        }
        for aliases in self.abstract_aliases.values_mut() {
            aliases.retain(|alias| alias != searched);
        }
    }

    /// The contextual override for `abstract_` requested by the class on top
    /// of the build stack, looked up by the abstract and then by each of its
    /// aliases in registration order.
    pub fn contextual_concrete(&self, abstract_: &str) -> Option<Implementation> {
        let consumer = self.contextual.get(self.build_stack.last()?)?;
        if let Some(implementation) = consumer.get(abstract_) {
            return Some(implementation.clone());
        }
        self.abstract_aliases
            .get(abstract_)?
            .iter()
            .find_map(|alias| consumer.get(alias))
            .cloned()
    }

    pub fn extenders_for(&self, abstract_: &str) -> Vec<Extender> {
        self.extenders
            .get(&self.alias_of(abstract_))
            .cloned()
            .unwrap_or_default()
    }
}
