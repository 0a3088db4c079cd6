use std::fmt;
use std::any::Any;
use std::sync::Arc;

pub type ArcAny = Arc<dyn Any + Send + Sync>;

pub struct Named<T> {
  pub name: String,
  pub value: T,
}

impl<T> fmt::Debug for Named<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Named")
      .field("name", &self.name)
      .finish()
  }
}

/// `name -> [T]` lists kept in the order each name was first seen.
pub struct NamedLists<T>(Vec<Named<Vec<T>>>);

impl<T> Default for NamedLists<T> {
  fn default() -> Self {
    NamedLists(Vec::new())
  }
}

impl<T> NamedLists<T>
  where T: Clone
{
  pub fn push(&mut self, name: &str, item: T) {
    match self.0.iter_mut().find(|named| named.name == name) {
      Some(named) => named.value.push(item),
      None => self.0.push(Named {
        name: name.to_string(),
        value: vec![item],
      }),
    }
  }

  pub fn matching<F>(&self, mut pred: F) -> Vec<T>
    where F: FnMut(&str) -> bool
  {
    self.0
      .iter()
      .filter(|named| pred(&named.name))
      .flat_map(|named| named.value.iter().cloned())
      .collect()
  }
}

impl<T> fmt::Debug for NamedLists<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.0.iter().map(|named| &named.name))
      .finish()
  }
}
