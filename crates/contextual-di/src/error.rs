use thiserror::Error;
use std::sync::Arc;

#[derive(Error, Debug, Clone)]
pub enum Error {
  #[error("{0}")]
  BindingResolution(String),
  #[error("no entry was found for [{id}] identifier")]
  EntryNotFound {
    id: String,
    #[source]
    source: Box<Error>,
  },
  #[error("Circular dependency detected while resolving [{target}]: {}", .chain.join(" -> "))]
  CircularDependency { target: String, chain: Vec<String> },
  #[error("[{0}] is aliased to itself.")]
  AliasedToItself(String),
  #[error("Method not provided for [{0}].")]
  MethodNotProvided(String),
  #[error("Method [{class}::{method}] does not exist.")]
  MethodNotFound { class: String, method: String },
  #[error("[{target}] resolved to `{found}`, expected `{expected}`")]
  TypeMismatch {
    target: String,
    expected: &'static str,
    found: &'static str,
  },
  #[error("no argument named [${0}] was assembled")]
  MissingArgument(String),
  #[error("service: {0}")]
  Service(Arc<anyhow::Error>),
}

impl Error {
  pub(crate) fn unresolvable(message: impl Into<String>) -> Self {
    Error::BindingResolution(message.into())
  }

  /// Failures that a default value or an empty variadic may stand in for.
  pub fn is_binding_resolution(&self) -> bool {
    matches!(self, Error::BindingResolution(_))
  }
}

// Container errors raised inside user closures travel through `anyhow` and
// come back out with their original kind.
impl From<anyhow::Error> for Error {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<Error>() {
      Ok(err) => err,
      Err(err) => Error::Service(Arc::new(err)),
    }
  }
}
