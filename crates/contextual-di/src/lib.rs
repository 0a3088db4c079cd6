//! A service container with contextual bindings.
//!
//! Abstracts (interface names, class names or arbitrary keys) are bound to
//! factories or to other abstracts, and resolved recursively: constructor
//! parameters described by a registered [`Class`] are injected by name, by
//! contextual binding, by type hint or by default value.
//!
//! ```
//! use contextual_di::{Class, Container, Parameter};
//! use std::sync::Arc;
//!
//! trait Mailer: Send + Sync {
//!     fn transport(&self) -> &str;
//! }
//!
//! struct SmtpMailer;
//!
//! impl Mailer for SmtpMailer {
//!     fn transport(&self) -> &str {
//!         "smtp"
//!     }
//! }
//!
//! struct Newsletter {
//!     mailer: Arc<dyn Mailer>,
//! }
//!
//! let container = Container::new();
//! container.register_class(Class::interface("Mailer"));
//! container.register_class(
//!     Class::new("SmtpMailer", |_| Ok(SmtpMailer))
//!         .implements_as("Mailer", |mailer: Arc<SmtpMailer>| mailer as Arc<dyn Mailer>),
//! );
//! container.register_class(
//!     Class::new("Newsletter", |args| Ok(Newsletter { mailer: args.get("mailer")? }))
//!         .param(Parameter::typed("mailer", "Mailer")),
//! );
//! container.singleton("Mailer", "SmtpMailer").unwrap();
//!
//! let newsletter: Arc<Newsletter> = container.make("Newsletter").unwrap();
//! assert_eq!(newsletter.mailer.transport(), "smtp");
//! ```

mod callbacks;
pub use callbacks::{BeforeResolvingCallback, Extender, ReboundCallback, ResolvingCallback};
pub mod config;
pub use config::Repository;
mod container;
pub use container::Container;
mod contextual;
pub use contextual::{ContextualBinding, ContextualBindingBuilder, ContextualFactory, Implementation};
mod error;
pub use error::Error;
mod global;
mod helpers;
mod invoker;
pub use invoker::{Callback, MethodBinding};
mod provider;
pub use provider::{Concrete, Factory, ProvideResult};
mod reflection;
pub use reflection::{Arguments, Class, Method, Parameter, CLOSURE, INVOKE};
mod registry;
mod resolver;
mod tagged;
pub use tagged::{Tagged, TaggedIter};
mod value;
pub use value::{ParameterKey, Parameters, Resolvable, Value};
