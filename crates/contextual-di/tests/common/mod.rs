#![allow(dead_code)]

use contextual_di::{Class, Container, Parameter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn driver(&self) -> &'static str;
}

pub struct FileStorage;

impl Storage for FileStorage {
    fn driver(&self) -> &'static str {
        "file"
    }
}

pub struct MemoryStorage;

impl Storage for MemoryStorage {
    fn driver(&self) -> &'static str {
        "memory"
    }
}

pub struct Uploader {
    pub storage: Arc<dyn Storage>,
}

pub struct Backup {
    pub storage: Arc<dyn Storage>,
}

pub struct Gallery {
    pub uploader: Arc<Uploader>,
}

pub struct Report {
    pub storage: Option<Arc<dyn Storage>>,
}

#[derive(Debug)]
pub struct Greeter {
    pub name: String,
    pub greeting: String,
}

impl Greeter {
    pub fn greet(&self) -> String {
        format!("{}, {}!", self.greeting, self.name)
    }
}

pub trait Filter: Send + Sync {
    fn name(&self) -> &'static str;
}

pub struct Trim;

impl Filter for Trim {
    fn name(&self) -> &'static str {
        "trim"
    }
}

pub struct Lowercase;

impl Filter for Lowercase {
    fn name(&self) -> &'static str {
        "lowercase"
    }
}

pub struct Pipeline {
    pub filters: Vec<Arc<dyn Filter>>,
}

impl Pipeline {
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }
}

pub struct Mailer {
    pub from: String,
}

pub struct Banner {
    pub title: String,
    pub width: u32,
}

pub struct Chicken;
pub struct Egg;

/// Counts how often a closure ran.
#[derive(Default, Clone)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A container that knows every fixture class, with nothing bound.
pub fn container() -> Container {
    init_tracing();

    let container = Container::new();

    container.register_class(Class::interface("Storage"));
    container.register_class(
        Class::new("FileStorage", |_| Ok(FileStorage))
            .implements_as("Storage", |storage: Arc<FileStorage>| storage as Arc<dyn Storage>),
    );
    container.register_class(
        Class::new("MemoryStorage", |_| Ok(MemoryStorage))
            .implements_as("Storage", |storage: Arc<MemoryStorage>| storage as Arc<dyn Storage>),
    );
    container.register_class(
        Class::new("Uploader", |args| {
            Ok(Uploader {
                storage: args.get("storage")?,
            })
        })
        .param(Parameter::typed("storage", "Storage")),
    );
    container.register_class(
        Class::new("Backup", |args| {
            Ok(Backup {
                storage: args.get("storage")?,
            })
        })
        .param(Parameter::typed("storage", "Storage")),
    );
    container.register_class(
        Class::new("Gallery", |args| {
            Ok(Gallery {
                uploader: args.get("uploader")?,
            })
        })
        .param(Parameter::typed("uploader", "Uploader")),
    );
    container.register_class(
        Class::new("Report", |args| {
            Ok(Report {
                storage: args.optional("storage")?,
            })
        })
        .param(Parameter::typed("storage", "Storage").nullable()),
    );
    container.register_class(
        Class::new("Greeter", |args| {
            Ok(Greeter {
                name: args.get("name")?,
                greeting: args.get("greeting")?,
            })
        })
        .param(Parameter::new("name"))
        .param(Parameter::new("greeting").with_default(String::from("Hello"))),
    );

    container.register_class(Class::interface("Filter"));
    container.register_class(
        Class::new("Trim", |_| Ok(Trim))
            .implements_as("Filter", |filter: Arc<Trim>| filter as Arc<dyn Filter>),
    );
    container.register_class(
        Class::new("Lowercase", |_| Ok(Lowercase))
            .implements_as("Filter", |filter: Arc<Lowercase>| filter as Arc<dyn Filter>),
    );
    container.register_class(
        Class::new("Pipeline", |args| {
            Ok(Pipeline {
                filters: args.all("filters")?,
            })
        })
        .param(Parameter::typed("filters", "Filter").variadic()),
    );

    container.register_class(
        Class::new("Mailer", |_| {
            Ok(Mailer {
                from: String::from("noreply@example.com"),
            })
        })
        .method(
            "send",
            vec![Parameter::typed("storage", "Storage"), Parameter::new("to")],
            |mailer: Arc<Mailer>, args| {
                let storage: Arc<dyn Storage> = args.get("storage")?;
                let to: String = args.get("to")?;
                Ok(format!("{} -> {} via {}", mailer.from, to, storage.driver()))
            },
        )
        .method(
            "__invoke",
            vec![Parameter::new("subject").with_default(String::from("hello"))],
            |_: Arc<Mailer>, args| args.get::<String>("subject").map_err(Into::into),
        ),
    );

    container.register_class(
        Class::new("Banner", |args| {
            Ok(Banner {
                title: args.deserialize("title")?,
                width: args.deserialize("width")?,
            })
        })
        .param(Parameter::new("title"))
        .param(Parameter::new("width").with_default(serde_json::json!(80))),
    );

    container.register_class(
        Class::new("Chicken", |_| Ok(Chicken)).param(Parameter::typed("egg", "Egg")),
    );
    container.register_class(
        Class::new("Egg", |_| Ok(Egg)).param(Parameter::typed("chicken", "Chicken")),
    );

    container
}
