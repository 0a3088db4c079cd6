mod common;

use common::*;
use contextual_di::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_each_consumer_gets_its_own_implementation() {
    let container = container();
    container.when("Uploader").needs("Storage").give("FileStorage");
    container.when("Backup").needs("Storage").give("MemoryStorage");

    let uploader: Arc<Uploader> = container.make("Uploader").unwrap();
    let backup: Arc<Backup> = container.make("Backup").unwrap();
    assert_eq!(uploader.storage.driver(), "file");
    assert_eq!(backup.storage.driver(), "memory");
}

#[test]
fn test_contextual_binding_wins_over_default_binding() {
    let container = container();
    container.bind("Storage", "FileStorage").unwrap();
    container.when("Backup").needs("Storage").give("MemoryStorage");

    let backup: Arc<Backup> = container.make("Backup").unwrap();
    let uploader: Arc<Uploader> = container.make("Uploader").unwrap();
    assert_eq!(backup.storage.driver(), "memory");
    assert_eq!(uploader.storage.driver(), "file");
}

#[test]
fn test_contextual_binding_skips_the_shared_instance() {
    let container = container();
    container.singleton("Storage", "FileStorage").unwrap();
    let shared = container.make_any("Storage", Parameters::new()).unwrap();

    container
        .when("Backup")
        .needs("Storage")
        .give(Implementation::factory(|_| {
            Ok(Arc::new(MemoryStorage) as Arc<dyn Storage>)
        }));

    let backup: Arc<Backup> = container.make("Backup").unwrap();
    assert_eq!(backup.storage.driver(), "memory");

    let again = container.make_any("Storage", Parameters::new()).unwrap();
    assert!(Value::ptr_eq(&shared, &again));
}

#[test]
fn test_needs_may_name_an_alias() {
    let container = container();
    container.alias("Storage", "storage").unwrap();
    container.when("Backup").needs("storage").give("MemoryStorage");

    let backup: Arc<Backup> = container.make("Backup").unwrap();
    assert_eq!(backup.storage.driver(), "memory");
}

#[test]
fn test_when_may_name_an_alias() {
    let container = container();
    container.alias("Backup", "backup").unwrap();
    container.when("backup").needs("Storage").give("MemoryStorage");

    let backup: Arc<Backup> = container.make("Backup").unwrap();
    assert_eq!(backup.storage.driver(), "memory");
}

#[test]
fn test_when_any_scopes_several_consumers() {
    let container = container();
    container
        .when_any(["Uploader", "Backup"])
        .needs("Storage")
        .give("MemoryStorage");

    let uploader: Arc<Uploader> = container.make("Uploader").unwrap();
    let backup: Arc<Backup> = container.make("Backup").unwrap();
    assert_eq!(uploader.storage.driver(), "memory");
    assert_eq!(backup.storage.driver(), "memory");
}

#[test]
fn test_contextual_binding_applies_to_nested_builds_only_at_their_level() {
    let container = container();
    container.bind("Storage", "FileStorage").unwrap();
    container.when("Gallery").needs("Storage").give("MemoryStorage");

    // Gallery never asks for Storage itself; its Uploader does.
    let gallery: Arc<Gallery> = container.make("Gallery").unwrap();
    assert_eq!(gallery.uploader.storage.driver(), "file");
}

#[test]
fn test_primitive_values() {
    let container = container();
    container
        .when("Greeter")
        .needs("$name")
        .give(Implementation::value(String::from("Taylor")));

    let greeter: Arc<Greeter> = container.make("Greeter").unwrap();
    assert_eq!(greeter.greet(), "Hello, Taylor!");
}

#[test]
fn test_primitive_factories_run_at_injection_time() {
    let container = container();
    let hits = Hits::default();
    let counter = hits.clone();
    container
        .when("Greeter")
        .needs("$name")
        .give(Implementation::factory(move |_| {
            counter.hit();
            Ok(String::from("Abigail"))
        }));
    assert_eq!(hits.count(), 0);

    let greeter: Arc<Greeter> = container.make("Greeter").unwrap();
    assert_eq!(greeter.greet(), "Hello, Abigail!");
    container.make::<Arc<Greeter>>("Greeter").unwrap();
    assert_eq!(hits.count(), 2);
}

#[test]
fn test_explicit_parameters_win_over_contextual_primitives() {
    let container = container();
    container
        .when("Greeter")
        .needs("$name")
        .give(Implementation::value(String::from("Taylor")));

    let greeter: Arc<Greeter> = container
        .make_with("Greeter", Parameters::new().with("name", String::from("Dayle")))
        .unwrap();
    assert_eq!(greeter.greet(), "Hello, Dayle!");
}

struct Labels(Vec<String>);

#[test]
fn test_variadic_primitives_spread_a_given_list() {
    let container = container();
    container.register_class(
        Class::new("Labels", |args| Ok(Labels(args.all("names")?)))
            .param(Parameter::new("names").variadic()),
    );
    container.when("Labels").needs("$names").give(vec!["a", "b"]);

    let labels: Arc<Labels> = container.make("Labels").unwrap();
    assert_eq!(labels.0, vec!["a", "b"]);
}

#[test]
fn test_variadic_dependencies_from_a_class_list() {
    let container = container();
    container
        .when("Pipeline")
        .needs("Filter")
        .give(["Trim", "Lowercase"]);

    let pipeline: Arc<Pipeline> = container.make("Pipeline").unwrap();
    assert_eq!(pipeline.names(), vec!["trim", "lowercase"]);
}

#[test]
fn test_variadic_dependencies_default_to_empty() {
    let container = container();

    let pipeline: Arc<Pipeline> = container.make("Pipeline").unwrap();
    assert!(pipeline.filters.is_empty());
}

#[test]
fn test_variadic_dependencies_from_a_single_binding() {
    let container = container();
    container.bind("Filter", "Lowercase").unwrap();

    let pipeline: Arc<Pipeline> = container.make("Pipeline").unwrap();
    assert_eq!(pipeline.names(), vec!["lowercase"]);
}

#[test]
fn test_variadic_dependencies_from_a_tag() {
    let container = container();
    container.tag(["Lowercase", "Trim"], ["filters"]);
    container.when("Pipeline").needs("Filter").give_tagged("filters");

    let pipeline: Arc<Pipeline> = container.make("Pipeline").unwrap();
    assert_eq!(pipeline.names(), vec!["lowercase", "trim"]);

    container.tag(["Trim"], ["filters"]);
    let pipeline: Arc<Pipeline> = container.make("Pipeline").unwrap();
    assert_eq!(pipeline.names(), vec!["lowercase", "trim", "trim"]);
}

#[test]
fn test_variadic_parameters_spread_explicit_lists() {
    let container = container();
    let filters = vec![
        Value::new(Arc::new(Trim) as Arc<dyn Filter>),
        Value::new(Arc::new(Trim) as Arc<dyn Filter>),
    ];

    let pipeline: Arc<Pipeline> = container
        .make_with("Pipeline", Parameters::new().with("filters", Value::list(filters)))
        .unwrap();
    assert_eq!(pipeline.names(), vec!["trim", "trim"]);
}

#[test]
fn test_configuration_values() {
    let container = container();
    container
        .instance(
            contextual_di::config::CONFIG,
            Repository::new(json!({ "banner": { "title": "Welcome" } })),
        )
        .unwrap();
    container.when("Banner").needs("$title").give_config("banner.title", None);
    container
        .when("Banner")
        .needs("$width")
        .give_config("banner.width", Some(json!(120)));

    let banner: Arc<Banner> = container.make("Banner").unwrap();
    assert_eq!(banner.title, "Welcome");
    assert_eq!(banner.width, 120);

    // read at injection time, not at binding time
    let config: Repository = container.make("config").unwrap();
    config.set("banner.width", json!(64));
    let banner: Arc<Banner> = container.make("Banner").unwrap();
    assert_eq!(banner.width, 64);
}
