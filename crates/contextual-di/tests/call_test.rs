mod common;

use common::*;
use contextual_di::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn text(value: Value) -> String {
    value.get::<String>().unwrap_or_default()
}

fn describe_storage() -> Callback {
    Callback::closure(
        vec![
            Parameter::typed("storage", "Storage"),
            Parameter::new("suffix").with_default(String::from("!")),
        ],
        |args| {
            let storage: Arc<dyn Storage> = args.get("storage")?;
            let suffix: String = args.get("suffix")?;
            Ok(format!("{}{}", storage.driver(), suffix))
        },
    )
}

#[test]
fn test_closure_dependencies_are_injected() {
    let container = container();
    container.bind("Storage", "FileStorage").unwrap();

    let result = container.call(describe_storage(), Parameters::new()).unwrap();
    assert_eq!(text(result), "file!");
}

#[test]
fn test_named_parameters_override_injection() {
    let container = container();
    container.bind("Storage", "FileStorage").unwrap();

    let result = container
        .call(describe_storage(), Parameters::new().with("suffix", String::from("?")))
        .unwrap();
    assert_eq!(text(result), "file?");
}

#[test]
fn test_parameters_keyed_by_type_hint() {
    let container = container();
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage);

    let result = container
        .call(describe_storage(), Parameters::new().with("Storage", storage))
        .unwrap();
    assert_eq!(text(result), "memory!");
}

#[test]
fn test_unresolvable_closure_parameter() {
    let container = container();
    let callback = Callback::closure(vec![Parameter::new("missing")], |_| Ok(()));

    let err = container.call(callback, Parameters::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to resolve dependency [Parameter #0 [ <required> $missing ]] in class Closure"
    );
}

#[test]
fn test_leftover_positional_parameters_are_appended() {
    let container = container();
    let callback = Callback::closure(vec![Parameter::new("first")], |args| {
        let first: i32 = args.get("first")?;
        let rest: Vec<i32> = args.positional().filter_map(Value::get::<i32>).collect();
        Ok((first, rest))
    });

    let result = container
        .call(
            callback,
            Parameters::new().with("first", 1_i32).push(2_i32).push(3_i32),
        )
        .unwrap();
    assert_eq!(result.get::<(i32, Vec<i32>)>(), Some((1, vec![2, 3])));
}

#[test]
fn test_variadic_closure_parameters() {
    let container = container();
    container.tag(["Trim", "Lowercase"], ["filters"]);
    container
        .bind(
            "Filter",
            Concrete::factory(|container, _| {
                let filters = container
                    .tagged("filters")
                    .iter()
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(filters))
            }),
        )
        .unwrap();
    let callback = Callback::closure(vec![Parameter::typed("filters", "Filter").variadic()], |args| {
        let filters: Vec<Arc<dyn Filter>> = args.all("filters")?;
        Ok(filters.iter().map(|filter| filter.name()).collect::<Vec<_>>().join(","))
    });

    let result = container.call(callback, Parameters::new()).unwrap();
    assert_eq!(text(result), "trim,lowercase");
}

#[test]
fn test_class_at_method() {
    let container = container();
    container.bind("Storage", "FileStorage").unwrap();

    let result = container
        .call(
            "Mailer@send",
            Parameters::new().with("to", String::from("taylor@example.com")),
        )
        .unwrap();
    assert_eq!(text(result), "noreply@example.com -> taylor@example.com via file");
}

#[test]
fn test_invoke_is_the_default_method() {
    let container = container();

    assert_eq!(text(container.call("Mailer", Parameters::new()).unwrap()), "hello");
    let result = container
        .call("Mailer", Parameters::new().with("subject", String::from("welcome")))
        .unwrap();
    assert_eq!(text(result), "welcome");
}

#[test]
fn test_explicit_default_method() {
    let container = container();
    container.bind("Storage", "MemoryStorage").unwrap();

    let result = container
        .call_with_default(
            "Mailer",
            Parameters::new().with("to", String::from("abigail@example.com")),
            "send",
        )
        .unwrap();
    assert_eq!(text(result), "noreply@example.com -> abigail@example.com via memory");
}

#[test]
fn test_method_not_provided() {
    let container = container();

    let err = container.call("FileStorage", Parameters::new()).unwrap_err();
    assert!(matches!(err, Error::MethodNotProvided(ref target) if target == "FileStorage"));
}

#[test]
fn test_method_not_found() {
    let container = container();

    let err = container.call("Mailer@archive", Parameters::new()).unwrap_err();
    assert_eq!(err.to_string(), "Method [Mailer::archive] does not exist.");
}

#[test]
fn test_bound_callback() {
    let container = container();
    container.bind("Storage", "FileStorage").unwrap();
    let mailer = container.make_any("Mailer", Parameters::new()).unwrap();

    let result = container
        .call(
            Callback::bound(mailer, "send"),
            Parameters::new().with("to", String::from("dayle@example.com")),
        )
        .unwrap();
    assert_eq!(text(result), "noreply@example.com -> dayle@example.com via file");
}

#[test]
fn test_method_bindings_replace_the_method() {
    let container = container();
    container.bind_method("Mailer@send", |mailer, _| {
        let mailer: Arc<Mailer> = mailer.get().ok_or_else(|| anyhow::anyhow!("not a mailer"))?;
        Ok(format!("intercepted for {}", mailer.from))
    });

    assert!(container.has_method_binding("Mailer@send"));
    assert!(!container.has_method_binding("Mailer@__invoke"));

    let result = container.call("Mailer@send", Parameters::new()).unwrap();
    assert_eq!(text(result), "intercepted for noreply@example.com");

    let mailer = container.make_any("Mailer", Parameters::new()).unwrap();
    let result = container.call_method_binding("Mailer@send", &mailer).unwrap();
    assert_eq!(text(result), "intercepted for noreply@example.com");
}

#[test]
fn test_wrap_defers_the_call() {
    let container = container();
    let hits = Hits::default();
    let counter = hits.clone();
    let callback = Callback::closure(Vec::new(), move |_| {
        counter.hit();
        Ok(())
    });

    let wrapped = container.wrap(callback, Parameters::new());
    assert_eq!(hits.count(), 0);
    wrapped().unwrap();
    wrapped().unwrap();
    assert_eq!(hits.count(), 2);
}
