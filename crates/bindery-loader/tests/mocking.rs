//! Mocking behaviour across import shapes
//!
//! Exercises the loader end to end: module bodies requiring each other,
//! tests substituting exports, and importers observing (or not) the change.

use bindery_loader::{
    ImportStyle, LoaderError, ModuleId, ModuleLoader, ModuleState, ModuleTable, NamedBindingMode,
    LoaderOptions, Value, array, object, spy_on,
};

fn users() -> Value {
    array![
        object! { "name" => Value::from("Tom") },
        object! { "name" => Value::from("Mary") },
    ]
}

/// `utils` exports `fetchData` and a separate default object whose `fetchData`
/// forwards to the exports object, like a re-exporting default.
fn utils_table() -> ModuleTable {
    let mut table = ModuleTable::new();
    table.define("utils", |ctx| {
        ctx.export("fetchData", Value::returning("fetchData", users()));
        let exports = ctx.exports().clone();
        ctx.exports().set_default(object! {
            "fetchData" => Value::function("fetchData", move |args| exports.call("fetchData", args)),
        });
        Ok(())
    });
    table
}

#[test]
fn test_require_returns_identical_exports() {
    let loader = ModuleLoader::new(utils_table());
    let a = loader.require("utils").unwrap();
    let b = loader.require("utils").unwrap();
    assert!(a.ptr_eq(&b));
}

#[test]
fn test_namespace_mutation_visible_to_every_holder() {
    let loader = ModuleLoader::new(utils_table());

    let mine = loader
        .import("utils", &ImportStyle::WholeNamespace)
        .unwrap()
        .into_namespace()
        .unwrap();
    let theirs = loader
        .import("utils", &ImportStyle::WholeNamespace)
        .unwrap()
        .into_namespace()
        .unwrap();
    let default = loader.import("utils", &ImportStyle::DefaultProperty).unwrap().value();

    mine.set("fetchData", Value::returning("stub", array![]));

    assert_eq!(theirs.call("fetchData", &[]).unwrap(), array![]);
    let via_default = default.as_object().unwrap().call_method("fetchData", &[]).unwrap();
    assert_eq!(via_default, array![]);
}

#[test]
fn test_named_import_keeps_captured_value() {
    let loader = ModuleLoader::new(utils_table());
    let binding = loader
        .import("utils", &ImportStyle::named("fetchData"))
        .unwrap();

    let utils = loader.require("utils").unwrap();
    utils.set("fetchData", Value::returning("stub", array![]));

    let result = binding.value().call(&[]).unwrap();
    assert_eq!(result.to_json(), users().to_json());
}

#[test]
fn test_live_named_import_follows_mutation() {
    let loader = ModuleLoader::new(utils_table()).with_options(LoaderOptions {
        named_binding: NamedBindingMode::Live,
    });
    let binding = loader
        .import("utils", &ImportStyle::named("fetchData"))
        .unwrap();

    let _guard = spy_on(
        &loader.require("utils").unwrap(),
        "fetchData",
        Value::returning("stub", array![]),
    )
    .unwrap();

    assert_eq!(binding.value().call(&[]).unwrap(), array![]);
}

#[test]
fn test_cyclic_require_sees_partial_exports() {
    let mut table = ModuleTable::new();
    table.define("a", |ctx| {
        ctx.export("early", Value::Boolean(true));
        ctx.require("b")?;
        ctx.export("late", Value::Boolean(true));
        Ok(())
    });
    table.define("b", |ctx| {
        let a = ctx.require("a")?;
        ctx.export("sawEarly", Value::Boolean(a.has("early")));
        ctx.export("sawLate", Value::Boolean(a.has("late")));
        ctx.export("a", a.to_value());
        Ok(())
    });
    let loader = ModuleLoader::new(table);

    let a = loader.require("a").unwrap();
    let b = loader.require("b").unwrap();

    assert_eq!(b.get("sawEarly"), Some(Value::Boolean(true)));
    assert_eq!(b.get("sawLate"), Some(Value::Boolean(false)));
    assert!(b.get("a").unwrap().as_object().unwrap().ptr_eq(a.as_object()));
    assert!(a.has("late"));
    assert_eq!(
        loader.evaluation_order(),
        vec![ModuleId::from("b"), ModuleId::from("a")]
    );
}

#[test]
fn test_self_require_returns_own_exports() {
    let mut table = ModuleTable::new();
    table.define("selfish", |ctx| {
        let me = ctx.require("selfish")?;
        ctx.export("same", Value::Boolean(me.ptr_eq(ctx.exports())));
        Ok(())
    });
    let loader = ModuleLoader::new(table);
    let exports = loader.require("selfish").unwrap();
    assert_eq!(exports.get("same"), Some(Value::Boolean(true)));
}

#[test]
fn test_default_import_without_default_export() {
    let mut table = ModuleTable::new();
    table.define(7u32, |ctx| {
        ctx.export("named", Value::Null);
        Ok(())
    });
    let loader = ModuleLoader::new(table);

    let err = loader.import(7u32, &ImportStyle::DefaultProperty).unwrap_err();
    assert!(matches!(err, LoaderError::MissingDefaultExport(ModuleId::Index(7))));
}

#[test]
fn test_nested_initialization_failure() {
    let mut table = ModuleTable::new();
    table.define("app", |ctx| {
        ctx.require("db")?;
        Ok(())
    });
    table.define("db", |_| Err(bindery_loader::ModuleError::thrown("connection refused")));
    let loader = ModuleLoader::new(table);

    let err = loader.require("app").unwrap_err();
    assert!(matches!(err, LoaderError::ModuleInitialization { ref id, .. } if id == &ModuleId::from("db")));
    assert_eq!(err.failing_module(), Some(&ModuleId::from("db")));
    assert!(err.to_string().contains("connection refused"));

    for id in ["app", "db"] {
        assert_eq!(
            loader.registry().state_of(&ModuleId::from(id)),
            Some(ModuleState::Uninitialized)
        );
    }
}

#[test]
fn test_mocking_scenario_through_namespace_import() {
    let mut table = utils_table();
    table.define("app", |ctx| {
        let utils = ctx
            .import("utils", &ImportStyle::WholeNamespace)?
            .into_namespace()
            .ok_or_else(|| bindery_loader::ModuleError::thrown("expected namespace"))?;
        ctx.export(
            "getUsers",
            Value::function("getUsers", move |_| utils.call("fetchData", &[])),
        );
        Ok(())
    });
    let loader = ModuleLoader::new(table);

    let app = loader.require("app").unwrap();
    let utils_exports = loader.require("utils").unwrap();
    assert_eq!(app.call("getUsers", &[]).unwrap().to_json(), users().to_json());

    let guard = spy_on(&utils_exports, "fetchData", Value::returning("stub", array![])).unwrap();
    assert_eq!(app.call("getUsers", &[]).unwrap(), array![]);
    assert_eq!(guard.calls(), 1);
    drop(guard);

    assert_eq!(app.call("getUsers", &[]).unwrap().to_json(), users().to_json());
}

#[test]
fn test_self_reference_observes_mock() {
    let mut table = ModuleTable::new();
    table.define("utils", |ctx| {
        let this = ctx.exports().clone();
        ctx.export("fetchData", Value::returning("fetchData", users()));
        ctx.export(
            "getUsers",
            Value::function("getUsers", move |_| this.call("fetchData", &[])),
        );
        Ok(())
    });
    let loader = ModuleLoader::new(table);

    let utils = loader.require("utils").unwrap();
    assert_eq!(utils.call("getUsers", &[]).unwrap().to_json(), users().to_json());

    let guard = spy_on(&utils, "fetchData", Value::returning("stub", array![])).unwrap();
    assert_eq!(utils.call("getUsers", &[]).unwrap(), array![]);
    assert_eq!(guard.calls(), 1);
}
