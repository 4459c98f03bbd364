//! Namespaced and shared modules side by side

use serde_json::json;
use tinstore::{Module, Store, StoreError};

fn main() -> Result<(), StoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("tinstore=debug"))
        .init();

    println!("=== Modules ===\n");

    let module_a = Module::new(json!({ "a": "aaaa" }))
        .namespaced(true)
        .getter("a", |state, _| state["a"].clone())
        .mutation("change", |state, value| state["a"] = value);

    // Not namespaced: `change` lands in the root table
    let module_b = Module::new(json!({ "b": "bbbb" })).mutation("change", |state, value| {
        println!("   local state b = {}", state["b"]);
        state["b"] = value;
    });

    let store = Store::new(
        Module::new(json!({ "count": 0 }))
            .module("moduleA", module_a)
            .module("moduleB", module_b),
    )?;

    println!("Mutations: {:?}", store.mutation_names().collect::<Vec<_>>());

    store.commit("moduleA/change", json!("input"))?;
    store.commit("change", json!("input"))?;

    println!("a    = {}", store.state()["moduleA"]["a"]);
    println!("b    = {}", store.state()["moduleB"]["b"]);
    println!("aget = {}", store.getter("moduleA/a")?);
    Ok(())
}
