//! Counter and product list sharing one store

use serde_json::{json, Value};
use tinstore::{Logger, Module, Store};

fn products_module() -> Module {
    Module::new(json!({ "count": 0, "products": [], "selectedProduct": null }))
        .mutation("increment", |state, _| {
            state["count"] = json!(state["count"].as_i64().unwrap_or(0) + 1);
        })
        .mutation("productsAdd", |state, product| {
            if let Some(products) = state["products"].as_array_mut() {
                products.push(product);
            }
        })
        .mutation("productsRemove", |state, product| {
            let kept: Vec<Value> = state["products"]
                .as_array()
                .map(|all| all.iter().filter(|p| p["id"] != product["id"]).cloned().collect())
                .unwrap_or_default();
            state["products"] = Value::Array(kept);
        })
        .mutation("productSelect", |state, product| {
            let selected = state["products"]
                .as_array()
                .and_then(|all| all.iter().find(|p| p["id"] == product["id"]).cloned())
                .unwrap_or(Value::Null);
            state["selectedProduct"] = selected;
        })
        .mutation("productsEdit", |state, product| {
            if let Some(products) = state["products"].as_array_mut() {
                for p in products.iter_mut().filter(|p| p["id"] == product["id"]) {
                    p["title"] = product["title"].clone();
                }
            }
        })
        .getter("selectedId", |state, _| {
            state["selectedProduct"].get("id").cloned().unwrap_or(json!(0))
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("tinstore=info"))
        .init();

    println!("=== Counter & Products ===\n");

    // One store, handed to every consumer explicitly
    let store = Store::builder(products_module()).plugin(Logger::new()).build()?;

    store.subscribe(|mutation, state| {
        println!(
            "   [State] after {}: count={}, products={}",
            mutation.name,
            state["count"],
            state["products"].as_array().map_or(0, Vec::len)
        );
    });

    println!("1. Counter");
    store.commit("increment", Value::Null)?;
    store.commit("increment", Value::Null)?;

    println!("\n2. Adding products");
    for (id, title) in [(1, "keyboard"), (2, "mouse"), (3, "monitor")] {
        store.commit("productsAdd", json!({ "id": id, "title": title }))?;
    }

    println!("\n3. Selecting and editing");
    store.commit("productSelect", json!({ "id": 2 }))?;
    store.commit("productsEdit", json!({ "id": 2, "title": "trackball" }))?;
    println!("   selected id: {}", store.getter("selectedId")?);

    println!("\n4. Removing");
    store.commit("productsRemove", json!({ "id": 1 }))?;

    println!("\nFinal state: {:#}", store.state());
    Ok(())
}
