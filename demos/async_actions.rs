//! Actions that wait on simulated I/O before committing

use std::time::Duration;

use serde_json::{json, Value};
use tinstore::{Module, Store};

async fn fetch(what: &'static str) -> Value {
    tokio::time::sleep(Duration::from_millis(300)).await;
    json!(what)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("tinstore=debug"))
        .init();

    println!("=== Async Actions ===\n");

    let root = Module::new(json!({ "count": 0, "data": null, "otherdata": null, "loading": false }))
        .mutation("increment", |state, _| {
            state["count"] = json!(state["count"].as_i64().unwrap_or(0) + 1);
        })
        .mutation("data", |state, data| state["data"] = data)
        .mutation("otherdata", |state, data| state["otherdata"] = data)
        .mutation("loading", |state, loading| state["loading"] = loading)
        .action("loadData", |ctx, _| async move {
            ctx.commit("loading", json!(true))?;
            ctx.commit("data", fetch("data").await)?;
            ctx.commit("loading", json!(false))?;
            Ok(())
        })
        .action("loadOtherData", |ctx, _| async move {
            ctx.dispatch("loadData", Value::Null).await?;
            ctx.commit("loading", json!(true))?;
            ctx.commit("otherdata", fetch("other data").await)?;
            ctx.commit("loading", json!(false))?;
            Ok(())
        })
        .action("increment", |ctx, _| async move {
            ctx.defer_commit(Duration::from_millis(200), "increment", Value::Null);
            Ok(())
        });

    let store = Store::new(root)?;
    store.subscribe(|mutation, state| {
        println!(
            "   {} -> loading={} data={} other={}",
            mutation.name, state["loading"], state["data"], state["otherdata"]
        );
    });

    println!("1. Deferred increment");
    store.dispatch("increment", Value::Null).await?;
    println!("   count right after dispatch: {}", store.state()["count"]);
    tokio::time::sleep(Duration::from_millis(250)).await;
    println!("   count after the delay: {}", store.state()["count"]);

    println!("\n2. Chained loads");
    store.dispatch("loadOtherData", Value::Null).await?;

    println!("\nFinal state: {:#}", store.state());
    Ok(())
}
