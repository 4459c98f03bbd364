//! Integration tests for Tinstore

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use serde_json::{json, Value};
use tinstore::{ActionError, CollisionPolicy, Module, Store, StoreError, StoreOptions};

fn increment(state: &mut Value, _: Value) {
    state["count"] = json!(state["count"].as_i64().unwrap_or(0) + 1);
}

fn same_id(product: &Value, payload: &Value) -> bool {
    product["id"] == payload["id"]
}

fn products_store() -> Store {
    let root = Module::new(json!({
        "count": 0,
        "products": [],
        "selectedProduct": null
    }))
    .mutation("increment", increment)
    .mutation("productsAdd", |state, product| {
        if let Some(products) = state["products"].as_array_mut() {
            products.push(product);
        }
    })
    .mutation("productsRemove", |state, product| {
        let kept: Vec<Value> = state["products"]
            .as_array()
            .map(|products| {
                products
                    .iter()
                    .filter(|p| !same_id(p, &product))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        state["products"] = Value::Array(kept);
    })
    .mutation("productSelect", |state, product| {
        let selected = state["products"]
            .as_array()
            .and_then(|products| products.iter().find(|p| same_id(p, &product)).cloned())
            .unwrap_or(Value::Null);
        state["selectedProduct"] = selected;
    })
    .mutation("productsEdit", |state, product| {
        if let Some(products) = state["products"].as_array_mut() {
            for p in products.iter_mut().filter(|p| same_id(p, &product)) {
                p["title"] = product["title"].clone();
            }
        }
    })
    .action("productsAdd", |ctx, product| async move {
        ctx.commit("productsAdd", product)?;
        Ok(())
    })
    .getter("productCount", |state, _| {
        json!(state["products"].as_array().map_or(0, Vec::len))
    });

    Store::new(root).unwrap()
}

#[tokio::test]
async fn counter_and_products_scenario() {
    let store = products_store();
    assert_eq!(store.state()["count"], json!(0));

    store.commit("increment", Value::Null).unwrap();
    assert_eq!(store.state()["count"], json!(1));

    store
        .dispatch("productsAdd", json!({"id": 1, "title": "x"}))
        .await
        .unwrap();
    assert_eq!(store.state()["products"], json!([{"id": 1, "title": "x"}]));

    store.commit("productsRemove", json!({"id": 1})).unwrap();
    assert_eq!(store.state()["products"], json!([]));
}

#[test]
fn select_and_edit_products() {
    let store = products_store();
    store.commit("productsAdd", json!({"id": 1, "title": "one"})).unwrap();
    store.commit("productsAdd", json!({"id": 2, "title": "two"})).unwrap();

    store.commit("productSelect", json!({"id": 2})).unwrap();
    assert_eq!(store.state()["selectedProduct"], json!({"id": 2, "title": "two"}));

    store.commit("productsEdit", json!({"id": 2, "title": "deux"})).unwrap();
    assert_eq!(store.state()["products"][1]["title"], json!("deux"));
    // The selection is a copy taken at select time.
    assert_eq!(store.state()["selectedProduct"]["title"], json!("two"));

    store.commit("productSelect", json!({"id": 9})).unwrap();
    assert_eq!(store.state()["selectedProduct"], Value::Null);
}

#[test]
fn getter_evaluation_is_idempotent() {
    let store = products_store();
    store.commit("productsAdd", json!({"id": 1, "title": "x"})).unwrap();

    let first = store.getter("productCount").unwrap();
    let second = store.getter("productCount").unwrap();
    assert_eq!(first, second);
    assert_eq!(first, json!(1));

    store.commit("productsAdd", json!({"id": 2, "title": "y"})).unwrap();
    assert_eq!(store.getter("productCount").unwrap(), json!(2));
}

#[test]
fn mutations_are_deterministic() {
    let run = || {
        let store = products_store();
        store.commit("productsAdd", json!({"id": 3, "title": "z"})).unwrap();
        store.commit("increment", Value::Null).unwrap();
        store.state()
    };
    assert_eq!(run(), run());
}

fn modules_store(options: StoreOptions) -> Result<Store, StoreError> {
    let module_a = Module::new(json!({"a": "aaaa"}))
        .namespaced(true)
        .getter("a", |state, _| state["a"].clone())
        .mutation("change", |state, value| state["a"] = value);

    let module_b = Module::new(json!({"b": "bbbb"})).mutation("change", |state, value| state["b"] = value);

    let root = Module::new(json!({"count": 0}))
        .module("moduleA", module_a)
        .module("moduleB", module_b);

    Store::with_options(root, options)
}

#[test]
fn namespaced_module_round_trip() {
    let store = modules_store(StoreOptions::default()).unwrap();

    store.commit("moduleA/change", json!("new a")).unwrap();
    assert_eq!(store.state()["moduleA"]["a"], json!("new a"));
    assert_eq!(store.getter("moduleA/a").unwrap(), json!("new a"));

    // `change` resolves to the non-namespaced moduleB, which only sees its own slice.
    store.commit("change", json!("new b")).unwrap();
    assert_eq!(store.state()["moduleB"], json!({"b": "new b"}));
    assert_eq!(store.state()["moduleA"]["a"], json!("new a"));
    assert_eq!(store.state()["count"], json!(0));
}

#[test]
fn namespaced_mutation_is_not_global() {
    let root = Module::default().module(
        "M",
        Module::new(json!({"v": 0}))
            .namespaced(true)
            .mutation("change", |state, value| state["v"] = value),
    );
    let store = Store::new(root).unwrap();

    store.commit("M/change", json!(5)).unwrap();
    let err = store.commit("change", json!(6)).unwrap_err();
    assert!(matches!(err, StoreError::UnknownMutation { ref name } if name == "change"));
    assert_eq!(store.state()["M"]["v"], json!(5));
}

#[test]
fn colliding_mutations_keep_the_later_module() {
    let root = Module::default()
        .module("first", Module::new(json!({"hit": false})).mutation("change", |s, _| s["hit"] = json!(true)))
        .module("second", Module::new(json!({"hit": false})).mutation("change", |s, _| s["hit"] = json!(true)));
    let store = Store::new(root).unwrap();

    store.commit("change", Value::Null).unwrap();
    assert_eq!(store.state()["first"]["hit"], json!(false));
    assert_eq!(store.state()["second"]["hit"], json!(true));
}

#[test]
fn reject_policy_refuses_colliding_modules() {
    let root = Module::default()
        .mutation("change", |_, _| {})
        .module("other", Module::default().mutation("change", |_, _| {}));
    let options = StoreOptions::from_toml_str(r#"collision = "reject""#).unwrap();
    assert_eq!(options.collision, CollisionPolicy::Reject);

    let err = Store::with_options(root, options).unwrap_err();
    assert!(matches!(err, StoreError::NameCollision { ref name, .. } if name == "change"));

    // The two-module example has no collision once moduleA is namespaced.
    assert!(modules_store(StoreOptions::from_toml_str(r#"collision = "reject""#).unwrap()).is_ok());
}

async fn api_get(value: &'static str) -> Value {
    tokio::time::sleep(Duration::from_secs(3)).await;
    json!(value)
}

fn loading_store() -> Store {
    let root = Module::new(json!({
        "count": 0,
        "data": null,
        "otherdata": null,
        "loading": false
    }))
    .mutation("increment", increment)
    .mutation("data", |state, data| state["data"] = data)
    .mutation("otherdata", |state, data| state["otherdata"] = data)
    .mutation("loading", |state, loading| state["loading"] = loading)
    .action("loadData", |ctx, _| async move {
        ctx.commit("loading", json!(true))?;
        ctx.commit("data", api_get("data").await)?;
        ctx.commit("loading", json!(false))?;
        Ok(())
    })
    .action("loadOtherData", |ctx, _| async move {
        ctx.dispatch("loadData", Value::Null).await?;
        ctx.commit("loading", json!(true))?;
        ctx.commit("otherdata", api_get("other data").await)?;
        ctx.commit("loading", json!(false))?;
        Ok(())
    })
    .action("increment", |ctx, _| async move {
        ctx.defer_commit(Duration::from_secs(2), "increment", Value::Null);
        Ok(())
    });

    Store::new(root).unwrap()
}

#[tokio::test(start_paused = true)]
async fn chained_actions_load_in_sequence() {
    let store = loading_store();
    let mutations = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&mutations);
    store.subscribe(move |record, _| sink.lock().push(record.name.clone()));

    store.dispatch("loadOtherData", Value::Null).await.unwrap();

    let state = store.state();
    assert_eq!(state["data"], json!("data"));
    assert_eq!(state["otherdata"], json!("other data"));
    assert_eq!(state["loading"], json!(false));
    assert_eq!(
        *mutations.lock(),
        vec!["loading", "data", "loading", "loading", "otherdata", "loading"]
    );
}

#[tokio::test(start_paused = true)]
async fn deferred_commit_lands_after_the_delay() {
    let store = loading_store();

    store.dispatch("increment", Value::Null).await.unwrap();
    assert_eq!(store.state()["count"], json!(0));

    tokio::time::advance(Duration::from_secs(1)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(store.state()["count"], json!(0));

    tokio::time::advance(Duration::from_secs(1)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(store.state()["count"], json!(1));
}

#[tokio::test(start_paused = true)]
async fn later_deferred_commit_wins() {
    let root = Module::new(json!({"value": 0}))
        .mutation("set", |state, value| state["value"] = value)
        .action("race", |ctx, _| async move {
            let slow = ctx.defer_commit(Duration::from_secs(2), "set", json!("slow"));
            let fast = ctx.defer_commit(Duration::from_secs(1), "set", json!("fast"));
            fast.await??;
            slow.await??;
            Ok(())
        });
    let store = Store::new(root).unwrap();

    store.dispatch("race", Value::Null).await.unwrap();
    assert_eq!(store.state()["value"], json!("slow"));
}

#[tokio::test]
async fn awaited_sub_action_is_visible_to_the_caller() {
    let root = Module::new(json!({"x": 0, "seen": null}))
        .mutation("setX", |state, value| state["x"] = value)
        .mutation("record", |state, value| state["seen"] = value)
        .action("otherAction", |ctx, _| async move {
            tokio::task::yield_now().await;
            ctx.commit("setX", json!(1))?;
            Ok(())
        })
        .action("caller", |ctx, _| async move {
            ctx.dispatch("otherAction", Value::Null).await?;
            let x = ctx.state()?["x"].clone();
            ctx.commit("record", x)?;
            Ok(())
        });
    let store = Store::new(root).unwrap();

    store.dispatch("caller", Value::Null).await.unwrap();
    assert_eq!(store.state()["seen"], json!(1));
}

#[tokio::test]
async fn namespaced_actions_commit_locally() {
    let cart = Module::new(json!({"items": []}))
        .namespaced(true)
        .mutation("add", |state, item| {
            if let Some(items) = state["items"].as_array_mut() {
                items.push(item);
            }
        })
        .getter("size", |state, _| json!(state["items"].as_array().map_or(0, Vec::len)))
        .action("checkout", |ctx, item| async move {
            assert_eq!(ctx.namespace(), "cart/");
            ctx.commit("add", item)?;
            let size = ctx.getter("size")?;
            ctx.commit_root("log", size)?;
            Ok(())
        });
    let root = Module::new(json!({"log": []}))
        .mutation("log", |state, entry| {
            if let Some(log) = state["log"].as_array_mut() {
                log.push(entry);
            }
        })
        .module("cart", cart);
    let store = Store::new(root).unwrap();

    store.dispatch("cart/checkout", json!("apple")).await.unwrap();
    assert_eq!(store.state()["cart"]["items"], json!(["apple"]));
    assert_eq!(store.state()["log"], json!([1]));

    let err = store.dispatch("checkout", Value::Null).await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownAction { .. }));
}

#[tokio::test]
async fn namespaced_actions_dispatch_locally_and_reach_the_root() {
    let module = Module::new(json!({"v": 0}))
        .namespaced(true)
        .mutation("set", |state, value| state["v"] = value)
        .action("inner", |ctx, value| async move {
            ctx.commit("set", value)?;
            Ok(())
        })
        .action("outer", |ctx, value| async move {
            ctx.dispatch("inner", value).await?;
            ctx.dispatch_root("rootAct", Value::Null).await?;

            assert_eq!(ctx.root_getter("rootG")?, json!(7));
            assert_eq!(ctx.root_state()["r"], json!(7));
            assert_eq!(ctx.state()?, json!({"v": 3}));
            assert!(ctx.store().has_action("m/inner"));

            // Local names never fall through to the root table.
            let err = ctx.dispatch("rootAct", Value::Null).await.unwrap_err();
            assert!(matches!(err, StoreError::UnknownAction { ref name } if name == "m/rootAct"));
            Ok(())
        });
    let root = Module::new(json!({"r": 0}))
        .mutation("setR", |state, value| state["r"] = value)
        .action("rootAct", |ctx, _| async move {
            ctx.commit("setR", json!(7))?;
            Ok(())
        })
        .getter("rootG", |state, _| state["r"].clone())
        .module("m", module);
    let store = Store::new(root).unwrap();

    assert_eq!(store.action_names().collect::<Vec<_>>(), vec!["m/inner", "m/outer", "rootAct"]);
    store.dispatch("m/outer", json!(3)).await.unwrap();
    assert_eq!(store.state(), json!({"r": 7, "m": {"v": 3}}));
}

#[tokio::test(start_paused = true)]
async fn failed_deferred_commit_is_reported_on_its_handle() {
    let root = Module::new(json!({})).action("late", |ctx, _| async move {
        let handle = ctx.defer_commit(Duration::from_secs(1), "missing", Value::Null);
        let err = handle.await?.unwrap_err();
        assert!(matches!(err, StoreError::UnknownMutation { ref name } if name == "missing"));
        Ok(())
    });
    let store = Store::new(root).unwrap();

    store.dispatch("late", Value::Null).await.unwrap();
}

#[tokio::test]
async fn failing_action_rejects_the_dispatch() {
    let root = Module::new(json!({"attempts": 0}))
        .mutation("attempt", |state, _| {
            state["attempts"] = json!(state["attempts"].as_i64().unwrap_or(0) + 1);
        })
        .action("fetch", |ctx, _| async move {
            ctx.commit("attempt", Value::Null)?;
            let err: ActionError = "backend unavailable".into();
            Err(err)
        })
        .action("missingCommit", |ctx, _| async move {
            ctx.commit("nope", Value::Null)?;
            Ok(())
        });
    let store = Store::new(root).unwrap();

    let err = store.dispatch("fetch", Value::Null).await.unwrap_err();
    match err {
        StoreError::Action { name, source } => {
            assert_eq!(name, "fetch");
            assert_eq!(source.to_string(), "backend unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
    // No retry.
    assert_eq!(store.state()["attempts"], json!(1));

    let err = store.dispatch("missingCommit", Value::Null).await.unwrap_err();
    let source = std::error::Error::source(&err).map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("unknown mutation type: nope"));
}

#[tokio::test]
async fn actions_fan_out_and_join() {
    let root = Module::new(json!({"done": []}))
        .mutation("done", |state, name| {
            if let Some(done) = state["done"].as_array_mut() {
                done.push(name);
            }
        })
        .action("job", |ctx, name| async move {
            ctx.commit("done", name)?;
            Ok(())
        })
        .action("all", |ctx, _| async move {
            futures::future::try_join_all(vec![
                ctx.dispatch("job", json!("a")),
                ctx.dispatch("job", json!("b")),
            ])
            .await?;
            ctx.commit("done", json!("all"))?;
            Ok(())
        });
    let store = Store::new(root).unwrap();

    store.dispatch("all", Value::Null).await.unwrap();
    let done = store.state()["done"].clone();
    assert_eq!(done.as_array().map(Vec::len), Some(3));
    assert_eq!(done[2], json!("all"));
}

#[tokio::test]
async fn action_subscribers_run_before_the_body() {
    let store = loading_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    store.subscribe_action(move |record, state| {
        assert_eq!(record.name, "increment");
        assert_eq!(state["count"], json!(0));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.dispatch("increment", Value::Null).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn getters_snapshot_every_getter() {
    let store = modules_store(StoreOptions::default()).unwrap();
    let getters = store.getters().unwrap();
    assert_eq!(getters.len(), 1);
    assert_eq!(getters["moduleA/a"], json!("aaaa"));
    assert!(matches!(
        store.getter("a"),
        Err(StoreError::UnknownGetter { .. })
    ));
}
