use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use cantina_cart::{AddItem, CartEngine};
use cantina_core::{CoreError, LineKind, NotificationSink};
use cantina_order::{CheckoutEngine, DirectOrder, DishOrder, OrderStatus};
use cantina_shared::models::events::Purchaser;
use cantina_store::MemoryStore;

/// Sink that records every published event, for asserting on the
/// fire-and-forget notification path.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(
        &self,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
        Ok(())
    }
}

/// Sink that always fails, to prove failures never reach the caller.
struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn publish(
        &self,
        _event: &str,
        _payload: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err("sink is down".into())
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    cart: CartEngine,
    orders: CheckoutEngine,
    sink: Arc<RecordingSink>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::default());
    let cart = CartEngine::new(store.clone(), store.clone());
    let orders = CheckoutEngine::new(store.clone(), store.clone(), sink.clone());
    Harness {
        store,
        cart,
        orders,
        sink,
    }
}

fn purchaser(id: &str) -> Purchaser {
    Purchaser {
        id: id.to_string(),
        email: Some(format!("{id}@school.example")),
        name: None,
        role: Some("CUSTOMER".to_string()),
    }
}

fn add_menu(menu_id: Uuid, quantity: Option<f64>) -> AddItem {
    AddItem {
        kind: LineKind::WholeMenu,
        menu_id: Some(menu_id),
        dish_id: None,
        quantity,
    }
}

fn add_dish(dish_id: Uuid, quantity: Option<f64>) -> AddItem {
    AddItem {
        kind: LineKind::Dish,
        menu_id: None,
        dish_id: Some(dish_id),
        quantity,
    }
}

fn served_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
}

/// Lets spawned notification tasks run to completion.
async fn drain_notifications() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_repeated_adds_merge_into_one_line() {
    let h = harness();
    let menu = h.store.seed_menu("Menú del Día - Lunes", 1250, served_on());

    h.cart
        .add_items("user-1", &[add_menu(menu.id, None)])
        .await
        .unwrap();
    h.cart
        .add_items("user-1", &[add_menu(menu.id, Some(2.0))])
        .await
        .unwrap();
    let view = h
        .cart
        .add_items("user-1", &[add_menu(menu.id, None)])
        .await
        .unwrap();

    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].quantity, 4);
    assert_eq!(view.lines[0].unit_price_cents, 1250);
    assert_eq!(view.total_cents, 5000);
}

#[tokio::test]
async fn test_merge_refreshes_price_to_latest_catalog_price() {
    let h = harness();
    let menu = h.store.seed_menu("Menú del Día", 1250, served_on());

    h.cart
        .add_items("user-1", &[add_menu(menu.id, None)])
        .await
        .unwrap();

    h.store.set_menu_price(menu.id, 1400);
    let view = h
        .cart
        .add_items("user-1", &[add_menu(menu.id, None)])
        .await
        .unwrap();

    // one line, accumulated quantity, priced at the price of the last add
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].quantity, 2);
    assert_eq!(view.lines[0].unit_price_cents, 1400);
    assert_eq!(view.total_cents, 2800);
}

#[tokio::test]
async fn test_worked_example_menu_and_dish_total() {
    let h = harness();
    let menu = h.store.seed_menu("Menú A", 1250, served_on());
    let dish = h.store.seed_dish(Some(menu.id), "Flan Casero", 300);

    h.cart
        .add_items(
            "user-1",
            &[add_menu(menu.id, None), add_dish(dish.id, Some(2.0))],
        )
        .await
        .unwrap();
    let view = h
        .cart
        .add_items("user-1", &[add_menu(menu.id, None)])
        .await
        .unwrap();

    assert_eq!(view.lines.len(), 2);
    let menu_line = view
        .lines
        .iter()
        .find(|line| line.kind == LineKind::WholeMenu)
        .unwrap();
    let dish_line = view
        .lines
        .iter()
        .find(|line| line.kind == LineKind::Dish)
        .unwrap();
    assert_eq!(menu_line.quantity, 2);
    assert_eq!(menu_line.unit_price_cents, 1250);
    assert_eq!(dish_line.quantity, 2);
    assert_eq!(dish_line.unit_price_cents, 300);
    assert_eq!(view.total_cents, 3100);

    let order = h.orders.checkout(&purchaser("user-1")).await.unwrap();
    assert_eq!(order.total_cents, 3100);
    assert_eq!(order.lines.len(), 2);
    assert_eq!(order.status, OrderStatus::Pending);

    let after = h.cart.read_cart("user-1").await.unwrap();
    assert!(after.lines.is_empty());
    assert_eq!(after.total_cents, 0);
}

#[tokio::test]
async fn test_unknown_reference_aborts_batch_but_keeps_earlier_items() {
    let h = harness();
    let menu = h.store.seed_menu("Menú A", 1250, served_on());

    let err = h
        .cart
        .add_items(
            "user-1",
            &[add_menu(menu.id, None), add_dish(Uuid::new_v4(), None)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    // the first item of the batch stays committed
    let lines = h.store.persisted_lines("user-1");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 1);
}

#[tokio::test]
async fn test_quantity_coercion_on_add() {
    let h = harness();
    let dish = h.store.seed_dish(None, "Ensalada Mixta", 450);

    let view = h
        .cart
        .add_items(
            "user-1",
            &[
                add_dish(dish.id, Some(0.0)),
                add_dish(dish.id, Some(-5.0)),
                add_dish(dish.id, Some(2.7)),
            ],
        )
        .await
        .unwrap();

    // 1 + 1 + 2 after coercion, merged into a single line
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].quantity, 4);
}

#[tokio::test]
async fn test_set_quantity_coerces_instead_of_rejecting() {
    let h = harness();
    let dish = h.store.seed_dish(None, "Ensalada Mixta", 450);

    let view = h
        .cart
        .add_items("user-1", &[add_dish(dish.id, Some(3.0))])
        .await
        .unwrap();
    let line_id = view.lines[0].id;

    h.cart
        .set_quantity("user-1", line_id, Some(0.0))
        .await
        .unwrap();
    assert_eq!(h.store.persisted_lines("user-1")[0].quantity, 1);

    h.cart
        .set_quantity("user-1", line_id, Some(-5.0))
        .await
        .unwrap();
    assert_eq!(h.store.persisted_lines("user-1")[0].quantity, 1);

    h.cart
        .set_quantity("user-1", line_id, Some(6.0))
        .await
        .unwrap();
    assert_eq!(h.store.persisted_lines("user-1")[0].quantity, 6);
}

#[tokio::test]
async fn test_set_quantity_on_foreign_line_is_not_found() {
    let h = harness();
    let dish = h.store.seed_dish(None, "Ensalada", 450);

    let view = h
        .cart
        .add_items("owner", &[add_dish(dish.id, None)])
        .await
        .unwrap();
    let line_id = view.lines[0].id;

    // another user's cart does not contain this line
    h.cart
        .add_items("intruder", &[add_dish(dish.id, None)])
        .await
        .unwrap();
    let err = h
        .cart
        .set_quantity("intruder", line_id, Some(5.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    // no cart at all behaves the same
    let err = h
        .cart
        .set_quantity("nobody", line_id, Some(5.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_remove_missing_line_reports_success() {
    let h = harness();
    let dish = h.store.seed_dish(None, "Ensalada", 450);

    h.cart
        .add_items("user-1", &[add_dish(dish.id, None)])
        .await
        .unwrap();

    h.cart
        .remove_line("user-1", Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(h.store.persisted_lines("user-1").len(), 1);

    // even without any cart
    h.cart.remove_line("nobody", Some(Uuid::new_v4())).await.unwrap();
}

#[tokio::test]
async fn test_remove_without_line_id_clears_the_cart() {
    let h = harness();
    let menu = h.store.seed_menu("Menú A", 1250, served_on());
    let dish = h.store.seed_dish(Some(menu.id), "Flan", 300);

    h.cart
        .add_items(
            "user-1",
            &[add_menu(menu.id, None), add_dish(dish.id, None)],
        )
        .await
        .unwrap();

    h.cart.remove_line("user-1", None).await.unwrap();

    let view = h.cart.read_cart("user-1").await.unwrap();
    assert!(view.cart.is_some());
    assert!(view.lines.is_empty());
    assert_eq!(view.total_cents, 0);
}

#[tokio::test]
async fn test_read_cart_for_unknown_user_is_empty_shape() {
    let h = harness();
    let view = h.cart.read_cart("never-seen").await.unwrap();
    assert!(view.cart.is_none());
    assert!(view.lines.is_empty());
    assert_eq!(view.total_cents, 0);
}

#[tokio::test]
async fn test_checkout_empty_cart_fails_and_writes_nothing() {
    let h = harness();

    // no cart at all
    let err = h.orders.checkout(&purchaser("user-1")).await.unwrap_err();
    assert!(matches!(err, CoreError::EmptyCart));

    // cart exists but was cleared
    let dish = h.store.seed_dish(None, "Flan", 300);
    h.cart
        .add_items("user-1", &[add_dish(dish.id, None)])
        .await
        .unwrap();
    h.cart.remove_line("user-1", None).await.unwrap();

    let err = h.orders.checkout(&purchaser("user-1")).await.unwrap_err();
    assert!(matches!(err, CoreError::EmptyCart));
    assert_eq!(h.store.order_count(), 0);

    drain_notifications().await;
    assert!(h.sink.events().is_empty());
}

#[tokio::test]
async fn test_checkout_clears_cart_and_second_checkout_sees_empty() {
    let h = harness();
    let dish = h.store.seed_dish(None, "Flan", 300);
    h.cart
        .add_items("user-1", &[add_dish(dish.id, Some(2.0))])
        .await
        .unwrap();

    let order = h.orders.checkout(&purchaser("user-1")).await.unwrap();
    assert_eq!(order.total_cents, 600);
    assert_eq!(h.store.order_count(), 1);

    let err = h.orders.checkout(&purchaser("user-1")).await.unwrap_err();
    assert!(matches!(err, CoreError::EmptyCart));
    assert_eq!(h.store.order_count(), 1);
}

#[tokio::test]
async fn test_checkout_total_is_frozen_against_later_price_changes() {
    let h = harness();
    let dish = h.store.seed_dish(None, "Flan", 300);
    h.cart
        .add_items("user-1", &[add_dish(dish.id, Some(2.0))])
        .await
        .unwrap();

    let order = h.orders.checkout(&purchaser("user-1")).await.unwrap();
    h.store.set_dish_price(dish.id, 9900);

    let reread = h
        .orders
        .get_order("user-1", order.id)
        .await
        .unwrap();
    assert_eq!(reread.total_cents, 600);
    assert_eq!(reread.lines[0].unit_price_cents, 300);
}

#[tokio::test]
async fn test_checkout_fires_order_created_notification() {
    let h = harness();
    let menu = h.store.seed_menu("Menú A", 1250, served_on());
    h.cart
        .add_items("user-1", &[add_menu(menu.id, None)])
        .await
        .unwrap();

    let order = h.orders.checkout(&purchaser("user-1")).await.unwrap();
    drain_notifications().await;

    let events = h.sink.events();
    assert_eq!(events.len(), 1);
    let (event, payload) = &events[0];
    assert_eq!(event, "order.created");
    assert_eq!(payload["order"]["id"], serde_json::json!(order.id));
    assert_eq!(payload["order"]["total_cents"], serde_json::json!(1250));
    assert_eq!(payload["order"]["lines"][0]["name"], serde_json::json!("Menú A"));
    assert_eq!(payload["user"]["id"], serde_json::json!("user-1"));
}

#[tokio::test]
async fn test_sink_failure_does_not_fail_checkout() {
    let store = Arc::new(MemoryStore::new());
    let cart = CartEngine::new(store.clone(), store.clone());
    let orders = CheckoutEngine::new(store.clone(), store.clone(), Arc::new(FailingSink));

    let dish = store.seed_dish(None, "Flan", 300);
    cart.add_items("user-1", &[add_dish(dish.id, None)])
        .await
        .unwrap();

    let order = orders.checkout(&purchaser("user-1")).await.unwrap();
    drain_notifications().await;
    assert_eq!(order.total_cents, 300);
    assert_eq!(store.order_count(), 1);
}

#[tokio::test]
async fn test_direct_order_whole_menu() {
    let h = harness();
    let menu = h.store.seed_menu("Menú A", 1250, served_on());

    let order = h
        .orders
        .create_order_direct(
            &purchaser("user-1"),
            DirectOrder::WholeMenu { menu_id: menu.id },
        )
        .await
        .unwrap();

    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].kind, LineKind::WholeMenu);
    assert_eq!(order.lines[0].quantity, 1);
    assert_eq!(order.total_cents, 1250);

    drain_notifications().await;
    assert_eq!(h.sink.events().len(), 1);
}

#[tokio::test]
async fn test_direct_order_a_la_carte_clamps_quantities() {
    let h = harness();
    let flan = h.store.seed_dish(None, "Flan", 300);
    let salad = h.store.seed_dish(None, "Ensalada", 450);

    let order = h
        .orders
        .create_order_direct(
            &purchaser("user-1"),
            DirectOrder::ALaCarte {
                dishes: vec![
                    DishOrder {
                        dish_id: flan.id,
                        quantity: Some(-3.0),
                    },
                    DishOrder {
                        dish_id: salad.id,
                        quantity: Some(2.0),
                    },
                ],
            },
        )
        .await
        .unwrap();

    assert_eq!(order.lines.len(), 2);
    assert_eq!(order.total_cents, 300 + 900);
}

#[tokio::test]
async fn test_direct_order_missing_dish_writes_nothing() {
    let h = harness();
    let flan = h.store.seed_dish(None, "Flan", 300);

    let err = h
        .orders
        .create_order_direct(
            &purchaser("user-1"),
            DirectOrder::ALaCarte {
                dishes: vec![
                    DishOrder {
                        dish_id: flan.id,
                        quantity: None,
                    },
                    DishOrder {
                        dish_id: Uuid::new_v4(),
                        quantity: None,
                    },
                ],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NotFound(_)));
    assert_eq!(h.store.order_count(), 0);

    drain_notifications().await;
    assert!(h.sink.events().is_empty());
}

#[tokio::test]
async fn test_status_transition_guard_via_engine() {
    let h = harness();
    let dish = h.store.seed_dish(None, "Flan", 300);
    h.cart
        .add_items("user-1", &[add_dish(dish.id, None)])
        .await
        .unwrap();
    let order = h.orders.checkout(&purchaser("user-1")).await.unwrap();

    let confirmed = h
        .orders
        .update_status(order.id, OrderStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    let err = h
        .orders
        .update_status(order.id, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_orders_are_scoped_to_their_owner() {
    let h = harness();
    let dish = h.store.seed_dish(None, "Flan", 300);
    h.cart
        .add_items("user-1", &[add_dish(dish.id, None)])
        .await
        .unwrap();
    let order = h.orders.checkout(&purchaser("user-1")).await.unwrap();

    let err = h
        .orders
        .get_order("user-2", order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    assert_eq!(h.orders.list_orders("user-1").await.unwrap().len(), 1);
    assert!(h.orders.list_orders("user-2").await.unwrap().is_empty());
}
