//! End-to-end business flow tests against an in-memory SQLite database:
//! order creation, payment lifecycle, returns, and the interactions
//! between them.

use vendra_core::{CoreError, OrderStatus, OrderType, PaymentMethod, PaymentStatus};
use vendra_db::service::order::{NewOrder, NewOrderLine};
use vendra_db::service::payment::NewPayment;
use vendra_db::service::returns::NewReturn;
use vendra_db::{
    Database, DbConfig, InventoryService, OpsError, OrderService, PaymentService, ReturnService,
};

const ACTOR: &str = "user-flows";

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

async fn seed_product(db: &Database, name: &str, stock: i64) -> String {
    let product = vendra_db::repository::product::new_product(name, None, 6_000, 10_000, 2);
    db.products().insert(&product, stock).await.unwrap();
    product.id
}

fn sale(product_id: &str, qty: i64) -> NewOrder {
    NewOrder {
        order_type: OrderType::Sale,
        customer_id: None,
        customer_name: Some("Ayesha Khan".to_string()),
        customer_phone: Some("0301-5550001".to_string()),
        supplier_id: None,
        lines: vec![NewOrderLine {
            product_id: product_id.to_string(),
            quantity: qty,
            unit_price_cents: 10_000,
        }],
    }
}

fn cash(order_id: &str, amount_cents: i64) -> NewPayment {
    NewPayment {
        order_id: order_id.to_string(),
        amount_cents,
        method: PaymentMethod::Cash,
        channel: None,
        txn_ref: None,
    }
}

#[tokio::test]
async fn sale_order_moves_stock_and_computes_total() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Karak Chai", 10).await;

    let created = OrderService::new(db.clone())
        .create_order(sale(&product_id, 3), ACTOR)
        .await
        .unwrap();

    assert_eq!(created.order.total_cents, 30_000);
    assert_eq!(created.order.status, OrderStatus::Pending);
    assert_eq!(created.order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].line_total_cents, 30_000);

    let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
    assert_eq!(level.quantity, 7);

    // The customer was created from name+phone and reused on lookup
    let customer = db
        .customers()
        .find_by_phone("0301-5550001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.order.customer_id.as_deref(), Some(customer.id.as_str()));
}

#[tokio::test]
async fn payment_lifecycle_partial_to_paid_then_overpay_rejected() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Basmati 5kg", 10).await;
    let order_id = OrderService::new(db.clone())
        .create_order(sale(&product_id, 3), ACTOR)
        .await
        .unwrap()
        .order
        .id;

    let payments = PaymentService::new(db.clone());

    let (_, status) = payments.record_payment(cash(&order_id, 10_000), ACTOR).await.unwrap();
    assert_eq!(status, PaymentStatus::Partial);

    let (_, status) = payments.record_payment(cash(&order_id, 20_000), ACTOR).await.unwrap();
    assert_eq!(status, PaymentStatus::Paid);

    // A third payment must be rejected with a zero remaining balance
    let err = payments
        .record_payment(cash(&order_id, 5_000), ACTOR)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OpsError::Core(CoreError::PaymentExceedsBalance {
            remaining_cents: 0,
            ..
        })
    ));

    assert_eq!(db.orders().total_paid(&order_id).await.unwrap(), 30_000);
    assert_eq!(payments.list_for_order(&order_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn sale_return_restores_stock_after_payment() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Lipton Yellow", 10).await;
    let order_id = OrderService::new(db.clone())
        .create_order(sale(&product_id, 3), ACTOR)
        .await
        .unwrap()
        .order
        .id;

    PaymentService::new(db.clone())
        .record_payment(cash(&order_id, 30_000), ACTOR)
        .await
        .unwrap();

    let processed = ReturnService::new(db.clone())
        .create_return(
            NewReturn {
                order_id: order_id.clone(),
                reason: "customer changed mind".to_string(),
                amount_cents: None,
                return_type: None,
            },
            ACTOR,
        )
        .await
        .unwrap();

    assert_eq!(processed.order.status, OrderStatus::Returned);
    assert_eq!(processed.return_record.amount_cents, 30_000);

    let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
    assert_eq!(level.quantity, 10);

    let returns = db.orders().get_returns(&order_id).await.unwrap();
    assert_eq!(returns.len(), 1);
}

#[tokio::test]
async fn purchase_raises_stock_and_needs_no_customer() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Sugar 1kg", 10).await;

    let created = OrderService::new(db.clone())
        .create_order(
            NewOrder {
                order_type: OrderType::Purchase,
                customer_id: None,
                customer_name: None,
                customer_phone: None,
                supplier_id: None,
                lines: vec![NewOrderLine {
                    product_id: product_id.clone(),
                    quantity: 5,
                    unit_price_cents: 6_000,
                }],
            },
            ACTOR,
        )
        .await
        .unwrap();

    assert_eq!(created.order.total_cents, 30_000);
    assert!(created.order.customer_id.is_none());

    let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
    assert_eq!(level.quantity, 15);
}

#[tokio::test]
async fn oversell_rolls_back_the_whole_order() {
    let db = test_db().await;
    let in_stock = seed_product(&db, "Colgate 100g", 10).await;
    let scarce = seed_product(&db, "Dettol 500ml", 1).await;

    // Second line fails; the first line's decrement must not survive
    let err = OrderService::new(db.clone())
        .create_order(
            NewOrder {
                order_type: OrderType::Sale,
                customer_id: None,
                customer_name: Some("Bilal".to_string()),
                customer_phone: Some("0302-5550002".to_string()),
                supplier_id: None,
                lines: vec![
                    NewOrderLine {
                        product_id: in_stock.clone(),
                        quantity: 4,
                        unit_price_cents: 10_000,
                    },
                    NewOrderLine {
                        product_id: scarce.clone(),
                        quantity: 2,
                        unit_price_cents: 10_000,
                    },
                ],
            },
            ACTOR,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OpsError::Core(CoreError::InsufficientStock {
            available: 1,
            requested: 2,
            ..
        })
    ));

    let level = db.products().stock_level(&in_stock).await.unwrap().unwrap();
    assert_eq!(level.quantity, 10);
    let level = db.products().stock_level(&scarce).await.unwrap().unwrap();
    assert_eq!(level.quantity, 1);
    assert!(db.orders().list(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn manual_adjustment_and_orders_share_one_stock_ledger() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Atta 10kg", 4).await;

    // Stocktake finds more on the shelf than the ledger says
    InventoryService::new(db.clone())
        .adjust_stock(
            &product_id,
            vendra_db::service::inventory::StockAdjustment::Set(6),
            "stocktake",
            ACTOR,
        )
        .await
        .unwrap();

    OrderService::new(db.clone())
        .create_order(sale(&product_id, 6), ACTOR)
        .await
        .unwrap();

    let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
    assert_eq!(level.quantity, 0);

    // Sold out: the next sale must fail
    let err = OrderService::new(db.clone())
        .create_order(sale(&product_id, 1), ACTOR)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OpsError::Core(CoreError::InsufficientStock { available: 0, .. })
    ));
}

#[tokio::test]
async fn audit_trail_records_each_flow() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Rooh Afza", 10).await;

    let order_id = OrderService::new(db.clone())
        .create_order(sale(&product_id, 2), ACTOR)
        .await
        .unwrap()
        .order
        .id;
    PaymentService::new(db.clone())
        .record_payment(cash(&order_id, 20_000), ACTOR)
        .await
        .unwrap();
    ReturnService::new(db.clone())
        .create_return(
            NewReturn {
                order_id,
                reason: "broken seal".to_string(),
                amount_cents: None,
                return_type: None,
            },
            ACTOR,
        )
        .await
        .unwrap();

    let entries = db.audit().list(50).await.unwrap();
    let categories: Vec<&str> = entries.iter().map(|e| e.category.as_str()).collect();
    assert!(categories.contains(&"orders"));
    assert!(categories.contains(&"payments"));
    assert!(categories.contains(&"returns"));
    assert!(entries.iter().all(|e| e.actor_id == ACTOR));
}
