//! Shared application state handed to every handler.

use vendra_db::{Database, InventoryService, OrderService, PaymentService, ReturnService};

/// Shared application state.
///
/// `Database` is a cheap clone around an `SqlitePool`; services are built
/// once here rather than per request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub returns: ReturnService,
    pub inventory: InventoryService,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            orders: OrderService::new(db.clone()),
            payments: PaymentService::new(db.clone()),
            returns: ReturnService::new(db.clone()),
            inventory: InventoryService::new(db.clone()),
            db,
        }
    }
}
