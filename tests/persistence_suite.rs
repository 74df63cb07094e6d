mod common;

use std::sync::Arc;

use chrono::Duration;
use common::{reference_now, temp_base};
use shop_ledger::{
    config::{ConfigManager, EngineConfig},
    core::{FixedClock, LedgerCoordinator},
    ledger::{ExpenseRecord, Frequency, SaleRecord, StockItem},
    storage::{JsonStore, OwnerId},
};

fn open(store: Arc<JsonStore>, owner: &str) -> LedgerCoordinator {
    LedgerCoordinator::open(
        store,
        OwnerId::new(owner),
        Arc::new(FixedClock::new(reference_now())),
    )
    .expect("open coordinator")
}

#[test]
fn committed_intents_survive_a_reopen() {
    let base = temp_base();
    let store = Arc::new(JsonStore::new(Some(base.join("records"))).unwrap());

    let mut coordinator = open(store.clone(), "corner-shop");
    coordinator
        .record_stock_item(StockItem::new("Widget", 10, 2.0, 5.0, reference_now()))
        .unwrap();
    coordinator
        .record_sale(
            SaleRecord::new("widget", 2, 5.0, reference_now()).on_credit(
                10.0,
                "Jane",
                Some("555-0100".into()),
            ),
        )
        .unwrap();
    coordinator
        .record_expense(
            ExpenseRecord::new("Rent", 300.0, reference_now() - Duration::days(29))
                .recurring(Frequency::Monthly),
        )
        .unwrap();

    let mut reopened = open(store.clone(), "corner-shop");
    let snapshot = reopened.snapshot().clone();
    assert_eq!(snapshot.stock[0].quantity, 8);
    assert_eq!(snapshot.sales.len(), 1);
    assert_eq!(snapshot.debts.len(), 1);
    assert_eq!(snapshot.debts[0].phone, "555-0100");
    assert_eq!(snapshot.expenses[0].frequency, Frequency::Monthly);
    assert_eq!(reopened.alerts().unpaid_debts.len(), 1);

    assert!(store
        .file_for(&OwnerId::new("corner-shop"), "sale")
        .exists());
}

#[test]
fn owners_do_not_see_each_other() {
    let base = temp_base();
    let store = Arc::new(JsonStore::new(Some(base.join("records"))).unwrap());

    let mut first = open(store.clone(), "north");
    first
        .record_stock_item(StockItem::new("Widget", 3, 2.0, 5.0, reference_now()))
        .unwrap();

    let second = open(store, "south");
    assert!(second.snapshot().stock.is_empty());
}

#[test]
fn config_points_the_store_at_its_records_dir() {
    let base = temp_base();
    let manager = ConfigManager::with_base_dir(base.clone()).unwrap();
    let config = EngineConfig {
        owner: OwnerId::new("kiosk"),
        ..EngineConfig::default()
    };
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    let store = Arc::new(JsonStore::new(Some(manager.records_dir(&loaded))).unwrap());
    assert_eq!(store.root(), base.join("records").as_path());

    let mut coordinator = LedgerCoordinator::open(
        store,
        loaded.owner.clone(),
        Arc::new(FixedClock::new(reference_now())),
    )
    .unwrap()
    .with_policy(loaded.alert_policy());
    coordinator
        .record_stock_item(StockItem::new("Widget", 5, 2.0, 5.0, reference_now()))
        .unwrap();
    assert_eq!(coordinator.alerts().low_stock.len(), 1);
}
