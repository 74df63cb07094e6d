//! Applies ledger intents and keeps the four record types consistent with each other.
//!
//! Every intent works on draft copies of the affected records and touches the
//! in-memory mirror only after the store has acknowledged every write. When a later
//! write of a multi-step intent fails, the writes that already landed are undone with
//! compensating calls and the mirror is left exactly as it was.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    alerts::{AlertCache, AlertPolicy, LedgerAlerts},
    core::time::Clock,
    errors::{LedgerResult, ValidationError},
    ledger::{
        common::closest_name,
        snapshot::{find, remove, replace},
        CostEntry, DebtRecord, ExpenseRecord, LedgerSnapshot, Mirrored, SaleRecord, StockItem,
    },
    storage::{LedgerStore, OwnerId, RecordStore, StoreResult},
};

/// Maximum edit distance for an unknown stock name to still get a suggestion.
const SUGGESTION_DISTANCE: usize = 3;

/// What a recorded sale changed besides the sale itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleOutcome {
    pub sale_id: Uuid,
    pub stock_id: Uuid,
    pub remaining_quantity: i64,
    pub debt_id: Option<Uuid>,
}

/// Facade that owns the ledger mirror for one owner and routes every mutation through
/// the store.
pub struct LedgerCoordinator {
    store: Arc<dyn LedgerStore>,
    owner: OwnerId,
    clock: Arc<dyn Clock>,
    policy: AlertPolicy,
    snapshot: LedgerSnapshot,
    alert_cache: AlertCache,
}

impl LedgerCoordinator {
    /// Creates a coordinator with an empty mirror. Call [`reload`](Self::reload) to
    /// populate it from the store.
    pub fn new(store: Arc<dyn LedgerStore>, owner: OwnerId, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            owner,
            clock,
            policy: AlertPolicy::default(),
            snapshot: LedgerSnapshot::default(),
            alert_cache: AlertCache::new(),
        }
    }

    /// Creates a coordinator and loads the owner's records.
    pub fn open(
        store: Arc<dyn LedgerStore>,
        owner: OwnerId,
        clock: Arc<dyn Clock>,
    ) -> LedgerResult<Self> {
        let mut coordinator = Self::new(store, owner, clock);
        coordinator.reload()?;
        Ok(coordinator)
    }

    pub fn with_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    /// Current alerts, recomputed only when the mirror or the minute has changed.
    pub fn alerts(&mut self) -> &LedgerAlerts {
        let now = self.clock.now();
        self.alert_cache.get(&self.snapshot, now, &self.policy)
    }

    /// Replaces the mirror with what the store currently holds.
    ///
    /// The mirror is untouched if any list call fails.
    pub fn reload(&mut self) -> LedgerResult<()> {
        let store = self.store.as_ref();
        let sales = RecordStore::<SaleRecord>::list(store, &self.owner)?;
        let stock = RecordStore::<StockItem>::list(store, &self.owner)?;
        let debts = RecordStore::<DebtRecord>::list(store, &self.owner)?;
        let expenses = RecordStore::<ExpenseRecord>::list(store, &self.owner)?;

        let revision = self.snapshot.revision() + 1;
        self.snapshot = LedgerSnapshot::new(sales, stock, debts, expenses);
        self.snapshot.set_revision(revision);
        info!(
            owner = %self.owner,
            sales = self.snapshot.sales.len(),
            stock = self.snapshot.stock.len(),
            debts = self.snapshot.debts.len(),
            expenses = self.snapshot.expenses.len(),
            "ledger reloaded"
        );
        Ok(())
    }

    /// Records a sale, depletes the matching stock item, and opens a debt for credit sales.
    ///
    /// Stock is matched by case-insensitive name. An unknown name is rejected before any
    /// store call.
    pub fn record_sale(&mut self, sale: SaleRecord) -> LedgerResult<SaleOutcome> {
        if sale.quantity <= 0 {
            return Err(ValidationError::InvalidQuantity(sale.quantity).into());
        }
        let (stock_idx, matches) = self
            .snapshot
            .stock_position(&sale.item_name)
            .ok_or_else(|| self.unknown_item(&sale.item_name))?;
        if matches > 1 {
            warn!(
                owner = %self.owner,
                item = %sale.item_name,
                matches,
                "stock name is ambiguous, depleting the first match"
            );
        }

        let now = self.clock.now();
        let original_stock = self.snapshot.stock[stock_idx].clone();
        let mut stock_draft = original_stock.clone();
        if stock_draft.deplete(sale.quantity, now).is_none() {
            return Err(ValidationError::StockOverflow {
                name: stock_draft.name,
                quantity: sale.quantity,
            }
            .into());
        }
        let debt_draft = DebtRecord::from_credit_sale(&sale);

        let store = self.store.as_ref();
        RecordStore::<SaleRecord>::create(store, &self.owner, &sale)?;

        if let Err(err) = RecordStore::<StockItem>::update(store, &self.owner, &stock_draft) {
            self.compensate(
                "delete sale",
                RecordStore::<SaleRecord>::delete(store, &self.owner, sale.id),
            );
            return Err(err.into());
        }

        if let Some(debt) = debt_draft.as_ref() {
            if let Err(err) = RecordStore::<DebtRecord>::create(store, &self.owner, debt) {
                self.compensate(
                    "restore stock",
                    RecordStore::<StockItem>::update(store, &self.owner, &original_stock),
                );
                self.compensate(
                    "delete sale",
                    RecordStore::<SaleRecord>::delete(store, &self.owner, sale.id),
                );
                return Err(err.into());
            }
        }

        let outcome = SaleOutcome {
            sale_id: sale.id,
            stock_id: stock_draft.id,
            remaining_quantity: stock_draft.quantity,
            debt_id: debt_draft.as_ref().map(|debt| debt.id),
        };
        self.snapshot.sales.push(sale);
        self.snapshot.stock[stock_idx] = stock_draft;
        if let Some(debt) = debt_draft {
            self.snapshot.debts.push(debt);
        }
        self.snapshot.bump_revision();
        info!(
            owner = %self.owner,
            sale = %outcome.sale_id,
            remaining = outcome.remaining_quantity,
            credit = outcome.debt_id.is_some(),
            "sale recorded"
        );
        Ok(outcome)
    }

    /// Deletes a sale. Stock and any debt it opened are left as they are.
    pub fn delete_sale(&mut self, id: Uuid) -> LedgerResult<SaleRecord> {
        self.persist_remove::<SaleRecord>(id)
    }

    pub fn record_debt(&mut self, debt: DebtRecord) -> LedgerResult<Uuid> {
        self.persist_new(debt)
    }

    pub fn update_debt(&mut self, debt: DebtRecord) -> LedgerResult<()> {
        self.persist_replace(debt).map(|_| ())
    }

    /// Flips the paid flag and returns the new value.
    pub fn toggle_debt_paid(&mut self, id: Uuid) -> LedgerResult<bool> {
        let mut debt = self.existing::<DebtRecord>(id)?.clone();
        debt.is_paid = !debt.is_paid;
        let paid = debt.is_paid;
        self.persist_replace(debt)?;
        Ok(paid)
    }

    pub fn delete_debt(&mut self, id: Uuid) -> LedgerResult<DebtRecord> {
        self.persist_remove::<DebtRecord>(id)
    }

    /// Adds a stock item, seeding its cost history when the caller left it empty.
    pub fn record_stock_item(&mut self, mut item: StockItem) -> LedgerResult<Uuid> {
        if item.cost_history.is_empty() {
            item.cost_history.push(CostEntry {
                price: item.cost_price,
                date: item.last_updated,
            });
        }
        if let Some((_, existing)) = self.snapshot.stock_position(&item.name) {
            warn!(
                owner = %self.owner,
                item = %item.name,
                existing,
                "stock name already in use"
            );
        }
        self.persist_new(item)
    }

    /// Saves an edited stock item, appending to its cost history when the cost changed.
    ///
    /// The stored history is authoritative; any history carried by `item` is ignored.
    pub fn update_stock_item(&mut self, mut item: StockItem) -> LedgerResult<StockItem> {
        let stored = self.existing::<StockItem>(item.id)?;
        let previous_cost = stored.cost_price;
        item.cost_history = stored.cost_history.clone();
        let now = self.clock.now();
        item.record_cost_change(previous_cost, now);
        item.last_updated = now;
        self.persist_replace(item.clone())?;
        Ok(item)
    }

    pub fn delete_stock_item(&mut self, id: Uuid) -> LedgerResult<StockItem> {
        self.persist_remove::<StockItem>(id)
    }

    pub fn record_expense(&mut self, expense: ExpenseRecord) -> LedgerResult<Uuid> {
        self.persist_new(expense)
    }

    pub fn update_expense(&mut self, expense: ExpenseRecord) -> LedgerResult<()> {
        self.persist_replace(expense).map(|_| ())
    }

    pub fn delete_expense(&mut self, id: Uuid) -> LedgerResult<ExpenseRecord> {
        self.persist_remove::<ExpenseRecord>(id)
    }

    fn existing<T: Mirrored>(&self, id: Uuid) -> LedgerResult<&T> {
        find(T::mirror(&self.snapshot), id).ok_or_else(|| {
            ValidationError::NotFound {
                kind: T::KIND,
                id,
            }
            .into()
        })
    }

    fn persist_new<T>(&mut self, record: T) -> LedgerResult<Uuid>
    where
        T: Mirrored,
        dyn LedgerStore: RecordStore<T>,
    {
        RecordStore::<T>::create(self.store.as_ref(), &self.owner, &record)?;
        let id = record.id();
        T::mirror_mut(&mut self.snapshot).push(record);
        self.snapshot.bump_revision();
        info!(owner = %self.owner, kind = T::KIND, %id, "record created");
        Ok(id)
    }

    /// Writes `record` over the stored copy and returns the previous version.
    fn persist_replace<T>(&mut self, record: T) -> LedgerResult<T>
    where
        T: Mirrored,
        dyn LedgerStore: RecordStore<T>,
    {
        let previous = self.existing::<T>(record.id())?.clone();
        RecordStore::<T>::update(self.store.as_ref(), &self.owner, &record)?;
        let id = record.id();
        replace(T::mirror_mut(&mut self.snapshot), record);
        self.snapshot.bump_revision();
        info!(owner = %self.owner, kind = T::KIND, %id, "record updated");
        Ok(previous)
    }

    fn persist_remove<T>(&mut self, id: Uuid) -> LedgerResult<T>
    where
        T: Mirrored,
        dyn LedgerStore: RecordStore<T>,
    {
        self.existing::<T>(id)?;
        RecordStore::<T>::delete(self.store.as_ref(), &self.owner, id)?;
        let removed = remove(T::mirror_mut(&mut self.snapshot), id).ok_or(
            ValidationError::NotFound {
                kind: T::KIND,
                id,
            },
        )?;
        self.snapshot.bump_revision();
        info!(owner = %self.owner, kind = T::KIND, %id, "record deleted");
        Ok(removed)
    }

    fn compensate(&self, step: &str, result: StoreResult<()>) {
        if let Err(err) = result {
            warn!(
                owner = %self.owner,
                step,
                error = %err,
                "compensation failed, store may disagree with the ledger until reload"
            );
        }
    }

    fn unknown_item(&self, name: &str) -> ValidationError {
        ValidationError::UnknownStockItem {
            name: name.to_string(),
            suggestion: closest_name(&self.snapshot.stock, name, SUGGESTION_DISTANCE),
        }
    }
}
