use uuid::Uuid;

use super::{
    common::{positions_named, Record},
    debt::DebtRecord,
    expense::ExpenseRecord,
    sale::SaleRecord,
    stock::StockItem,
};

/// In-memory mirror of everything the store holds for one owner.
///
/// `revision` increases by one for every committed mutation so consumers can tell
/// whether a derived view is stale without comparing contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    pub sales: Vec<SaleRecord>,
    pub stock: Vec<StockItem>,
    pub debts: Vec<DebtRecord>,
    pub expenses: Vec<ExpenseRecord>,
    revision: u64,
}

impl LedgerSnapshot {
    pub fn new(
        sales: Vec<SaleRecord>,
        stock: Vec<StockItem>,
        debts: Vec<DebtRecord>,
        expenses: Vec<ExpenseRecord>,
    ) -> Self {
        Self {
            sales,
            stock,
            debts,
            expenses,
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Index of the first stock item whose name matches case-insensitively, plus how many
    /// items share that name.
    pub fn stock_position(&self, name: &str) -> Option<(usize, usize)> {
        let matches = positions_named(&self.stock, name);
        matches.first().map(|first| (*first, matches.len()))
    }

    pub fn stock_by_name(&self, name: &str) -> Option<&StockItem> {
        self.stock_position(name).map(|(idx, _)| &self.stock[idx])
    }

    pub fn stock_item(&self, id: Uuid) -> Option<&StockItem> {
        find(&self.stock, id)
    }

    pub fn debt(&self, id: Uuid) -> Option<&DebtRecord> {
        find(&self.debts, id)
    }

    pub fn expense(&self, id: Uuid) -> Option<&ExpenseRecord> {
        find(&self.expenses, id)
    }

    pub fn sale(&self, id: Uuid) -> Option<&SaleRecord> {
        find(&self.sales, id)
    }

    /// Unpaid debts owed by `debtor`, matched case-insensitively.
    pub fn open_debts_of(&self, debtor: &str) -> Vec<&DebtRecord> {
        positions_named(&self.debts, debtor)
            .into_iter()
            .map(|idx| &self.debts[idx])
            .filter(|debt| !debt.is_paid)
            .collect()
    }
}

/// Record types that have a mirror list inside [`LedgerSnapshot`].
pub trait Mirrored: Record {
    fn mirror(snapshot: &LedgerSnapshot) -> &[Self];
    fn mirror_mut(snapshot: &mut LedgerSnapshot) -> &mut Vec<Self>;
}

macro_rules! mirrored {
    ($record:ty, $field:ident) => {
        impl Mirrored for $record {
            fn mirror(snapshot: &LedgerSnapshot) -> &[Self] {
                &snapshot.$field
            }

            fn mirror_mut(snapshot: &mut LedgerSnapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

mirrored!(SaleRecord, sales);
mirrored!(StockItem, stock);
mirrored!(DebtRecord, debts);
mirrored!(ExpenseRecord, expenses);

pub(crate) fn find<T: Record>(records: &[T], id: Uuid) -> Option<&T> {
    records.iter().find(|record| record.id() == id)
}

/// Replaces the record sharing `record`'s id, returning whether one was found.
pub(crate) fn replace<T: Record>(records: &mut [T], record: T) -> bool {
    match records.iter_mut().find(|existing| existing.id() == record.id()) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

/// Removes and returns the record with `id`.
pub(crate) fn remove<T: Record>(records: &mut Vec<T>, id: Uuid) -> Option<T> {
    let idx = records.iter().position(|record| record.id() == id)?;
    Some(records.remove(idx))
}
