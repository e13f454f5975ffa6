// File: src/accounts.rs

use std::sync::Arc;

use vkmass_common::models::Account;

/// In-memory account list.
///
/// Records are shared as `Arc<Account>` and never mutated in place: an update
/// clones the record, applies the change and swaps the new `Arc` in, so any
/// snapshot handed out earlier keeps showing the old state.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<Arc<Account>>,
}

impl AccountRegistry {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: accounts.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Account>> {
        self.accounts.iter().find(|a| a.id == id).cloned()
    }

    /// Cheap copy of the current list, in seed order.
    pub fn snapshot(&self) -> Vec<Arc<Account>> {
        self.accounts.clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Account>> {
        self.accounts.iter()
    }

    /// Replaces the record for `id` with a modified copy. Returns the new record.
    pub fn update<F>(&mut self, id: &str, f: F) -> Option<Arc<Account>>
    where
        F: FnOnce(&mut Account),
    {
        let slot = self.accounts.iter_mut().find(|a| a.id == id)?;
        let mut next = (**slot).clone();
        f(&mut next);
        *slot = Arc::new(next);
        Some(slot.clone())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
