//! Dual-list selector.
//!
//! Each section keeps its acceptable rooms and timeslots as a pair of pools:
//! `acceptable` holds what the section accepts, `available` holds the rest of
//! the items in the currently shown scope (a building, a timeslot category, a
//! course prefix). Items move between the two with [`DualListSelector::transfer`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{WorkbenchError, WorkbenchResult};
use crate::models::{
    category_day_pattern, compare_course_ids, compare_timeslot_ids, CourseName, OrderingRules,
    RoomName, TimeslotName, OFF_MATRIX_CATEGORY,
};

/// An item that can live in a selector pool.
pub trait PoolItem: Clone + PartialEq + fmt::Debug + fmt::Display {
    /// Key compared against the active scope.
    fn scope_key(&self) -> &str;

    /// Key that items of `scope` carry. `None` means the scope cannot be
    /// recognised from the item alone and membership comes from the universe.
    fn key_for_scope(scope: &str) -> Option<&str>;

    fn compare(&self, other: &Self, rules: &OrderingRules) -> Ordering;
}

impl PoolItem for RoomName {
    fn scope_key(&self) -> &str {
        self.building()
    }

    fn key_for_scope(scope: &str) -> Option<&str> {
        Some(scope)
    }

    fn compare(&self, other: &Self, _rules: &OrderingRules) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PoolItem for TimeslotName {
    fn scope_key(&self) -> &str {
        self.leading_token()
    }

    fn key_for_scope(scope: &str) -> Option<&str> {
        if scope == OFF_MATRIX_CATEGORY {
            None
        } else {
            Some(category_day_pattern(scope))
        }
    }

    fn compare(&self, other: &Self, rules: &OrderingRules) -> Ordering {
        compare_timeslot_ids(self.as_str(), other.as_str(), rules.timeslot_ordering)
    }
}

impl PoolItem for CourseName {
    fn scope_key(&self) -> &str {
        self.prefix()
    }

    fn key_for_scope(scope: &str) -> Option<&str> {
        Some(scope)
    }

    fn compare(&self, other: &Self, _rules: &OrderingRules) -> Ordering {
        match (self.parse(), other.parse()) {
            (Ok((a, _, _)), Ok((b, _, _))) => {
                compare_course_ids(&a, &b).then_with(|| self.as_str().cmp(other.as_str()))
            }
            _ => self.as_str().cmp(other.as_str()),
        }
    }
}

/// One side of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pool {
    Acceptable,
    Available,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::Acceptable => f.write_str("acceptable"),
            Pool::Available => f.write_str("available"),
        }
    }
}

/// What a transfer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Moved,
    /// The item already was where it was asked to go.
    Unchanged,
    /// Demoted out of scope: removed from both pools.
    Dropped,
}

impl TransferOutcome {
    /// Whether the acceptable pool changed.
    pub fn changed(self) -> bool {
        !matches!(self, TransferOutcome::Unchanged)
    }
}

#[derive(Debug, Clone)]
pub struct DualListSelector<T: PoolItem> {
    acceptable: Vec<T>,
    available: Vec<T>,
    scope: Option<String>,
    scoped: Vec<T>,
    rules: OrderingRules,
}

impl<T: PoolItem> DualListSelector<T> {
    pub fn new(rules: OrderingRules) -> Self {
        Self {
            acceptable: Vec::new(),
            available: Vec::new(),
            scope: None,
            scoped: Vec::new(),
            rules,
        }
    }

    pub fn acceptable(&self) -> &[T] {
        &self.acceptable
    }

    pub fn available(&self) -> &[T] {
        &self.available
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn is_acceptable(&self, item: &T) -> bool {
        self.acceptable.contains(item)
    }

    /// Show the items of `universe` that belong to `scope`.
    pub fn set_scope(&mut self, scope: impl Into<String>, universe: impl IntoIterator<Item = T>) {
        let scope = scope.into();
        let key = T::key_for_scope(&scope).map(str::to_string);

        let mut scoped: Vec<T> = Vec::new();
        for item in universe {
            let in_scope = key.as_deref().map_or(true, |k| item.scope_key() == k);
            if in_scope && !scoped.contains(&item) {
                scoped.push(item);
            }
        }
        let rules = self.rules;
        scoped.sort_by(|a, b| a.compare(b, &rules));

        self.available = scoped
            .iter()
            .filter(|item| !self.acceptable.contains(item))
            .cloned()
            .collect();
        self.scoped = scoped;
        self.scope = Some(scope);
    }

    /// Replace the acceptable pool with the store's copy and recompute the
    /// available pool from the active scope.
    pub fn load_acceptable(&mut self, items: impl IntoIterator<Item = T>) {
        self.acceptable.clear();
        for item in items {
            if !self.acceptable.contains(&item) {
                self.acceptable.push(item);
            }
        }
        self.available = self
            .scoped
            .iter()
            .filter(|item| !self.acceptable.contains(item))
            .cloned()
            .collect();
    }

    /// Move `item` from one pool to the other.
    pub fn transfer(&mut self, from: Pool, to: Pool, item: &T) -> WorkbenchResult<TransferOutcome> {
        match (from, to) {
            (Pool::Available, Pool::Acceptable) => {
                if self.is_acceptable(item) {
                    return Ok(TransferOutcome::Unchanged);
                }
                let at = self.position(Pool::Available, item)?;
                let item = self.available.remove(at);
                self.acceptable.push(item);
                Ok(TransferOutcome::Moved)
            }
            (Pool::Acceptable, Pool::Available) => {
                let at = self.position(Pool::Acceptable, item)?;
                let item = self.acceptable.remove(at);
                if self.in_active_scope(&item) {
                    let rules = self.rules;
                    let at = self
                        .available
                        .partition_point(|x| x.compare(&item, &rules) != Ordering::Greater);
                    self.available.insert(at, item);
                    Ok(TransferOutcome::Moved)
                } else {
                    Ok(TransferOutcome::Dropped)
                }
            }
            (from, to) => Err(WorkbenchError::invalid(format!(
                "Cannot move '{}' from {} to {}",
                item, from, to
            ))),
        }
    }

    pub fn promote(&mut self, item: &T) -> WorkbenchResult<TransferOutcome> {
        self.transfer(Pool::Available, Pool::Acceptable, item)
    }

    pub fn demote(&mut self, item: &T) -> WorkbenchResult<TransferOutcome> {
        self.transfer(Pool::Acceptable, Pool::Available, item)
    }

    /// Accept an item that never appeared in the available pool.
    ///
    /// Returns false when it already was acceptable.
    pub fn add_custom(&mut self, item: T) -> bool {
        if self.is_acceptable(&item) {
            return false;
        }
        self.available.retain(|x| x != &item);
        self.acceptable.push(item);
        true
    }

    fn position(&self, pool: Pool, item: &T) -> WorkbenchResult<usize> {
        let items = match pool {
            Pool::Acceptable => &self.acceptable,
            Pool::Available => &self.available,
        };
        items
            .iter()
            .position(|x| x == item)
            .ok_or_else(|| WorkbenchError::invalid(format!("'{}' is not in the {} pool", item, pool)))
    }

    fn in_active_scope(&self, item: &T) -> bool {
        let Some(scope) = self.scope.as_deref() else {
            return false;
        };
        match T::key_for_scope(scope) {
            Some(key) => item.scope_key() == key,
            None => self.scoped.contains(item),
        }
    }
}
