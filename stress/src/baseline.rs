use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

use dashmap::DashSet;

/// Reference implementations the oracle is compared against.
pub(crate) enum Baseline {
    /// One global lock around a `HashSet`.
    Mutex(Mutex<HashSet<u64>>),
    /// `DashSet` with its default sharding.
    DashSet(DashSet<u64>),
}

impl Baseline {
    pub(crate) fn mutex() -> Self {
        Self::Mutex(Mutex::new(HashSet::new()))
    }

    pub(crate) fn dash_set() -> Self {
        Self::DashSet(DashSet::new())
    }

    pub(crate) fn mark(&self, id: u64) -> bool {
        match self {
            Self::Mutex(set) => set
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id),
            Self::DashSet(set) => set.insert(id),
        }
    }
}
