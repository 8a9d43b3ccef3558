// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared repository handle.
//!
//! The engine itself is single-threaded: structural edits to a model must be
//! serialized by whoever owns it. `SharedRepository` is that serialization
//! point for callers spread over several threads: readers take the read lock,
//! anything that may materialize or propagate takes the write lock.

use crate::classify::Classifier;
use crate::error::Result;
use crate::repository::Repository;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Clonable, lock-protected handle to a [`Repository`].
pub struct SharedRepository<C: Classifier> {
    inner: Arc<RwLock<Repository<C>>>,
}

impl<C: Classifier> Clone for SharedRepository<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Classifier> SharedRepository<C> {
    pub fn new(repository: Repository<C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(repository)),
        }
    }

    /// Shared access for lookups that do not materialize elements.
    pub fn read(&self) -> RwLockReadGuard<'_, Repository<C>> {
        self.inner.read()
    }

    /// Exclusive access for definition edits, instance creation and element access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Repository<C>> {
        self.inner.write()
    }

    /// Run `edit` under the write lock.
    pub fn edit<T>(&self, edit: impl FnOnce(&mut Repository<C>) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.write();
        edit(&mut guard)
    }
}
