//! Storage - Shared Element Buffers for Tensors
//!
//! Provides the memory storage that underlies every tensor. Storage is
//! reference-counted so that views share a buffer with the tensor they were
//! taken from, and guarded by a read/write lock so that writes through one
//! view are visible through every other.
//!
//! # Example
//! ```rust
//! use tensorex_core::Storage;
//!
//! let storage = Storage::<f32>::zeros(100);
//! assert_eq!(storage.len(), 100);
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use core::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::dtype::Scalar;

// =============================================================================
// Storage Struct
// =============================================================================

/// Reference-counted element buffer.
///
/// Cloning a `Storage` shares the buffer. The length is fixed at creation.
#[derive(Debug)]
pub struct Storage<T: Scalar> {
    inner: Arc<RwLock<Vec<T>>>,
    len: usize,
}

impl<T: Scalar> Storage<T> {
    /// Creates new storage of `len` default-initialized elements.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self::from_vec(vec![T::default(); len])
    }

    /// Creates storage filled with a value.
    #[must_use]
    pub fn full(len: usize, value: T) -> Self {
        Self::from_vec(vec![value; len])
    }

    /// Creates storage from an existing vector.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        let len = data.len();
        Self {
            inner: Arc::new(RwLock::new(data)),
            len,
        }
    }

    /// Creates storage from a slice by copying the data.
    #[must_use]
    pub fn from_slice(data: &[T]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Returns the number of elements in this storage.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the storage is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if both storages refer to the same buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns a read guard over the elements.
    ///
    /// The lock is not reentrant: do not take a write guard on the same
    /// storage while this guard is alive.
    #[must_use]
    pub fn as_slice(&self) -> StorageReadGuard<'_, T> {
        StorageReadGuard {
            guard: self.inner.read(),
        }
    }

    /// Returns a write guard over the elements.
    #[must_use]
    pub fn as_slice_mut(&self) -> StorageWriteGuard<'_, T> {
        StorageWriteGuard {
            guard: self.inner.write(),
        }
    }
}

impl<T: Scalar> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            len: self.len,
        }
    }
}

// =============================================================================
// Guard Types for Safe Access
// =============================================================================

/// Read guard for storage data.
pub struct StorageReadGuard<'a, T: Scalar> {
    guard: parking_lot::RwLockReadGuard<'a, Vec<T>>,
}

impl<T: Scalar> Deref for StorageReadGuard<'_, T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Write guard for storage data.
pub struct StorageWriteGuard<'a, T: Scalar> {
    guard: parking_lot::RwLockWriteGuard<'a, Vec<T>>,
}

impl<T: Scalar> Deref for StorageWriteGuard<'_, T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<T: Scalar> DerefMut for StorageWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

// =============================================================================
// Tests
// =============================================================================
