//! Shared, fixed-length numeric buffers.
//!
//! A [`SharedArray`] is a handle onto a lock-protected buffer. Cloning the
//! handle aliases the storage: writes through one handle are visible through
//! every other clone. This is how profiles and mixing ratios are shared between
//! caller-owned data and the objects that hold them.
//!
//! The length of the buffer is fixed when it is created. Guards hand out
//! slices, never the owning container, so contents can change but the element
//! count cannot.
//!
//! ```rust
//! use rtbx_core::buffer::SharedArray;
//!
//! let a = SharedArray::from_vec(vec![0.2095, 0.2095, 0.2095]);
//! let b = a.clone();
//! b.write()[1] = 0.15;
//! assert_eq!(a.read()[1], 0.15);
//! assert!(a.ptr_eq(&b));
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ndarray::{Array1, ArrayView1, ArrayViewMut1};

use crate::errors::{RTBXError, RTBXResult};

/// Reference-counted handle onto a fixed-length buffer.
pub struct SharedArray<T> {
    data: Arc<RwLock<Box<[T]>>>,
    len: usize,
}

impl<T> Clone for SharedArray<T> {
    /// Clone the handle. Both handles refer to the same storage.
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            len: self.len,
        }
    }
}

impl<T: Copy + Default> SharedArray<T> {
    /// Allocate a zero-filled (default-filled) buffer of `len` elements.
    pub fn zeros(len: usize) -> Self {
        Self::from_vec(vec![T::default(); len])
    }
}

impl<T: Copy> SharedArray<T> {
    /// Take ownership of `values` as the storage of a new buffer.
    pub fn from_vec(values: Vec<T>) -> Self {
        let len = values.len();
        Self {
            data: Arc::new(RwLock::new(values.into_boxed_slice())),
            len,
        }
    }

    /// Copy the contents of a slice into a new buffer.
    pub fn from_slice(values: &[T]) -> Self {
        Self::from_vec(values.to_vec())
    }

    /// Number of elements. Never changes over the buffer's lifetime.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Acquire shared read access.
    pub fn read(&self) -> SharedArrayReadGuard<'_, T> {
        SharedArrayReadGuard(self.data.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Acquire exclusive write access.
    ///
    /// Writers are serialized by the lock; holding a read guard on the same
    /// buffer in the same thread while calling this deadlocks.
    pub fn write(&self) -> SharedArrayWriteGuard<'_, T> {
        SharedArrayWriteGuard(self.data.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy the current contents out.
    pub fn to_vec(&self) -> Vec<T> {
        self.read().to_vec()
    }

    /// Copy the current contents into an owned ndarray.
    pub fn to_array(&self) -> Array1<T> {
        Array1::from(self.to_vec())
    }

    /// Overwrite every element with `values`.
    ///
    /// Fails without touching the buffer when the lengths differ.
    pub fn assign(&self, values: &[T]) -> RTBXResult<()> {
        if values.len() != self.len {
            return Err(RTBXError::shape_mismatch(
                "shared array",
                self.len,
                values.len(),
            ));
        }
        self.write().copy_from_slice(values);
        Ok(())
    }

    /// Allocate independent storage holding a copy of the current contents.
    pub fn deep_clone(&self) -> Self {
        Self::from_vec(self.to_vec())
    }

    /// True if both handles refer to the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl<T: Copy> From<Vec<T>> for SharedArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: Copy> From<Array1<T>> for SharedArray<T> {
    fn from(values: Array1<T>) -> Self {
        Self::from_vec(values.to_vec())
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for SharedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.read();
        f.debug_struct("SharedArray")
            .field("len", &self.len)
            .field("data", &&*data)
            .finish()
    }
}

/// Read guard returned by [`SharedArray::read`].
pub struct SharedArrayReadGuard<'a, T>(RwLockReadGuard<'a, Box<[T]>>);

impl<T> SharedArrayReadGuard<'_, T> {
    /// View the contents as an ndarray.
    pub fn view(&self) -> ArrayView1<'_, T> {
        ArrayView1::from(&**self.0)
    }
}

impl<T> Deref for SharedArrayReadGuard<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

/// Write guard returned by [`SharedArray::write`].
pub struct SharedArrayWriteGuard<'a, T>(RwLockWriteGuard<'a, Box<[T]>>);

impl<T> SharedArrayWriteGuard<'_, T> {
    /// Mutable ndarray view of the contents.
    pub fn view_mut(&mut self) -> ArrayViewMut1<'_, T> {
        ArrayViewMut1::from(&mut **self.0)
    }
}

impl<T> Deref for SharedArrayWriteGuard<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> DerefMut for SharedArrayWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.0
    }
}
