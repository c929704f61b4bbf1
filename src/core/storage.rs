use crate::error::PhysicsError;
use crate::Result;
use std::collections::BTreeMap;

/// Trait implemented by the typed handle newtypes
pub trait Handle: Copy + Ord {
    /// Human-readable kind name used in error messages
    const KIND: &'static str;

    /// Creates a handle from its raw id
    fn from_raw(raw: u32) -> Self;

    /// Returns the raw id of the handle
    fn raw(&self) -> u32;
}

/// Handle-addressed storage for physics objects.
///
/// Ids are never reused, so a handle to a removed item stays dead for the
/// lifetime of the storage. Iteration is in ascending handle order, which
/// keeps stepping and pair generation deterministic.
pub struct HandleStorage<H: Handle, T> {
    items: BTreeMap<H, T>,
    next_id: u32,
}

impl<H: Handle, T> HandleStorage<H, T> {
    /// Creates a new empty storage
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1, // Start at 1, so 0 can represent an invalid handle
        }
    }

    /// Adds an item to the storage and returns its handle
    pub fn add(&mut self, item: T) -> H {
        let handle = H::from_raw(self.next_id);
        self.next_id += 1;
        self.items.insert(handle, item);
        handle
    }

    /// Gets a reference to an item by its handle
    pub fn get(&self, handle: H) -> Option<&T> {
        self.items.get(&handle)
    }

    /// Gets a mutable reference to an item by its handle
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.items.get_mut(&handle)
    }

    /// Gets an item by its handle, returning an error for a dead handle
    pub fn get_or_err(&self, handle: H) -> Result<&T> {
        self.get(handle).ok_or_else(|| {
            PhysicsError::InvalidReference(format!("{} #{} not found", H::KIND, handle.raw()))
        })
    }

    /// Gets a mutable reference by handle, returning an error for a dead handle
    pub fn get_mut_or_err(&mut self, handle: H) -> Result<&mut T> {
        self.get_mut(handle).ok_or_else(|| {
            PhysicsError::InvalidReference(format!("{} #{} not found", H::KIND, handle.raw()))
        })
    }

    /// Removes an item from the storage
    pub fn remove(&mut self, handle: H) -> Option<T> {
        self.items.remove(&handle)
    }

    /// Returns the number of items in the storage
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clears all items from the storage
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns all live handles in ascending order
    pub fn handles(&self) -> Vec<H> {
        self.items.keys().copied().collect()
    }

    /// Returns an iterator over all items in handle order
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.items.iter().map(|(h, item)| (*h, item))
    }

    /// Returns a mutable iterator over all items in handle order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> {
        self.items.iter_mut().map(|(h, item)| (*h, item))
    }
}

impl<H: Handle, T> Default for HandleStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}
