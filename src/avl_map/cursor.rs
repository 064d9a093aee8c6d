use core::fmt;

use super::AvlMap;
use crate::MapError;
use crate::raw::Handle;

/// A read-only position in the in-order walk of an [`AvlMap`].
///
/// A cursor names either one entry of the map or the *past-the-end*
/// position one step beyond the maximum key. Stepping and dereferencing are
/// checked: dereferencing or advancing the past-the-end position, and
/// receding from the first entry, fail with [`MapError::InvalidCursor`]
/// without changing the cursor.
///
/// A `Cursor` can be obtained from a [`CursorMut`] (via [`From`] or
/// [`CursorMut::as_cursor`]), never the other way around.
///
/// # Examples
///
/// ```
/// use avlmap::AvlMap;
///
/// let map = AvlMap::from([(1, "a"), (2, "b"), (3, "c")]);
///
/// let mut cursor = map.cursor_front();
/// assert_eq!(cursor.key_value()?, (&1, &"a"));
/// cursor.move_next()?;
/// cursor.move_next()?;
/// assert_eq!(cursor.key()?, &3);
/// cursor.move_next()?;
/// assert!(cursor.is_end());
/// # Ok::<(), avlmap::MapError>(())
/// ```
pub struct Cursor<'a, K, V> {
    map: &'a AvlMap<K, V>,
    node: Option<Handle>,
}

/// A position in the in-order walk of an [`AvlMap`] that can mutate the
/// entry it names.
///
/// Navigation and dereference behave exactly like [`Cursor`]; in addition
/// the mapped value at the current position can be written through
/// [`value_mut`](CursorMut::value_mut), and the current entry can be removed
/// with [`remove_current`](CursorMut::remove_current). Keys stay read-only.
///
/// Because a `CursorMut` borrows its map mutably, it is the only live
/// handle into the map while it exists; removing through a cursor that
/// belongs to a different map is not expressible.
pub struct CursorMut<'a, K, V> {
    map: &'a mut AvlMap<K, V>,
    node: Option<Handle>,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(super) fn new(map: &'a AvlMap<K, V>, node: Option<Handle>) -> Self {
        Cursor { map, node }
    }

    /// Returns `true` if the cursor is at the past-the-end position.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Returns the key-value pair at the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] at the past-the-end position.
    pub fn key_value(&self) -> Result<(&'a K, &'a V), MapError> {
        let h = self.node.ok_or(MapError::InvalidCursor)?;
        let node = self.map.raw.node(h);
        Ok((node.key(), self.map.raw.value(node.value())))
    }

    /// Returns the key at the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] at the past-the-end position.
    pub fn key(&self) -> Result<&'a K, MapError> {
        self.key_value().map(|(k, _)| k)
    }

    /// Returns the value at the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] at the past-the-end position.
    pub fn value(&self) -> Result<&'a V, MapError> {
        self.key_value().map(|(_, v)| v)
    }

    /// Moves the cursor to the in-order successor.
    ///
    /// Advancing past the last entry lands on the past-the-end position.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] if the cursor is already past-the-end;
    /// the cursor is left where it was.
    pub fn move_next(&mut self) -> Result<(), MapError> {
        let h = self.node.ok_or(MapError::InvalidCursor)?;
        self.node = self.map.raw.successor(h);
        Ok(())
    }

    /// Moves the cursor to the in-order predecessor.
    ///
    /// From the past-the-end position this lands on the last (maximum-key)
    /// entry.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] if the cursor is at the first entry (or
    /// the map is empty); the cursor is left where it was.
    pub fn move_prev(&mut self) -> Result<(), MapError> {
        if self.node == self.map.raw.first() {
            // Covers the empty map too: first and past-the-end coincide.
            return Err(MapError::InvalidCursor);
        }
        self.node = match self.node {
            None => Some(self.map.raw.last().ok_or(MapError::InvalidCursor)?),
            Some(h) => self.map.raw.predecessor(h),
        };
        Ok(())
    }
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(super) fn new(map: &'a mut AvlMap<K, V>, node: Option<Handle>) -> Self {
        CursorMut { map, node }
    }

    /// Returns `true` if the cursor is at the past-the-end position.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Returns a read-only cursor at the same position, borrowing from this
    /// one.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor {
            map: &*self.map,
            node: self.node,
        }
    }

    /// Returns the key-value pair at the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] at the past-the-end position.
    pub fn key_value(&self) -> Result<(&K, &V), MapError> {
        let h = self.node.ok_or(MapError::InvalidCursor)?;
        let node = self.map.raw.node(h);
        Ok((node.key(), self.map.raw.value(node.value())))
    }

    /// Returns the key at the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] at the past-the-end position.
    pub fn key(&self) -> Result<&K, MapError> {
        self.key_value().map(|(k, _)| k)
    }

    /// Returns the value at the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] at the past-the-end position.
    pub fn value(&self) -> Result<&V, MapError> {
        self.key_value().map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value at the cursor. The key is
    /// not reachable mutably; it anchors the entry's position.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] at the past-the-end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::AvlMap;
    ///
    /// let mut map = AvlMap::from([(1, 10)]);
    /// let mut cursor = map.cursor_front_mut();
    /// *cursor.value_mut()? += 1;
    /// drop(cursor);
    /// assert_eq!(map[&1], 11);
    /// # Ok::<(), avlmap::MapError>(())
    /// ```
    pub fn value_mut(&mut self) -> Result<&mut V, MapError> {
        let h = self.node.ok_or(MapError::InvalidCursor)?;
        let value = self.map.raw.node(h).value();
        Ok(self.map.raw.value_mut(value))
    }

    /// Moves the cursor to the in-order successor.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] if the cursor is already past-the-end;
    /// the cursor is left where it was.
    pub fn move_next(&mut self) -> Result<(), MapError> {
        let h = self.node.ok_or(MapError::InvalidCursor)?;
        self.node = self.map.raw.successor(h);
        Ok(())
    }

    /// Moves the cursor to the in-order predecessor; from the past-the-end
    /// position, to the last entry.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] if the cursor is at the first entry (or
    /// the map is empty); the cursor is left where it was.
    pub fn move_prev(&mut self) -> Result<(), MapError> {
        if self.node == self.map.raw.first() {
            return Err(MapError::InvalidCursor);
        }
        self.node = match self.node {
            None => Some(self.map.raw.last().ok_or(MapError::InvalidCursor)?),
            Some(h) => self.map.raw.predecessor(h),
        };
        Ok(())
    }
}

impl<K: Ord, V> CursorMut<'_, K, V> {
    /// Removes the entry at the cursor and returns it, leaving the cursor
    /// at the removed entry's in-order successor (the past-the-end position
    /// when the maximum was removed).
    ///
    /// Cursors and references to other entries are unaffected: rebalancing
    /// rotations move subtree roots but never destroy nodes.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`] at the past-the-end position; the map is
    /// left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::AvlMap;
    ///
    /// let mut map = AvlMap::from([(1, "a"), (2, "b")]);
    /// let mut cursor = map.cursor_front_mut();
    /// assert_eq!(cursor.remove_current()?, (1, "a"));
    /// assert_eq!(cursor.key()?, &2);
    /// assert_eq!(cursor.remove_current()?, (2, "b"));
    /// assert!(cursor.is_end());
    /// drop(cursor);
    /// assert!(map.is_empty());
    /// # Ok::<(), avlmap::MapError>(())
    /// ```
    pub fn remove_current(&mut self) -> Result<(K, V), MapError> {
        let h = self.node.ok_or(MapError::InvalidCursor)?;
        let (pair, next) = self.map.raw.remove_at(h);
        self.node = next;
        Ok(pair)
    }
}

impl<'a, K, V> From<CursorMut<'a, K, V>> for Cursor<'a, K, V> {
    /// Downgrades a mutable cursor, keeping its position.
    fn from(cursor: CursorMut<'a, K, V>) -> Cursor<'a, K, V> {
        Cursor {
            map: cursor.map,
            node: cursor.node,
        }
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Cursor {
            map: self.map,
            node: self.node,
        }
    }
}

// Cursors compare by position identity: same owning map, same node. The
// past-the-end positions of two different maps are distinct.
impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.map, other.map) && self.node == other.node
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K, V> PartialEq<CursorMut<'_, K, V>> for Cursor<'_, K, V> {
    fn eq(&self, other: &CursorMut<'_, K, V>) -> bool {
        core::ptr::eq(self.map, &raw const *other.map) && self.node == other.node
    }
}

impl<K, V> PartialEq for CursorMut<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(&raw const *self.map, &raw const *other.map) && self.node == other.node
    }
}

impl<K, V> Eq for CursorMut<'_, K, V> {}

impl<K, V> PartialEq<Cursor<'_, K, V>> for CursorMut<'_, K, V> {
    fn eq(&self, other: &Cursor<'_, K, V>) -> bool {
        core::ptr::eq(&raw const *self.map, other.map) && self.node == other.node
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value().ok()).finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.key_value().ok()).finish()
    }
}
