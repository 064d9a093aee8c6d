use super::handle::Handle;

/// Which child slot of a node a link occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A single AVL tree node.
///
/// The key is immutable for the life of the node; the mapped value lives in
/// the value arena and is reached through `value`. Child links own their
/// subtrees, the parent link is a plain back-index (`None` at the root).
/// `height` is `1 + max(child heights)` with absent children at height 0.
#[derive(Clone)]
pub(crate) struct Node<K> {
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
    height: u8,
    key: K,
    value: Handle,
}

impl<K> Node<K> {
    /// Creates a leaf node holding `key` and a handle to its value.
    pub(crate) fn new(key: K, value: Handle, parent: Option<Handle>) -> Self {
        Self {
            parent,
            left: None,
            right: None,
            height: 1,
            key,
            value,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn key_mut(&mut self) -> &mut K {
        &mut self.key
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> Handle {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: Handle) {
        self.value = value;
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: u8) {
        self.height = height;
    }

    /// Which child slot of `parent` this node occupies, given `parent`'s
    /// link to compare against.
    pub(crate) fn side_of(parent: &Node<K>, child: Handle) -> Side {
        if parent.left == Some(child) { Side::Left } else { Side::Right }
    }
}
