use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};

/// The height-balanced binary search tree backing `AvlMap`.
///
/// Nodes and values live in separate arenas (values are reachable only
/// through the node that owns them, but their storage is independent, so a
/// mutable value borrow never aliases tree structure). `None` links are the
/// nil terminator of every leaf path; `root` is `None` exactly when the map
/// is empty, and `first`/`last` cache the in-order extremes.
#[derive(Clone)]
pub(crate) struct RawAvlMap<K, V> {
    nodes: Arena<Node<K>>,
    values: Arena<V>,
    root: Option<Handle>,
    first: Option<Handle>,
    last: Option<Handle>,
    len: usize,
}

/// An attach point produced by a failed [`RawAvlMap::locate`]: the would-be
/// parent of the new node and the child slot it would occupy.
#[derive(Clone, Copy)]
pub(crate) struct InsertSlot {
    parent: Option<Handle>,
    side: Side,
}

impl<K, V> RawAvlMap<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            first: None,
            last: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        self.first
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        self.last
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.values.get(handle)
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut V {
        self.values.get_mut(handle)
    }

    /// Returns a reference to a node by handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawAvlMap<K, V>`.
    pub(crate) unsafe fn node_ptr<'a>(ptr: *const Self, handle: Handle) -> &'a Node<K> {
        // SAFETY: We only access the `nodes` field through addr_of, avoiding
        // aliasing with the `values` field.
        unsafe { Arena::get_ptr(core::ptr::addr_of!((*ptr).nodes), handle) }
    }

    /// Returns a mutable reference to a value by handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawAvlMap<K, V>`.
    /// - The caller must have logical exclusive access to the value at
    ///   `handle` and must not hold another reference into the values arena.
    pub(crate) unsafe fn value_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut V {
        // SAFETY: We only access the `values` field, avoiding aliasing with
        // the `nodes` field.
        unsafe { (*core::ptr::addr_of_mut!((*ptr).values)).get_mut(handle) }
    }

    /// In-order successor of `x`, reading only the nodes arena of `ptr`.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawAvlMap<K, V>` whose
    ///   structure is not being mutated.
    pub(crate) unsafe fn successor_ptr(ptr: *const Self, x: Handle) -> Option<Handle> {
        // SAFETY: All reads go through node_ptr, which touches only the
        // nodes arena.
        unsafe {
            if let Some(mut r) = Self::node_ptr(ptr, x).right() {
                while let Some(l) = Self::node_ptr(ptr, r).left() {
                    r = l;
                }
                return Some(r);
            }
            let mut cur = x;
            while let Some(p) = Self::node_ptr(ptr, cur).parent() {
                if Self::node_ptr(ptr, p).left() == Some(cur) {
                    return Some(p);
                }
                cur = p;
            }
            None
        }
    }

    /// In-order predecessor of `x`, reading only the nodes arena of `ptr`.
    ///
    /// # Safety
    /// - Same contract as [`Self::successor_ptr`].
    pub(crate) unsafe fn predecessor_ptr(ptr: *const Self, x: Handle) -> Option<Handle> {
        // SAFETY: All reads go through node_ptr, which touches only the
        // nodes arena.
        unsafe {
            if let Some(mut l) = Self::node_ptr(ptr, x).left() {
                while let Some(r) = Self::node_ptr(ptr, l).right() {
                    l = r;
                }
                return Some(l);
            }
            let mut cur = x;
            while let Some(p) = Self::node_ptr(ptr, cur).parent() {
                if Self::node_ptr(ptr, p).right() == Some(cur) {
                    return Some(p);
                }
                cur = p;
            }
            None
        }
    }

    /// Leftmost node of the subtree rooted at `x`.
    pub(crate) fn minimum(&self, mut x: Handle) -> Handle {
        while let Some(l) = self.node(x).left() {
            x = l;
        }
        x
    }

    /// Rightmost node of the subtree rooted at `x`.
    pub(crate) fn maximum(&self, mut x: Handle) -> Handle {
        while let Some(r) = self.node(x).right() {
            x = r;
        }
        x
    }

    /// In-order successor of `x`, or `None` if `x` is the maximum.
    pub(crate) fn successor(&self, x: Handle) -> Option<Handle> {
        if let Some(r) = self.node(x).right() {
            return Some(self.minimum(r));
        }
        let mut cur = x;
        while let Some(p) = self.node(cur).parent() {
            if self.node(p).left() == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    /// In-order predecessor of `x`, or `None` if `x` is the minimum.
    pub(crate) fn predecessor(&self, x: Handle) -> Option<Handle> {
        if let Some(l) = self.node(x).left() {
            return Some(self.maximum(l));
        }
        let mut cur = x;
        while let Some(p) = self.node(cur).parent() {
            if self.node(p).right() == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    #[inline]
    fn height_of(&self, link: Option<Handle>) -> u8 {
        link.map_or(0, |h| self.node(h).height())
    }

    fn update_height(&mut self, h: Handle) {
        let n = self.node(h);
        let height = self.height_of(n.left()).max(self.height_of(n.right())) + 1;
        self.node_mut(h).set_height(height);
    }

    /// Left subtree height minus right subtree height.
    #[allow(clippy::cast_possible_wrap)]
    fn balance_factor(&self, h: Handle) -> i8 {
        let n = self.node(h);
        // AVL height is bounded by 1.44·log2(capacity) << i8::MAX.
        self.height_of(n.left()) as i8 - self.height_of(n.right()) as i8
    }

    /// Re-links `child` into the slot `from` occupies under `parent`, or as
    /// the root when `parent` is `None`.
    fn replace_child(&mut self, parent: Option<Handle>, from: Handle, child: Option<Handle>) {
        match parent {
            None => self.root = child,
            Some(p) => {
                let side = Node::side_of(self.node(p), from);
                self.node_mut(p).set_child(side, child);
            }
        }
    }

    /// Single right rotation around `x` (the LL fix). Returns the subtree's
    /// new root, `x`'s former left child.
    fn rotate_right(&mut self, x: Handle) -> Handle {
        let y = self.node(x).left().expect("`RawAvlMap::rotate_right()` - no left child!");
        let z = self.node(y).right();
        let parent = self.node(x).parent();

        self.node_mut(x).set_child(Side::Left, z);
        if let Some(z) = z {
            self.node_mut(z).set_parent(Some(x));
        }

        self.node_mut(y).set_child(Side::Right, Some(x));
        self.node_mut(x).set_parent(Some(y));

        self.replace_child(parent, x, Some(y));
        self.node_mut(y).set_parent(parent);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Single left rotation around `x` (the RR fix). Returns the subtree's
    /// new root, `x`'s former right child.
    fn rotate_left(&mut self, x: Handle) -> Handle {
        let y = self.node(x).right().expect("`RawAvlMap::rotate_left()` - no right child!");
        let z = self.node(y).left();
        let parent = self.node(x).parent();

        self.node_mut(x).set_child(Side::Right, z);
        if let Some(z) = z {
            self.node_mut(z).set_parent(Some(x));
        }

        self.node_mut(y).set_child(Side::Left, Some(x));
        self.node_mut(x).set_parent(Some(y));

        self.replace_child(parent, x, Some(y));
        self.node_mut(y).set_parent(parent);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Recomputes `h`'s height and, if the balance invariant is violated by
    /// one level, applies the matching LL/LR/RR/RL fix. Returns the subtree's
    /// root afterwards (`h` itself when no rotation was needed).
    fn rebalance(&mut self, h: Handle) -> Handle {
        self.update_height(h);
        let bf = self.balance_factor(h);
        if bf > 1 {
            let l = self.node(h).left().expect("`RawAvlMap::rebalance()` - left-heavy node has no left child!");
            if self.balance_factor(l) < 0 {
                // LR: the surplus sits in the left child's right subtree.
                self.rotate_left(l);
            }
            self.rotate_right(h)
        } else if bf < -1 {
            let r = self.node(h).right().expect("`RawAvlMap::rebalance()` - right-heavy node has no right child!");
            if self.balance_factor(r) > 0 {
                // RL: the surplus sits in the right child's left subtree.
                self.rotate_right(r);
            }
            self.rotate_left(h)
        } else {
            h
        }
    }

    /// Walks upward from the new leaf's parent after an insertion. Classic
    /// AVL: at most one rotation is ever needed, and the walk can also stop
    /// as soon as a node's height comes out unchanged.
    fn rebalance_after_insert(&mut self, mut cur: Option<Handle>) {
        while let Some(h) = cur {
            let before = self.node(h).height();
            if self.rebalance(h) != h {
                break;
            }
            if self.node(h).height() == before {
                break;
            }
            cur = self.node(h).parent();
        }
    }

    /// Walks upward from the splice point after a deletion. Unlike
    /// insertion, every ancestor up to the root may need its own rotation.
    fn rebalance_after_remove(&mut self, mut cur: Option<Handle>) {
        while let Some(h) = cur {
            let subtree = self.rebalance(h);
            cur = self.node(subtree).parent();
        }
    }

    fn refresh_ends(&mut self) {
        self.first = self.root.map(|r| self.minimum(r));
        self.last = self.root.map(|r| self.maximum(r));
    }

    /// Drains every entry in key order. Powers `IntoIter`.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut order = Vec::with_capacity(self.len);
        let mut cur = self.first;
        while let Some(h) = cur {
            order.push(h);
            cur = self.successor(h);
        }

        let mut out = Vec::with_capacity(order.len());
        for h in order {
            let node = self.nodes.take(h);
            let value = self.values.take(node.value());
            out.push((node.into_key(), value));
        }

        self.clear();
        out
    }
}

impl<K: Ord, V> RawAvlMap<K, V> {
    /// Descends from the root comparing keys; the single source of truth for
    /// lookup, shared by `get`, `at`, `count`, `find` and the entry API.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut cur = self.root;
        while let Some(h) = cur {
            cur = match key.cmp(self.node(h).key().borrow()) {
                Ordering::Less => self.node(h).left(),
                Ordering::Greater => self.node(h).right(),
                Ordering::Equal => return Some(h),
            };
        }
        None
    }

    /// Same descent as [`Self::search`], but on a miss reports where the key
    /// would be attached.
    pub(crate) fn locate(&self, key: &K) -> Result<Handle, InsertSlot> {
        let mut cur = self.root;
        let mut slot = InsertSlot {
            parent: None,
            side: Side::Left,
        };
        while let Some(h) = cur {
            let side = match key.cmp(self.node(h).key()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Ok(h),
            };
            slot = InsertSlot {
                parent: Some(h),
                side,
            };
            cur = self.node(h).child(side);
        }
        Err(slot)
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let h = self.search(key)?;
        Some(self.value(self.node(h).value()))
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let h = self.search(key)?;
        let value = self.node(h).value();
        Some(self.value_mut(value))
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let h = self.search(key)?;
        let node = self.node(h);
        Some((node.key(), self.value(node.value())))
    }

    /// Links a new leaf at `slot`, rebalances, and refreshes the cached
    /// extremes. The slot must come from a [`Self::locate`] miss on the same
    /// (unmodified since) tree.
    pub(crate) fn attach(&mut self, slot: InsertSlot, key: K, value: V) -> Handle {
        let value_handle = self.values.alloc(value);
        let h = self.nodes.alloc(Node::new(key, value_handle, slot.parent));

        match slot.parent {
            None => self.root = Some(h),
            Some(p) => self.node_mut(p).set_child(slot.side, Some(h)),
        }

        self.rebalance_after_insert(slot.parent);
        self.len += 1;
        self.refresh_ends();
        h
    }

    /// Inserts `key`/`value`, replacing and returning the previous value if
    /// the key is already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.locate(&key) {
            Ok(h) => {
                let value_handle = self.node(h).value();
                Some(mem::replace(self.value_mut(value_handle), value))
            }
            Err(slot) => {
                self.attach(slot, key, value);
                None
            }
        }
    }

    /// Removes the node at `h`.
    ///
    /// Returns the removed pair together with the handle that now carries the
    /// in-order-next payload (deleting a node with two children swaps its
    /// payload with the in-order successor's and splices the successor node
    /// out instead, so "next" is `h` itself in that case).
    pub(crate) fn remove_at(&mut self, h: Handle) -> ((K, V), Option<Handle>) {
        let (left, right) = (self.node(h).left(), self.node(h).right());

        let (target, next) = if let (Some(_), Some(r)) = (left, right) {
            let succ = self.minimum(r);
            let (a, b) = self.nodes.get2_mut(h, succ);
            mem::swap(a.key_mut(), b.key_mut());
            let (va, vb) = (a.value(), b.value());
            a.set_value(vb);
            b.set_value(va);
            (succ, Some(h))
        } else {
            (h, self.successor(h))
        };

        // target has at most one real child; splice it out.
        let child = self.node(target).left().or(self.node(target).right());
        let parent = self.node(target).parent();
        if let Some(c) = child {
            self.node_mut(c).set_parent(parent);
        }
        self.replace_child(parent, target, child);

        self.rebalance_after_remove(parent);
        self.len -= 1;
        self.refresh_ends();

        let node = self.nodes.take(target);
        let value = self.values.take(node.value());
        ((node.into_key(), value), next)
    }

    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let h = self.search(key)?;
        Some(self.remove_at(h).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    impl<K: Ord, V> RawAvlMap<K, V> {
        /// Checks every structural invariant reachable from the root.
        fn assert_invariants(&self) {
            match self.root {
                None => {
                    assert_eq!(self.len, 0);
                    assert!(self.first.is_none() && self.last.is_none());
                    return;
                }
                Some(r) => {
                    assert!(self.node(r).parent().is_none(), "root has a parent link");
                    assert_eq!(self.first, Some(self.minimum(r)), "stale first cache");
                    assert_eq!(self.last, Some(self.maximum(r)), "stale last cache");
                }
            }

            let mut visited = 0usize;
            let mut prev: Option<Handle> = None;
            let mut cur = self.first;
            while let Some(h) = cur {
                let node = self.node(h);

                // Keys strictly increase along the in-order walk.
                if let Some(p) = prev {
                    assert!(self.node(p).key() < node.key(), "in-order keys out of order");
                }

                // Stored height matches its definition and the AVL bound.
                let (hl, hr) = (self.height_of(node.left()), self.height_of(node.right()));
                assert_eq!(node.height(), hl.max(hr) + 1, "stale height");
                assert!(hl.abs_diff(hr) <= 1, "balance factor out of range");

                // Child links and parent links are exact inverses.
                for side in [Side::Left, Side::Right] {
                    if let Some(c) = node.child(side) {
                        assert_eq!(self.node(c).parent(), Some(h), "dangling parent link");
                    }
                }

                visited += 1;
                prev = Some(h);
                cur = self.successor(h);
            }
            assert_eq!(visited, self.len, "len does not match traversal");
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i16, u32),
        Remove(i16),
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            8 => (-200i16..200, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            4 => (-200i16..200).prop_map(Op::Remove),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        /// Every invariant of the tree holds after every operation of a
        /// random insert/remove/clear sequence.
        #[test]
        fn invariants_hold_under_random_ops(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut map: RawAvlMap<i16, u32> = RawAvlMap::new();

            for op in ops {
                match op {
                    Op::Insert(k, v) => {
                        map.insert(k, v);
                    }
                    Op::Remove(k) => {
                        map.remove_entry(&k);
                    }
                    Op::Clear => map.clear(),
                }
                map.assert_invariants();
            }
        }

        /// Ascending and descending bulk insertions both stay balanced and
        /// keep the cached extremes current.
        #[test]
        fn bulk_insert_stays_balanced(n in 1usize..200) {
            let mut asc: RawAvlMap<usize, usize> = RawAvlMap::new();
            let mut desc: RawAvlMap<usize, usize> = RawAvlMap::new();
            for i in 0..n {
                asc.insert(i, i);
                desc.insert(n - i, i);
            }
            asc.assert_invariants();
            desc.assert_invariants();
            prop_assert_eq!(asc.len(), n);
            prop_assert_eq!(desc.len(), n);
        }
    }

    #[test]
    fn search_hits_and_misses() {
        let mut map: RawAvlMap<i32, i32> = RawAvlMap::new();
        for k in [5, 3, 8, 1, 4, 7, 9] {
            map.insert(k, k * 10);
        }
        assert_eq!(map.get(&4), Some(&40));
        assert_eq!(map.get(&6), None);
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn remove_root_of_three_node_tree() {
        let mut map: RawAvlMap<i32, i32> = RawAvlMap::new();
        map.insert(2, 2);
        map.insert(1, 1);
        map.insert(3, 3);

        let root = map.search(&2).unwrap();
        let ((k, v), _) = map.remove_at(root);
        assert_eq!((k, v), (2, 2));
        map.assert_invariants();
        assert_eq!(map.len(), 2);
        assert!(map.get(&1).is_some() && map.get(&3).is_some());
    }

    #[test]
    fn remove_reports_next_position() {
        let mut map: RawAvlMap<i32, i32> = RawAvlMap::new();
        for k in 1..=7 {
            map.insert(k, k);
        }

        // Interior node with two children: the successor payload moves into
        // the removed node's slot.
        let h = map.search(&4).unwrap();
        let (_, next) = map.remove_at(h);
        let next = next.unwrap();
        assert_eq!(*map.node(next).key(), 5);

        // Maximum: nothing follows.
        let h = map.search(&7).unwrap();
        let (_, next) = map.remove_at(h);
        assert!(next.is_none());
    }

    #[test]
    fn parked_handle_survives_unrelated_mutations() {
        let mut map: RawAvlMap<i32, i32> = RawAvlMap::new();
        for k in (0..64).step_by(2) {
            map.insert(k, k * 10);
        }
        let parked = map.search(&30).unwrap();
        let value_handle = map.node(parked).value();

        // Interleaved insertions rotate subtrees all over the tree; the
        // parked node's identity and payload must not move.
        for k in (1..64).step_by(2) {
            map.insert(k, k * 10);
            assert_eq!(*map.node(parked).key(), 30);
            assert_eq!(*map.value(value_handle), 300);
        }

        // Remove everything except 28..=30. Removing a two-child node swaps
        // its payload with its in-order successor's, so keeping 29 alive
        // guarantees no removal ever targets 30 as that successor.
        for k in (0..28).chain(31..64) {
            map.remove_entry(&k);
            assert_eq!(*map.node(parked).key(), 30);
            assert_eq!(*map.value(value_handle), 300);
            map.assert_invariants();
        }

        assert_eq!(map.len(), 3);
        assert_eq!(map.search(&30), Some(parked));
    }

    #[test]
    fn clone_is_structurally_independent() {
        let mut a: RawAvlMap<i32, i32> = RawAvlMap::new();
        for k in 0..50 {
            a.insert(k, k);
        }
        let mut b = a.clone();
        b.remove_entry(&25);
        b.insert(100, 100);

        assert_eq!(a.len(), 50);
        assert_eq!(a.get(&25), Some(&25));
        assert_eq!(a.get(&100), None);
        a.assert_invariants();
        b.assert_invariants();
    }

    #[test]
    fn drain_is_in_key_order() {
        let mut map: RawAvlMap<i32, i32> = RawAvlMap::new();
        for k in [5, 3, 8, 1, 4, 7, 9] {
            map.insert(k, k);
        }
        let drained: Vec<i32> = map.drain_to_vec().into_iter().map(|(k, _)| k).collect();
        assert_eq!(drained, [1, 3, 4, 5, 7, 8, 9]);
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
