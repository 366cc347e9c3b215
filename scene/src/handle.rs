use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Common accessors of the generational handles stored in [`Slots`].
pub(crate) trait Handle: Copy {
    fn from_parts(index: u32, spawn_tick: u64) -> Self;
    fn index(&self) -> u32;
    fn spawn_tick(&self) -> u64;
}

macro_rules! generational_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Serialize, Deserialize)]
        pub struct $name {
            index: u32,
            spawn_tick: u64,
        }

        impl $name {
            /// Returns the slot index of this handle.
            pub fn index(&self) -> u32 {
                self.index
            }

            /// Returns the scene tick at which the object was spawned.
            pub fn spawn_tick(&self) -> u64 {
                self.spawn_tick
            }
        }

        impl Handle for $name {
            fn from_parts(index: u32, spawn_tick: u64) -> Self {
                Self { index, spawn_tick }
            }

            fn index(&self) -> u32 {
                self.index
            }

            fn spawn_tick(&self) -> u64 {
                self.spawn_tick
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index && self.spawn_tick == other.spawn_tick
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.index.hash(state);
                self.spawn_tick.hash(state);
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({}@{})"), self.index, self.spawn_tick)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({}@{})"), self.index, self.spawn_tick)
            }
        }
    };
}

generational_handle!(
    /// A non-owning reference to a scene node.
    ///
    /// Layout: `u32 index` + `u64 spawn_tick`. The spawn tick is unique per
    /// spawn within a scene, so a handle whose node was removed never
    /// resolves again. The exception is a node restored from a snapshot,
    /// which comes back under the same identity.
    NodeId,
    "Node"
);

generational_handle!(
    /// A non-owning reference to a component attached to a node.
    ///
    /// Same identity rules as [`NodeId`].
    ComponentId,
    "Component"
);

/// Either a node or a component: anything that owns reflected attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Node(NodeId),
    Component(ComponentId),
}

impl From<NodeId> for EntityId {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<ComponentId> for EntityId {
    fn from(component: ComponentId) -> Self {
        Self::Component(component)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node(node) => node.fmt(f),
            Self::Component(component) => component.fmt(f),
        }
    }
}

struct Slot<T> {
    spawn_tick: u64,
    value: Option<T>,
}

/// Generational slot storage with a LIFO free list.
///
/// Unlike a plain allocator, a handle can be re-inserted at its original
/// slot with [`insert_at`](Self::insert_at), which is how removed nodes and
/// components are brought back by undo.
pub(crate) struct Slots<H, T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    count: usize,
    _handle: std::marker::PhantomData<H>,
}

impl<H: Handle, T> Slots<H, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            count: 0,
            _handle: std::marker::PhantomData,
        }
    }

    /// Stores `value`, reusing a recycled slot if available.
    pub fn insert(&mut self, spawn_tick: u64, value: T) -> H {
        self.count += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.spawn_tick = spawn_tick;
            slot.value = Some(value);
            H::from_parts(index, spawn_tick)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                spawn_tick,
                value: Some(value),
            });
            H::from_parts(index, spawn_tick)
        }
    }

    /// Stores `value` under an exact handle. Returns `false` if the slot is
    /// currently occupied.
    pub fn insert_at(&mut self, handle: H, value: T) -> bool {
        let idx = handle.index() as usize;
        while self.slots.len() <= idx {
            self.free_list.push(self.slots.len() as u32);
            self.slots.push(Slot {
                spawn_tick: 0,
                value: None,
            });
        }
        let slot = &mut self.slots[idx];
        if slot.value.is_some() {
            return false;
        }
        slot.spawn_tick = handle.spawn_tick();
        slot.value = Some(value);
        self.free_list.retain(|&i| i != handle.index());
        self.count += 1;
        true
    }

    /// Removes the value behind `handle`. Returns `None` for stale handles.
    pub fn remove(&mut self, handle: H) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.spawn_tick != handle.spawn_tick() {
            return None;
        }
        let value = slot.value.take()?;
        self.free_list.push(handle.index());
        self.count -= 1;
        Some(value)
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.spawn_tick != handle.spawn_tick() {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.spawn_tick != handle.spawn_tick() {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// Iterates over all live handles with their values.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value
                .as_ref()
                .map(|value| (H::from_parts(idx as u32, slot.spawn_tick), value))
        })
    }

    /// Drops every value and forgets all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sequential() {
        let mut slots = Slots::<NodeId, &str>::new();
        let a = slots.insert(1, "a");
        let b = slots.insert(2, "b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn remove_makes_handle_stale() {
        let mut slots = Slots::<NodeId, &str>::new();
        let a = slots.insert(1, "a");
        assert_eq!(slots.remove(a), Some("a"));
        assert!(!slots.contains(a));
        assert_eq!(slots.remove(a), None);
    }

    #[test]
    fn recycled_slot_rejects_old_handle() {
        let mut slots = Slots::<NodeId, &str>::new();
        let a = slots.insert(1, "a");
        slots.remove(a);
        let b = slots.insert(2, "b");
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(slots.get(a).is_none());
        assert_eq!(slots.get(b), Some(&"b"));
    }

    #[test]
    fn insert_at_restores_identity() {
        let mut slots = Slots::<ComponentId, i32>::new();
        let a = slots.insert(5, 10);
        slots.remove(a);
        assert!(slots.insert_at(a, 11));
        assert_eq!(slots.get(a), Some(&11));
        // The slot is no longer on the free list.
        let b = slots.insert(6, 12);
        assert_ne!(a.index(), b.index());
    }

    #[test]
    fn insert_at_occupied_slot_fails() {
        let mut slots = Slots::<NodeId, i32>::new();
        let a = slots.insert(1, 1);
        slots.remove(a);
        let _b = slots.insert(2, 2);
        assert!(!slots.insert_at(a, 3));
    }

    #[test]
    fn insert_at_grows_storage() {
        let mut slots = Slots::<NodeId, i32>::new();
        let far = NodeId::from_parts(3, 9);
        assert!(slots.insert_at(far, 1));
        assert_eq!(slots.len(), 1);
        // Gap slots are reused before new ones are appended.
        let next = slots.insert(10, 2);
        assert!(next.index() < 3);
    }

    #[test]
    fn iter_yields_live_values() {
        let mut slots = Slots::<NodeId, i32>::new();
        let a = slots.insert(1, 1);
        let b = slots.insert(2, 2);
        slots.remove(a);
        let live: Vec<_> = slots.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(live, vec![(b, 2)]);
    }

    #[test]
    fn handle_display() {
        let node = NodeId::from_parts(4, 17);
        assert_eq!(node.to_string(), "Node(4@17)");
        assert_eq!(EntityId::from(node).to_string(), "Node(4@17)");
    }
}
