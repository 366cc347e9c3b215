//! Builders that turn one scene mutation into one reversible action.
//!
//! Every builder follows the same protocol:
//!
//! 1. Construct it right before the mutation. It captures the "before"
//!    state.
//! 2. Perform the mutation through the [`Scene`](quill_scene::Scene) API.
//! 3. Call `build`. It captures the "after" state and returns the action,
//!    or `None` when there is nothing to undo.
//!
//! Builders are single-use: `build` consumes them. Calling `build` before
//! the mutation produces an action that undoes nothing; this ordering is
//! the caller's responsibility. Builders only keep a
//! [`WeakScene`](quill_scene::WeakScene), so a scene dropped in the meantime
//! makes `build` return `None`. The scene must not be write-locked by the
//! caller while a builder runs.

use std::borrow::Borrow;

use quill_scene::serialize::{EntitySnapshot, SceneSnapshot};

mod attributes;
mod buffer;
mod component;
mod node;

pub use attributes::{ChangeComponentAttributesActionBuilder, ChangeNodeAttributesActionBuilder};
pub use buffer::ChangeAttributeBuffer;
pub use component::{CreateComponentActionBuilder, RemoveComponentActionBuilder};
pub use node::{CreateNodeActionBuilder, RemoveNodeActionBuilder};

/// Collects any iterable of handles (owned or borrowed) into an ordered
/// target list.
pub fn targets_from<H, I>(targets: I) -> Vec<H>
where
    H: Copy,
    I: IntoIterator,
    I::Item: Borrow<H>,
{
    targets.into_iter().map(|t| *t.borrow()).collect()
}

/// State captured by a single-entity builder before its mutation.
#[derive(Debug)]
enum Before {
    /// The mutation is fully described by the entity captured at build time.
    Nothing,
    Component(EntitySnapshot),
    Node(EntitySnapshot),
    Scene(SceneSnapshot),
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn targets_from_keeps_iteration_order() {
        let owned: Vec<u32> = targets_from(vec![3_u32, 1, 2]);
        assert_eq!(owned, vec![3, 1, 2]);

        let borrowed: Vec<u32> = targets_from(&[5_u32, 4]);
        assert_eq!(borrowed, vec![5, 4]);

        let set: BTreeSet<u32> = [9, 7, 8].into_iter().collect();
        let sorted: Vec<u32> = targets_from(&set);
        assert_eq!(sorted, vec![7, 8, 9]);
    }
}
