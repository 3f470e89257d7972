//! The request pool: unassigned passenger requests in arrival order.
//!
//! Drivers consume the pool concurrently within a tick; a request a driver
//! saw at the top of its turn may already have been claimed by an
//! earlier-acting driver. Removal is what makes a claim atomic: a request
//! leaves the pool in the same turn its state moves off `Waiting`.

use bevy_ecs::prelude::{Entity, Resource};

/// Ordered collection of unassigned requests plus membership queries.
/// Arrival order is preserved for the queue dispatch strategy.
#[derive(Debug, Default, Resource)]
pub struct RequestPool {
    waiting: Vec<Entity>,
}

impl RequestPool {
    /// Append a newly spawned request.
    pub fn push(&mut self, request: Entity) {
        debug_assert!(!self.contains(request), "request already pooled");
        self.waiting.push(request);
    }

    /// Remove a request; returns whether it was present. O(n).
    pub fn remove(&mut self, request: Entity) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|e| *e != request);
        self.waiting.len() != before
    }

    pub fn contains(&self, request: Entity) -> bool {
        self.waiting.contains(&request)
    }

    /// Requests in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.waiting.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
