//! Visualization hook for an external renderer.
//!
//! The core exposes one callable: given an agent entity, return its visual
//! class. Drivers, passengers, and destination markers are distinct; markers
//! render beneath the agent layers. The renderer itself lives outside this
//! crate and only consumes these descriptions.

use bevy_ecs::prelude::{Entity, World};
use serde::Serialize;

use crate::ecs::{AgentKind, DestMarker, Driver, Passenger};

/// How to draw one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portrayal {
    pub shape: &'static str,
    pub color: &'static str,
    pub layer: f32,
    pub radius: f32,
}

/// Which visual class an entity belongs to, if it is an agent at all.
pub fn agent_kind(world: &World, entity: Entity) -> Option<AgentKind> {
    if world.get::<Driver>(entity).is_some() {
        Some(AgentKind::Driver)
    } else if world.get::<Passenger>(entity).is_some() {
        Some(AgentKind::Passenger)
    } else if world.get::<DestMarker>(entity).is_some() {
        Some(AgentKind::DestMarker)
    } else {
        None
    }
}

/// Visual description for an agent entity; `None` for non-agents.
pub fn portrayal(world: &World, entity: Entity) -> Option<Portrayal> {
    Some(match agent_kind(world, entity)? {
        AgentKind::Driver => Portrayal {
            shape: "car",
            color: "#2b6cb0",
            layer: 0.1,
            radius: 0.5,
        },
        AgentKind::Passenger => Portrayal {
            shape: "person",
            color: "#2f855a",
            layer: 0.1,
            radius: 0.5,
        },
        AgentKind::DestMarker => Portrayal {
            shape: "circle",
            color: "#a0aec0",
            layer: 0.0,
            radius: 0.5,
        },
    })
}
