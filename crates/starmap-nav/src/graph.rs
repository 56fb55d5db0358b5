use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{GraphError, Result};

/// Dense, 0-based index of a location inside a [`LocationGraph`].
///
/// This value is stable for the lifetime of a loaded graph; it is not the external
/// (native) identifier the map data was exported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocationId(pub u32);

impl LocationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LocationId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Outgoing link from one location to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Connection {
    pub to: LocationId,
    pub to_native_id: u32,
    /// Longer-range link between regions. Affects display only; search cost is unchanged.
    pub regional: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    pub id: LocationId,
    pub native_id: u32,
    pub name: String,
    pub position: [f32; 3],
    pub connections: Vec<Connection>,
}

/// Location data as handed over by an external loader.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocationRecord {
    pub id: u32,
    pub native_id: u32,
    pub name: String,
    pub position: [f32; 3],
    #[cfg_attr(feature = "serde", serde(default))]
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionRecord {
    pub to: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub to_native_id: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub regional: bool,
}

/// Immutable adjacency data plus a mutable "blocked" overlay.
///
/// The overlay uses atomics so a graph shared behind an `Arc` with the pathfinding worker
/// can still be toggled from the interactive thread. Adjacency itself never changes after
/// load.
#[derive(Debug)]
pub struct LocationGraph {
    locations: Vec<Location>,
    /// Reverse adjacency: `incoming[b]` lists every `a` with a connection `a -> b`.
    incoming: Vec<Vec<LocationId>>,
    names: HashMap<String, LocationId>,
    blocked: Vec<AtomicBool>,
}

impl LocationGraph {
    /// Build a graph from loader records.
    ///
    /// Record `i` must carry id `i`. Connections that point outside the loaded set are
    /// dropped with a warning rather than failing the whole load.
    pub fn from_records(records: Vec<LocationRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(GraphError::Empty);
        }

        let count = records.len();
        let mut names = HashMap::with_capacity(count);
        let mut locations = Vec::with_capacity(count);

        for (index, record) in records.into_iter().enumerate() {
            if record.id as usize != index {
                return Err(GraphError::SparseId {
                    index,
                    id: record.id,
                });
            }

            let id = LocationId(record.id);
            if names.insert(record.name.clone(), id).is_some() {
                return Err(GraphError::DuplicateName(record.name));
            }

            let mut connections = Vec::with_capacity(record.connections.len());
            for conn in record.connections {
                if conn.to as usize >= count {
                    tracing::warn!(
                        from = %record.name,
                        to = conn.to,
                        "Dropping connection to unknown location"
                    );
                    continue;
                }
                connections.push(Connection {
                    to: LocationId(conn.to),
                    to_native_id: conn.to_native_id,
                    regional: conn.regional,
                });
            }

            locations.push(Location {
                id,
                native_id: record.native_id,
                name: record.name,
                position: record.position,
                connections,
            });
        }

        let mut incoming = vec![Vec::new(); count];
        for location in &locations {
            for conn in &location.connections {
                incoming[conn.to.index()].push(location.id);
            }
        }

        let blocked = (0..count).map(|_| AtomicBool::new(false)).collect();

        tracing::debug!(locations = count, "Location graph loaded");

        Ok(Self {
            locations,
            incoming,
            names,
            blocked,
        })
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, id: LocationId) -> bool {
        id.index() < self.locations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn find_by_name(&self, name: &str) -> Option<LocationId> {
        self.names.get(name).copied()
    }

    pub fn connections(&self, id: LocationId) -> &[Connection] {
        self.get(id)
            .map(|loc| loc.connections.as_slice())
            .unwrap_or(&[])
    }

    /// Locations with a connection leading into `id`, in load order.
    pub fn incoming(&self, id: LocationId) -> &[LocationId] {
        self.incoming
            .get(id.index())
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Exclude (or re-include) a location from path search without touching adjacency.
    pub fn set_blocked(&self, id: LocationId, blocked: bool) {
        if let Some(flag) = self.blocked.get(id.index()) {
            flag.store(blocked, Ordering::Release);
        }
    }

    /// Re-include every location in path search.
    pub fn clear_blocked(&self) {
        for flag in &self.blocked {
            flag.store(false, Ordering::Release);
        }
    }

    /// Unknown ids report as blocked so the search never steps outside the arena.
    pub fn is_blocked(&self, id: LocationId) -> bool {
        self.blocked
            .get(id.index())
            .map(|flag| flag.load(Ordering::Acquire))
            .unwrap_or(true)
    }
}
