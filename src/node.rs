use crate::grid::Position;

/// Index of a node in the grid's node table.
pub type NodeId = usize;

/// Passability class of a cell. The discriminant is the class value used in
/// cost maps and, for passable classes, the surcharge paid when leaving the
/// cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Open = 0,
    Blocked = 1,
    Light = 2,
    Medium = 3,
    Heavy = 4,
}

impl Terrain {
    pub const ALL: [Terrain; 5] = [
        Terrain::Open,
        Terrain::Blocked,
        Terrain::Light,
        Terrain::Medium,
        Terrain::Heavy,
    ];

    pub fn from_class(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| *t as u8 == value)
    }

    pub fn class(self) -> u8 {
        self as u8
    }

    pub fn is_blocked(self) -> bool {
        self == Terrain::Blocked
    }

    /// Extra cost added to every move that leaves a cell of this class.
    pub fn surcharge(self) -> f64 {
        match self {
            Terrain::Blocked => 0.0,
            other => other as u8 as f64,
        }
    }
}

/// Immutable identity and adjacency of one grid cell.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    pub terrain: Terrain,
    /// Passable cells at the eight surrounding offsets. Empty for blocked cells.
    pub neighbors: Vec<NodeId>,
}

impl Node {
    pub fn is_blocked(&self) -> bool {
        self.terrain.is_blocked()
    }
}

/// Per-search bookkeeping for one node, kept outside the grid so that a
/// reset is a bulk fill and the grid itself stays immutable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub distance_travelled: f64,
    pub priority: f64,
    pub previous: Option<NodeId>,
}

impl Default for NodeRecord {
    fn default() -> Self {
        NodeRecord {
            distance_travelled: f64::INFINITY,
            priority: 0.0,
            previous: None,
        }
    }
}

impl NodeRecord {
    pub fn reset(&mut self) {
        *self = NodeRecord::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_values_round_trip_through_terrain() {
        for terrain in Terrain::ALL {
            assert_eq!(Terrain::from_class(terrain.class()), Some(terrain));
        }
        assert_eq!(Terrain::from_class(5), None);
    }

    #[test]
    fn surcharge_grows_with_costlier_classes() {
        assert_eq!(Terrain::Open.surcharge(), 0.0);
        assert!(Terrain::Light.surcharge() < Terrain::Medium.surcharge());
        assert!(Terrain::Medium.surcharge() < Terrain::Heavy.surcharge());
    }

    #[test]
    fn reset_clears_search_fields() {
        let mut record = NodeRecord {
            distance_travelled: 3.0,
            priority: 7.5,
            previous: Some(4),
        };
        record.reset();
        assert!(record.distance_travelled.is_infinite());
        assert_eq!(record.previous, None);
    }
}
