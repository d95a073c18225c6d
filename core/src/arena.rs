//! Geometry of the diamond-shaped arena.

use serde::{Deserialize, Serialize};

use crate::{Player, Position, Side};

/// Width and height of the arena bounding square.
pub const ARENA_SIZE: i32 = 28;

/// Number of rows owned by each player.
pub const HALF_ARENA: i32 = ARENA_SIZE / 2;

/// Largest `x` still counted towards the left flank.
pub const LEFT_FLANK_MAX_X: i32 = 12;

/// Smallest `x` still counted towards the right flank.
pub const RIGHT_FLANK_MIN_X: i32 = 15;

/// Reports whether the tile lies inside the arena diamond.
#[must_use]
pub fn in_bounds(position: Position) -> bool {
    let (x, y) = (position.x(), position.y());
    if !(0..ARENA_SIZE).contains(&y) {
        return false;
    }

    let (start, end) = if y < HALF_ARENA {
        (HALF_ARENA - 1 - y, HALF_ARENA + y)
    } else {
        (y - HALF_ARENA, ARENA_SIZE + HALF_ARENA - 1 - y)
    };
    (start..=end).contains(&x)
}

/// Reflects the tile about the vertical centre line.
#[must_use]
pub const fn mirror(position: Position) -> Position {
    Position::new(ARENA_SIZE - 1 - position.x(), position.y())
}

/// Reports whether the tile belongs to the agent's half of the arena.
#[must_use]
pub const fn is_friendly_half(position: Position) -> bool {
    position.y() < HALF_ARENA
}

/// Flank the tile counts towards, if any. The centre strip belongs to neither.
#[must_use]
pub const fn flank_of(position: Position) -> Option<Side> {
    if position.x() <= LEFT_FLANK_MAX_X {
        Some(Side::Left)
    } else if position.x() >= RIGHT_FLANK_MIN_X {
        Some(Side::Right)
    } else {
        None
    }
}

/// Iterates every in-bounds tile, row by row from the friendly corner.
pub fn positions() -> impl Iterator<Item = Position> {
    (0..ARENA_SIZE)
        .flat_map(|y| (0..ARENA_SIZE).map(move |x| Position::new(x, y)))
        .filter(|position| in_bounds(*position))
}

/// Tiles whose centre lies within `radius` of `center`.
///
/// A tile counts when its distance is below `radius + 0.51`, matching the
/// engine's inclusive range rounding.
#[must_use]
pub fn locations_in_range(center: Position, radius: f32) -> Vec<Position> {
    if !radius.is_finite() || radius < 0.0 {
        return Vec::new();
    }

    let reach = radius.ceil() as i32 + 1;
    let mut tiles = Vec::new();
    for y in center.y() - reach..=center.y() + reach {
        for x in center.x() - reach..=center.x() + reach {
            let candidate = Position::new(x, y);
            if in_bounds(candidate) && center.distance(candidate) < radius + 0.51 {
                tiles.push(candidate);
            }
        }
    }
    tiles
}

/// One of the four diagonal borders of the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Edge {
    /// Opponent edge on the right.
    TopRight,
    /// Opponent edge on the left.
    TopLeft,
    /// Agent edge on the left.
    BottomLeft,
    /// Agent edge on the right.
    BottomRight,
}

impl Edge {
    /// All edges in engine order.
    pub const ALL: [Edge; 4] = [
        Self::TopRight,
        Self::TopLeft,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// The agent's deployment edges.
    pub const FRIENDLY: [Edge; 2] = [Self::BottomLeft, Self::BottomRight];

    /// The opponent's deployment edges.
    pub const OPPONENT: [Edge; 2] = [Self::TopLeft, Self::TopRight];

    /// Edge diagonally across the arena, the destination of units spawned here.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopRight => Self::BottomLeft,
            Self::TopLeft => Self::BottomRight,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    /// Player allowed to deploy mobile units on the edge.
    #[must_use]
    pub const fn owner(self) -> Player {
        match self {
            Self::BottomLeft | Self::BottomRight => Player::Friendly,
            Self::TopLeft | Self::TopRight => Player::Opponent,
        }
    }

    /// Flank the edge runs along.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::BottomLeft | Self::TopLeft => Side::Left,
            Self::BottomRight | Self::TopRight => Side::Right,
        }
    }

    /// Tiles of the edge ordered from the centre line outwards.
    #[must_use]
    pub fn locations(self) -> Vec<Position> {
        (0..HALF_ARENA)
            .map(|i| match self {
                Self::BottomLeft => Position::new(HALF_ARENA - 1 - i, i),
                Self::BottomRight => Position::new(HALF_ARENA + i, i),
                Self::TopLeft => Position::new(HALF_ARENA - 1 - i, ARENA_SIZE - 1 - i),
                Self::TopRight => Position::new(HALF_ARENA + i, ARENA_SIZE - 1 - i),
            })
            .collect()
    }

    /// Reports whether the tile lies on this edge.
    #[must_use]
    pub const fn contains(self, position: Position) -> bool {
        let (x, y) = (position.x(), position.y());
        match self {
            Self::BottomLeft => y >= 0 && y < HALF_ARENA && x + y == HALF_ARENA - 1,
            Self::BottomRight => y >= 0 && y < HALF_ARENA && x - y == HALF_ARENA,
            Self::TopLeft => y >= HALF_ARENA && y < ARENA_SIZE && y - x == HALF_ARENA,
            Self::TopRight => {
                y >= HALF_ARENA && y < ARENA_SIZE && x + y == ARENA_SIZE + HALF_ARENA - 1
            }
        }
    }

    /// Number of diagonal steps separating an in-bounds tile from the edge.
    #[must_use]
    pub const fn gap(self, position: Position) -> i32 {
        let (x, y) = (position.x(), position.y());
        match self {
            Self::BottomLeft => x + y - (HALF_ARENA - 1),
            Self::BottomRight => HALF_ARENA - (x - y),
            Self::TopLeft => HALF_ARENA - (y - x),
            Self::TopRight => ARENA_SIZE + HALF_ARENA - 1 - (x + y),
        }
    }

    /// Edge the tile lies on, if any.
    #[must_use]
    pub fn of(position: Position) -> Option<Self> {
        Self::ALL.into_iter().find(|edge| edge.contains(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_bounds_follow_the_diamond() {
        assert!(in_bounds(Position::new(13, 0)));
        assert!(in_bounds(Position::new(14, 0)));
        assert!(!in_bounds(Position::new(12, 0)));
        assert!(!in_bounds(Position::new(15, 0)));
        assert!(in_bounds(Position::new(0, 13)));
        assert!(in_bounds(Position::new(27, 13)));
        assert!(in_bounds(Position::new(0, 14)));
        assert!(in_bounds(Position::new(27, 14)));
        assert!(in_bounds(Position::new(13, 27)));
        assert!(in_bounds(Position::new(14, 27)));
        assert!(!in_bounds(Position::new(12, 27)));
        assert!(!in_bounds(Position::new(1, 28)));
        assert!(!in_bounds(Position::new(-1, 13)));
    }

    #[test]
    fn arena_holds_expected_tile_count() {
        // Each half is a triangle of 2 + 4 + ... + 28 tiles.
        assert_eq!(positions().count(), 2 * (2..=28).step_by(2).sum::<i32>() as usize);
    }

    #[test]
    fn edges_lie_inside_the_arena_and_match_membership() {
        for edge in Edge::ALL {
            let tiles = edge.locations();
            assert_eq!(tiles.len(), HALF_ARENA as usize);
            for tile in tiles {
                assert!(in_bounds(tile), "{tile} of {edge:?} out of bounds");
                assert!(edge.contains(tile), "{tile} not recognised on {edge:?}");
                assert_eq!(Edge::of(tile), Some(edge));
            }
        }
    }

    #[test]
    fn mirror_maps_edges_onto_their_reflection() {
        for tile in Edge::BottomLeft.locations() {
            assert!(Edge::BottomRight.contains(mirror(tile)));
        }
        for tile in Edge::TopLeft.locations() {
            assert!(Edge::TopRight.contains(mirror(tile)));
        }
    }

    #[test]
    fn mirror_preserves_bounds() {
        for tile in positions() {
            assert!(in_bounds(mirror(tile)));
            assert_eq!(mirror(mirror(tile)), tile);
        }
    }

    #[test]
    fn gap_is_zero_on_the_edge_and_grows_inwards() {
        for edge in Edge::ALL {
            for tile in edge.locations() {
                assert_eq!(edge.gap(tile), 0, "{tile} on {edge:?}");
            }
        }
        assert_eq!(Edge::TopRight.gap(Position::new(13, 0)), 28);
        assert!(positions().all(|tile| Edge::ALL.iter().all(|edge| edge.gap(tile) >= 0)));
    }

    #[test]
    fn opposite_edges_belong_to_the_other_player() {
        for edge in Edge::ALL {
            assert_ne!(edge.owner(), edge.opposite().owner());
            assert_ne!(edge.side(), edge.opposite().side());
            assert_eq!(edge.opposite().opposite(), edge);
        }
    }

    #[test]
    fn neutral_strip_belongs_to_neither_flank() {
        assert_eq!(flank_of(Position::new(12, 20)), Some(Side::Left));
        assert_eq!(flank_of(Position::new(13, 20)), None);
        assert_eq!(flank_of(Position::new(14, 20)), None);
        assert_eq!(flank_of(Position::new(15, 20)), Some(Side::Right));
    }

    #[test]
    fn range_includes_the_centre_and_respects_radius() {
        let centre = Position::new(13, 10);
        let tiles = locations_in_range(centre, 2.5);
        assert!(tiles.contains(&centre));
        assert!(tiles.contains(&Position::new(13, 13)));
        assert!(!tiles.contains(&Position::new(13, 14)));
        assert!(tiles.iter().all(|tile| centre.distance(*tile) < 3.01));
    }

    #[test]
    fn negative_radius_yields_no_tiles() {
        assert!(locations_in_range(Position::new(13, 10), -1.0).is_empty());
        assert!(locations_in_range(Position::new(13, 10), f32::NAN).is_empty());
    }
}
