//! Breadth-first distance field used to answer path queries.

use std::collections::VecDeque;

use lane_defence_core::{
    arena::{self, Edge, ARENA_SIZE},
    Position,
};

const SIDE: usize = ARENA_SIZE as usize;
const UNREACHABLE: u16 = u16::MAX;

/// Dense step-distance grid seeded from a set of goal tiles.
///
/// Distances default to `u16::MAX` for tiles that cannot reach any goal so
/// callers can distinguish blocked tiles from traversable ones.
#[derive(Clone, Debug)]
pub(crate) struct NavigationField {
    distances: Vec<u16>,
}

impl Default for NavigationField {
    fn default() -> Self {
        Self {
            distances: vec![UNREACHABLE; SIDE * SIDE],
        }
    }
}

impl NavigationField {
    /// Rebuilds the distances with a breadth-first search from the goals.
    pub(crate) fn rebuild_with<F>(&mut self, goals: &[Position], is_blocked: F)
    where
        F: Fn(Position) -> bool,
    {
        self.distances.fill(UNREACHABLE);
        let mut queue = VecDeque::new();

        for &goal in goals {
            if is_blocked(goal) {
                continue;
            }
            let Some(index) = index(goal) else {
                continue;
            };
            if self.distances[index] == 0 {
                continue;
            }
            self.distances[index] = 0;
            queue.push_back(goal);
        }

        while let Some(tile) = queue.pop_front() {
            let Some(current) = self.distance(tile) else {
                continue;
            };
            if current >= UNREACHABLE.saturating_sub(1) {
                continue;
            }
            let next = current + 1;

            for neighbor in neighbors(tile) {
                if is_blocked(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = index(neighbor) else {
                    continue;
                };
                if self.distances[neighbor_index] <= next {
                    continue;
                }
                self.distances[neighbor_index] = next;
                queue.push_back(neighbor);
            }
        }
    }

    /// Distance captured for the tile, `None` when unreachable or outside the arena.
    #[must_use]
    pub(crate) fn distance(&self, tile: Position) -> Option<u16> {
        let distance = *self.distances.get(index(tile)?)?;
        (distance != UNREACHABLE).then_some(distance)
    }

    /// Walks downhill from `start` until a goal is reached.
    ///
    /// Neighbours are tried in a fixed order so equal-length routes resolve
    /// deterministically. Returns an empty path when `start` cannot reach a goal.
    #[must_use]
    pub(crate) fn descend(&self, start: Position) -> Vec<Position> {
        let Some(mut remaining) = self.distance(start) else {
            return Vec::new();
        };

        let mut path = vec![start];
        let mut current = start;
        while remaining > 0 {
            let Some(next) = neighbors(current)
                .find(|neighbor| self.distance(*neighbor) == Some(remaining - 1))
            else {
                break;
            };
            path.push(next);
            current = next;
            remaining -= 1;
        }
        path
    }
}

/// Computes the path from `start` towards `target`.
///
/// When no tile of the target edge is reachable the unit walks to the
/// reachable tile closest to that edge, preferring the nearest such tile.
pub(crate) fn find_path<F>(start: Position, target: Edge, is_blocked: F) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    if !arena::in_bounds(start) || is_blocked(start) {
        return Vec::new();
    }

    let mut field = NavigationField::default();
    field.rebuild_with(&target.locations(), &is_blocked);
    if field.distance(start).is_some() {
        return field.descend(start);
    }

    field.rebuild_with(&[start], &is_blocked);
    let deepest = arena::positions()
        .filter_map(|tile| field.distance(tile).map(|steps| (target.gap(tile), steps, tile)))
        .min();
    let Some((_, _, destination)) = deepest else {
        return vec![start];
    };

    field.rebuild_with(&[destination], &is_blocked);
    field.descend(start)
}

fn neighbors(tile: Position) -> impl Iterator<Item = Position> {
    [
        tile.offset(0, 1),
        tile.offset(1, 0),
        tile.offset(0, -1),
        tile.offset(-1, 0),
    ]
    .into_iter()
    .filter(|neighbor| arena::in_bounds(*neighbor))
}

fn index(tile: Position) -> Option<usize> {
    if !arena::in_bounds(tile) {
        return None;
    }
    let column = usize::try_from(tile.x()).ok()?;
    let row = usize::try_from(tile.y()).ok()?;
    row.checked_mul(SIDE)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_with_sets_goal_tiles_to_zero() {
        let mut field = NavigationField::default();
        let goal = Position::new(13, 5);

        field.rebuild_with(&[goal], |_| false);

        assert_eq!(field.distance(goal), Some(0));
        assert_eq!(field.distance(Position::new(13, 4)), Some(1));
        assert_eq!(field.distance(Position::new(14, 3)), Some(3));
        assert_eq!(field.distance(Position::new(0, 0)), None);
    }

    #[test]
    fn rebuild_with_respects_blocked_tiles() {
        let mut field = NavigationField::default();
        let goal = Position::new(13, 5);
        let wall = Position::new(13, 4);

        field.rebuild_with(&[goal], |tile| tile == wall);

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(Position::new(13, 3)), Some(4));
    }

    #[test]
    fn open_arena_path_reaches_the_opposite_edge() {
        let start = Position::new(13, 0);
        let path = find_path(start, Edge::TopRight, |_| false);

        assert_eq!(path.first(), Some(&start));
        let last = path.last().copied().expect("non-empty path");
        assert!(Edge::TopRight.contains(last), "path ended at {last}");
        for pair in path.windows(2) {
            let step = (pair[0].x() - pair[1].x()).abs() + (pair[0].y() - pair[1].y()).abs();
            assert_eq!(step, 1);
        }
    }

    #[test]
    fn blocked_start_yields_an_empty_path() {
        let start = Position::new(13, 0);
        assert!(find_path(start, Edge::TopRight, |tile| tile == start).is_empty());
        assert!(find_path(Position::new(0, 0), Edge::TopRight, |_| false).is_empty());
    }

    #[test]
    fn sealed_half_walks_to_the_deepest_reachable_tile() {
        let start = Position::new(13, 0);
        let path = find_path(start, Edge::TopRight, |tile| tile.y() == 10);

        let last = path.last().copied().expect("non-empty path");
        assert_eq!(last.y(), 9);
        assert_eq!(Edge::TopRight.gap(last), 9);
    }
}
