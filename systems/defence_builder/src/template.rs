use lane_defence_core::{arena, Position, Side, UnitType};

/// When a template tile that is already present gets upgraded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeIntent {
    /// Never upgraded by the template.
    SpawnOnly,
    /// Upgraded as soon as the build reaches the tile again.
    Immediate,
    /// Upgraded in the late pass once the cheaper stages are placed.
    Deferred,
}

/// Build stages in placement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Diagonal wall running out from the layout anchor.
    AnchorWall,
    /// Diagonal wall closing the opposite side of the funnel.
    FunnelWall,
    /// Wall covering the core turrets.
    Keystone,
    /// First turrets of the kill zone.
    CoreTurrets,
    /// Factory row behind the anchor.
    Factories,
    /// Turrets completing the kill zone.
    SupportTurrets,
    /// Walls shielding the kill zone and the far corner.
    Shell,
    /// Extra turret row placed once the escalations ran.
    Battery,
}

impl Stage {
    /// Stages placed before the rush gate and the first turret escalation.
    pub const FOUNDATION: [Stage; 7] = [
        Stage::AnchorWall,
        Stage::FunnelWall,
        Stage::Keystone,
        Stage::CoreTurrets,
        Stage::Factories,
        Stage::SupportTurrets,
        Stage::Shell,
    ];
}

/// A single structure of the defence template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TemplateTile {
    /// Structure placed on the tile.
    pub unit: UnitType,
    /// Tile to place it on.
    pub position: Position,
    /// Stage the tile belongs to.
    pub stage: Stage,
    /// Upgrade behaviour once the tile is present.
    pub intent: UpgradeIntent,
}

impl TemplateTile {
    const fn new(unit: UnitType, x: i32, y: i32, stage: Stage, intent: UpgradeIntent) -> Self {
        Self {
            unit,
            position: Position::new(x, y),
            stage,
            intent,
        }
    }

    /// Tile mirrored across the vertical centre line.
    #[must_use]
    pub const fn reflect(self) -> Self {
        Self {
            position: arena::mirror(self.position),
            ..self
        }
    }
}

/// Stationary layout committed to one flank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefenceTemplate {
    side: Side,
    tiles: Vec<TemplateTile>,
    gate: Position,
    corner_pair: [Position; 2],
    corner_anchor: Position,
    expansion: Vec<Position>,
}

impl DefenceTemplate {
    /// The authored layout, anchored on the left.
    #[must_use]
    pub fn left_anchored() -> Self {
        use Stage::*;
        use UnitType::{Factory, Turret, Wall};
        use UpgradeIntent::*;

        let mut tiles = vec![TemplateTile::new(Wall, 18, 4, AnchorWall, SpawnOnly)];
        for (x, y) in [(17, 4), (16, 4), (15, 3), (14, 2)] {
            tiles.push(TemplateTile::new(Wall, x, y, AnchorWall, SpawnOnly));
        }
        for n in 5..=12 {
            tiles.push(TemplateTile::new(Wall, 14 + n, n, AnchorWall, SpawnOnly));
        }
        for n in 1..=8 {
            tiles.push(TemplateTile::new(Wall, 13 - n, n + 2, FunnelWall, SpawnOnly));
        }
        tiles.push(TemplateTile::new(Wall, 8, 13, Keystone, Deferred));
        for (x, y) in [(8, 12), (6, 10)] {
            tiles.push(TemplateTile::new(Turret, x, y, CoreTurrets, Immediate));
        }
        for x in 12..=15 {
            tiles.push(TemplateTile::new(Factory, x, 4, Factories, Immediate));
        }
        for (x, y) in [(4, 12), (7, 10)] {
            tiles.push(TemplateTile::new(Turret, x, y, SupportTurrets, SpawnOnly));
        }
        for (x, y) in [
            (8, 10),
            (3, 13),
            (4, 13),
            (5, 13),
            (6, 13),
            (7, 13),
            (7, 12),
            (27, 13),
            (26, 13),
        ] {
            tiles.push(TemplateTile::new(Wall, x, y, Shell, Deferred));
        }
        for (x, y) in [(6, 12), (5, 12), (4, 12)] {
            tiles.push(TemplateTile::new(Turret, x, y, Battery, SpawnOnly));
        }

        let rows = [
            (5, 11..=18),
            (6, 10..=19),
            (7, 9..=20),
            (8, 8..=21),
            (9, 7..=22),
            (10, 9..=23),
            (11, 14..=24),
        ];
        let expansion = rows
            .into_iter()
            .flat_map(|(y, xs)| xs.map(move |x| Position::new(x, y)))
            .collect();

        Self {
            side: Side::Left,
            tiles,
            gate: Position::new(5, 11),
            corner_pair: [Position::new(0, 13), Position::new(1, 13)],
            corner_anchor: Position::new(0, 13),
            expansion,
        }
    }

    /// The same layout mirrored onto the other flank.
    #[must_use]
    pub fn reflect(&self) -> Self {
        let [first, second] = self.corner_pair;
        Self {
            side: self.side.mirror(),
            tiles: self.tiles.iter().map(|tile| tile.reflect()).collect(),
            gate: arena::mirror(self.gate),
            corner_pair: [arena::mirror(first), arena::mirror(second)],
            corner_anchor: arena::mirror(self.corner_anchor),
            expansion: self.expansion.iter().copied().map(arena::mirror).collect(),
        }
    }

    /// Layout committed to the provided side.
    #[must_use]
    pub fn for_side(side: Side) -> Self {
        let left = Self::left_anchored();
        match side {
            Side::Left => left,
            Side::Right => left.reflect(),
        }
    }

    /// Side the layout is committed to.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Every tile in placement order.
    #[must_use]
    pub fn tiles(&self) -> &[TemplateTile] {
        &self.tiles
    }

    /// Tiles of one stage in placement order.
    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &TemplateTile> + '_ {
        self.tiles.iter().filter(move |tile| tile.stage == stage)
    }

    /// Tile opened and closed in a single turn to reroute units before a rush.
    #[must_use]
    pub const fn gate(&self) -> Position {
        self.gate
    }

    /// Corner walls removed so a rush can leave through the corner.
    #[must_use]
    pub const fn corner_pair(&self) -> [Position; 2] {
        self.corner_pair
    }

    /// Corner wall whose presence allows the turret escalations.
    #[must_use]
    pub const fn corner_anchor(&self) -> Position {
        self.corner_anchor
    }

    /// Factory expansion block in placement order.
    #[must_use]
    pub fn expansion(&self) -> &[Position] {
        &self.expansion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn reflecting_twice_restores_the_template() {
        let left = DefenceTemplate::left_anchored();
        assert_eq!(left.reflect().reflect(), left);
        assert_eq!(DefenceTemplate::for_side(Side::Right).side(), Side::Right);
    }

    #[test]
    fn every_tile_sits_on_the_friendly_half() {
        for side in [Side::Left, Side::Right] {
            let template = DefenceTemplate::for_side(side);
            for tile in template.tiles() {
                assert!(arena::in_bounds(tile.position), "{}", tile.position);
                assert!(arena::is_friendly_half(tile.position), "{}", tile.position);
            }
            for position in template.expansion() {
                assert!(arena::in_bounds(*position), "{position}");
            }
        }
    }

    #[test]
    fn expansion_block_avoids_the_template() {
        let template = DefenceTemplate::left_anchored();
        let occupied: HashSet<Position> =
            template.tiles().iter().map(|tile| tile.position).collect();
        assert!(template
            .expansion()
            .iter()
            .all(|position| !occupied.contains(position)));
        assert_eq!(template.expansion().len(), 8 + 10 + 12 + 14 + 16 + 15 + 11);
    }

    #[test]
    fn foundation_excludes_the_battery() {
        assert!(!Stage::FOUNDATION.contains(&Stage::Battery));
        assert!(Stage::FOUNDATION.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
