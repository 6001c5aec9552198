// Arena collision geometry
//
// The level is a set of named floor and wall pieces owned by one terrain
// entity. Level pieces are authored in hub units and scaled on build; loose
// props such as the tunnel panel carry their own scale.

use glam::Vec3;
use rapier3d::prelude::SharedShape;

use crate::core::math::rotation_from_hpr;
use crate::engine::physics::{to_isometry, CollisionCategory, CollisionWorld, EntityId};

/// Scale applied to the hub level geometry
pub const TERRAIN_SCALE: f32 = 1.5;

/// One box of floor or wall
#[derive(Debug, Clone)]
struct TerrainPiece {
    name: String,
    category: CollisionCategory,
    center: Vec3,
    half_extents: Vec3,
    heading: f32,
}

/// Collects pieces, then registers them all at once
#[derive(Debug)]
pub struct TerrainBuilder {
    owner: EntityId,
    scale: f32,
    pieces: Vec<TerrainPiece>,
    player_start: Vec3,
    spawn_center: Vec3,
}

impl TerrainBuilder {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            scale: 1.0,
            pieces: Vec::new(),
            player_start: Vec3::ZERO,
            spawn_center: Vec3::ZERO,
        }
    }

    /// Uniform scale for level pieces added after this call
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn floor(self, name: &str, center: Vec3, half_extents: Vec3) -> Self {
        let scale = self.scale;
        self.piece(name, CollisionCategory::Floor, center * scale, half_extents * scale, 0.0)
    }

    pub fn wall(self, name: &str, center: Vec3, half_extents: Vec3) -> Self {
        let scale = self.scale;
        self.piece(name, CollisionCategory::Wall, center * scale, half_extents * scale, 0.0)
    }

    /// A free-standing wall placed in world units with its own heading and
    /// per-axis scale; `position` is the middle of its base
    pub fn panel(self, name: &str, position: Vec3, heading: f32, size: Vec3, scale: Vec3) -> Self {
        let half_extents = size * scale * 0.5;
        let center = position + Vec3::new(0.0, 0.0, half_extents.z);
        self.piece(name, CollisionCategory::Wall, center, half_extents, heading)
    }

    fn piece(
        mut self,
        name: &str,
        category: CollisionCategory,
        center: Vec3,
        half_extents: Vec3,
        heading: f32,
    ) -> Self {
        self.pieces.push(TerrainPiece {
            name: name.to_string(),
            category,
            center,
            half_extents,
            heading,
        });
        self
    }

    pub fn player_start(mut self, position: Vec3) -> Self {
        self.player_start = position;
        self
    }

    pub fn spawn_center(mut self, position: Vec3) -> Self {
        self.spawn_center = position;
        self
    }

    pub fn build(self, collisions: &mut CollisionWorld) -> Terrain {
        collisions.set_owner_transform(self.owner, Vec3::ZERO, glam::Quat::IDENTITY);
        for piece in &self.pieces {
            let he = piece.half_extents;
            collisions.add_geometry(
                self.owner,
                &piece.name,
                piece.category,
                SharedShape::cuboid(he.x, he.y, he.z),
                to_isometry(piece.center, rotation_from_hpr(piece.heading, 0.0, 0.0)),
            );
        }
        log::info!(
            "Terrain built: {} pieces ({} floors)",
            self.pieces.len(),
            self.pieces
                .iter()
                .filter(|p| p.category == CollisionCategory::Floor)
                .count()
        );

        Terrain {
            player_start: self.player_start,
            spawn_center: self.spawn_center,
        }
    }
}

/// Registered level geometry
#[derive(Debug)]
pub struct Terrain {
    pub player_start: Vec3,
    pub spawn_center: Vec3,
}

/// The golf-hub courtyard: one floor, four perimeter walls and the panel
/// that blocks the exit tunnel
pub fn default_arena(owner: EntityId) -> TerrainBuilder {
    TerrainBuilder::new(owner)
        .scale(TERRAIN_SCALE)
        .floor(
            "collision_floors",
            Vec3::new(0.0, -40.0, -0.5),
            Vec3::new(80.0, 100.0, 0.5),
        )
        .wall(
            "collision_walls_north",
            Vec3::new(0.0, 60.5, 10.0),
            Vec3::new(80.0, 0.5, 10.0),
        )
        .wall(
            "collision_walls_south",
            Vec3::new(0.0, -140.5, 10.0),
            Vec3::new(80.0, 0.5, 10.0),
        )
        .wall(
            "collision_walls_east",
            Vec3::new(80.5, -40.0, 10.0),
            Vec3::new(0.5, 100.0, 10.0),
        )
        .wall(
            "collision_walls_west",
            Vec3::new(-80.5, -40.0, 10.0),
            Vec3::new(0.5, 100.0, 10.0),
        )
        .panel(
            "LB_wall_panel",
            Vec3::new(-30.0, -185.0, 0.0),
            -30.0,
            Vec3::new(10.0, 1.0, 10.0),
            Vec3::new(1.6, 1.0, 2.0),
        )
        .player_start(Vec3::ZERO)
        .spawn_center(Vec3::new(0.0, -60.0, 0.0))
}
