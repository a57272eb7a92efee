//! Hole descriptions
//!
//! Levels are static authoring data: read once, validated, never mutated by
//! the simulation. The built-in course ships as embedded JSON.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{GROUND_HALF_EXTENT, TRUNK_SIZE};
use crate::sim::geometry::OrientedBox;

/// Built-in course data
const BUILTIN_LEVELS: &str = include_str!("../assets/levels.json");

/// Obstacle flavours from the level editor
///
/// Both collide as rotated boxes; ramps are simply boxes authored with a tilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    #[default]
    Box,
    Ramp,
}

/// A solid box, optionally rotated (Euler XYZ, radians)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    #[serde(rename = "type", default)]
    pub kind: ObstacleKind,
    pub position: Vec3,
    /// Full extents along each local axis
    pub size: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
}

impl Obstacle {
    pub fn collision_box(&self) -> OrientedBox {
        OrientedBox::from_euler(self.position, self.size, self.rotation.unwrap_or(Vec3::ZERO))
    }
}

/// Circular sand zone lying on the ground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sandpit {
    pub position: Vec3,
    pub radius: f32,
}

/// Decorative tree; its trunk still blocks the ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub position: Vec3,
}

impl Tree {
    /// Trunk collider standing on the ground under the tree
    pub fn trunk(&self) -> OrientedBox {
        let center = Vec3::new(self.position.x, TRUNK_SIZE.y / 2.0, self.position.z);
        OrientedBox::axis_aligned(center, TRUNK_SIZE)
    }
}

fn default_ground_half_extent() -> f32 {
    GROUND_HALF_EXTENT
}

/// One hole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub par: u32,
    pub start_position: Vec3,
    pub hole_position: Vec3,
    pub hole_radius: f32,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub sandpits: Vec<Sandpit>,
    #[serde(default)]
    pub trees: Vec<Tree>,
    /// Half-width of the square ground plane centred on the origin
    #[serde(default = "default_ground_half_extent")]
    pub ground_half_extent: f32,
}

impl Level {
    /// An empty hole on the default ground plane
    pub fn new(id: u32, name: impl Into<String>, start: Vec3, hole: Vec3, hole_radius: f32) -> Self {
        Self {
            id,
            name: name.into(),
            par: 1,
            start_position: start,
            hole_position: hole,
            hole_radius,
            obstacles: Vec::new(),
            sandpits: Vec::new(),
            trees: Vec::new(),
            ground_half_extent: GROUND_HALF_EXTENT,
        }
    }

    /// Reject geometry the simulation cannot run on
    pub fn validate(&self) -> Result<(), LevelError> {
        let invalid = |reason: String| LevelError::Invalid { level: self.id, reason };

        if !self.start_position.is_finite() || !self.hole_position.is_finite() {
            return Err(invalid("start or hole position is not finite".into()));
        }
        if !(self.hole_radius.is_finite() && self.hole_radius > 0.0) {
            return Err(invalid(format!("hole radius {} must be positive", self.hole_radius)));
        }
        if !(self.ground_half_extent.is_finite() && self.ground_half_extent > 0.0) {
            return Err(invalid(format!(
                "ground extent {} must be positive",
                self.ground_half_extent
            )));
        }

        for (i, obstacle) in self.obstacles.iter().enumerate() {
            if !obstacle.position.is_finite() {
                return Err(invalid(format!("obstacle {i} position is not finite")));
            }
            if !obstacle.size.is_finite() || obstacle.size.min_element() <= 0.0 {
                return Err(invalid(format!("obstacle {i} has degenerate size {}", obstacle.size)));
            }
            if obstacle.rotation.is_some_and(|r| !r.is_finite()) {
                return Err(invalid(format!("obstacle {i} rotation is not finite")));
            }
        }

        for (i, pit) in self.sandpits.iter().enumerate() {
            if !pit.position.is_finite() || !(pit.radius.is_finite() && pit.radius > 0.0) {
                return Err(invalid(format!("sandpit {i} radius {} must be positive", pit.radius)));
            }
        }

        if let Some(i) = self.trees.iter().position(|t| !t.position.is_finite()) {
            return Err(invalid(format!("tree {i} position is not finite")));
        }

        Ok(())
    }

    /// Every solid the ball can hit: authored obstacles, then tree trunks
    pub fn collision_boxes(&self) -> Vec<OrientedBox> {
        self.obstacles
            .iter()
            .map(Obstacle::collision_box)
            .chain(self.trees.iter().map(Tree::trunk))
            .collect()
    }

    /// Whether a horizontal position lies over the ground plane
    #[inline]
    pub fn over_ground(&self, position: Vec3) -> bool {
        position.x.abs() <= self.ground_half_extent && position.z.abs() <= self.ground_half_extent
    }
}

/// Level loading/validation failure
#[derive(Debug)]
pub enum LevelError {
    /// Course JSON could not be parsed
    Parse(serde_json::Error),
    /// Geometry failed validation
    Invalid { level: u32, reason: String },
    /// Two levels share an id
    DuplicateId(u32),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Parse(e) => write!(f, "malformed course data: {e}"),
            LevelError::Invalid { level, reason } => write!(f, "level {level}: {reason}"),
            LevelError::DuplicateId(id) => write!(f, "level id {id} appears more than once"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e)
    }
}

/// Ordered list of holes
#[derive(Debug, Clone, Default)]
pub struct Course {
    levels: Vec<Level>,
}

impl Course {
    /// Build a course, validating every level
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        for (i, level) in levels.iter().enumerate() {
            level.validate()?;
            if levels[..i].iter().any(|l| l.id == level.id) {
                return Err(LevelError::DuplicateId(level.id));
            }
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of levels
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let levels: Vec<Level> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    /// The six holes shipped with the game
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn find(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// The level after `id` in play order, if any
    pub fn next_after(&self, id: u32) -> Option<&Level> {
        let index = self.levels.iter().position(|l| l.id == id)?;
        self.levels.get(index + 1)
    }

    /// Sum of par over the whole course
    pub fn total_par(&self) -> u32 {
        self.levels.iter().map(|l| l.par).sum()
    }
}
