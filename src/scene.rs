//! The scene capability targeted by dispatched commands.
//!
//! The dispatcher only ever talks to a [`Scene`]; what a scene does with the
//! calls (build meshes, record them, forward them to a renderer) is up to the
//! implementation. Every argument arrives fully typed and validated.

use glam::Vec3;

use crate::param::Color;

/// Failure reported by a scene implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// A remove operation addressed an element that does not exist.
    #[error("cannot remove {collection} #{index}: collection holds {len}")]
    IndexOutOfRange {
        collection: String,
        index: usize,
        len: usize,
    },
    /// Implementation specific rejection.
    #[error("scene rejected the call: {0}")]
    Rejected(String),
}

/// Primitive shape families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Torus,
}

impl ShapeType {
    pub const ALL: [ShapeType; 5] = [
        ShapeType::Box,
        ShapeType::Sphere,
        ShapeType::Cylinder,
        ShapeType::Cone,
        ShapeType::Torus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeType::Box => "box",
            ShapeType::Sphere => "sphere",
            ShapeType::Cylinder => "cylinder",
            ShapeType::Cone => "cone",
            ShapeType::Torus => "torus",
        }
    }
}

/// Geometry of one primitive, without its placement.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Box {
        scale: Vec3,
    },
    Sphere {
        radius: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Cone {
        radius: f32,
        height: f32,
    },
    Torus {
        radius: f32,
        tube_radius: f32,
        radial_segments: u32,
        tubular_segments: u32,
        /// Central angle in radians.
        arc: f32,
    },
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Box { .. } => ShapeType::Box,
            Shape::Sphere { .. } => ShapeType::Sphere,
            Shape::Cylinder { .. } => ShapeType::Cylinder,
            Shape::Cone { .. } => ShapeType::Cone,
            Shape::Torus { .. } => ShapeType::Torus,
        }
    }
}

/// Surface of a mesh: a flat color, or a texture that takes precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub texture: Option<String>,
}

impl Material {
    pub fn color(color: Color) -> Self {
        Self {
            color,
            texture: None,
        }
    }
}

/// A single mesh at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    pub shape: Shape,
    pub position: Vec3,
    pub material: Material,
}

/// Many copies of the same mesh sharing geometry and material.
#[derive(Debug, Clone, PartialEq)]
pub struct InstancedShapeSpec {
    pub shape: Shape,
    pub positions: Vec<Vec3>,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLightSpec {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FpsControlSpec {
    pub movement_speed: f32,
    pub look_speed: f32,
}

impl Default for FpsControlSpec {
    fn default() -> Self {
        Self {
            movement_speed: 150.0,
            look_speed: 0.1,
        }
    }
}

/// Content of one cell of a cube map layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapCell {
    Empty,
    Floor,
    /// A floor block with a wall of this many blocks stacked on top.
    Wall(u32),
}

/// A grid of blocks laid out on the XZ plane, rows along Z and cells along X.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMapSpec {
    pub layout: Vec<Vec<MapCell>>,
    pub scale: f32,
    pub origin: Vec3,
    pub floor: Material,
    pub wall: Material,
}

impl CubeMapSpec {
    /// World positions of the floor blocks, in layout order.
    pub fn floor_positions(&self) -> Vec<Vec3> {
        self.cells()
            .filter(|&(_, cell)| cell != MapCell::Empty)
            .map(|(at, _)| at)
            .collect()
    }

    /// World positions of the wall blocks, bottom to top for each cell.
    pub fn wall_positions(&self) -> Vec<Vec3> {
        let mut out = Vec::new();
        for (at, cell) in self.cells() {
            if let MapCell::Wall(height) = cell {
                for level in 1..=height {
                    out.push(at + Vec3::new(0.0, level as f32 * self.scale, 0.0));
                }
            }
        }
        out
    }

    /// Total number of blocks the map is built from.
    pub fn block_count(&self) -> usize {
        self.floor_positions().len() + self.wall_positions().len()
    }

    fn cells(&self) -> impl Iterator<Item = (Vec3, MapCell)> + '_ {
        self.layout.iter().enumerate().flat_map(move |(z, row)| {
            row.iter().enumerate().map(move |(x, &cell)| {
                let offset = Vec3::new(x as f32 * self.scale, 0.0, z as f32 * self.scale);
                (self.origin + offset, cell)
            })
        })
    }
}

/// An external model loaded from a path. Loading completes out of band.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub path: String,
    pub position: Vec3,
    pub scale_factor: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridHelperSpec {
    pub size: f32,
    pub divisions: u32,
}

/// Operations a scene offers to the dispatcher.
///
/// Remove operations address elements by 0-based insertion order within
/// their own collection and remove exactly one element.
pub trait Scene {
    fn add_shape(&mut self, spec: ShapeSpec) -> Result<(), SceneError>;
    fn add_instanced_shapes(&mut self, spec: InstancedShapeSpec) -> Result<(), SceneError>;
    fn remove_shape(&mut self, shape: ShapeType, index: usize) -> Result<(), SceneError>;
    fn remove_instanced_shapes(&mut self, shape: ShapeType, index: usize)
        -> Result<(), SceneError>;

    fn set_ambient_light(&mut self, color: Color) -> Result<(), SceneError>;
    fn clear_ambient_light(&mut self) -> Result<(), SceneError>;
    fn add_point_light(&mut self, spec: PointLightSpec) -> Result<(), SceneError>;
    fn remove_point_light(&mut self, index: usize) -> Result<(), SceneError>;

    fn enable_orbital_controls(&mut self) -> Result<(), SceneError>;
    fn disable_orbital_controls(&mut self) -> Result<(), SceneError>;
    fn enable_fps_controls(&mut self, spec: FpsControlSpec) -> Result<(), SceneError>;
    fn disable_fps_controls(&mut self) -> Result<(), SceneError>;

    fn add_cube_map(&mut self, spec: CubeMapSpec) -> Result<(), SceneError>;
    fn remove_cube_map(&mut self, index: usize) -> Result<(), SceneError>;

    fn add_model(&mut self, spec: ModelSpec) -> Result<(), SceneError>;
    fn remove_model(&mut self, index: usize) -> Result<(), SceneError>;

    fn add_axis_helper(&mut self, size: f32) -> Result<(), SceneError>;
    fn remove_axis_helper(&mut self) -> Result<(), SceneError>;
    fn add_grid_helper(&mut self, spec: GridHelperSpec) -> Result<(), SceneError>;
    fn remove_grid_helper(&mut self) -> Result<(), SceneError>;

    /// Begin continuous rendering. Calling it again has no further effect.
    fn start(&mut self) -> Result<(), SceneError>;

    /// Tear down all scene content.
    fn reset(&mut self);
}
