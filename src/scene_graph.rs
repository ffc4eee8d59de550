//! In-memory scene graph.
//!
//! Holds the content built by a replayed script: every added element becomes
//! an entity, and each collection keeps its entities in insertion order so
//! that remove operations can address them by index.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::param::Color;
use crate::scene::{
    CubeMapSpec, FpsControlSpec, GridHelperSpec, InstancedShapeSpec, ModelSpec, PointLightSpec,
    Scene, SceneError, ShapeSpec, ShapeType,
};

/// Unique identifier for scene entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub u64);

/// An indexable group of entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Shapes(ShapeType),
    InstancedShapes(ShapeType),
    PointLights,
    CubeMaps,
    Models,
}

impl Collection {
    pub fn label(self) -> String {
        match self {
            Collection::Shapes(shape) => format!("{} meshes", shape.name()),
            Collection::InstancedShapes(shape) => format!("instanced {} meshes", shape.name()),
            Collection::PointLights => "point lights".to_string(),
            Collection::CubeMaps => "cube maps".to_string(),
            Collection::Models => "models".to_string(),
        }
    }
}

/// A scene entity.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEntity {
    Mesh(ShapeSpec),
    Instanced(InstancedShapeSpec),
    PointLight(PointLightSpec),
    CubeMap(CubeMapSpec),
    Model(ModelSpec),
}

impl SceneEntity {
    pub fn collection(&self) -> Collection {
        match self {
            SceneEntity::Mesh(spec) => Collection::Shapes(spec.shape.shape_type()),
            SceneEntity::Instanced(spec) => Collection::InstancedShapes(spec.shape.shape_type()),
            SceneEntity::PointLight(_) => Collection::PointLights,
            SceneEntity::CubeMap(_) => Collection::CubeMaps,
            SceneEntity::Model(_) => Collection::Models,
        }
    }
}

/// Snapshot of scene contents for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub entities: usize,
    pub collections: BTreeMap<String, usize>,
    /// Blocks built by all cube maps, walls included.
    pub cube_map_blocks: usize,
    pub ambient_light: Option<Color>,
    pub orbital_controls: bool,
    pub fps_controls: bool,
    pub axis_helper: bool,
    pub grid_helper: bool,
    pub started: bool,
}

/// The scene graph: all entities created by the current script.
#[derive(Debug)]
pub struct SceneGraph {
    /// All entities indexed by their ID.
    pub entities: HashMap<EntityId, SceneEntity>,
    /// Entity IDs of each collection, in insertion order.
    collections: HashMap<Collection, Vec<EntityId>>,
    ambient_light: Option<Color>,
    orbital_controls: bool,
    fps_controls: Option<FpsControlSpec>,
    axis_helper: Option<f32>,
    grid_helper: Option<GridHelperSpec>,
    started: bool,
    /// Next entity ID to assign.
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            collections: HashMap::new(),
            ambient_light: None,
            orbital_controls: false,
            fps_controls: None,
            axis_helper: None,
            grid_helper: None,
            started: false,
            next_id: 1,
        }
    }

    /// Generate a new unique entity ID.
    fn new_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, entity: SceneEntity) -> EntityId {
        let id = self.new_id();
        self.collections
            .entry(entity.collection())
            .or_default()
            .push(id);
        self.entities.insert(id, entity);
        id
    }

    /// Remove exactly the `index`-th entity of `collection`.
    fn remove_at(&mut self, collection: Collection, index: usize) -> Result<EntityId, SceneError> {
        let ids = self.collections.entry(collection).or_default();
        if index >= ids.len() {
            return Err(SceneError::IndexOutOfRange {
                collection: collection.label(),
                index,
                len: ids.len(),
            });
        }
        let id = ids.remove(index);
        self.entities.remove(&id);
        Ok(id)
    }

    /// Get a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(&id)
    }

    /// Entities of one collection, in insertion order.
    pub fn collection(
        &self,
        collection: Collection,
    ) -> impl Iterator<Item = (EntityId, &SceneEntity)> {
        self.collections
            .get(&collection)
            .into_iter()
            .flatten()
            .filter_map(|&id| self.entities.get(&id).map(|e| (id, e)))
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collections.get(&collection).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ambient_light(&self) -> Option<&Color> {
        self.ambient_light.as_ref()
    }

    pub fn orbital_controls(&self) -> bool {
        self.orbital_controls
    }

    pub fn fps_controls(&self) -> Option<&FpsControlSpec> {
        self.fps_controls.as_ref()
    }

    pub fn axis_helper(&self) -> Option<f32> {
        self.axis_helper
    }

    pub fn grid_helper(&self) -> Option<&GridHelperSpec> {
        self.grid_helper.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn summary(&self) -> SceneSummary {
        let collections = self
            .collections
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(collection, ids)| (collection.label(), ids.len()))
            .collect();
        let cube_map_blocks = self
            .collection(Collection::CubeMaps)
            .map(|(_, entity)| match entity {
                SceneEntity::CubeMap(spec) => spec.block_count(),
                _ => 0,
            })
            .sum();
        SceneSummary {
            entities: self.entities.len(),
            collections,
            cube_map_blocks,
            ambient_light: self.ambient_light.clone(),
            orbital_controls: self.orbital_controls,
            fps_controls: self.fps_controls.is_some(),
            axis_helper: self.axis_helper.is_some(),
            grid_helper: self.grid_helper.is_some(),
            started: self.started,
        }
    }

    /// Clear all entities and scene state.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for SceneGraph {
    fn add_shape(&mut self, spec: ShapeSpec) -> Result<(), SceneError> {
        self.insert(SceneEntity::Mesh(spec));
        Ok(())
    }

    fn add_instanced_shapes(&mut self, spec: InstancedShapeSpec) -> Result<(), SceneError> {
        self.insert(SceneEntity::Instanced(spec));
        Ok(())
    }

    fn remove_shape(&mut self, shape: ShapeType, index: usize) -> Result<(), SceneError> {
        self.remove_at(Collection::Shapes(shape), index).map(|_| ())
    }

    fn remove_instanced_shapes(
        &mut self,
        shape: ShapeType,
        index: usize,
    ) -> Result<(), SceneError> {
        self.remove_at(Collection::InstancedShapes(shape), index)
            .map(|_| ())
    }

    fn set_ambient_light(&mut self, color: Color) -> Result<(), SceneError> {
        // A second ambient light replaces the first.
        self.ambient_light = Some(color);
        Ok(())
    }

    fn clear_ambient_light(&mut self) -> Result<(), SceneError> {
        self.ambient_light = None;
        Ok(())
    }

    fn add_point_light(&mut self, spec: PointLightSpec) -> Result<(), SceneError> {
        self.insert(SceneEntity::PointLight(spec));
        Ok(())
    }

    fn remove_point_light(&mut self, index: usize) -> Result<(), SceneError> {
        self.remove_at(Collection::PointLights, index).map(|_| ())
    }

    fn enable_orbital_controls(&mut self) -> Result<(), SceneError> {
        self.orbital_controls = true;
        Ok(())
    }

    fn disable_orbital_controls(&mut self) -> Result<(), SceneError> {
        self.orbital_controls = false;
        Ok(())
    }

    fn enable_fps_controls(&mut self, spec: FpsControlSpec) -> Result<(), SceneError> {
        self.fps_controls = Some(spec);
        Ok(())
    }

    fn disable_fps_controls(&mut self) -> Result<(), SceneError> {
        self.fps_controls = None;
        Ok(())
    }

    fn add_cube_map(&mut self, spec: CubeMapSpec) -> Result<(), SceneError> {
        self.insert(SceneEntity::CubeMap(spec));
        Ok(())
    }

    fn remove_cube_map(&mut self, index: usize) -> Result<(), SceneError> {
        self.remove_at(Collection::CubeMaps, index).map(|_| ())
    }

    fn add_model(&mut self, spec: ModelSpec) -> Result<(), SceneError> {
        self.insert(SceneEntity::Model(spec));
        Ok(())
    }

    fn remove_model(&mut self, index: usize) -> Result<(), SceneError> {
        self.remove_at(Collection::Models, index).map(|_| ())
    }

    fn add_axis_helper(&mut self, size: f32) -> Result<(), SceneError> {
        self.axis_helper = Some(size);
        Ok(())
    }

    fn remove_axis_helper(&mut self) -> Result<(), SceneError> {
        self.axis_helper = None;
        Ok(())
    }

    fn add_grid_helper(&mut self, spec: GridHelperSpec) -> Result<(), SceneError> {
        self.grid_helper = Some(spec);
        Ok(())
    }

    fn remove_grid_helper(&mut self) -> Result<(), SceneError> {
        self.grid_helper = None;
        Ok(())
    }

    fn start(&mut self) -> Result<(), SceneError> {
        if !self.started {
            log::debug!("scene started with {} entities", self.entities.len());
        }
        self.started = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MapCell, Material, Shape};
    use glam::Vec3;

    fn sphere_at(x: f32) -> ShapeSpec {
        ShapeSpec {
            shape: Shape::Sphere { radius: 1.0 },
            position: Vec3::new(x, 0.0, 0.0),
            material: Material::color(Color::white()),
        }
    }

    #[test]
    fn test_add_shape() {
        let mut scene = SceneGraph::new();
        scene.add_shape(sphere_at(0.0)).unwrap();

        assert_eq!(scene.len(Collection::Shapes(ShapeType::Sphere)), 1);
        assert_eq!(scene.len(Collection::Shapes(ShapeType::Box)), 0);

        let (id, entity) = scene.collection(Collection::Shapes(ShapeType::Sphere)).next().unwrap();
        assert_eq!(scene.get(id), Some(entity));
        assert_eq!(entity.collection(), Collection::Shapes(ShapeType::Sphere));
    }

    #[test]
    fn test_remove_exactly_one_by_index() {
        let mut scene = SceneGraph::new();
        for x in 0..3 {
            scene.add_shape(sphere_at(x as f32)).unwrap();
        }

        scene.remove_shape(ShapeType::Sphere, 1).unwrap();

        let xs: Vec<f32> = scene
            .collection(Collection::Shapes(ShapeType::Sphere))
            .map(|(_, e)| match e {
                SceneEntity::Mesh(spec) => spec.position.x,
                other => panic!("unexpected entity {other:?}"),
            })
            .collect();
        assert_eq!(xs, vec![0.0, 2.0]);
        assert_eq!(scene.entities.len(), 2);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut scene = SceneGraph::new();
        scene.add_shape(sphere_at(0.0)).unwrap();

        let err = scene.remove_shape(ShapeType::Sphere, 1).unwrap_err();
        assert_eq!(
            err,
            SceneError::IndexOutOfRange {
                collection: "sphere meshes".to_string(),
                index: 1,
                len: 1,
            }
        );
        assert!(scene.remove_point_light(0).is_err());
        assert_eq!(scene.entities.len(), 1);
    }

    #[test]
    fn test_collections_are_independent() {
        let mut scene = SceneGraph::new();
        scene.add_shape(sphere_at(0.0)).unwrap();
        scene
            .add_instanced_shapes(InstancedShapeSpec {
                shape: Shape::Sphere { radius: 1.0 },
                positions: vec![Vec3::ZERO, Vec3::X],
                material: Material::color(Color::white()),
            })
            .unwrap();

        scene.remove_instanced_shapes(ShapeType::Sphere, 0).unwrap();
        assert_eq!(scene.len(Collection::Shapes(ShapeType::Sphere)), 1);
        assert_eq!(scene.len(Collection::InstancedShapes(ShapeType::Sphere)), 0);
    }

    #[test]
    fn test_toggles_and_reset() {
        let mut scene = SceneGraph::new();
        scene.set_ambient_light(Color::white()).unwrap();
        scene.enable_orbital_controls().unwrap();
        scene.enable_fps_controls(FpsControlSpec::default()).unwrap();
        scene.add_axis_helper(5.0).unwrap();
        scene.add_shape(sphere_at(0.0)).unwrap();
        scene.start().unwrap();

        let summary = scene.summary();
        assert_eq!(summary.entities, 1);
        assert_eq!(summary.collections.get("sphere meshes"), Some(&1));
        assert!(summary.orbital_controls && summary.fps_controls && summary.axis_helper);
        assert!(!summary.grid_helper);
        assert!(summary.started);

        scene.disable_orbital_controls().unwrap();
        scene.remove_axis_helper().unwrap();
        assert!(!scene.orbital_controls());
        assert_eq!(scene.axis_helper(), None);

        scene.reset();
        assert!(scene.is_empty());
        assert_eq!(scene.ambient_light(), None);
        assert!(scene.fps_controls().is_none());
        assert!(!scene.is_started());
    }

    #[test]
    fn test_summary_counts_cube_map_blocks() {
        let mut scene = SceneGraph::new();
        scene
            .add_cube_map(CubeMapSpec {
                layout: vec![vec![MapCell::Wall(2), MapCell::Empty, MapCell::Floor]],
                scale: 1.0,
                origin: Vec3::ZERO,
                floor: Material::color(Color::white()),
                wall: Material::color(Color::white()),
            })
            .unwrap();

        let summary = scene.summary();
        assert_eq!(summary.collections.get("cube maps"), Some(&1));
        assert_eq!(summary.cube_map_blocks, 4);

        scene.remove_cube_map(0).unwrap();
        assert_eq!(scene.summary().cube_map_blocks, 0);
    }

    #[test]
    fn test_ids_are_unique_after_removal() {
        let mut scene = SceneGraph::new();
        scene.add_shape(sphere_at(0.0)).unwrap();
        scene.remove_shape(ShapeType::Sphere, 0).unwrap();
        scene.add_shape(sphere_at(1.0)).unwrap();
        let (id, _) = scene.collection(Collection::Shapes(ShapeType::Sphere)).next().unwrap();
        assert_eq!(id, EntityId(2));
    }
}
