//! Command dispatcher.
//!
//! Resolves a decoded [`Command`] against the catalog, coerces its positional
//! parameters into the typed arguments of one [`Scene`] call, and only then
//! invokes the scene. A command that fails validation never touches the scene.

use glam::Vec3;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::catalog::{Operation, ParamSpec};
use crate::command::Command;
use crate::error::ScriptError;
use crate::param::{Color, Param};
use crate::scene::{
    CubeMapSpec, FpsControlSpec, GridHelperSpec, InstancedShapeSpec, MapCell, Material, ModelSpec,
    PointLightSpec, Scene, SceneError, Shape, ShapeSpec, ShapeType,
};
use crate::tokenizer::{normalize, parse_command, raw_commands};

const DEFAULT_POINT_INTENSITY: i64 = 3;
const DEFAULT_POINT_DISTANCE: i64 = 100;
const DEFAULT_AXIS_SIZE: i64 = 5;
const DEFAULT_GRID_SIZE: i64 = 10;
const DEFAULT_GRID_DIVISIONS: i64 = 10;
const DEFAULT_MODEL_SCALE: i64 = 1;

/// One fully typed scene invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    AddShape(ShapeSpec),
    AddInstancedShapes(InstancedShapeSpec),
    RemoveShape(ShapeType, usize),
    RemoveInstancedShapes(ShapeType, usize),
    SetAmbientLight(Color),
    ClearAmbientLight,
    AddPointLight(PointLightSpec),
    RemovePointLight(usize),
    EnableOrbitalControls,
    DisableOrbitalControls,
    EnableFpsControls(FpsControlSpec),
    DisableFpsControls,
    AddCubeMap(CubeMapSpec),
    RemoveCubeMap(usize),
    AddModel(ModelSpec),
    RemoveModel(usize),
    AddAxisHelper(f32),
    RemoveAxisHelper,
    AddGridHelper(GridHelperSpec),
    RemoveGridHelper,
    Start,
    Reset,
}

impl SceneCall {
    pub fn apply<S: Scene + ?Sized>(self, scene: &mut S) -> Result<(), SceneError> {
        match self {
            SceneCall::AddShape(spec) => scene.add_shape(spec),
            SceneCall::AddInstancedShapes(spec) => scene.add_instanced_shapes(spec),
            SceneCall::RemoveShape(shape, index) => scene.remove_shape(shape, index),
            SceneCall::RemoveInstancedShapes(shape, index) => {
                scene.remove_instanced_shapes(shape, index)
            }
            SceneCall::SetAmbientLight(color) => scene.set_ambient_light(color),
            SceneCall::ClearAmbientLight => scene.clear_ambient_light(),
            SceneCall::AddPointLight(spec) => scene.add_point_light(spec),
            SceneCall::RemovePointLight(index) => scene.remove_point_light(index),
            SceneCall::EnableOrbitalControls => scene.enable_orbital_controls(),
            SceneCall::DisableOrbitalControls => scene.disable_orbital_controls(),
            SceneCall::EnableFpsControls(spec) => scene.enable_fps_controls(spec),
            SceneCall::DisableFpsControls => scene.disable_fps_controls(),
            SceneCall::AddCubeMap(spec) => scene.add_cube_map(spec),
            SceneCall::RemoveCubeMap(index) => scene.remove_cube_map(index),
            SceneCall::AddModel(spec) => scene.add_model(spec),
            SceneCall::RemoveModel(index) => scene.remove_model(index),
            SceneCall::AddAxisHelper(size) => scene.add_axis_helper(size),
            SceneCall::RemoveAxisHelper => scene.remove_axis_helper(),
            SceneCall::AddGridHelper(spec) => scene.add_grid_helper(spec),
            SceneCall::RemoveGridHelper => scene.remove_grid_helper(),
            SceneCall::Start => scene.start(),
            SceneCall::Reset => {
                scene.reset();
                Ok(())
            }
        }
    }
}

/// Dispatch a single command. Errors report position 0.
pub fn dispatch<S: Scene + ?Sized>(scene: &mut S, command: &Command) -> Result<(), ScriptError> {
    dispatch_at(scene, 0, command)
}

/// Dispatch the command found at `position` in its script.
pub fn dispatch_at<S: Scene + ?Sized>(
    scene: &mut S,
    position: usize,
    command: &Command,
) -> Result<(), ScriptError> {
    let call = prepare(position, command)?;
    call.apply(scene)
        .map_err(|source| ScriptError::Scene {
            command: position,
            source,
        })
}

/// Resolve and validate a command without invoking anything.
pub fn prepare(position: usize, command: &Command) -> Result<SceneCall, ScriptError> {
    let op = command
        .operation()
        .ok_or(ScriptError::UnrecognizedCommand {
            command: position,
            category: command.category,
            subcategory: command.subcategory,
            function: command.function,
        })?;
    let args = Args::new(op, position, &command.params)?;

    let call = match op {
        Operation::AddShape(shape) => {
            let at = args.vec3_at(0)?;
            let (shape, next) = args.shape(shape, 3)?;
            SceneCall::AddShape(ShapeSpec {
                shape,
                position: at,
                material: args.material(next)?,
            })
        }
        Operation::AddInstancedShapes(shape) => {
            let positions = args.positions(0)?;
            let (shape, next) = args.shape(shape, 1)?;
            SceneCall::AddInstancedShapes(InstancedShapeSpec {
                shape,
                positions,
                material: args.material(next)?,
            })
        }
        Operation::RemoveShape(shape) => SceneCall::RemoveShape(shape, args.index(0)?),
        Operation::RemoveInstancedShapes(shape) => {
            SceneCall::RemoveInstancedShapes(shape, args.index(0)?)
        }
        Operation::SetAmbientLight => SceneCall::SetAmbientLight(args.color(0)?),
        Operation::ClearAmbientLight => SceneCall::ClearAmbientLight,
        Operation::AddPointLight => SceneCall::AddPointLight(PointLightSpec {
            position: args.vec3(0)?,
            color: args.color(1)?,
            intensity: args.int_or(2, DEFAULT_POINT_INTENSITY)? as f32,
            distance: args.int_or(3, DEFAULT_POINT_DISTANCE)? as f32,
        }),
        Operation::RemovePointLight => SceneCall::RemovePointLight(args.index(0)?),
        Operation::EnableOrbitalControls => SceneCall::EnableOrbitalControls,
        Operation::DisableOrbitalControls => SceneCall::DisableOrbitalControls,
        Operation::EnableFpsControls => {
            let defaults = FpsControlSpec::default();
            SceneCall::EnableFpsControls(FpsControlSpec {
                movement_speed: args.float_or(0, defaults.movement_speed)?,
                look_speed: args.float_or(1, defaults.look_speed)?,
            })
        }
        Operation::DisableFpsControls => SceneCall::DisableFpsControls,
        Operation::AddCubeMap => SceneCall::AddCubeMap(CubeMapSpec {
            layout: args.layout(0)?,
            scale: args.float(1)?,
            origin: args.vec3(2)?,
            floor: Material {
                color: args.color(3)?,
                texture: args.texture(5)?,
            },
            wall: Material {
                color: args.color(4)?,
                texture: args.texture(6)?,
            },
        }),
        Operation::RemoveCubeMap => SceneCall::RemoveCubeMap(args.index(0)?),
        Operation::AddModel => SceneCall::AddModel(ModelSpec {
            path: args.text(0)?,
            position: args.vec3_at(1)?,
            scale_factor: args.int_or(4, DEFAULT_MODEL_SCALE)? as f32,
        }),
        Operation::RemoveModel => SceneCall::RemoveModel(args.index(0)?),
        Operation::AddAxisHelper => {
            SceneCall::AddAxisHelper(args.int_or(0, DEFAULT_AXIS_SIZE)? as f32)
        }
        Operation::RemoveAxisHelper => SceneCall::RemoveAxisHelper,
        Operation::AddGridHelper => SceneCall::AddGridHelper(GridHelperSpec {
            size: args.int_or(0, DEFAULT_GRID_SIZE)? as f32,
            divisions: args.count_or(1, DEFAULT_GRID_DIVISIONS)?,
        }),
        Operation::RemoveGridHelper => SceneCall::RemoveGridHelper,
    };
    Ok(call)
}

/// Outcome of a successful replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    /// Number of commands dispatched.
    pub commands: usize,
    /// SHA-256 of the normalized script text.
    pub fingerprint: String,
}

/// SHA-256 of a script after normalization, as lowercase hex.
pub fn fingerprint(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(script).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Reset the scene, then decode and dispatch every command in order without
/// starting it.
///
/// Replay stops at the first command that fails to decode or dispatch: every
/// command before it stays applied, it and everything after it are not.
pub fn replay<S: Scene + ?Sized>(
    scene: &mut S,
    script: &str,
) -> Result<ReplaySummary, ScriptError> {
    scene.reset();

    let text = normalize(script);
    let mut count = 0;
    for (position, raw) in raw_commands(&text) {
        let command = parse_command(position, raw)?;
        dispatch_at(scene, position, &command)?;
        count += 1;
    }
    log::info!("replayed {} commands", count);

    Ok(ReplaySummary {
        commands: count,
        fingerprint: fingerprint(script),
    })
}

/// [`replay`] the script, then start rendering.
pub fn run<S: Scene + ?Sized>(scene: &mut S, script: &str) -> Result<ReplaySummary, ScriptError> {
    let summary = replay(scene, script)?;
    scene.start().map_err(|source| ScriptError::Scene {
        command: summary.commands,
        source,
    })?;
    Ok(summary)
}

/// A scene that records every call it receives, in order.
///
/// `reset` clears the record before logging itself, so after a replay the
/// log holds exactly the calls of that replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallLog {
    pub calls: Vec<SceneCall>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, call: SceneCall) -> Result<(), SceneError> {
        self.calls.push(call);
        Ok(())
    }
}

impl Scene for CallLog {
    fn add_shape(&mut self, spec: ShapeSpec) -> Result<(), SceneError> {
        self.record(SceneCall::AddShape(spec))
    }
    fn add_instanced_shapes(&mut self, spec: InstancedShapeSpec) -> Result<(), SceneError> {
        self.record(SceneCall::AddInstancedShapes(spec))
    }
    fn remove_shape(&mut self, shape: ShapeType, index: usize) -> Result<(), SceneError> {
        self.record(SceneCall::RemoveShape(shape, index))
    }
    fn remove_instanced_shapes(
        &mut self,
        shape: ShapeType,
        index: usize,
    ) -> Result<(), SceneError> {
        self.record(SceneCall::RemoveInstancedShapes(shape, index))
    }
    fn set_ambient_light(&mut self, color: Color) -> Result<(), SceneError> {
        self.record(SceneCall::SetAmbientLight(color))
    }
    fn clear_ambient_light(&mut self) -> Result<(), SceneError> {
        self.record(SceneCall::ClearAmbientLight)
    }
    fn add_point_light(&mut self, spec: PointLightSpec) -> Result<(), SceneError> {
        self.record(SceneCall::AddPointLight(spec))
    }
    fn remove_point_light(&mut self, index: usize) -> Result<(), SceneError> {
        self.record(SceneCall::RemovePointLight(index))
    }
    fn enable_orbital_controls(&mut self) -> Result<(), SceneError> {
        self.record(SceneCall::EnableOrbitalControls)
    }
    fn disable_orbital_controls(&mut self) -> Result<(), SceneError> {
        self.record(SceneCall::DisableOrbitalControls)
    }
    fn enable_fps_controls(&mut self, spec: FpsControlSpec) -> Result<(), SceneError> {
        self.record(SceneCall::EnableFpsControls(spec))
    }
    fn disable_fps_controls(&mut self) -> Result<(), SceneError> {
        self.record(SceneCall::DisableFpsControls)
    }
    fn add_cube_map(&mut self, spec: CubeMapSpec) -> Result<(), SceneError> {
        self.record(SceneCall::AddCubeMap(spec))
    }
    fn remove_cube_map(&mut self, index: usize) -> Result<(), SceneError> {
        self.record(SceneCall::RemoveCubeMap(index))
    }
    fn add_model(&mut self, spec: ModelSpec) -> Result<(), SceneError> {
        self.record(SceneCall::AddModel(spec))
    }
    fn remove_model(&mut self, index: usize) -> Result<(), SceneError> {
        self.record(SceneCall::RemoveModel(index))
    }
    fn add_axis_helper(&mut self, size: f32) -> Result<(), SceneError> {
        self.record(SceneCall::AddAxisHelper(size))
    }
    fn remove_axis_helper(&mut self) -> Result<(), SceneError> {
        self.record(SceneCall::RemoveAxisHelper)
    }
    fn add_grid_helper(&mut self, spec: GridHelperSpec) -> Result<(), SceneError> {
        self.record(SceneCall::AddGridHelper(spec))
    }
    fn remove_grid_helper(&mut self) -> Result<(), SceneError> {
        self.record(SceneCall::RemoveGridHelper)
    }
    fn start(&mut self) -> Result<(), SceneError> {
        self.record(SceneCall::Start)
    }
    fn reset(&mut self) {
        self.calls.clear();
        self.calls.push(SceneCall::Reset);
    }
}

/// Positional parameters of one command, checked against its declaration.
struct Args<'a> {
    op: Operation,
    position: usize,
    params: &'a [Param],
    specs: &'static [ParamSpec],
}

impl<'a> Args<'a> {
    fn new(op: Operation, position: usize, params: &'a [Param]) -> Result<Self, ScriptError> {
        let (min, max) = op.arity();
        // Parameterless commands are conventionally written with a lone `^`.
        let params = if max == 0 && params == [Param::Null] {
            &params[..0]
        } else {
            params
        };

        if params.len() < min || params.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            return Err(ScriptError::ParameterArity {
                command: position,
                operation: op.name(),
                expected,
                found: params.len(),
            });
        }

        Ok(Self {
            op,
            position,
            params,
            specs: op.params(),
        })
    }

    fn mismatch(
        &self,
        index: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> ScriptError {
        ScriptError::ParameterType {
            command: self.position,
            operation: self.op.name(),
            index,
            name: self.specs.get(index).map(|s| s.name).unwrap_or("?"),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// The parameter at `index`, or `None` when an optional one was omitted
    /// or given as null.
    fn optional(&self, index: usize) -> Option<&'a Param> {
        match self.params.get(index) {
            None | Some(Param::Null) => None,
            Some(param) => Some(param),
        }
    }

    fn required(&self, index: usize) -> Result<&'a Param, ScriptError> {
        match self.params.get(index) {
            Some(param) => Ok(param),
            None => Err(self.mismatch(index, "a value", "nothing")),
        }
    }

    fn int(&self, index: usize) -> Result<i64, ScriptError> {
        match self.required(index)? {
            Param::Int(v) => Ok(*v),
            other => Err(self.mismatch(index, "integer", other.kind_name())),
        }
    }

    fn int_or(&self, index: usize, default: i64) -> Result<i64, ScriptError> {
        match self.optional(index) {
            None => Ok(default),
            Some(_) => self.int(index),
        }
    }

    fn float(&self, index: usize) -> Result<f32, ScriptError> {
        self.int(index).map(|v| v as f32)
    }

    fn float_or(&self, index: usize, default: f32) -> Result<f32, ScriptError> {
        match self.optional(index) {
            None => Ok(default),
            Some(_) => self.float(index),
        }
    }

    fn positive_count(&self, index: usize, value: i64) -> Result<u32, ScriptError> {
        match u32::try_from(value) {
            Ok(count) if count > 0 => Ok(count),
            _ => Err(self.mismatch(index, "positive integer", value.to_string())),
        }
    }

    fn count(&self, index: usize) -> Result<u32, ScriptError> {
        let value = self.int(index)?;
        self.positive_count(index, value)
    }

    fn count_or(&self, index: usize, default: i64) -> Result<u32, ScriptError> {
        let value = self.int_or(index, default)?;
        self.positive_count(index, value)
    }

    fn index(&self, index: usize) -> Result<usize, ScriptError> {
        let value = self.int(index)?;
        usize::try_from(value)
            .map_err(|_| self.mismatch(index, "non-negative index", value.to_string()))
    }

    fn color(&self, index: usize) -> Result<Color, ScriptError> {
        match self.required(index)? {
            Param::Color(color) => Ok(color.clone()),
            other => Err(self.mismatch(index, "color", other.kind_name())),
        }
    }

    fn single_string(&self, index: usize, param: &Param) -> Result<String, ScriptError> {
        match param {
            Param::StrList(items) if items.len() == 1 => Ok(items[0].clone()),
            Param::StrList(items) => Err(self.mismatch(
                index,
                "a single string",
                format!("{} strings", items.len()),
            )),
            other => Err(self.mismatch(index, "string", other.kind_name())),
        }
    }

    fn text(&self, index: usize) -> Result<String, ScriptError> {
        let param = self.required(index)?;
        self.single_string(index, param)
    }

    fn texture(&self, index: usize) -> Result<Option<String>, ScriptError> {
        match self.optional(index) {
            None => Ok(None),
            Some(param) => self.single_string(index, param).map(Some),
        }
    }

    fn material(&self, index: usize) -> Result<Material, ScriptError> {
        Ok(Material {
            color: self.color(index)?,
            texture: self.texture(index + 1)?,
        })
    }

    /// Three consecutive integer parameters starting at `index`.
    fn vec3_at(&self, index: usize) -> Result<Vec3, ScriptError> {
        Ok(Vec3::new(
            self.float(index)?,
            self.float(index + 1)?,
            self.float(index + 2)?,
        ))
    }

    fn triple(&self, index: usize, cells: &[i64]) -> Result<Vec3, ScriptError> {
        match cells {
            [x, y, z] => Ok(Vec3::new(*x as f32, *y as f32, *z as f32)),
            _ => Err(self.mismatch(index, "[x, y, z]", format!("{} numbers", cells.len()))),
        }
    }

    /// A `$` list of three numbers.
    fn vec3(&self, index: usize) -> Result<Vec3, ScriptError> {
        match self.required(index)? {
            Param::NumList(cells) => self.triple(index, cells),
            other => Err(self.mismatch(index, "number list", other.kind_name())),
        }
    }

    fn grid(&self, index: usize) -> Result<&'a [Vec<i64>], ScriptError> {
        match self.required(index)? {
            Param::NumGrid(rows) => Ok(rows),
            other => Err(self.mismatch(index, "2D number list", other.kind_name())),
        }
    }

    fn positions(&self, index: usize) -> Result<Vec<Vec3>, ScriptError> {
        self.grid(index)?
            .iter()
            .map(|row| self.triple(index, row))
            .collect()
    }

    fn layout(&self, index: usize) -> Result<Vec<Vec<MapCell>>, ScriptError> {
        self.grid(index)?
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&cell| match cell {
                        0 => Ok(MapCell::Empty),
                        1 => Ok(MapCell::Floor),
                        n => u32::try_from(n)
                            .map(|n| MapCell::Wall(n - 1))
                            .map_err(|_| self.mismatch(index, "non-negative cell", n.to_string())),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    /// Geometry parameters of `shape` starting at `index`, and the index of
    /// the first parameter after them.
    fn shape(&self, shape: ShapeType, index: usize) -> Result<(Shape, usize), ScriptError> {
        let parsed = match shape {
            ShapeType::Box => (
                Shape::Box {
                    scale: self.vec3_at(index)?,
                },
                index + 3,
            ),
            ShapeType::Sphere => (
                Shape::Sphere {
                    radius: self.float(index)?,
                },
                index + 1,
            ),
            ShapeType::Cylinder => (
                Shape::Cylinder {
                    radius_top: self.float(index)?,
                    radius_bottom: self.float(index + 1)?,
                    height: self.float(index + 2)?,
                },
                index + 3,
            ),
            ShapeType::Cone => (
                Shape::Cone {
                    radius: self.float(index)?,
                    height: self.float(index + 1)?,
                },
                index + 2,
            ),
            ShapeType::Torus => (
                Shape::Torus {
                    radius: self.float(index)?,
                    tube_radius: self.float(index + 1)?,
                    radial_segments: self.count(index + 2)?,
                    tubular_segments: self.count(index + 3)?,
                    // Scripts give the arc in degrees.
                    arc: self.float(index + 4)?.to_radians(),
                },
                index + 5,
            ),
        };
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn white() -> Color {
        Color::parse("#FFFFFF").unwrap()
    }

    fn single(script: &str) -> Command {
        let mut commands = tokenize(script).unwrap();
        assert_eq!(commands.len(), 1);
        commands.remove(0)
    }

    #[test]
    fn test_add_single_box() {
        let call = prepare(0, &single("0:0:0:.0.0.0.1.1.1#FFFFFF^n")).unwrap();
        assert_eq!(
            call,
            SceneCall::AddShape(ShapeSpec {
                shape: Shape::Box {
                    scale: Vec3::new(1.0, 1.0, 1.0)
                },
                position: Vec3::ZERO,
                material: Material::color(white()),
            })
        );
    }

    #[test]
    fn test_add_instanced_spheres_without_texture() {
        let call = prepare(0, &single("0:1:1:=2,0,0;2,0,-2;2,0,2.1#FFFFFF")).unwrap();
        assert_eq!(
            call,
            SceneCall::AddInstancedShapes(InstancedShapeSpec {
                shape: Shape::Sphere { radius: 1.0 },
                positions: vec![
                    Vec3::new(2.0, 0.0, 0.0),
                    Vec3::new(2.0, 0.0, -2.0),
                    Vec3::new(2.0, 0.0, 2.0),
                ],
                material: Material::color(white()),
            })
        );
    }

    #[test]
    fn test_torus_arc_in_degrees() {
        let call = prepare(0, &single("0:4:0:.0.1.0.3.1.20.100.180#FFFFFF@wood")).unwrap();
        match call {
            SceneCall::AddShape(ShapeSpec {
                shape: Shape::Torus { arc, radial_segments, .. },
                material,
                ..
            }) => {
                assert!((arc - std::f32::consts::PI).abs() < 1e-6);
                assert_eq!(radial_segments, 20);
                assert_eq!(material.texture.as_deref(), Some("wood"));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn test_unknown_category_does_not_touch_scene() {
        let mut log = CallLog::new();
        let err = dispatch(&mut log, &Command::new(9, 0, 0, vec![])).unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnrecognizedCommand {
                command: 0,
                category: 9,
                subcategory: 0,
                function: 0,
            }
        );
        assert!(log.calls.is_empty());
    }

    #[test]
    fn test_arity_mismatch() {
        let err = prepare(3, &single("0:0:0:.0.0.0.1.1")).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::ParameterArity { command: 3, found: 5, .. }
        ));

        let err = prepare(0, &single("2:0:0:.1")).unwrap_err();
        assert!(matches!(err, ScriptError::ParameterArity { found: 1, .. }));
    }

    #[test]
    fn test_lone_null_placeholder() {
        assert_eq!(
            prepare(0, &single("2:0:0:^n")).unwrap(),
            SceneCall::EnableOrbitalControls
        );
        assert!(prepare(0, &single("2:0:0:^^")).is_err());
    }

    #[test]
    fn test_type_mismatch() {
        let err = prepare(0, &single("1:0:0:.5")).unwrap_err();
        match err {
            ScriptError::ParameterType { index, name, expected, .. } => {
                assert_eq!(index, 0);
                assert_eq!(name, "color");
                assert_eq!(expected, "color");
            }
            other => panic!("unexpected error {other:?}"),
        }

        // Position rows need three coordinates.
        assert!(prepare(0, &single("0:0:1:=1,2.1.1.1#FFFFFF")).is_err());
    }

    #[test]
    fn test_negative_index_rejected() {
        let err = prepare(0, &single("0:0:2:.-1")).unwrap_err();
        assert!(matches!(err, ScriptError::ParameterType { .. }));
    }

    #[test]
    fn test_point_light_defaults() {
        let call = prepare(0, &single("1:1:0:$10;5;10#FFFFFF")).unwrap();
        assert_eq!(
            call,
            SceneCall::AddPointLight(PointLightSpec {
                position: Vec3::new(10.0, 5.0, 10.0),
                color: white(),
                intensity: 3.0,
                distance: 100.0,
            })
        );
    }

    #[test]
    fn test_fps_defaults() {
        assert_eq!(
            prepare(0, &single("2:1:0:")).unwrap(),
            SceneCall::EnableFpsControls(FpsControlSpec::default())
        );
        assert_eq!(
            prepare(0, &single("2:1:0:.50")).unwrap(),
            SceneCall::EnableFpsControls(FpsControlSpec {
                movement_speed: 50.0,
                look_speed: 0.1,
            })
        );
    }

    #[test]
    fn test_cube_map_layout() {
        let call = prepare(0, &single("3:0:0:=1,2;0,4.1$0;0;0#FFFFFF#000000")).unwrap();
        match call {
            SceneCall::AddCubeMap(spec) => {
                assert_eq!(
                    spec.layout,
                    vec![
                        vec![MapCell::Floor, MapCell::Wall(1)],
                        vec![MapCell::Empty, MapCell::Wall(3)],
                    ]
                );
                assert_eq!(spec.wall.color.as_str(), "#000000");
                assert_eq!(spec.floor.texture, None);
            }
            other => panic!("unexpected call {other:?}"),
        }
        let err = prepare(0, &single("3:0:0:=1,-1.1$0;0;0#FFFFFF#000000")).unwrap_err();
        assert!(matches!(err, ScriptError::ParameterType { index: 0, .. }));
    }

    #[test]
    fn test_model_path() {
        // `.` starts a new token, so a path cannot carry a file extension.
        let err = tokenize("4:0:0:@models/castle.glb.1.0.2").unwrap_err();
        assert!(matches!(err, ScriptError::Decode { tag: '.', .. }));

        let call = prepare(0, &single("4:0:0:@castle.1.0.2")).unwrap();
        assert_eq!(
            call,
            SceneCall::AddModel(ModelSpec {
                path: "castle".to_string(),
                position: Vec3::new(1.0, 0.0, 2.0),
                scale_factor: 1.0,
            })
        );
    }

    #[test]
    fn test_run_orders_calls() {
        let mut log = CallLog::new();
        let summary = run(&mut log, "2:0:0:^n|1:0:0:#FFFFFF|0:0:2:.0").unwrap();
        assert_eq!(summary.commands, 3);
        assert_eq!(
            log.calls,
            vec![
                SceneCall::Reset,
                SceneCall::EnableOrbitalControls,
                SceneCall::SetAmbientLight(white()),
                SceneCall::RemoveShape(ShapeType::Box, 0),
                SceneCall::Start,
            ]
        );
    }

    #[test]
    fn test_run_stops_at_failing_command() {
        let mut log = CallLog::new();
        let err = run(&mut log, "2:0:0:|1:0:0:#FFFFFF|7:0:0:|2:0:1:").unwrap_err();
        assert_eq!(err.command(), Some(2));
        assert_eq!(
            log.calls,
            vec![
                SceneCall::Reset,
                SceneCall::EnableOrbitalControls,
                SceneCall::SetAmbientLight(white()),
            ]
        );
    }

    #[test]
    fn test_decode_failure_keeps_earlier_commands() {
        let mut log = CallLog::new();
        run(&mut log, "0:0:0:.0.0.0.1.1.1#FFFFFF").unwrap();

        let err = run(&mut log, "2:0:0:|1:0:0:#FFF|2:0:1:").unwrap_err();
        assert!(matches!(err, ScriptError::Decode { command: 1, .. }));
        assert_eq!(log.calls, vec![SceneCall::Reset, SceneCall::EnableOrbitalControls]);
    }

    #[test]
    fn test_replay_does_not_start() {
        let mut log = CallLog::new();
        replay(&mut log, "5:0:0:").unwrap();
        assert_eq!(log.calls, vec![SceneCall::Reset, SceneCall::AddAxisHelper(5.0)]);
    }

    #[test]
    fn test_fingerprint_ignores_line_breaks() {
        assert_eq!(fingerprint("2:0:0:\n|1:0:0:#FFFFFF"), fingerprint("2:0:0:|1:0:0:#FFFFFF"));
        assert_ne!(fingerprint("2:0:0:"), fingerprint("2:0:1:"));
    }
}
