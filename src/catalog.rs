//! The fixed operation catalog.
//!
//! Maps every `(category, subcategory, function)` path to exactly one scene
//! operation, together with the declared kind of each positional parameter.

use serde::Serialize;

use crate::param::{Color, Param, CELL_SEPARATOR, ROW_SEPARATOR};
use crate::scene::ShapeType;

/// Declared kind of one positional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// `.` integer.
    Int,
    /// `#` color literal.
    Color,
    /// `=` list of `[x, y, z]` rows.
    Positions,
    /// `$` list of exactly three numbers.
    Vec3,
    /// `@` list holding one string.
    Text,
    /// `^` for none, or `@` with one texture name.
    Texture,
    /// `=` grid of cube map cells.
    Layout,
}

impl ParamKind {
    pub fn describe(self) -> &'static str {
        match self {
            ParamKind::Int => "integer",
            ParamKind::Color => "color",
            ParamKind::Positions => "list of [x, y, z] positions",
            ParamKind::Vec3 => "[x, y, z]",
            ParamKind::Text => "text",
            ParamKind::Texture => "texture name or null",
            ParamKind::Layout => "2D layout grid",
        }
    }

    /// Convert raw form-field text into a parameter of this kind.
    ///
    /// Lists may be written in bracket notation (`[[0,0,0],[2,0,2]]`) or in
    /// script notation (`0,0,0;2,0,2`).
    pub fn parse_input(self, text: &str) -> Result<Param, String> {
        let text = text.trim();
        match self {
            ParamKind::Int => text
                .parse::<i64>()
                .map(Param::Int)
                .map_err(|_| format!("'{}' is not a whole number", text)),
            ParamKind::Color => Color::parse(text).map(Param::Color),
            ParamKind::Positions | ParamKind::Layout => {
                let body = bracket_rows_to_body(text);
                Param::decode(crate::param::Tag::NumGrid, &body).map_err(|e| e.to_string())
            }
            ParamKind::Vec3 => {
                let body: String = text
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '[' && *c != ']')
                    .map(|c| if c == CELL_SEPARATOR { ROW_SEPARATOR } else { c })
                    .collect();
                Param::decode(crate::param::Tag::NumList, &body).map_err(|e| e.to_string())
            }
            ParamKind::Text if text.is_empty() => Err("text must not be empty".to_string()),
            ParamKind::Text => Ok(Param::StrList(vec![text.to_string()])),
            ParamKind::Texture if text.is_empty() => Ok(Param::Null),
            ParamKind::Texture => Ok(Param::StrList(vec![text.to_string()])),
        }
    }
}

fn bracket_rows_to_body(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .replace("],[", &ROW_SEPARATOR.to_string())
        .replace(['[', ']'], "")
}

/// One positional parameter of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Optional parameters may be omitted from the end of the list.
    pub optional: bool,
}

const fn required(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        optional: false,
    }
}

const fn optional(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        optional: true,
    }
}

const INDEX: &[ParamSpec] = &[required("index", ParamKind::Int)];
const NONE: &[ParamSpec] = &[];

const BOX: &[ParamSpec] = &[
    required("x", ParamKind::Int),
    required("y", ParamKind::Int),
    required("z", ParamKind::Int),
    required("scaleX", ParamKind::Int),
    required("scaleY", ParamKind::Int),
    required("scaleZ", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const INSTANCED_BOX: &[ParamSpec] = &[
    required("positions", ParamKind::Positions),
    required("scaleX", ParamKind::Int),
    required("scaleY", ParamKind::Int),
    required("scaleZ", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const SPHERE: &[ParamSpec] = &[
    required("x", ParamKind::Int),
    required("y", ParamKind::Int),
    required("z", ParamKind::Int),
    required("radius", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const INSTANCED_SPHERE: &[ParamSpec] = &[
    required("positions", ParamKind::Positions),
    required("radius", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const CYLINDER: &[ParamSpec] = &[
    required("x", ParamKind::Int),
    required("y", ParamKind::Int),
    required("z", ParamKind::Int),
    required("radiusTop", ParamKind::Int),
    required("radiusBot", ParamKind::Int),
    required("height", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const INSTANCED_CYLINDER: &[ParamSpec] = &[
    required("positions", ParamKind::Positions),
    required("radiusTop", ParamKind::Int),
    required("radiusBot", ParamKind::Int),
    required("height", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const CONE: &[ParamSpec] = &[
    required("x", ParamKind::Int),
    required("y", ParamKind::Int),
    required("z", ParamKind::Int),
    required("radius", ParamKind::Int),
    required("height", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const INSTANCED_CONE: &[ParamSpec] = &[
    required("positions", ParamKind::Positions),
    required("radius", ParamKind::Int),
    required("height", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const TORUS: &[ParamSpec] = &[
    required("x", ParamKind::Int),
    required("y", ParamKind::Int),
    required("z", ParamKind::Int),
    required("radius", ParamKind::Int),
    required("tubeRadius", ParamKind::Int),
    required("radialSegments", ParamKind::Int),
    required("tubularSegments", ParamKind::Int),
    required("arc", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];
const INSTANCED_TORUS: &[ParamSpec] = &[
    required("positions", ParamKind::Positions),
    required("radius", ParamKind::Int),
    required("tubeRadius", ParamKind::Int),
    required("radialSegments", ParamKind::Int),
    required("tubularSegments", ParamKind::Int),
    required("arc", ParamKind::Int),
    required("color", ParamKind::Color),
    optional("texture", ParamKind::Texture),
];

const AMBIENT_LIGHT: &[ParamSpec] = &[required("color", ParamKind::Color)];
const POINT_LIGHT: &[ParamSpec] = &[
    required("position", ParamKind::Vec3),
    required("color", ParamKind::Color),
    optional("intensity", ParamKind::Int),
    optional("distance", ParamKind::Int),
];
const FPS_CONTROLS: &[ParamSpec] = &[
    optional("movementSpeed", ParamKind::Int),
    optional("lookSpeed", ParamKind::Int),
];
const CUBE_MAP: &[ParamSpec] = &[
    required("layout", ParamKind::Layout),
    required("scale", ParamKind::Int),
    required("origin", ParamKind::Vec3),
    required("floorColor", ParamKind::Color),
    required("wallColor", ParamKind::Color),
    optional("floorTexture", ParamKind::Texture),
    optional("wallTexture", ParamKind::Texture),
];
const MODEL: &[ParamSpec] = &[
    required("path", ParamKind::Text),
    required("x", ParamKind::Int),
    required("y", ParamKind::Int),
    required("z", ParamKind::Int),
    optional("scaleFactor", ParamKind::Int),
];
const AXIS_HELPER: &[ParamSpec] = &[optional("size", ParamKind::Int)];
const GRID_HELPER: &[ParamSpec] = &[
    optional("size", ParamKind::Int),
    optional("divisions", ParamKind::Int),
];

pub const CATEGORY_SHAPES: u32 = 0;
pub const CATEGORY_LIGHTS: u32 = 1;
pub const CATEGORY_CONTROLS: u32 = 2;
pub const CATEGORY_MAPS: u32 = 3;
pub const CATEGORY_MODELS: u32 = 4;
pub const CATEGORY_HELPERS: u32 = 5;

/// Menu label of a top-level category.
pub fn category_name(category: u32) -> Option<&'static str> {
    match category {
        CATEGORY_SHAPES => Some("basic shapes"),
        CATEGORY_LIGHTS => Some("lights"),
        CATEGORY_CONTROLS => Some("controls"),
        CATEGORY_MAPS => Some("maps"),
        CATEGORY_MODELS => Some("models"),
        CATEGORY_HELPERS => Some("helpers"),
        _ => None,
    }
}

/// Menu label of a subcategory.
pub fn subcategory_name(category: u32, subcategory: u32) -> Option<&'static str> {
    let names: &[&str] = match category {
        CATEGORY_SHAPES => &["boxes", "spheres", "cylinders", "cones", "toruses"],
        CATEGORY_LIGHTS => &["ambient lights", "point lights"],
        CATEGORY_CONTROLS => &["orbital controls", "FPS controls"],
        CATEGORY_MAPS => &["cube maps"],
        CATEGORY_MODELS => &["gltf models"],
        CATEGORY_HELPERS => &["axis helper", "grid helper"],
        _ => return None,
    };
    names.get(subcategory as usize).copied()
}

fn shape_index(shape: ShapeType) -> u32 {
    match shape {
        ShapeType::Box => 0,
        ShapeType::Sphere => 1,
        ShapeType::Cylinder => 2,
        ShapeType::Cone => 3,
        ShapeType::Torus => 4,
    }
}

/// A scene operation reachable from a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddShape(ShapeType),
    AddInstancedShapes(ShapeType),
    RemoveShape(ShapeType),
    RemoveInstancedShapes(ShapeType),
    SetAmbientLight,
    ClearAmbientLight,
    AddPointLight,
    RemovePointLight,
    EnableOrbitalControls,
    DisableOrbitalControls,
    EnableFpsControls,
    DisableFpsControls,
    AddCubeMap,
    RemoveCubeMap,
    AddModel,
    RemoveModel,
    AddAxisHelper,
    RemoveAxisHelper,
    AddGridHelper,
    RemoveGridHelper,
}

impl Operation {
    /// Every catalog entry, in path order.
    pub fn all() -> Vec<Operation> {
        let mut ops = Vec::new();
        for shape in ShapeType::ALL {
            ops.push(Operation::AddShape(shape));
            ops.push(Operation::AddInstancedShapes(shape));
            ops.push(Operation::RemoveShape(shape));
            ops.push(Operation::RemoveInstancedShapes(shape));
        }
        ops.extend([
            Operation::SetAmbientLight,
            Operation::ClearAmbientLight,
            Operation::AddPointLight,
            Operation::RemovePointLight,
            Operation::EnableOrbitalControls,
            Operation::DisableOrbitalControls,
            Operation::EnableFpsControls,
            Operation::DisableFpsControls,
            Operation::AddCubeMap,
            Operation::RemoveCubeMap,
            Operation::AddModel,
            Operation::RemoveModel,
            Operation::AddAxisHelper,
            Operation::RemoveAxisHelper,
            Operation::AddGridHelper,
            Operation::RemoveGridHelper,
        ]);
        ops
    }

    pub fn lookup(category: u32, subcategory: u32, function: u32) -> Option<Operation> {
        let op = match (category, subcategory, function) {
            (CATEGORY_SHAPES, s, f) => {
                let shape = *ShapeType::ALL.get(s as usize)?;
                match f {
                    0 => Operation::AddShape(shape),
                    1 => Operation::AddInstancedShapes(shape),
                    2 => Operation::RemoveShape(shape),
                    3 => Operation::RemoveInstancedShapes(shape),
                    _ => return None,
                }
            }
            (CATEGORY_LIGHTS, 0, 0) => Operation::SetAmbientLight,
            (CATEGORY_LIGHTS, 0, 1) => Operation::ClearAmbientLight,
            (CATEGORY_LIGHTS, 1, 0) => Operation::AddPointLight,
            (CATEGORY_LIGHTS, 1, 1) => Operation::RemovePointLight,
            (CATEGORY_CONTROLS, 0, 0) => Operation::EnableOrbitalControls,
            (CATEGORY_CONTROLS, 0, 1) => Operation::DisableOrbitalControls,
            (CATEGORY_CONTROLS, 1, 0) => Operation::EnableFpsControls,
            (CATEGORY_CONTROLS, 1, 1) => Operation::DisableFpsControls,
            (CATEGORY_MAPS, 0, 0) => Operation::AddCubeMap,
            (CATEGORY_MAPS, 0, 1) => Operation::RemoveCubeMap,
            (CATEGORY_MODELS, 0, 0) => Operation::AddModel,
            (CATEGORY_MODELS, 0, 1) => Operation::RemoveModel,
            (CATEGORY_HELPERS, 0, 0) => Operation::AddAxisHelper,
            (CATEGORY_HELPERS, 0, 1) => Operation::RemoveAxisHelper,
            (CATEGORY_HELPERS, 1, 0) => Operation::AddGridHelper,
            (CATEGORY_HELPERS, 1, 1) => Operation::RemoveGridHelper,
            _ => return None,
        };
        Some(op)
    }

    /// `(category, subcategory, function)` of this entry.
    pub fn path(self) -> (u32, u32, u32) {
        match self {
            Operation::AddShape(s) => (CATEGORY_SHAPES, shape_index(s), 0),
            Operation::AddInstancedShapes(s) => (CATEGORY_SHAPES, shape_index(s), 1),
            Operation::RemoveShape(s) => (CATEGORY_SHAPES, shape_index(s), 2),
            Operation::RemoveInstancedShapes(s) => (CATEGORY_SHAPES, shape_index(s), 3),
            Operation::SetAmbientLight => (CATEGORY_LIGHTS, 0, 0),
            Operation::ClearAmbientLight => (CATEGORY_LIGHTS, 0, 1),
            Operation::AddPointLight => (CATEGORY_LIGHTS, 1, 0),
            Operation::RemovePointLight => (CATEGORY_LIGHTS, 1, 1),
            Operation::EnableOrbitalControls => (CATEGORY_CONTROLS, 0, 0),
            Operation::DisableOrbitalControls => (CATEGORY_CONTROLS, 0, 1),
            Operation::EnableFpsControls => (CATEGORY_CONTROLS, 1, 0),
            Operation::DisableFpsControls => (CATEGORY_CONTROLS, 1, 1),
            Operation::AddCubeMap => (CATEGORY_MAPS, 0, 0),
            Operation::RemoveCubeMap => (CATEGORY_MAPS, 0, 1),
            Operation::AddModel => (CATEGORY_MODELS, 0, 0),
            Operation::RemoveModel => (CATEGORY_MODELS, 0, 1),
            Operation::AddAxisHelper => (CATEGORY_HELPERS, 0, 0),
            Operation::RemoveAxisHelper => (CATEGORY_HELPERS, 0, 1),
            Operation::AddGridHelper => (CATEGORY_HELPERS, 1, 0),
            Operation::RemoveGridHelper => (CATEGORY_HELPERS, 1, 1),
        }
    }

    pub fn name(self) -> &'static str {
        use ShapeType::*;
        match self {
            Operation::AddShape(Box) => "add box",
            Operation::AddShape(Sphere) => "add sphere",
            Operation::AddShape(Cylinder) => "add cylinder",
            Operation::AddShape(Cone) => "add cone",
            Operation::AddShape(Torus) => "add torus",
            Operation::AddInstancedShapes(Box) => "add instanced boxes",
            Operation::AddInstancedShapes(Sphere) => "add instanced spheres",
            Operation::AddInstancedShapes(Cylinder) => "add instanced cylinders",
            Operation::AddInstancedShapes(Cone) => "add instanced cones",
            Operation::AddInstancedShapes(Torus) => "add instanced toruses",
            Operation::RemoveShape(Box) => "remove box",
            Operation::RemoveShape(Sphere) => "remove sphere",
            Operation::RemoveShape(Cylinder) => "remove cylinder",
            Operation::RemoveShape(Cone) => "remove cone",
            Operation::RemoveShape(Torus) => "remove torus",
            Operation::RemoveInstancedShapes(Box) => "remove instanced boxes",
            Operation::RemoveInstancedShapes(Sphere) => "remove instanced spheres",
            Operation::RemoveInstancedShapes(Cylinder) => "remove instanced cylinders",
            Operation::RemoveInstancedShapes(Cone) => "remove instanced cones",
            Operation::RemoveInstancedShapes(Torus) => "remove instanced toruses",
            Operation::SetAmbientLight => "set ambient light",
            Operation::ClearAmbientLight => "remove ambient light",
            Operation::AddPointLight => "add point light",
            Operation::RemovePointLight => "remove point light",
            Operation::EnableOrbitalControls => "enable orbital controls",
            Operation::DisableOrbitalControls => "disable orbital controls",
            Operation::EnableFpsControls => "enable FPS controls",
            Operation::DisableFpsControls => "disable FPS controls",
            Operation::AddCubeMap => "add cube map",
            Operation::RemoveCubeMap => "remove cube map",
            Operation::AddModel => "add gltf model",
            Operation::RemoveModel => "remove gltf model",
            Operation::AddAxisHelper => "add axis helper",
            Operation::RemoveAxisHelper => "remove axis helper",
            Operation::AddGridHelper => "add grid helper",
            Operation::RemoveGridHelper => "remove grid helper",
        }
    }

    /// Declared positional parameters.
    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            Operation::AddShape(ShapeType::Box) => BOX,
            Operation::AddShape(ShapeType::Sphere) => SPHERE,
            Operation::AddShape(ShapeType::Cylinder) => CYLINDER,
            Operation::AddShape(ShapeType::Cone) => CONE,
            Operation::AddShape(ShapeType::Torus) => TORUS,
            Operation::AddInstancedShapes(ShapeType::Box) => INSTANCED_BOX,
            Operation::AddInstancedShapes(ShapeType::Sphere) => INSTANCED_SPHERE,
            Operation::AddInstancedShapes(ShapeType::Cylinder) => INSTANCED_CYLINDER,
            Operation::AddInstancedShapes(ShapeType::Cone) => INSTANCED_CONE,
            Operation::AddInstancedShapes(ShapeType::Torus) => INSTANCED_TORUS,
            Operation::RemoveShape(_)
            | Operation::RemoveInstancedShapes(_)
            | Operation::RemovePointLight
            | Operation::RemoveCubeMap
            | Operation::RemoveModel => INDEX,
            Operation::SetAmbientLight => AMBIENT_LIGHT,
            Operation::AddPointLight => POINT_LIGHT,
            Operation::EnableFpsControls => FPS_CONTROLS,
            Operation::AddCubeMap => CUBE_MAP,
            Operation::AddModel => MODEL,
            Operation::AddAxisHelper => AXIS_HELPER,
            Operation::AddGridHelper => GRID_HELPER,
            Operation::ClearAmbientLight
            | Operation::EnableOrbitalControls
            | Operation::DisableOrbitalControls
            | Operation::DisableFpsControls
            | Operation::RemoveAxisHelper
            | Operation::RemoveGridHelper => NONE,
        }
    }

    /// Inclusive range of accepted parameter counts.
    pub fn arity(self) -> (usize, usize) {
        let params = self.params();
        let required = params.iter().filter(|p| !p.optional).count();
        (required, params.len())
    }
}

/// Serializable description of one catalog entry, for editor menus.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub category: u32,
    pub subcategory: u32,
    pub function: u32,
    pub name: &'static str,
    pub category_name: &'static str,
    pub subcategory_name: &'static str,
    pub params: &'static [ParamSpec],
}

/// The whole catalog in path order.
pub fn entries() -> Vec<CatalogEntry> {
    Operation::all()
        .into_iter()
        .map(|op| {
            let (category, subcategory, function) = op.path();
            CatalogEntry {
                category,
                subcategory,
                function,
                name: op.name(),
                category_name: category_name(category).unwrap_or_default(),
                subcategory_name: subcategory_name(category, subcategory).unwrap_or_default(),
                params: op.params(),
            }
        })
        .collect()
}
