//! Parameter codec.
//!
//! Every parameter in a script is a tagged fragment `<tag><body>`. The tag
//! alone decides how the body is decoded:
//!
//! | tag | value                | body grammar                     |
//! |-----|----------------------|----------------------------------|
//! | `.` | integer              | `-?[0-9]+`                       |
//! | `$` | 1D numeric list      | cells joined by `;`              |
//! | `@` | 1D string list       | strings joined by `;`            |
//! | `=` | 2D numeric list      | rows joined by `;`, cells by `,` |
//! | `+` | 2D string list       | rows joined by `;`, cells by `,` |
//! | `#` | color literal        | six hex digits                   |
//! | `^` | null                 | ignored                          |
//!
//! There is no escaping, so tag characters can never appear inside a body.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;

/// Separator between the cells of a flat list, and between rows of a grid.
pub const ROW_SEPARATOR: char = ';';
/// Separator between the cells of one grid row.
pub const CELL_SEPARATOR: char = ',';

/// Characters that would break tokenizing if they appeared inside a string value.
const RESERVED: &[char] = &['.', '$', '@', '=', '+', '#', '^', ';', ',', ':', '|', '\n', '\r'];

/// Parameter tag character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Int,
    NumList,
    StrList,
    NumGrid,
    StrGrid,
    Color,
    Null,
}

impl Tag {
    pub fn from_char(c: char) -> Option<Tag> {
        match c {
            '.' => Some(Tag::Int),
            '$' => Some(Tag::NumList),
            '@' => Some(Tag::StrList),
            '=' => Some(Tag::NumGrid),
            '+' => Some(Tag::StrGrid),
            '#' => Some(Tag::Color),
            '^' => Some(Tag::Null),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Tag::Int => '.',
            Tag::NumList => '$',
            Tag::StrList => '@',
            Tag::NumGrid => '=',
            Tag::StrGrid => '+',
            Tag::Color => '#',
            Tag::Null => '^',
        }
    }
}

/// A `#RRGGBB` color literal.
///
/// The literal is kept exactly as written so that decoding and re-encoding
/// never changes the script text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse a literal including its leading `#`.
    pub fn parse(literal: &str) -> Result<Self, String> {
        let hex = literal
            .strip_prefix('#')
            .ok_or_else(|| "color must start with '#'".to_string())?;
        if hex.len() != 6 {
            return Err(format!("expected 6 hex digits, found {}", hex.len()));
        }
        if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a hex digit", bad));
        }
        Ok(Self(literal.to_string()))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    pub fn white() -> Self {
        Self::from_rgb(255, 255, 255)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// A decoded parameter value. The variant is the declared type; the codec
/// never infers it from the shape of the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Param {
    Int(i64),
    NumList(Vec<i64>),
    StrList(Vec<String>),
    NumGrid(Vec<Vec<i64>>),
    StrGrid(Vec<Vec<String>>),
    Color(Color),
    Null,
}

impl Param {
    pub fn tag(&self) -> Tag {
        match self {
            Param::Int(_) => Tag::Int,
            Param::NumList(_) => Tag::NumList,
            Param::StrList(_) => Tag::StrList,
            Param::NumGrid(_) => Tag::NumGrid,
            Param::StrGrid(_) => Tag::StrGrid,
            Param::Color(_) => Tag::Color,
            Param::Null => Tag::Null,
        }
    }

    /// Human readable kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Param::Int(_) => "integer",
            Param::NumList(_) => "number list",
            Param::StrList(_) => "string list",
            Param::NumGrid(_) => "2D number list",
            Param::StrGrid(_) => "2D string list",
            Param::Color(_) => "color",
            Param::Null => "null",
        }
    }

    /// Render the tagged fragment for this value.
    pub fn encode(&self) -> Result<String, ScriptError> {
        let tag = self.tag().as_char();
        let body = match self {
            Param::Int(v) => v.to_string(),
            Param::NumList(cells) => join_numbers(cells, ROW_SEPARATOR),
            Param::StrList(cells) => {
                for cell in cells {
                    check_string(cell)?;
                }
                cells.join(&ROW_SEPARATOR.to_string())
            }
            Param::NumGrid(rows) => {
                let mut encoded = Vec::with_capacity(rows.len());
                for row in rows {
                    check_row(row.len(), rows)?;
                    encoded.push(join_numbers(row, CELL_SEPARATOR));
                }
                encoded.join(&ROW_SEPARATOR.to_string())
            }
            Param::StrGrid(rows) => {
                let mut encoded = Vec::with_capacity(rows.len());
                for row in rows {
                    check_row(row.len(), rows)?;
                    for cell in row {
                        check_string(cell)?;
                    }
                    encoded.push(row.join(&CELL_SEPARATOR.to_string()));
                }
                encoded.join(&ROW_SEPARATOR.to_string())
            }
            // The literal already carries its '#'.
            Param::Color(color) => return Ok(color.as_str().to_string()),
            Param::Null => String::new(),
        };
        Ok(format!("{}{}", tag, body))
    }

    /// Decode a body according to its tag.
    pub fn decode(tag: Tag, body: &str) -> Result<Param, ScriptError> {
        let fail = |reason: String| ScriptError::Decode {
            command: 0,
            tag: tag.as_char(),
            body: body.to_string(),
            reason,
        };

        match tag {
            Tag::Int => parse_int(body).map(Param::Int).map_err(fail),
            Tag::NumList => split_cells(body, ROW_SEPARATOR)
                .iter()
                .map(|cell| parse_int(cell))
                .collect::<Result<Vec<_>, _>>()
                .map(Param::NumList)
                .map_err(fail),
            Tag::StrList => split_strings(body, ROW_SEPARATOR)
                .map(Param::StrList)
                .map_err(fail),
            Tag::NumGrid => split_cells(body, ROW_SEPARATOR)
                .iter()
                .map(|row| {
                    non_empty_row(row)?
                        .split(CELL_SEPARATOR)
                        .map(parse_int)
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Param::NumGrid)
                .map_err(fail),
            Tag::StrGrid => split_cells(body, ROW_SEPARATOR)
                .iter()
                .map(|row| split_strings(non_empty_row(row)?, CELL_SEPARATOR))
                .collect::<Result<Vec<_>, _>>()
                .map(Param::StrGrid)
                .map_err(fail),
            Tag::Color => Color::parse(&format!("#{}", body))
                .map(Param::Color)
                .map_err(fail),
            Tag::Null => Ok(Param::Null),
        }
    }

    /// Decode a whole `<tag><body>` fragment.
    pub fn decode_token(token: &str) -> Result<Param, ScriptError> {
        let mut chars = token.chars();
        let first = chars.next().ok_or_else(|| ScriptError::MalformedCommand {
            command: 0,
            reason: "empty parameter token".to_string(),
        })?;
        let tag = Tag::from_char(first).ok_or_else(|| ScriptError::MalformedCommand {
            command: 0,
            reason: format!("unrecognized tag character '{}'", first),
        })?;
        Param::decode(tag, chars.as_str())
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Int(v) => write!(f, "{}", v),
            Param::NumList(v) => write!(f, "{:?}", v),
            Param::StrList(v) => write!(f, "{:?}", v),
            Param::NumGrid(v) => write!(f, "{:?}", v),
            Param::StrGrid(v) => write!(f, "{:?}", v),
            Param::Color(c) => write!(f, "{}", c),
            Param::Null => write!(f, "null"),
        }
    }
}

fn parse_int(text: &str) -> Result<i64, String> {
    if text.is_empty() {
        return Err("empty number".to_string());
    }
    text.parse::<i64>()
        .map_err(|_| format!("'{}' is not a base-10 integer", text))
}

/// Split a body into cells; an empty body has no cells.
fn split_cells(body: &str, separator: char) -> Vec<&str> {
    if body.is_empty() {
        Vec::new()
    } else {
        body.split(separator).collect()
    }
}

fn non_empty_row(row: &str) -> Result<&str, String> {
    if row.is_empty() {
        Err("empty row".to_string())
    } else {
        Ok(row)
    }
}

fn split_strings(body: &str, separator: char) -> Result<Vec<String>, String> {
    split_cells(body, separator)
        .into_iter()
        .map(|cell| {
            if cell.is_empty() {
                Err("empty string element".to_string())
            } else {
                Ok(cell.to_string())
            }
        })
        .collect()
}

fn join_numbers(cells: &[i64], separator: char) -> String {
    cells
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

fn check_string(value: &str) -> Result<(), ScriptError> {
    if value.is_empty() {
        return Err(ScriptError::Encode {
            value: "\"\"".to_string(),
            reason: "empty strings have no encoding".to_string(),
        });
    }
    if let Some(bad) = value.chars().find(|c| RESERVED.contains(c)) {
        return Err(ScriptError::Encode {
            value: format!("{:?}", value),
            reason: format!("'{}' is reserved by the script grammar", bad),
        });
    }
    Ok(())
}

fn check_row<T: fmt::Debug>(len: usize, rows: &[Vec<T>]) -> Result<(), ScriptError> {
    if len == 0 {
        return Err(ScriptError::Encode {
            value: format!("{:?}", rows),
            reason: "empty rows have no encoding".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_2d_numbers() {
        let param = Param::decode_token("=1,2;3,4").unwrap();
        assert_eq!(param, Param::NumGrid(vec![vec![1, 2], vec![3, 4]]));
    }

    #[test]
    fn test_encode_2d_numbers() {
        let param = Param::NumGrid(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(param.encode().unwrap(), "=1,2;3,4");
    }

    #[test]
    fn test_color_round_trips_unchanged() {
        let param = Param::decode_token("#FFFFFF").unwrap();
        assert_eq!(param, Param::Color(Color::parse("#FFFFFF").unwrap()));
        assert_eq!(param.encode().unwrap(), "#FFFFFF");

        let lower = Param::decode_token("#a0b1c2").unwrap();
        assert_eq!(lower.encode().unwrap(), "#a0b1c2");
    }

    #[test]
    fn test_malformed_color_fails() {
        assert!(matches!(
            Param::decode_token("#FFFFF"),
            Err(ScriptError::Decode { tag: '#', .. })
        ));
        assert!(matches!(
            Param::decode_token("#GGGGGG"),
            Err(ScriptError::Decode { tag: '#', .. })
        ));
    }

    #[test]
    fn test_null_token() {
        assert_eq!(Param::decode_token("^").unwrap(), Param::Null);
        assert_eq!(Param::decode_token("^n").unwrap(), Param::Null);
        assert_eq!(Param::Null.encode().unwrap(), "^");
    }

    #[test]
    fn test_integer_decode() {
        assert_eq!(Param::decode_token(".42").unwrap(), Param::Int(42));
        assert_eq!(Param::decode_token(".-7").unwrap(), Param::Int(-7));
        assert!(matches!(
            Param::decode_token(".abc"),
            Err(ScriptError::Decode { tag: '.', .. })
        ));
        assert!(Param::decode_token(".").is_err());
    }

    #[test]
    fn test_flat_lists() {
        assert_eq!(
            Param::decode_token("$10;5;-10").unwrap(),
            Param::NumList(vec![10, 5, -10])
        );
        assert_eq!(
            Param::decode_token("@grass;stone").unwrap(),
            Param::StrList(vec!["grass".to_string(), "stone".to_string()])
        );
        assert_eq!(Param::decode_token("$").unwrap(), Param::NumList(vec![]));
        assert!(Param::decode_token("$1;;2").is_err());
        assert!(Param::decode_token("@a;;b").is_err());
        assert!(Param::decode_token("=1,2;;3,4").is_err());
    }

    #[test]
    fn test_string_grid() {
        let param = Param::decode_token("+a,b;c").unwrap();
        assert_eq!(
            param,
            Param::StrGrid(vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()],
            ])
        );
        assert_eq!(param.encode().unwrap(), "+a,b;c");
    }

    #[test]
    fn test_encode_rejects_reserved_characters() {
        let param = Param::StrList(vec!["model.gltf".to_string()]);
        assert!(matches!(param.encode(), Err(ScriptError::Encode { .. })));

        let empty_row = Param::NumGrid(vec![vec![]]);
        assert!(matches!(empty_row.encode(), Err(ScriptError::Encode { .. })));
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(
            Param::decode_token("!1"),
            Err(ScriptError::MalformedCommand { .. })
        ));
    }

    #[test]
    fn test_color_from_rgb() {
        let color = Color::from_rgb(255, 128, 0);
        assert_eq!(color.as_str(), "#ff8000");
        assert_eq!(Color::parse(color.as_str()), Ok(color));
    }

    #[test]
    fn test_param_json_shape() {
        let json = serde_json::to_string(&Param::Color(Color::white())).unwrap();
        assert_eq!(json, r##"{"kind":"color","value":"#ffffff"}"##);

        let back: Param = serde_json::from_str(r#"{"kind":"int","value":3}"#).unwrap();
        assert_eq!(back, Param::Int(3));

        let bad: Result<Param, _> = serde_json::from_str(r#"{"kind":"color","value":"red"}"#);
        assert!(bad.is_err());
    }
}
