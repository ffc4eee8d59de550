//! Script tokenizer.
//!
//! A script is a `|`-separated list of commands; each command is
//! `category:subcategory:function:params` where `params` is a run of tagged
//! tokens. A token starts at a tag character and extends to the next tag
//! character or the end of the blob.

use crate::command::Command;
use crate::error::ScriptError;
use crate::param::{Param, Tag};

pub const COMMAND_SEPARATOR: char = '|';
pub const FIELD_SEPARATOR: char = ':';

/// Strip line breaks and a single leading command separator.
pub fn normalize(script: &str) -> String {
    let flat: String = script.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    match flat.strip_prefix(COMMAND_SEPARATOR) {
        Some(rest) => rest.to_string(),
        None => flat,
    }
}

/// Raw command strings of a normalized script, with their positions.
pub fn raw_commands(normalized: &str) -> impl Iterator<Item = (usize, &str)> {
    normalized
        .split(COMMAND_SEPARATOR)
        .filter(move |_| !normalized.is_empty())
        .enumerate()
}

/// Decode a whole script into commands, in script order.
pub fn tokenize(script: &str) -> Result<Vec<Command>, ScriptError> {
    let script = normalize(script);
    raw_commands(&script)
        .map(|(position, raw)| parse_command(position, raw))
        .collect()
}

/// Decode one raw command string found at `position` in its script.
pub fn parse_command(position: usize, raw: &str) -> Result<Command, ScriptError> {
    let fields: Vec<&str> = raw.split(FIELD_SEPARATOR).collect();
    if fields.len() != 4 {
        return Err(ScriptError::MalformedCommand {
            command: position,
            reason: format!(
                "expected 4 '{}'-separated fields in '{}', found {}",
                FIELD_SEPARATOR,
                raw,
                fields.len()
            ),
        });
    }

    let number = |field: &str, what: &str| {
        field
            .parse::<u32>()
            .map_err(|_| ScriptError::MalformedCommand {
                command: position,
                reason: format!("{} '{}' is not a non-negative integer", what, field),
            })
    };

    let command = Command {
        category: number(fields[0], "category")?,
        subcategory: number(fields[1], "subcategory")?,
        function: number(fields[2], "function")?,
        params: scan_params(position, fields[3])?,
    };
    log::debug!("command {}: {:?}", position, command);
    Ok(command)
}

/// Split a parameter blob into tagged tokens and decode each of them.
pub fn scan_params(position: usize, blob: &str) -> Result<Vec<Param>, ScriptError> {
    let mut tokens: Vec<(Tag, String)> = Vec::new();

    for c in blob.chars() {
        if let Some(tag) = Tag::from_char(c) {
            tokens.push((tag, String::new()));
            continue;
        }
        match tokens.last_mut() {
            Some((_, body)) => body.push(c),
            None => {
                return Err(ScriptError::MalformedCommand {
                    command: position,
                    reason: format!("unrecognized tag character '{}'", c),
                })
            }
        }
    }

    tokens
        .iter()
        .map(|(tag, body)| Param::decode(*tag, body).map_err(|e| e.at_command(position)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Color;

    fn white() -> Param {
        Param::Color(Color::parse("#FFFFFF").unwrap())
    }

    #[test]
    fn test_single_box_command() {
        let commands = tokenize("0:0:0:.0.0.0.1.1.1#FFFFFF^n").unwrap();
        assert_eq!(
            commands,
            vec![Command::new(
                0,
                0,
                0,
                vec![
                    Param::Int(0),
                    Param::Int(0),
                    Param::Int(0),
                    Param::Int(1),
                    Param::Int(1),
                    Param::Int(1),
                    white(),
                    Param::Null,
                ]
            )]
        );
    }

    #[test]
    fn test_instanced_spheres_command() {
        let commands = tokenize("0:1:1:=2,0,0;2,0,-2;2,0,2.1#FFFFFF").unwrap();
        assert_eq!(
            commands,
            vec![Command::new(
                0,
                1,
                1,
                vec![
                    Param::NumGrid(vec![vec![2, 0, 0], vec![2, 0, -2], vec![2, 0, 2]]),
                    Param::Int(1),
                    white(),
                ]
            )]
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let commands = tokenize("2:0:0:^n|1:0:0:#FFFFFF|0:0:2:.0").unwrap();
        let paths: Vec<_> = commands.iter().map(|c| c.path()).collect();
        assert_eq!(paths, vec![(2, 0, 0), (1, 0, 0), (0, 0, 2)]);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(tokenize("|").unwrap(), vec![]);
        assert_eq!(tokenize("2:0:0:").unwrap(), vec![Command::new(2, 0, 0, vec![])]);
    }

    #[test]
    fn test_leading_separator_and_line_breaks() {
        let commands = tokenize("|2:0:0:\r\n|1:0:0:#FFFFFF\n").unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].params, vec![white()]);
    }

    #[test]
    fn test_wrong_field_count_reports_position() {
        let err = tokenize("2:0:0:|1:0:#FFFFFF").unwrap_err();
        assert!(matches!(err, ScriptError::MalformedCommand { command: 1, .. }));

        let err = tokenize("2:0:0:|").unwrap_err();
        assert!(matches!(err, ScriptError::MalformedCommand { command: 1, .. }));
    }

    #[test]
    fn test_non_numeric_path() {
        let err = tokenize("a:0:0:").unwrap_err();
        assert!(matches!(err, ScriptError::MalformedCommand { command: 0, .. }));
        assert!(tokenize("-1:0:0:").is_err());
    }

    #[test]
    fn test_blob_must_start_with_tag() {
        let err = tokenize("0:0:2:5").unwrap_err();
        match err {
            ScriptError::MalformedCommand { command, reason } => {
                assert_eq!(command, 0);
                assert!(reason.contains("'5'"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_carries_position() {
        let err = tokenize("2:0:0:|0:0:2:.x").unwrap_err();
        assert!(matches!(err, ScriptError::Decode { command: 1, tag: '.', .. }));
    }

    #[test]
    fn test_raw_commands() {
        let raw: Vec<_> = raw_commands("2:0:0:|1:0:0:#FFFFFF").collect();
        assert_eq!(raw, vec![(0, "2:0:0:"), (1, "1:0:0:#FFFFFF")]);
        assert_eq!(raw_commands("").count(), 0);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("|a|b"), "a|b");
        assert_eq!(normalize("||a"), "|a");
        assert_eq!(normalize("a\n|b"), "a|b");
    }
}
