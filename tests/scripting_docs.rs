//! Test that all script blocks in scripting.md replay cleanly.
//!
//! Run with: cargo test --test scripting_docs

use std::fs;
use threescript::dispatcher::run;
use threescript::scene_graph::SceneGraph;
use threescript::serializer::serialize_script;
use threescript::tokenizer::tokenize;

/// Extract all script code blocks from markdown content
fn extract_script_blocks(content: &str) -> Vec<(usize, String)> {
    let mut blocks = Vec::new();
    let mut in_block = false;
    let mut current_block = String::new();
    let mut block_start_line = 0;

    for (line_num, line) in content.lines().enumerate() {
        if line.trim().starts_with("```script") {
            in_block = true;
            block_start_line = line_num + 1;
            current_block.clear();
        } else if in_block && line.trim() == "```" {
            in_block = false;
            blocks.push((block_start_line, current_block.clone()));
        } else if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    blocks
}

#[test]
fn test_all_script_blocks_replay() {
    let scripting_md_path = concat!(env!("CARGO_MANIFEST_DIR"), "/scripting.md");
    let content = fs::read_to_string(scripting_md_path).expect("Failed to read scripting.md");

    let blocks = extract_script_blocks(&content);
    assert!(!blocks.is_empty(), "No script blocks found in scripting.md");

    let mut errors = Vec::new();

    for (line_num, block) in &blocks {
        let mut scene = SceneGraph::new();
        match run(&mut scene, block) {
            Ok(summary) => assert!(summary.commands > 0, "empty block at line {}", line_num),
            Err(err) => errors.push(format!(
                "Block starting at line {} failed to replay:\n{}\nError: {}",
                line_num,
                block.lines().take(3).collect::<Vec<_>>().join("\n"),
                err
            )),
        }
    }

    if !errors.is_empty() {
        panic!(
            "Found {} replay error(s) in scripting.md:\n\n{}",
            errors.len(),
            errors.join("\n\n---\n\n")
        );
    }

    println!("Successfully replayed {} script blocks", blocks.len());
}

#[test]
fn test_script_blocks_reencode_to_themselves() {
    let scripting_md_path = concat!(env!("CARGO_MANIFEST_DIR"), "/scripting.md");
    let content = fs::read_to_string(scripting_md_path).expect("Failed to read scripting.md");

    for (line_num, block) in extract_script_blocks(&content) {
        let commands = tokenize(&block).unwrap();
        let encoded = serialize_script(&commands).unwrap();
        // `^n` comes back as a bare `^`.
        let expected = block.replace('\n', "").replace("^n", "^");
        assert_eq!(encoded, expected, "block at line {}", line_num);
    }
}
