//! Parser for `.ls8` program files.
//!
//! Each line holds one byte written as exactly eight `0`/`1` digits, optionally followed by a
//! `#` comment. Blank and comment-only lines are skipped.

use std::path::Path;

use crate::{error::LoadError, memory::Memory, Byte};

const COMMENT_MARKER: char = '#';
const DIGITS_PER_BYTE: usize = Byte::BITS as usize;

fn parse_line(line: &str) -> Option<Result<Byte, ()>> {
    let literal = match line.split_once(COMMENT_MARKER) {
        Some((literal, _comment)) => literal,
        None => line,
    }
    .trim();
    if literal.is_empty() {
        return None;
    }
    if literal.len() != DIGITS_PER_BYTE || !literal.bytes().all(|c| c == b'0' || c == b'1') {
        return Some(Err(()));
    }
    Some(Byte::from_str_radix(literal, 2).map_err(|_| ()))
}

/// Parses a whole program. Nothing is returned unless every line is well-formed.
pub fn parse(source: &str) -> Result<Vec<Byte>, LoadError> {
    let mut program = Vec::new();
    for (index, line) in source.lines().enumerate() {
        match parse_line(line) {
            None => {}
            Some(Ok(byte)) => program.push(byte),
            Some(Err(())) => {
                return Err(LoadError::Format {
                    line: index + 1,
                    content: line.trim().to_owned(),
                })
            }
        }
    }
    if program.len() > Memory::SIZE {
        return Err(LoadError::ProgramTooLarge {
            size: program.len(),
        });
    }
    Ok(program)
}

pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Byte>, LoadError> {
    let source = std::fs::read_to_string(path.as_ref())?;
    let program = parse(&source)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        bytes = program.len(),
        "parsed program"
    );
    Ok(program)
}
