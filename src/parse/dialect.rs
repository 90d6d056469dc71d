//! Reader for the front end's bracket dialect.
//!
//! The front end dumps one AST per line using `<`/`>` for object braces and
//! `(`/`)` for array brackets. Constructors without arguments come out as
//! `<"Name">`, which has no JSON equivalent and is rewritten to `"Name"`.

use serde_json::Value;

use crate::error::{Error, Result};

/// Rewrite one line of bracket dialect into standard JSON.
///
/// Bracket characters inside string literals are left alone.
pub fn to_standard_json(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    let (mut dq, mut esc) = (false, false);

    while i < len {
        let c = chars[i];

        if esc {
            out.push(c);
            esc = false;
            i += 1;
            continue;
        }
        if dq {
            if c == '\\' {
                esc = true;
            } else if c == '"' {
                dq = false;
            }
            out.push(c);
            i += 1;
            continue;
        }

        // <"Name"> → "Name"
        if c == '<'
            && let Some(end) = nullary_constructor_end(&chars, i)
        {
            out.extend(&chars[i + 1..end]);
            i = end + 1;
            continue;
        }

        match c {
            '"' => {
                dq = true;
                out.push(c);
            }
            '<' => out.push('{'),
            '>' => out.push('}'),
            '(' => out.push('['),
            ')' => out.push(']'),
            _ => out.push(c),
        }
        i += 1;
    }

    out
}

/// If `chars[start]` opens `<"Name">` with an alphabetic name, return the
/// index of the closing `>`.
fn nullary_constructor_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) != Some(&'"') {
        return None;
    }
    i += 1;
    let name_start = i;
    while i < chars.len() && chars[i].is_ascii_alphabetic() {
        i += 1;
    }
    if i == name_start || chars.get(i) != Some(&'"') || chars.get(i + 1) != Some(&'>') {
        return None;
    }
    Some(i + 1)
}

/// Parse one dialect line. `line_no` is 1-based and only used for errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<Value> {
    let json = to_standard_json(line);
    serde_json::from_str(&json).map_err(|source| Error::Json {
        line: line_no,
        source,
    })
}

/// Parse a whole dump, one AST per non-blank line.
pub fn parse_ast(text: &str) -> Result<Vec<Value>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}
