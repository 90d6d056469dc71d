//! Human-readable rendering of lowered IR.
//!
//! `Display` on [`Lowered`] gives an indented listing, one line per tree
//! node, fragment and stage. Words are rendered back to shell syntax.

use std::fmt::{self, Write};

use super::fragment::{Fragment, FragmentNode, Stage};
use super::tree::{Lowered, LoweredArgument, Tree};
use crate::error::{Error, Result};
use crate::parse::{ArgChar, Assignment};

/// One JSON document per lowered top-level node, newline-terminated.
pub fn render_json(lowered: &[Lowered], pretty: bool) -> Result<String> {
    let mut out = String::new();
    for node in lowered {
        let doc = if pretty {
            serde_json::to_string_pretty(node)
        } else {
            serde_json::to_string(node)
        }
        .map_err(Error::Serialize)?;
        out.push_str(&doc);
        out.push('\n');
    }
    Ok(out)
}

/// Indented listing of every lowered top-level node.
pub fn render_text(lowered: &[Lowered]) -> String {
    lowered.iter().map(|l| l.to_string()).collect()
}

/// Render an argument as a shell word.
pub fn render_argument(arg: &LoweredArgument) -> String {
    let mut out = String::new();
    let mut run = String::new();
    for c in arg.chars() {
        if let ArgChar::Char(ch) = c {
            run.push(*ch);
            continue;
        }
        flush_literal(&mut out, &mut run);
        match c {
            ArgChar::Subst(node) => {
                let _ = write!(out, "$({})", inline(node));
            }
            ArgChar::Quoted(inner) => {
                let _ = write!(out, "\"{}\"", render_in_double_quotes(inner));
            }
            ArgChar::Other(raw) => out.push_str(&render_other(raw)),
            ArgChar::Char(_) => {}
        }
    }
    flush_literal(&mut out, &mut run);
    out
}

/// Escaped characters (`{"E": code}`) render as `\c`; any other form renders
/// as a `<TAG>` placeholder.
fn render_other(raw: &serde_json::Value) -> String {
    let Some((tag, payload)) = raw.as_object().and_then(|m| m.iter().next()) else {
        return "<?>".to_string();
    };
    if tag == "E"
        && let Some(ch) = payload.as_u64().and_then(|c| u32::try_from(c).ok()).and_then(char::from_u32)
    {
        return format!("\\{ch}");
    }
    format!("<{tag}>")
}

fn flush_literal(out: &mut String, run: &mut String) {
    if run.is_empty() {
        return;
    }
    match shlex::try_quote(run.as_str()) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => {
            let _ = write!(out, "{run:?}");
        }
    }
    run.clear();
}

fn render_in_double_quotes(arg: &LoweredArgument) -> String {
    let mut out = String::new();
    for c in arg.chars() {
        match c {
            ArgChar::Char(ch @ ('"' | '\\' | '$' | '`')) => {
                out.push('\\');
                out.push(*ch);
            }
            ArgChar::Char(ch) => out.push(*ch),
            ArgChar::Subst(node) => {
                let _ = write!(out, "$({})", inline(node));
            }
            ArgChar::Quoted(inner) => out.push_str(&render_in_double_quotes(inner)),
            ArgChar::Other(raw) => out.push_str(&render_other(raw)),
        }
    }
    out
}

fn render_assignments(assignments: &[Assignment<Lowered>]) -> String {
    assignments
        .iter()
        .map(|a| format!("{}={}", a.name, render_argument(&a.value)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A stage as a single shell command line.
pub fn render_stage(stage: &Stage) -> String {
    let mut words = Vec::new();
    if !stage.assignments.is_empty() {
        words.push(render_assignments(&stage.assignments));
    }
    words.push(render_argument(&stage.name));
    words.extend(stage.options.iter().map(render_argument));
    words.join(" ")
}

/// One-line shell-like rendering, used inside substitutions.
pub fn inline(lowered: &Lowered) -> String {
    match lowered {
        Lowered::Fragment(f) => inline_fragment(f),
        Lowered::Tree(t) => inline_tree(t),
    }
}

fn inline_fragment(fragment: &Fragment) -> String {
    fragment
        .nodes()
        .iter()
        .map(|n| match n {
            FragmentNode::Stage(s) => render_stage(s),
            FragmentNode::Opaque(t) => inline_tree(t),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn inline_tree(tree: &Tree) -> String {
    match tree {
        Tree::Command { assignments, .. } => render_assignments(assignments),
        Tree::And(l, r) => format!("{} && {}", inline(l), inline(r)),
        Tree::Or(l, r) => format!("{} || {}", inline(l), inline(r)),
        Tree::Semi(l, r) => format!("{}; {}", inline(l), inline(r)),
        Tree::Redir { node, .. } => inline_tree(node),
        Tree::Subshell { node, .. } => format!("( {} )", inline_tree(node)),
        Tree::Defun { name, body, .. } => format!("{name}() {{ {}; }}", inline(body)),
    }
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

fn write_lowered(f: &mut fmt::Formatter<'_>, lowered: &Lowered, depth: usize) -> fmt::Result {
    match lowered {
        Lowered::Fragment(frag) => write_fragment(f, frag, depth),
        Lowered::Tree(tree) => write_tree(f, tree, depth),
    }
}

fn write_fragment(f: &mut fmt::Formatter<'_>, fragment: &Fragment, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    writeln!(f, "fragment {} -> {}", fragment.input(), fragment.output())?;
    for node in fragment.nodes() {
        match node {
            FragmentNode::Stage(stage) => {
                indent(f, depth + 1)?;
                writeln!(
                    f,
                    "stage {} -> {}: {}",
                    stage.input,
                    stage.output,
                    render_stage(stage)
                )?;
            }
            FragmentNode::Opaque(tree) => {
                indent(f, depth + 1)?;
                writeln!(f, "opaque unbound -> unbound")?;
                write_tree(f, tree, depth + 2)?;
            }
        }
    }
    Ok(())
}

fn write_tree(f: &mut fmt::Formatter<'_>, tree: &Tree, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    match tree {
        Tree::Command {
            line_no,
            assignments,
            ..
        } => writeln!(f, "assign (line {line_no}): {}", render_assignments(assignments)),
        Tree::And(l, r) | Tree::Or(l, r) | Tree::Semi(l, r) => {
            let label = match tree {
                Tree::And(..) => "and",
                Tree::Or(..) => "or",
                _ => "semi",
            };
            writeln!(f, "{label}")?;
            write_lowered(f, l, depth + 1)?;
            write_lowered(f, r, depth + 1)
        }
        Tree::Redir {
            line_no,
            node,
            redirs,
        }
        | Tree::Subshell {
            line_no,
            node,
            redirs,
        } => {
            let label = if matches!(tree, Tree::Redir { .. }) {
                "redir"
            } else {
                "subshell"
            };
            writeln!(f, "{label} (line {line_no}, {} redirections)", redirs.len())?;
            write_tree(f, node, depth + 1)
        }
        Tree::Defun {
            line_no,
            name,
            body,
        } => {
            writeln!(f, "defun {name} (line {line_no})")?;
            write_lowered(f, body, depth + 1)
        }
    }
}

impl fmt::Display for Lowered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_lowered(f, self, 0)
    }
}
