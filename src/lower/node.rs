//! The recursive node dispatcher.

use super::{Lowerer, merge, shape};
use crate::error::Result;
use crate::ir::{Fragment, Lowered, Stage, Tree};
use crate::parse::{Argument, Assignment, Node, Redirection};

impl Lowerer {
    /// Lower one AST node to a tree node or a pipeline fragment.
    pub fn lower_node(&mut self, node: &Node) -> Result<Lowered> {
        log::trace!("lowering {} node", node.construct());
        match node {
            Node::Pipe { background, items } => {
                shape::check_pipe_items(items.len())?;
                let lowered = items
                    .iter()
                    .map(|item| self.lower_node(item))
                    .collect::<Result<Vec<_>>>()?;
                let fragment = merge::merge_pipeline(lowered)?;
                if self.options.verify_fragments {
                    fragment.verify()?;
                }
                if *background {
                    log::debug!("background pipeline lowered without channel adjustment");
                }
                Ok(Lowered::Fragment(fragment))
            }
            Node::Command {
                line_no,
                assignments,
                words,
                redirs,
            } => self.lower_command(*line_no, assignments, words, redirs),
            Node::And(l, r) => {
                let (l, r) = self.lower_pair(l, r)?;
                Ok(Lowered::Tree(Tree::And(l, r)))
            }
            Node::Or(l, r) => {
                let (l, r) = self.lower_pair(l, r)?;
                Ok(Lowered::Tree(Tree::Or(l, r)))
            }
            Node::Semi(l, r) => {
                let (l, r) = self.lower_pair(l, r)?;
                Ok(Lowered::Tree(Tree::Semi(l, r)))
            }
            Node::Redir {
                line_no,
                node,
                redirs,
            } => Ok(match self.lower_node(node)? {
                Lowered::Fragment(f) => {
                    log::debug!("line {line_no}: redirections not applied to fragment channels");
                    Lowered::Fragment(f)
                }
                Lowered::Tree(t) => Lowered::Tree(Tree::Redir {
                    line_no: *line_no,
                    node: Box::new(t),
                    redirs: redirs.clone(),
                }),
            }),
            Node::Subshell {
                line_no,
                node,
                redirs,
            } => Ok(match self.lower_node(node)? {
                Lowered::Fragment(f) => {
                    log::debug!("line {line_no}: subshell redirections not applied to fragment channels");
                    Lowered::Fragment(f)
                }
                Lowered::Tree(t) => Lowered::Tree(Tree::Subshell {
                    line_no: *line_no,
                    node: Box::new(t),
                    redirs: redirs.clone(),
                }),
            }),
            Node::Background { line_no, node, .. } => Ok(match self.lower_node(node)? {
                Lowered::Fragment(f) => Lowered::Fragment(f),
                Lowered::Tree(t) => {
                    log::debug!("line {line_no}: background tree node wrapped with unbound channels");
                    Lowered::Fragment(Fragment::opaque(t))
                }
            }),
            Node::Defun {
                line_no,
                name,
                body,
            } => Ok(Lowered::Tree(Tree::Defun {
                line_no: *line_no,
                name: name.clone(),
                body: Box::new(self.lower_node(body)?),
            })),
        }
    }

    fn lower_pair(&mut self, l: &Node, r: &Node) -> Result<(Box<Lowered>, Box<Lowered>)> {
        let l = self.lower_node(l)?;
        let r = self.lower_node(r)?;
        Ok((Box::new(l), Box::new(r)))
    }

    fn lower_command(
        &mut self,
        line_no: u32,
        assignments: &[Assignment<Node>],
        words: &[Argument<Node>],
        redirs: &[Redirection],
    ) -> Result<Lowered> {
        let assignments = self.lower_assignments(assignments)?;
        let Some((name, options)) = words.split_first() else {
            return Ok(Lowered::Tree(Tree::Command {
                line_no,
                assignments,
                redirs: redirs.to_vec(),
            }));
        };
        let name = self.lower_argument(name)?;
        let options = self.lower_arguments(options)?;
        let input = self.channels.next_channel()?;
        let output = self.channels.next_channel()?;
        Ok(Lowered::Fragment(Fragment::single_stage(Stage {
            name,
            options,
            input,
            output,
            assignments,
            redirs: redirs.to_vec(),
        })))
    }
}
