//! Depth-first traversal of field trees.
//!
//! Rows are expanded in place, and a group field is yielded before its
//! nested fields. The walk keeps an explicit stack of sibling iterators, so
//! the order is exactly declaration order regardless of nesting depth.

use std::slice;

use crate::answers::AnswerMap;
use crate::spec::field::{Field, FieldNode};
use crate::visibility::should_show;

/// A field reached by the walk together with its group nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct FieldVisit<'a> {
    pub field: &'a Field,
    pub depth: usize,
}

struct Frame<'a> {
    nodes: slice::Iter<'a, FieldNode>,
    depth: usize,
}

/// Iterator over the fields of a tree, optionally pruning hidden branches.
pub struct Walk<'a> {
    stack: Vec<Frame<'a>>,
    answers: Option<&'a AnswerMap>,
}

impl<'a> Walk<'a> {
    /// Every field, hidden or not.
    pub fn all(nodes: &'a [FieldNode]) -> Self {
        Self {
            stack: vec![Frame {
                nodes: nodes.iter(),
                depth: 0,
            }],
            answers: None,
        }
    }

    /// Only fields whose conditions hold; a hidden group hides its children.
    pub fn visible(nodes: &'a [FieldNode], answers: &'a AnswerMap) -> Self {
        Self {
            answers: Some(answers),
            ..Self::all(nodes)
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = FieldVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let depth = frame.depth;
            let Some(node) = frame.nodes.next() else {
                self.stack.pop();
                continue;
            };
            match node {
                FieldNode::Row(row) => self.stack.push(Frame {
                    nodes: row.iter(),
                    depth,
                }),
                FieldNode::Field(field) => {
                    let field: &'a Field = field;
                    if let Some(answers) = self.answers
                        && !should_show(field, answers)
                    {
                        continue;
                    }
                    if field.kind.is_group() && !field.fields.is_empty() {
                        self.stack.push(Frame {
                            nodes: field.fields.iter(),
                            depth: depth + 1,
                        });
                    }
                    return Some(FieldVisit { field, depth });
                }
            }
        }
    }
}

/// Borrowing view over a list of field nodes.
#[derive(Debug, Clone, Copy)]
pub struct FieldTree<'a> {
    nodes: &'a [FieldNode],
}

impl<'a> FieldTree<'a> {
    pub fn new(nodes: &'a [FieldNode]) -> Self {
        Self { nodes }
    }

    pub fn iter(self) -> impl Iterator<Item = &'a Field> {
        Walk::all(self.nodes).map(|visit| visit.field)
    }

    pub fn visible(self, answers: &'a AnswerMap) -> impl Iterator<Item = &'a Field> {
        Walk::visible(self.nodes, answers).map(|visit| visit.field)
    }

    pub fn find(self, field_id: &str) -> Option<&'a Field> {
        self.iter().find(|field| field.id == field_id)
    }
}

/// All fields in declaration order, groups before their children.
pub fn flatten(nodes: &[FieldNode]) -> Vec<&Field> {
    FieldTree::new(nodes).iter().collect()
}

/// Calls `visit` for every field that is currently shown.
pub fn walk_visible<'a, F>(nodes: &'a [FieldNode], answers: &'a AnswerMap, mut visit: F)
where
    F: FnMut(&'a Field),
{
    for FieldVisit { field, .. } in Walk::visible(nodes, answers) {
        visit(field);
    }
}
