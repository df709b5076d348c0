// SPDX-License-Identifier: Apache-2.0

// Dotted/bracketed path lookup over a parsed buffer. Resolution walks the
// flat structure links only; nothing is re-tokenized.

use crate::convert::from_ascii_u64;
use crate::node::{Node, NodeRef};

/// Resolves a path expression against a parsed buffer, starting at the
/// top-level container in slot 0.
///
/// Steps are `[index]` for arrays and `.name` for objects, for example
/// `[1].y[0]`. Array indices wrap modulo the element count, and a `-`
/// prefix counts from the end, so `[-1]` is the last element. Key names
/// match either bare (`.name`) or quoted (`."name"`), the quoted form
/// being the one that can contain dots or brackets. An empty path answers
/// the start node itself.
///
/// Lookup never fails loudly: anything that does not lead to a node, be
/// it a kind mismatch, an unknown key, an empty container or a malformed
/// step, answers `None`.
///
/// # Example
/// ```
/// use flatjson::{resolve, Node, Parser};
///
/// let mut nodes = [Node::default(); 16];
/// let mut parser = Parser::new(r#"{"point": [1, 2, 3]}"#);
/// parser.parse(&mut nodes);
/// let nodes = &nodes[..parser.node_count()];
/// assert_eq!(resolve(nodes, ".point[-1]").and_then(|n| n.as_u64()), Some(3));
/// ```
pub fn resolve<'a, 'b>(nodes: &'b [Node<'a>], path: &str) -> Option<NodeRef<'a, 'b>> {
    resolve_from(nodes, 0, path)
}

pub(crate) fn resolve_from<'a, 'b>(
    nodes: &'b [Node<'a>],
    start: usize,
    path: &str,
) -> Option<NodeRef<'a, 'b>> {
    let bytes = path.as_bytes();
    let mut current = start;
    let mut pos = 0;
    while pos < bytes.len() && !nodes.get(current)?.is_end_of_stream() {
        match bytes[pos] {
            b'[' if nodes[current].is_array() => {
                pos += 1;
                current = array_step(nodes, current, bytes, &mut pos)?;
            }
            b'.' if nodes[current].is_object() => {
                pos += 1;
                if nodes[current].count() == 0 {
                    return None;
                }
                current = match_key(nodes, current + 1, bytes, &mut pos)?;
            }
            _ => return None,
        }
    }
    NodeRef::new(nodes, current)
}

/// One `[index]` step; `current` is an array node. Answers the index of
/// the selected element.
fn array_step(nodes: &[Node], current: usize, path: &[u8], pos: &mut usize) -> Option<usize> {
    let count = nodes[current].count() as u64;
    if count == 0 {
        return None;
    }
    let negative = path.get(*pos) == Some(&b'-');
    if negative {
        *pos += 1;
    }
    let (index, digits) = from_ascii_u64(&path[*pos..])?;
    *pos += digits;
    if path.get(*pos) != Some(&b']') {
        return None;
    }
    *pos += 1;

    let mut index = if index >= count { index % count } else { index };
    if negative && index != 0 {
        index = count - index;
    }

    // Hop the successor chain from the first element.
    let mut element = current + 1;
    for _ in 0..index {
        element = nodes[element].successor()?;
    }
    Some(element)
}

/// One `.name` step; `current` is the first key of an object. Walks the
/// key chain and answers the index of the matched member's value. A path
/// exhausted mid-step answers the key the walk stood on.
fn match_key(nodes: &[Node], mut current: usize, path: &[u8], pos: &mut usize) -> Option<usize> {
    while *pos < path.len() && nodes.get(current).is_some_and(|n| n.is_key()) {
        let stored = nodes[current].text().as_bytes();
        let remaining = &path[*pos..];
        if let Some(consumed) = key_match(remaining, stored) {
            *pos += consumed;
            return Some(current + 1);
        }
        current = nodes[current].successor()?;
    }
    Some(current)
}

/// Compares one path step against a stored key span (quotes included).
/// The quoted path form matches the whole span, the bare form matches the
/// content between the quotes. Answers the path bytes consumed.
fn key_match(remaining: &[u8], stored: &[u8]) -> Option<usize> {
    if remaining.first() == Some(&b'"') {
        if remaining.len() >= stored.len() && remaining[..stored.len()] == *stored {
            return Some(stored.len());
        }
    } else {
        let bare = &stored[1..stored.len() - 1];
        if remaining.len() >= bare.len() && remaining[..bare.len()] == *bare {
            return Some(bare.len());
        }
    }
    None
}
