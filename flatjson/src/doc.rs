// SPDX-License-Identifier: Apache-2.0

use core::ops::Index;

use crate::node::{Node, NodeRef};
use crate::path;

/// A parsed document that carries its node storage inline.
///
/// `N` is the node capacity, chosen at compile time. Filling the buffer
/// is [`crate::Parser::parse_doc`]'s job; everything here reads the
/// result. When the content is too big for `N` the parse reports
/// [`crate::ParseStatus::CapacityExceeded`] and a larger `FlatDoc` is
/// called for.
///
/// # Example
/// ```
/// use flatjson::{FlatDoc, ParseStatus, Parser};
///
/// let mut doc: FlatDoc<16> = FlatDoc::new();
/// let mut parser = Parser::new(r#"{"on": true, "level": 3}"#);
/// assert_eq!(parser.parse_doc(&mut doc), ParseStatus::Valid);
/// assert_eq!(doc.bool_at(".on"), Some(true));
/// assert_eq!(doc.u64_at(".level"), Some(3));
/// ```
pub struct FlatDoc<'a, const N: usize> {
    nodes: [Node<'a>; N],
    len: usize,
}

impl<'a, const N: usize> FlatDoc<'a, N> {
    pub fn new() -> Self {
        Self {
            nodes: [Node::default(); N],
            len: 0,
        }
    }

    /// The nodes written by the parse that filled this document.
    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// The top-level container node.
    pub fn root(&self) -> Option<NodeRef<'a, '_>> {
        NodeRef::new(self.nodes(), 0)
    }

    /// Resolves a path expression from the top-level container; see
    /// [`crate::resolve`] for the syntax.
    pub fn resolve(&self, path: &str) -> Option<NodeRef<'a, '_>> {
        path::resolve(self.nodes(), path)
    }

    pub fn bool_at(&self, path: &str) -> Option<bool> {
        self.resolve(path)?.as_bool()
    }

    pub fn u64_at(&self, path: &str) -> Option<u64> {
        self.resolve(path)?.as_u64()
    }

    pub fn i64_at(&self, path: &str) -> Option<i64> {
        self.resolve(path)?.as_i64()
    }

    pub fn f32_at(&self, path: &str) -> Option<f32> {
        self.resolve(path)?.as_f32()
    }

    pub fn f64_at(&self, path: &str) -> Option<f64> {
        self.resolve(path)?.as_f64()
    }

    /// Decoded UTF-8 length of the string at `path`, for sizing the
    /// destination of [`FlatDoc::str_at`].
    pub fn str_len_at(&self, path: &str) -> Option<usize> {
        self.resolve(path)?.string_decoded_len()
    }

    /// Decodes the string at `path` into `dest`, answering the byte
    /// count written.
    pub fn str_at(&self, path: &str, dest: &mut [u8]) -> Option<usize> {
        self.resolve(path)?.decode_string_into(dest)
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut [Node<'a>] {
        &mut self.nodes
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
    }
}

impl<'a, const N: usize> Default for FlatDoc<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Index<usize> for FlatDoc<'a, N> {
    type Output = Node<'a>;

    fn index(&self, index: usize) -> &Node<'a> {
        &self.nodes()[index]
    }
}
