// SPDX-License-Identifier: Apache-2.0

use core::fmt;
use core::ops::Deref;

use crate::convert;
use crate::tokenizer::{Token, TokenKind};

/// Discriminates what one flat node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Nothing parseable; the span covers the rejected input.
    Invalid,
    Array,
    Object,
    True,
    False,
    Null,
    /// Standard JSON number, kept as uninterpreted source text.
    Number,
    /// Lossless 32-bit float, `0x` plus 8 hex digits of bit pattern.
    FloatHex,
    /// Lossless 64-bit float, `0x` plus 16 hex digits of bit pattern.
    DoubleHex,
    String,
    /// An object member name; a string in key position.
    Key,
    /// Synthesized once after a fully parsed document.
    EndOfStream,
    /// A well-formed token that turned up in an illegal position.
    SyntaxError,
}

/// The two payload shapes a node can carry, selected by its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Payload<'a> {
    /// Raw source span, surrounding syntax included (quotes on strings).
    Text(&'a str),
    /// Immediate element count (arrays) or member-pair count (objects).
    Count(usize),
}

/// One record of a flat parsed document.
///
/// Nodes sit in the caller's buffer in the order the parser emitted them,
/// which is the order their spans appear in the source. A container's
/// first child is the very next node; same-level neighbors are linked by
/// [`Node::successor`] indices. There are no parent links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a> {
    kind: NodeKind,
    payload: Payload<'a>,
    successor: Option<usize>,
}

impl Default for Node<'_> {
    /// An empty [`NodeKind::Invalid`] marker; parse output overwrites it.
    fn default() -> Self {
        Self {
            kind: NodeKind::Invalid,
            payload: Payload::Text(""),
            successor: None,
        }
    }
}

impl<'a> Node<'a> {
    pub(crate) fn from_token(token: &Token<'a>) -> Self {
        let kind = match token.kind {
            TokenKind::ArrayBegin => NodeKind::Array,
            TokenKind::ObjectBegin => NodeKind::Object,
            TokenKind::True => NodeKind::True,
            TokenKind::False => NodeKind::False,
            TokenKind::Null => NodeKind::Null,
            TokenKind::Number => NodeKind::Number,
            TokenKind::FloatHex => NodeKind::FloatHex,
            TokenKind::DoubleHex => NodeKind::DoubleHex,
            TokenKind::String => NodeKind::String,
            TokenKind::Key => NodeKind::Key,
            TokenKind::EndOfStream => NodeKind::EndOfStream,
            TokenKind::SyntaxError => NodeKind::SyntaxError,
            TokenKind::Invalid
            | TokenKind::ArrayEnd
            | TokenKind::ObjectEnd
            | TokenKind::Colon
            | TokenKind::Comma => NodeKind::Invalid,
        };
        let payload = match kind {
            NodeKind::Array | NodeKind::Object => Payload::Count(0),
            _ => Payload::Text(token.text),
        };
        Self {
            kind,
            payload,
            successor: None,
        }
    }

    pub(crate) fn bump_count(&mut self) {
        if let Payload::Count(n) = &mut self.payload {
            *n += 1;
        }
    }

    pub(crate) fn set_successor(&mut self, index: usize) {
        self.successor = Some(index);
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Raw source span backing this node, quotes and all.
    ///
    /// # Panics
    /// Arrays and objects carry a count, not a span; asking them for text
    /// is a usage error.
    pub fn text(&self) -> &'a str {
        match self.payload {
            Payload::Text(text) => text,
            Payload::Count(_) => panic!("text() called on an array or object node"),
        }
    }

    /// Immediate element count of an array, or member-pair count of an
    /// object. Nested containers count as one.
    ///
    /// # Panics
    /// On non-container nodes.
    pub fn count(&self) -> usize {
        match self.payload {
            Payload::Count(count) => count,
            Payload::Text(_) => panic!("count() called on a non-container node"),
        }
    }

    /// Buffer index of the same-level successor, if any: the next array
    /// element, the next key of the same object, or the value of the next
    /// member pair.
    pub fn successor(&self) -> Option<usize> {
        self.successor
    }

    pub fn is_array(&self) -> bool {
        self.kind == NodeKind::Array
    }

    pub fn is_object(&self) -> bool {
        self.kind == NodeKind::Object
    }

    /// Arrays and objects.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Array | NodeKind::Object)
    }

    pub fn is_key(&self) -> bool {
        self.kind == NodeKind::Key
    }

    /// Anything that is neither a key nor an error marker.
    pub fn is_value(&self) -> bool {
        !self.is_key() && !self.is_error()
    }

    pub fn is_string(&self) -> bool {
        self.kind == NodeKind::String
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.kind, NodeKind::True | NodeKind::False)
    }

    pub fn is_null(&self) -> bool {
        self.kind == NodeKind::Null
    }

    /// Standard numbers plus both lossless hex forms.
    pub fn is_number_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Number | NodeKind::FloatHex | NodeKind::DoubleHex
        )
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.kind == NodeKind::EndOfStream
    }

    /// Rejected-input and grammar-violation markers.
    pub fn is_error(&self) -> bool {
        matches!(self.kind, NodeKind::Invalid | NodeKind::SyntaxError)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            NodeKind::True => Some(true),
            NodeKind::False => Some(false),
            _ => None,
        }
    }

    /// Unsigned integer reading of a number node.
    ///
    /// Consumes the span's leading digit run, so `1.5` answers 1. Numbers
    /// beyond `u64` range answer `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match self.kind {
            NodeKind::Number => {
                convert::from_ascii_u64(self.text().as_bytes()).map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Signed companion of [`Node::as_u64`].
    pub fn as_i64(&self) -> Option<i64> {
        match self.kind {
            NodeKind::Number => {
                convert::from_ascii_i64(self.text().as_bytes()).map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Floating-point reading of any number-like node.
    ///
    /// The hex forms are exact bit patterns and convert unconditionally.
    /// Standard number spans go through core's decimal parser, which the
    /// `float` feature switches on; without it they answer `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self.kind {
            NodeKind::DoubleHex => Some(convert::f64_from_hex(self.text())),
            NodeKind::FloatHex => Some(convert::f32_from_hex(self.text()) as f64),
            #[cfg(feature = "float")]
            NodeKind::Number => match self.text().parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => panic!("number span rejected by the decimal parser"),
            },
            _ => None,
        }
    }

    /// Single-precision companion of [`Node::as_f64`]. Values from
    /// 64-bit forms are narrowed.
    pub fn as_f32(&self) -> Option<f32> {
        match self.kind {
            NodeKind::FloatHex => Some(convert::f32_from_hex(self.text())),
            NodeKind::DoubleHex => Some(convert::f64_from_hex(self.text()) as f32),
            #[cfg(feature = "float")]
            NodeKind::Number => self.as_f64().map(|value| value as f32),
            _ => None,
        }
    }

    /// Decoded UTF-8 byte length of a string or key node's content,
    /// escapes resolved, quotes excluded.
    pub fn string_decoded_len(&self) -> Option<usize> {
        match self.kind {
            NodeKind::String | NodeKind::Key => Some(convert::unescaped_len(self.inner_text())),
            _ => None,
        }
    }

    /// Decodes a string or key node's content into `dest` as UTF-8,
    /// answering the byte count written.
    ///
    /// # Panics
    /// If `dest` is smaller than [`Node::string_decoded_len`].
    pub fn decode_string_into(&self, dest: &mut [u8]) -> Option<usize> {
        match self.kind {
            NodeKind::String | NodeKind::Key => {
                Some(convert::unescape_into(self.inner_text(), dest))
            }
            _ => None,
        }
    }

    /// Iterates a string or key node's decoded characters.
    pub fn string_chars(&self) -> Option<convert::Unescape<'a>> {
        match self.kind {
            NodeKind::String | NodeKind::Key => Some(convert::unescape(self.inner_text())),
            _ => None,
        }
    }

    /// The span between the quotes. Callers have checked the kind.
    fn inner_text(&self) -> &'a str {
        let text = self.text();
        &text[1..text.len() - 1]
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload {
            Payload::Count(count) => write!(f, "{:?}({})", self.kind, count),
            Payload::Text(text) if text.is_empty() => write!(f, "{:?}", self.kind),
            Payload::Text(text) => write!(f, "{:?} {}", self.kind, text),
        }
    }
}

/// A node handle bound to the buffer slice containing it.
///
/// Structure links are buffer indices, so navigation needs the slice;
/// this pairs the two and derefs to the [`Node`] itself for everything
/// else.
#[derive(Clone, Copy)]
pub struct NodeRef<'a, 'b> {
    nodes: &'b [Node<'a>],
    index: usize,
}

impl<'a, 'b> NodeRef<'a, 'b> {
    /// Binds `index` into `nodes`; `None` when out of range.
    pub fn new(nodes: &'b [Node<'a>], index: usize) -> Option<Self> {
        if index < nodes.len() {
            Some(Self { nodes, index })
        } else {
            None
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn node(&self) -> &'b Node<'a> {
        &self.nodes[self.index]
    }

    /// First child of a container: the next buffer slot, present when the
    /// count is nonzero. For objects that is the first key.
    pub fn first_child(&self) -> Option<Self> {
        if self.node().is_container() && self.node().count() != 0 {
            Self::new(self.nodes, self.index + 1)
        } else {
            None
        }
    }

    /// Same-level successor along this node's chain.
    pub fn next_sibling(&self) -> Option<Self> {
        Self::new(self.nodes, self.node().successor()?)
    }

    /// The value reachable from here: a key answers the node after it,
    /// value nodes answer themselves.
    pub fn value(&self) -> Option<Self> {
        if self.node().is_key() {
            Self::new(self.nodes, self.index + 1)
        } else if self.node().is_value() {
            Some(*self)
        } else {
            None
        }
    }

    /// Iterates the immediate children: array elements, or the keys of an
    /// object (fetch each member's value through [`NodeRef::value`]).
    pub fn children(&self) -> Siblings<'a, 'b> {
        Siblings {
            next: self.first_child(),
        }
    }

    /// Resolves `path` relative to this node.
    pub fn resolve(&self, path: &str) -> Option<Self> {
        crate::path::resolve_from(self.nodes, self.index, path)
    }
}

impl<'a> Deref for NodeRef<'a, '_> {
    type Target = Node<'a>;

    fn deref(&self) -> &Self::Target {
        self.node()
    }
}

impl fmt::Debug for NodeRef<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("index", &self.index)
            .field("node", self.node())
            .finish()
    }
}

impl fmt::Display for NodeRef<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.node(), f)
    }
}

/// Iterator over one successor chain, fronted by [`NodeRef::children`].
pub struct Siblings<'a, 'b> {
    next: Option<NodeRef<'a, 'b>>,
}

impl<'a, 'b> Iterator for Siblings<'a, 'b> {
    type Item = NodeRef<'a, 'b>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}
