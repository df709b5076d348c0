// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// Terminal outcome of a parse attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// No parse attempt has completed yet.
    NotDone,
    /// The document parsed completely.
    Valid,
    /// The tokenizer hit a span it could not lex.
    InvalidTokens,
    /// A well-formed token appeared in an illegal grammar position.
    SyntacticErrors,
    /// The node buffer filled up before the document was finished. The
    /// caller should re-invoke parse with a larger buffer.
    CapacityExceeded,
}

pub(crate) const ERROR_LOG_CAPACITY: usize = 255;

/// Fixed-capacity diagnostic text buffer.
///
/// Appended to through `core::fmt::Write`. Once full it fails closed:
/// excess text is dropped at a character boundary, the buffer never grows.
pub(crate) struct ErrorLog {
    buf: [u8; ERROR_LOG_CAPACITY],
    len: usize,
}

impl ErrorLog {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0; ERROR_LOG_CAPACITY],
            len: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    pub(crate) fn as_str(&self) -> &str {
        // Only complete UTF-8 sequences are ever copied in.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl fmt::Write for ErrorLog {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let space = ERROR_LOG_CAPACITY - self.len;
        let take = if s.len() <= space {
            s.len()
        } else {
            let mut n = space;
            while n > 0 && !s.is_char_boundary(n) {
                n -= 1;
            }
            n
        };
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}
