//! Parser driver: routes scanner observations onto a streaming-node tree.

mod scanner;

pub use scanner::{ScanStatus, Scanner};

use crate::error::StreamError;
use crate::node::Node;

/// Drives character chunks through the partial-JSON scanner and forwards
/// each changed observation to the root node's `update`. The root is
/// borrowed for the parser's lifetime; callbacks must already be
/// registered (or be registered from inside other callbacks, as array
/// children appear).
///
/// Errors from user callbacks and from the stream itself propagate out of
/// `push`/`complete`; after an error the parser must be dropped.
pub struct Parser<'a> {
    root: &'a mut Node,
    scanner: Scanner,
    completed: bool,
}

impl<'a> Parser<'a> {
    pub fn new(root: &'a mut Node) -> Self {
        Self {
            root,
            scanner: Scanner::new(),
            completed: false,
        }
    }

    /// Feed the next chunk of the document. Empty chunks are no-ops.
    pub fn push(&mut self, chunk: &str) -> Result<(), StreamError> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.scanner.push(chunk)?;
        self.dispatch()
    }

    /// Finish the stream: flush anything the scanner still holds, forward
    /// the final observation, and complete the root node. Idempotent; a
    /// second call is a silent no-op.
    pub fn complete(&mut self) -> Result<(), StreamError> {
        if self.completed {
            return Ok(());
        }
        self.completed = true;
        self.scanner.finish();
        self.dispatch()?;
        self.root.complete()
    }

    /// Whether the scanner has seen the document close.
    pub fn status(&self) -> ScanStatus {
        self.scanner.status()
    }

    fn dispatch(&mut self) -> Result<(), StreamError> {
        if !self.scanner.take_dirty() {
            return Ok(());
        }
        match self.scanner.view() {
            Some(view) => self.root.update(view),
            None => Ok(()),
        }
    }
}

/// Run `f` with a parser over `root`, guaranteeing `complete()` on exit.
/// When `f` itself fails, its error wins and a secondary completion error
/// is dropped.
pub fn scoped<T>(
    root: &mut Node,
    f: impl FnOnce(&mut Parser<'_>) -> Result<T, StreamError>,
) -> Result<T, StreamError> {
    let mut parser = Parser::new(root);
    match f(&mut parser) {
        Ok(value) => {
            parser.complete()?;
            Ok(value)
        }
        Err(err) => {
            let _ = parser.complete();
            Err(err)
        }
    }
}
