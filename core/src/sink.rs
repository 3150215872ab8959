//! Shared writer handles.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// A shareable output sink. Flag sets and the instructer hold one of
/// these so a single buffer or stream can collect output from several
/// components (and so tests can capture it).
pub type Sink = Rc<RefCell<dyn Write>>;

/// Wraps a writer into a [`Sink`].
pub fn sink<W: Write + 'static>(writer: W) -> Sink {
    Rc::new(RefCell::new(writer))
}
