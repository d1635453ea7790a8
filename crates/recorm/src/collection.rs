//! Lazily hydrated, single-pass results.

use crate::connection::Connection;
use crate::entity::Entity;
use crate::error::OrmResult;
use crate::handle::RowCursor;
use crate::model::Model;
use std::fmt;
use std::iter::Peekable;
use std::sync::Arc;

/// Observable position of a [`Collection`]'s cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Nothing fetched yet.
    Unconsumed,
    /// A row is available: fetched, or buffered and not yet hydrated.
    Positioned,
    /// Terminal: the cursor passed its last row.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unconsumed,
    Positioned,
    // The positioned model was handed out; the following row is buffered but not hydrated.
    Between,
    Exhausted,
}

/// A forward-only sequence of models hydrated one row at a time.
///
/// `first`/`current` position the cursor on demand and never advance it; iteration hands
/// out the positioned model (if any) and then the remaining rows.
pub struct Collection<E: Entity> {
    conn: Arc<Connection>,
    rows: Peekable<RowCursor>,
    current: Option<Model<E>>,
    state: State,
}

impl<E: Entity> Collection<E> {
    pub(crate) fn new(conn: Arc<Connection>, rows: RowCursor) -> Self {
        Self {
            conn,
            rows: rows.peekable(),
            current: None,
            state: State::Unconsumed,
        }
    }

    pub fn state(&self) -> CursorState {
        match self.state {
            State::Unconsumed => CursorState::Unconsumed,
            State::Positioned | State::Between => CursorState::Positioned,
            State::Exhausted => CursorState::Exhausted,
        }
    }

    /// The element the cursor is positioned on, or `None` when there is none.
    ///
    /// Calling it repeatedly returns the same element.
    pub fn first(&mut self) -> OrmResult<Option<&Model<E>>> {
        self.current()
    }

    pub fn current(&mut self) -> OrmResult<Option<&Model<E>>> {
        if matches!(self.state, State::Unconsumed | State::Between) {
            self.fetch()?;
        }
        Ok(self.current.as_ref())
    }

    /// Whether the cursor is positioned on a row.
    pub fn valid(&mut self) -> OrmResult<bool> {
        Ok(self.current()?.is_some())
    }

    /// Move past the current element.
    pub fn advance(&mut self) -> OrmResult<()> {
        self.current()?;
        if self.state == State::Positioned {
            self.current = None;
            self.step_past_current();
        }
        Ok(())
    }

    /// Pull the next row into `current`.
    ///
    /// A failed row leaves the cursor past that row so iteration can go on.
    fn fetch(&mut self) -> OrmResult<()> {
        match self.rows.next() {
            Some(row) => {
                self.step_past_current();
                let model = Model::hydrate(Arc::clone(&self.conn), row?)?;
                self.current = Some(model);
                self.state = State::Positioned;
            }
            None => {
                self.current = None;
                self.state = State::Exhausted;
            }
        }
        Ok(())
    }

    /// Settle the state after leaving a row: exhausted unless another row is buffered.
    fn step_past_current(&mut self) {
        self.state = match self.rows.peek() {
            Some(_) => State::Between,
            None => State::Exhausted,
        };
    }
}

impl<E: Entity> Iterator for Collection<E> {
    type Item = OrmResult<Model<E>>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, State::Unconsumed | State::Between) {
            if let Err(e) = self.fetch() {
                return Some(Err(e));
            }
        }

        match self.state {
            State::Positioned => {
                let current = self.current.take();
                self.step_past_current();
                current.map(Ok)
            }
            _ => None,
        }
    }
}

impl<E: Entity> fmt::Debug for Collection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("table", &E::schema().table())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
