//! Bounded FIFO buffers shared between blocks
//!
//! A [`PipeBuf`] is a linear buffer of fixed-size elements with one producer
//! and any number of consumers. Blocks never touch the buffer directly; they
//! hold a [`PipeWriter`] or [`PipeReader`] handle obtained at construction.
//!
//! Every handle exposes the same three-step contract:
//!
//! 1. query how much can be done (`readable()` / `writable()`)
//! 2. borrow a window over exactly that many elements (`rd()` / `wr()`)
//! 3. advance by at most that many elements (`read(k)` / `written(k)`)
//!
//! Space behind the slowest reader is reclaimed lazily: when a writer asks
//! for its window and the tail of the buffer is too short, unread elements
//! are moved to the front. Windows handed out earlier in the same call must
//! be dropped before advancing, which the `RefCell` borrow rules enforce.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

struct PipeState<T> {
    name: String,
    buf: Vec<T>,
    /// Index one past the last committed element
    wr: usize,
    /// Read offset per reader slot; `None` once the reader is dropped
    readers: Vec<Option<usize>>,
    /// Oldest retained element while no reader is registered
    floor: usize,
    total_written: u64,
}

impl<T: Copy> PipeState<T> {
    /// Offset of the oldest element some reader still needs.
    /// With no live readers, everything from `floor` on is kept for the next one.
    fn min_rd(&self) -> usize {
        self.readers.iter().flatten().copied().min().unwrap_or(self.floor)
    }

    /// Read offset of a live reader. Retired slots read as empty.
    fn rd(&self, id: usize) -> usize {
        self.readers[id].unwrap_or(self.wr)
    }

    fn writable(&self) -> usize {
        self.buf.len() - self.wr + self.min_rd()
    }

    /// Move unread elements to the front of the buffer
    fn pack(&mut self) {
        let shift = self.min_rd();
        if shift == 0 {
            return;
        }
        self.buf.copy_within(shift..self.wr, 0);
        self.wr -= shift;
        self.floor = self.floor.saturating_sub(shift);
        for rd in self.readers.iter_mut().flatten() {
            *rd -= shift;
        }
    }
}

/// Bounded single-producer, multi-consumer buffer of `T` elements
pub struct PipeBuf<T> {
    state: Rc<RefCell<PipeState<T>>>,
}

impl<T: Copy + Default> PipeBuf<T> {
    /// Create a buffer holding at most `capacity` unread elements
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(PipeState {
                name: name.into(),
                buf: vec![T::default(); capacity],
                wr: 0,
                readers: Vec::new(),
                floor: 0,
                total_written: 0,
            })),
        }
    }
}

impl<T: Copy> PipeBuf<T> {
    /// Name of this buffer, used as the default name of the blocks bound to it
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    /// Maximum number of unread elements
    pub fn capacity(&self) -> usize {
        self.state.borrow().buf.len()
    }

    /// Total number of elements ever committed by the writer
    pub fn total_written(&self) -> u64 {
        self.state.borrow().total_written
    }

    /// Number of live readers
    pub fn num_readers(&self) -> usize {
        self.state.borrow().readers.iter().flatten().count()
    }

    /// Get the producer handle.
    ///
    /// A buffer has exactly one producer; the caller is responsible for not
    /// binding two writing blocks to the same buffer.
    pub fn writer(&self) -> PipeWriter<T> {
        PipeWriter {
            state: Rc::clone(&self.state),
        }
    }

    /// Register a new consumer.
    ///
    /// The reader starts at the oldest element still held by the buffer, so
    /// readers registered before any data is written see the whole stream.
    /// Dropping the reader releases its hold on the buffer.
    pub fn reader(&self) -> PipeReader<T> {
        let mut state = self.state.borrow_mut();
        let start = state.min_rd();
        let free_slot = state.readers.iter().position(Option::is_none);
        let id = match free_slot {
            Some(free) => {
                state.readers[free] = Some(start);
                free
            }
            None => {
                state.readers.push(Some(start));
                state.readers.len() - 1
            }
        };
        PipeReader {
            state: Rc::clone(&self.state),
            id,
        }
    }
}

impl<T> Clone for PipeBuf<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for PipeBuf<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.borrow();
        write!(
            f,
            "PipeBuf[{}: {}/{} used, {} readers]",
            state.name,
            state.wr,
            state.buf.len(),
            state.readers.iter().flatten().count()
        )
    }
}

/// Consumer handle into a [`PipeBuf`]
pub struct PipeReader<T> {
    state: Rc<RefCell<PipeState<T>>>,
    id: usize,
}

impl<T: Copy> PipeReader<T> {
    /// Number of elements available to this reader
    pub fn readable(&self) -> usize {
        let state = self.state.borrow();
        state.wr - state.rd(self.id)
    }

    /// Read-only window over exactly `readable()` elements
    pub fn rd(&self) -> Ref<'_, [T]> {
        let id = self.id;
        Ref::map(self.state.borrow(), |state| {
            &state.buf[state.rd(id)..state.wr]
        })
    }

    /// Discard the first `count` readable elements from this reader's view.
    ///
    /// # Panics
    /// Panics if `count` exceeds `readable()`.
    pub fn read(&mut self, count: usize) {
        let mut state = self.state.borrow_mut();
        let rd = state.rd(self.id);
        let available = state.wr - rd;
        assert!(
            count <= available,
            "[{}] read({}) with only {} readable elements",
            state.name,
            count,
            available
        );
        state.readers[self.id] = Some(rd + count);
    }

    /// Name of the buffer this reader is bound to
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }
}

impl<T> Drop for PipeReader<T> {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(rd) = state.readers[self.id].take()
            && state.readers.iter().all(Option::is_none)
        {
            state.floor = rd;
        }
    }
}

/// Producer handle into a [`PipeBuf`]
pub struct PipeWriter<T> {
    state: Rc<RefCell<PipeState<T>>>,
}

impl<T: Copy> PipeWriter<T> {
    /// Number of free element slots
    pub fn writable(&self) -> usize {
        self.state.borrow().writable()
    }

    /// Writable window over exactly `writable()` elements.
    ///
    /// Elements placed in the window stay invisible to readers until
    /// `written()` commits them.
    pub fn wr(&mut self) -> RefMut<'_, [T]> {
        let mut state = self.state.borrow_mut();
        if state.buf.len() - state.wr < state.writable() {
            state.pack();
        }
        RefMut::map(state, |state| {
            let wr = state.wr;
            &mut state.buf[wr..]
        })
    }

    /// Commit the first `count` elements of the window.
    ///
    /// # Panics
    /// Panics if `count` exceeds the window returned by `wr()`.
    pub fn written(&mut self, count: usize) {
        let mut state = self.state.borrow_mut();
        let room = state.buf.len() - state.wr;
        assert!(
            count <= room,
            "[{}] written({}) with only {} slots in the window",
            state.name,
            count,
            room
        );
        state.wr += count;
        state.total_written += count as u64;
    }

    /// Copy `items` into the buffer and commit them, up to the free space.
    /// Returns how many were committed.
    pub fn push_slice(&mut self, items: &[T]) -> usize {
        let count = {
            let mut window = self.wr();
            let count = items.len().min(window.len());
            window[..count].copy_from_slice(&items[..count]);
            count
        };
        self.written(count);
        count
    }

    /// Name of the buffer this writer is bound to
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }
}
