//! The cooperative scheduler.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use remotestorage_diagnostics::{Diagnostics, Logger};

use crate::future::Future;

type Tick = Box<dyn FnOnce()>;

struct Scheduler {
    queue: RefCell<VecDeque<Tick>>,
    logger: Logger,
}

/// Single-threaded tick queue that every deferred resolution goes through.
///
/// Nothing runs until the owner calls [`tick`](Runtime::tick) or
/// [`run_until_idle`](Runtime::run_until_idle). Each queued action runs to
/// completion with an empty stack above it, so continuations never reenter
/// the code that scheduled them.
///
/// Cloning is cheap; clones share the same queue.
#[derive(Clone)]
pub struct Runtime {
    scheduler: Rc<Scheduler>,
}

impl Runtime {
    pub fn new(diagnostics: &Arc<Diagnostics>) -> Self {
        Self {
            scheduler: Rc::new(Scheduler {
                queue: RefCell::new(VecDeque::new()),
                logger: diagnostics.logger("future"),
            }),
        }
    }

    pub(crate) fn logger(&self) -> &Logger {
        &self.scheduler.logger
    }

    /// Create an unsettled future bound to this runtime.
    pub fn future<T, E>(&self) -> Future<T, E> {
        Future::new(self.clone())
    }

    /// Queue `action` to run on a later tick.
    pub fn next_tick(&self, action: impl FnOnce() + 'static) {
        self.scheduler.queue.borrow_mut().push_back(Box::new(action));
    }

    pub fn pending_ticks(&self) -> usize {
        self.scheduler.queue.borrow().len()
    }

    /// Run the oldest queued action. Returns `false` if the queue was empty.
    pub fn tick(&self) -> bool {
        let next = self.scheduler.queue.borrow_mut().pop_front();
        match next {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    /// Run queued actions, including ones they queue, until none are left.
    ///
    /// Returns the number of ticks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ticks = 0;
        while self.tick() {
            ticks += 1;
        }
        ticks
    }

    /// Create a future and hand it to `setup` on the next tick.
    ///
    /// `setup` may settle the future itself and return `Ok(None)`, return
    /// another future whose outcome is forwarded, or return an error which
    /// fails the future.
    pub fn make_future<T, E, F>(&self, setup: F) -> Future<T, E>
    where
        T: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
        F: FnOnce(&Future<T, E>) -> Result<Option<Future<T, E>>, E> + 'static,
    {
        let future = self.future();
        let target = future.clone();
        self.next_tick(move || match setup(&target) {
            Ok(Some(chained)) => chained.forward_to(&target),
            Ok(None) => {}
            Err(error) => target.report(target.fail(error)),
        });
        future
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("pending_ticks", &self.pending_ticks())
            .finish()
    }
}
