//! Single-resolution futures with chained continuations.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::{FutureError, Runtime};

/// What a continuation or task hands back: either a plain value or another
/// future whose outcome should be adopted once it settles.
pub enum Outcome<T, E> {
    Value(T),
    Pending(Future<T, E>),
}

impl<T, E> From<Future<T, E>> for Outcome<T, E> {
    fn from(future: Future<T, E>) -> Self {
        Outcome::Pending(future)
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Outcome::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Return type of continuations. An `Err` fails the successor future.
pub type Continued<T, E> = Result<Outcome<T, E>, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureState {
    Pending,
    Fulfilled,
    Failed,
}

impl fmt::Display for FutureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FutureState::Pending => "pending",
            FutureState::Fulfilled => "fulfilled",
            FutureState::Failed => "failed",
        })
    }
}

type Continuation<T, E> = Box<dyn FnOnce(Result<T, E>)>;

struct Slot<T, E> {
    outcome: Option<Result<T, E>>,
    continuations: Vec<Continuation<T, E>>,
}

/// A deferred value that is fulfilled or failed exactly once.
///
/// Any number of continuations may be registered; they run in registration
/// order, synchronously, inside the call that settles the future. Each
/// [`then`](Future::then) returns its own successor. A continuation
/// registered after the future settled runs immediately.
///
/// A future that fails while nobody is listening reports the error to the
/// runtime's diagnostics at `error` level.
pub struct Future<T, E> {
    slot: Rc<RefCell<Slot<T, E>>>,
    runtime: Runtime,
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T, E> Future<T, E> {
    pub(crate) fn new(runtime: Runtime) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                outcome: None,
                continuations: Vec::new(),
            })),
            runtime,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn state(&self) -> FutureState {
        match &self.slot.borrow().outcome {
            None => FutureState::Pending,
            Some(Ok(_)) => FutureState::Fulfilled,
            Some(Err(_)) => FutureState::Failed,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state() != FutureState::Pending
    }
}

impl<T, E> Future<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Fulfill with `value` and run continuations.
    ///
    /// Fails with [`FutureError::AlreadySettled`] if the future was already
    /// fulfilled or failed.
    pub fn fulfill(&self, value: T) -> Result<(), FutureError> {
        self.settle(Ok(value))
    }

    /// Fail with `error` and run continuations.
    pub fn fail(&self, error: E) -> Result<(), FutureError> {
        self.settle(Err(error))
    }

    /// Fulfill on a later tick of the runtime.
    pub fn fulfill_later(&self, value: T) -> Self {
        let target = self.clone();
        self.runtime
            .next_tick(move || target.report(target.fulfill(value)));
        self.clone()
    }

    /// Fail on a later tick of the runtime.
    pub fn fail_later(&self, error: E) -> Self {
        let target = self.clone();
        self.runtime
            .next_tick(move || target.report(target.fail(error)));
        self.clone()
    }

    /// Settle from a continuation result: fulfill with a value, adopt a
    /// pending future, or fail with an error.
    pub fn resolve(&self, step: Continued<T, E>) {
        match step {
            Ok(Outcome::Value(value)) => self.report(self.fulfill(value)),
            Ok(Outcome::Pending(inner)) => inner.forward_to(self),
            Err(error) => self.report(self.fail(error)),
        }
    }

    /// The settled outcome, if any.
    pub fn outcome(&self) -> Option<Result<T, E>> {
        self.slot.borrow().outcome.clone()
    }

    /// Register a raw continuation that observes the outcome without creating
    /// a successor.
    pub fn on_settled(&self, continuation: impl FnOnce(Result<T, E>) + 'static) {
        let outcome = {
            let mut slot = self.slot.borrow_mut();
            match slot.outcome.clone() {
                Some(outcome) => outcome,
                None => {
                    slot.continuations.push(Box::new(continuation));
                    return;
                }
            }
        };
        continuation(outcome);
    }

    /// Settle `target` with whatever this future settles with.
    pub fn forward_to(&self, target: &Future<T, E>) {
        let target = target.clone();
        self.on_settled(move |outcome| target.report(target.settle(outcome)));
    }

    /// Register handlers for both outcomes and return the successor they feed.
    pub fn then<U, F, R>(&self, on_fulfilled: F, on_failed: R) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Continued<U, E> + 'static,
        R: FnOnce(E) -> Continued<U, E> + 'static,
    {
        let successor = self.runtime.future();
        let next = successor.clone();
        self.on_settled(move |outcome| {
            let step = match outcome {
                Ok(value) => on_fulfilled(value),
                Err(error) => on_failed(error),
            };
            next.resolve(step);
        });
        successor
    }

    pub fn and_then<U, F>(&self, on_fulfilled: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Continued<U, E> + 'static,
    {
        self.then(on_fulfilled, |error| Err(error))
    }

    pub fn map<U, F>(&self, transform: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.and_then(move |value| Ok(Outcome::Value(transform(value))))
    }

    /// Recover from a failure. Fulfilled values pass through.
    pub fn or_else<F>(&self, on_failed: F) -> Future<T, E>
    where
        F: FnOnce(E) -> Continued<T, E> + 'static,
    {
        self.then(|value| Ok(Outcome::Value(value)), on_failed)
    }

    /// Invoke `method` on the fulfilled value and continue with its result.
    pub fn call<U, F>(&self, method: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(&T) -> Continued<U, E> + 'static,
    {
        self.and_then(move |value| method(&value))
    }

    fn settle(&self, outcome: Result<T, E>) -> Result<(), FutureError> {
        let continuations = {
            let mut slot = self.slot.borrow_mut();
            if let Some(previous) = &slot.outcome {
                let state = match previous {
                    Ok(_) => FutureState::Fulfilled,
                    Err(_) => FutureState::Failed,
                };
                return Err(FutureError::AlreadySettled(state));
            }
            slot.outcome = Some(outcome.clone());
            std::mem::take(&mut slot.continuations)
        };

        if continuations.is_empty() {
            if let Err(error) = &outcome {
                self.runtime
                    .logger()
                    .error(format_args!("Uncaught error: {:?}", error));
            }
            return Ok(());
        }

        for continuation in continuations {
            continuation(outcome.clone());
        }
        Ok(())
    }

    pub(crate) fn report(&self, result: Result<(), FutureError>) {
        if let Err(error) = result {
            self.runtime.logger().error(error);
        }
    }
}

impl<E> Future<Value, E>
where
    E: Clone + fmt::Debug + From<FutureError> + 'static,
{
    /// Read fields of the fulfilled JSON object.
    ///
    /// The successor is fulfilled on a later tick with the field values in
    /// the order requested, `Null` for missing fields. It fails if the value
    /// is not an object.
    pub fn get(&self, fields: &[&str]) -> Future<Vec<Value>, E> {
        let fields: Vec<String> = fields.iter().map(|field| field.to_string()).collect();
        let runtime = self.runtime.clone();
        self.and_then(move |value| {
            let future = runtime.future();
            match value.as_object() {
                Some(object) => {
                    let values = fields
                        .iter()
                        .map(|field| object.get(field).cloned().unwrap_or(Value::Null))
                        .collect();
                    future.fulfill_later(values);
                }
                None => {
                    future.fail_later(
                        FutureError::NotAnObject {
                            fields: fields.join(", "),
                        }
                        .into(),
                    );
                }
            }
            Ok(Outcome::Pending(future))
        })
    }
}

impl<T, E> fmt::Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("state", &self.state())
            .field("continuations", &self.slot.borrow().continuations.len())
            .finish()
    }
}
