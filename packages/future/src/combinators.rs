//! Fan-out/fan-in over many tasks.
//!
//! Results are stored by input index, so their order matches the input no
//! matter which task finishes first. A failing task never aborts its
//! siblings; its error is collected and its result slot stays `None`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use remotestorage_diagnostics::Logger;

use crate::{Continued, Future, Outcome, Runtime};

/// A unit of work for [`Runtime::group`].
pub type Task<T, E> = Box<dyn FnOnce() -> Continued<T, E>>;

/// Index-aligned results plus every error caught along the way.
pub type Collected<T, E> = (Vec<Option<T>>, Vec<E>);

struct Collector<T, E> {
    results: Vec<Option<T>>,
    errors: Vec<E>,
    todo: usize,
}

fn finish_one<T, E>(
    collector: &Rc<RefCell<Collector<T, E>>>,
    done: &Future<Collected<T, E>, E>,
    logger: &Logger,
    index: usize,
    outcome: Result<T, E>,
) where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    let collected = {
        let mut collector = collector.borrow_mut();
        match outcome {
            Ok(value) => collector.results[index] = Some(value),
            Err(error) => {
                logger.debug(format_args!("group part {} failed: {:?}", index, error));
                collector.errors.push(error);
            }
        }
        collector.todo -= 1;
        if collector.todo > 0 {
            return;
        }
        (
            std::mem::take(&mut collector.results),
            std::mem::take(&mut collector.errors),
        )
    };
    done.resolve(Ok(Outcome::Value(collected)));
}

impl Runtime {
    /// Run every task and fulfill with `(results, errors)` once all of them
    /// have finished.
    ///
    /// Tasks start on the next tick. The returned future never fails.
    pub fn group<T, E>(&self, tasks: Vec<Task<T, E>>) -> Future<Collected<T, E>, E>
    where
        T: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
    {
        let logger = self.logger().clone();
        self.make_future(move |done| {
            if tasks.is_empty() {
                done.resolve(Ok(Outcome::Value((Vec::new(), Vec::new()))));
                return Ok(None);
            }

            let collector = Rc::new(RefCell::new(Collector {
                results: (0..tasks.len()).map(|_| None).collect(),
                errors: Vec::new(),
                todo: tasks.len(),
            }));

            for (index, task) in tasks.into_iter().enumerate() {
                match task() {
                    Ok(Outcome::Value(value)) => {
                        finish_one(&collector, done, &logger, index, Ok(value))
                    }
                    Ok(Outcome::Pending(future)) => {
                        let collector = Rc::clone(&collector);
                        let done = done.clone();
                        let logger = logger.clone();
                        future.on_settled(move |outcome| {
                            finish_one(&collector, &done, &logger, index, outcome)
                        });
                    }
                    Err(error) => finish_one(&collector, done, &logger, index, Err(error)),
                }
            }
            Ok(None)
        })
    }

    /// Apply `iterator` to every item and fulfill with the original items
    /// and the errors raised along the way.
    pub fn each<I, U, E, F>(&self, items: Vec<I>, iterator: F) -> Future<(Vec<I>, Vec<E>), E>
    where
        I: Clone + 'static,
        U: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
        F: FnMut(&I, usize) -> Continued<U, E> + 'static,
    {
        let iterator = Rc::new(RefCell::new(iterator));
        let tasks = items
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, item)| {
                let iterator = Rc::clone(&iterator);
                Box::new(move || {
                    let mut iterator = iterator.borrow_mut();
                    let step = (*iterator)(&item, index);
                    step
                }) as Task<U, E>
            })
            .collect();

        self.group(tasks).map(move |(_, errors)| (items, errors))
    }

    /// Transform every item with `mapper`, fulfilling with
    /// `(results, errors)`.
    pub fn map<I, U, E, F>(&self, items: Vec<I>, mapper: F) -> Future<Collected<U, E>, E>
    where
        I: 'static,
        U: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
        F: FnMut(I) -> Continued<U, E> + 'static,
    {
        let mapper = Rc::new(RefCell::new(mapper));
        let tasks = items
            .into_iter()
            .map(|item| {
                let mapper = Rc::clone(&mapper);
                Box::new(move || {
                    let mut mapper = mapper.borrow_mut();
                    let step = (*mapper)(item);
                    step
                }) as Task<U, E>
            })
            .collect();

        self.group(tasks)
    }

    /// Keep the items whose predicate comes back `true`, in input order.
    ///
    /// Items whose predicate fails are left out.
    pub fn select<I, E, F>(&self, items: Vec<I>, mut predicate: F) -> Future<Vec<I>, E>
    where
        I: Clone + 'static,
        E: Clone + fmt::Debug + 'static,
        F: FnMut(&I) -> Continued<bool, E> + 'static,
    {
        let matches = Rc::new(RefCell::new(vec![false; items.len()]));
        let flags = Rc::clone(&matches);

        self.each(items, move |item, index| {
            let flags = Rc::clone(&flags);
            match predicate(item)? {
                Outcome::Value(hit) => {
                    flags.borrow_mut()[index] = hit;
                    Ok(Outcome::Value(()))
                }
                Outcome::Pending(future) => Ok(Outcome::Pending(
                    future.map(move |hit| flags.borrow_mut()[index] = hit),
                )),
            }
        })
        .map(move |(items, _errors)| {
            let flags = matches.take();
            items
                .into_iter()
                .zip(flags)
                .filter_map(|(item, hit)| hit.then_some(item))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remotestorage_diagnostics::{Diagnostics, Level, RecordingSink};

    fn runtime() -> (Runtime, RecordingSink) {
        let diagnostics = Diagnostics::new();
        let sink = RecordingSink::new();
        diagnostics.set_sink(sink.clone());
        (Runtime::new(&diagnostics), sink)
    }

    fn value<T, E>(value: T) -> Continued<T, E> {
        Ok(Outcome::Value(value))
    }

    #[test]
    fn group_collects_synchronous_failure() {
        let (runtime, sink) = runtime();
        let tasks: Vec<Task<i32, String>> = vec![
            Box::new(|| value(1)),
            Box::new(|| Err("second task threw".to_string())),
            Box::new(|| value(3)),
        ];

        let group = runtime.group(tasks);
        assert!(!group.is_settled());
        runtime.run_until_idle();

        let (results, errors) = group.outcome().unwrap().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results, vec![Some(1), None, Some(3)]);
        assert_eq!(errors, vec!["second task threw".to_string()]);
        assert!(sink.at_level(Level::Error).is_empty());
    }

    #[test]
    fn group_with_no_tasks_fulfills_empty() {
        let (runtime, _) = runtime();
        let group = runtime.group::<i32, String>(Vec::new());
        runtime.run_until_idle();

        assert_eq!(group.outcome(), Some(Ok((Vec::new(), Vec::new()))));
    }

    #[test]
    fn group_keeps_input_order_regardless_of_completion() {
        let (runtime, _) = runtime();
        let futures: Vec<Future<&'static str, String>> =
            (0..3).map(|_| runtime.future()).collect();

        let tasks: Vec<Task<&'static str, String>> = futures
            .iter()
            .cloned()
            .map(|future| {
                Box::new(move || Ok(Outcome::Pending(future))) as Task<&'static str, String>
            })
            .collect();
        let group = runtime.group(tasks);
        runtime.run_until_idle();
        assert!(!group.is_settled());

        futures[2].fulfill("c").unwrap();
        futures[0].fail("a failed".into()).unwrap();
        assert!(!group.is_settled());
        futures[1].fulfill("b").unwrap();

        let (results, errors) = group.outcome().unwrap().unwrap();
        assert_eq!(results, vec![None, Some("b"), Some("c")]);
        assert_eq!(errors, vec!["a failed".to_string()]);
    }

    #[test]
    fn map_squares() {
        let (runtime, _) = runtime();
        let squares = runtime.map(vec![1, 2, 3], |x: i32| value::<i32, String>(x * x));
        runtime.run_until_idle();

        let (results, errors) = squares.outcome().unwrap().unwrap();
        assert_eq!(results, vec![Some(1), Some(4), Some(9)]);
        assert!(errors.is_empty());
    }

    #[test]
    fn map_with_deferred_results() {
        let (runtime, _) = runtime();
        let scheduler = runtime.clone();
        let lengths = runtime.map(vec!["a", "bbb", "cc"], move |word: &str| {
            let future: Future<usize, String> = scheduler.future();
            future.fulfill_later(word.len());
            Ok(Outcome::Pending(future))
        });
        runtime.run_until_idle();

        let (results, errors) = lengths.outcome().unwrap().unwrap();
        assert_eq!(results, vec![Some(1), Some(3), Some(2)]);
        assert!(errors.is_empty());
    }

    #[test]
    fn each_returns_original_items_and_errors() {
        let (runtime, _) = runtime();
        let visited = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&visited);

        let each = runtime.each(vec!["x", "y", "z"], move |item: &&str, index| {
            log.borrow_mut().push((index, *item));
            if *item == "y" {
                Err(format!("cannot handle {}", item))
            } else {
                value(())
            }
        });
        runtime.run_until_idle();

        let (items, errors) = each.outcome().unwrap().unwrap();
        assert_eq!(items, vec!["x", "y", "z"]);
        assert_eq!(errors, vec!["cannot handle y".to_string()]);
        assert_eq!(*visited.borrow(), vec![(0, "x"), (1, "y"), (2, "z")]);
    }

    #[test]
    fn select_keeps_matching_items_in_order() {
        let (runtime, _) = runtime();
        let scheduler = runtime.clone();
        let pending: Rc<RefCell<Vec<(Future<bool, String>, bool)>>> =
            Rc::new(RefCell::new(Vec::new()));
        let queue = Rc::clone(&pending);

        let selected = runtime.select(vec![1, 2, 3, 4, 5, 6], move |n: &i32| {
            if *n == 5 {
                return Err("five is unknowable".to_string());
            }
            let future = scheduler.future();
            queue.borrow_mut().push((future.clone(), n % 2 == 0));
            Ok(Outcome::Pending(future))
        });
        runtime.run_until_idle();

        // Settle in reverse to show completion order does not matter.
        let answers: Vec<_> = pending.borrow_mut().drain(..).collect();
        for (future, answer) in answers.into_iter().rev() {
            future.fulfill(answer).unwrap();
        }

        assert_eq!(selected.outcome(), Some(Ok(vec![2, 4, 6])));
    }

    #[test]
    fn select_with_immediate_predicate() {
        let (runtime, _) = runtime();
        let selected = runtime.select(vec!["/a/", "b", "/c/"], |path: &&str| {
            value::<bool, String>(path.ends_with('/'))
        });
        runtime.run_until_idle();

        assert_eq!(selected.outcome(), Some(Ok(vec!["/a/", "/c/"])));
    }
}
