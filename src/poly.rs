use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::{future::Future, task::{Poll, Waker}};
use log::trace;
use crate::{Error, Promise};

/// This `poly::Producer` promise can have many consumers. The consumers may be
/// cloned. The consumers return a `Arc<Result<T,E>>`, or
/// `Error::ProducerDropped` when the producer went away without settling.
///
/// # Examples
///
/// ```
/// use promise_chain::{Promise, poly::Producer};
/// use futures::executor::block_on;
/// use std::thread;
/// let (promise, consumer) = Producer::<String, String>::new();
/// let consumer2 = consumer.clone();
/// let task1 = thread::spawn(move || block_on(async {
///     println!("Received on task 1 {:?}",  consumer.await);
/// }));
/// let task2 = thread::spawn(move || block_on(async {
///     println!("Received on task 2 {:?}",  consumer2.await);
/// }));
/// promise.resolve("Hi".into());
/// task1.join().expect("The task1 thread has panicked.");
/// task2.join().expect("The task2 thread has panicked.");
/// ```
#[derive(Debug)]
pub struct Producer<T, E> {
    promise: Arc<Mutex<Inner<T, E>>>,
}

pub struct Consumer<T, E> {
    promise: Arc<Mutex<Inner<T, E>>>,
}

#[derive(Debug)]
struct Inner<T, E> {
    value: Option<Arc<Result<T, E>>>,
    dropped: bool,
    // Every consumer task is woken, not only the last one to poll.
    wakers: Vec<Waker>,
}

impl<T, E> Inner<T, E> {
    fn settle(&mut self, value: Result<T, E>) {
        self.value = Some(Arc::new(value));
        for waker in self.wakers.drain(..) {
            waker.wake()
        }
    }
}

fn lock<T, E>(promise: &Mutex<Inner<T, E>>) -> MutexGuard<'_, Inner<T, E>> {
    // The slot is written once, a poisoned guard still holds a usable state.
    promise.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T, E> Promise for Producer<T, E> {
    type Output = T;
    type Error = E;
    type Waiter = Consumer<T, E>;

    ///promise.resolve
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::{Promise, poly::Producer};
    /// use futures::executor::block_on;
    /// use std::thread;
    /// let (op, op_a) = Producer::<String, ()>::new();
    /// let task1 = thread::spawn(move || block_on(async {
    ///     assert_eq!(*op_a.await.unwrap(), Ok(String::from("🍓")));
    /// }));
    /// op.resolve(String::from("🍓"));
    /// task1.join().expect("The task1 thread has panicked");
    /// ```
    fn resolve(self, value: T) {
        trace!("promise resolved");
        lock(&self.promise).settle(Ok(value));
    }

    ///promise.reject
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::{Promise, poly::Producer};
    /// use futures::executor::block_on;
    /// let (op, op_a) = Producer::<(), String>::new();
    /// op.reject(String::from("💥"));
    /// assert_eq!(*block_on(op_a).unwrap(), Err(String::from("💥")));
    /// ```
    fn reject(self, err: E) {
        trace!("promise rejected");
        lock(&self.promise).settle(Err(err));
    }

    /// promise.new
    ///
    /// Returns the producer together with its first consumer. More consumers
    /// come from cloning that one.
    fn new() -> (Self, Self::Waiter) {
        let producer = Self {
                            promise: Arc::new(Mutex::new(Inner {
                                value: None,
                                dropped: false,
                                wakers: vec![],
                            })),
                        };
        let consumer = Consumer { promise: producer.promise.clone() };
        (producer, consumer)
    }
}

impl<T, E> Drop for Producer<T, E> {
    /// If this is an unresolved producer, wake every consumer with an error.
    fn drop(&mut self) {
        let mut promise = lock(&self.promise);
        if promise.value.is_none() {
            trace!("promise dropped before settling");
            promise.dropped = true;
            for waker in promise.wakers.drain(..) {
                waker.wake()
            }
        }
    }
}

impl<T, E> Clone for Consumer<T, E> {
    fn clone(&self) -> Self {
        Self { promise: self.promise.clone() }
    }
}

impl<T, E> std::fmt::Debug for Consumer<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let promise = lock(&self.promise);
        f.debug_struct("Consumer")
            .field("settled", &promise.value.is_some())
            .field("dropped", &promise.dropped)
            .finish()
    }
}

impl<T, E> Future for Consumer<T, E> {
    type Output = Result<Arc<Result<T, E>>, Error>;

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        let mut guard = lock(&self.promise);
        let promise = &mut *guard;
        match promise.value {
            Some(ref value) => Poll::Ready(Ok(value.clone())),
            None if promise.dropped => Poll::Ready(Err(Error::ProducerDropped)),
            None => {
                if !promise.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                    promise.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
use futures::executor::block_on;
use std::thread;
use super::Producer;
use crate::{Error, Promise};

#[test]
fn test_promise_resolve() {
    let (op, op_a) = Producer::<String, ()>::new();
    let task1 = thread::spawn(move || {
        block_on(async {
            op_a.await
        })
    });
    let task2 = thread::spawn(move || {
        op.resolve(String::from("🍓"));
    });
    task2.join().expect("The task2 thread has panicked");
    let value = task1.join().expect("The task1 thread has panicked").unwrap();
    assert_eq!(*value, Ok(String::from("🍓")));
}

#[test]
fn test_two_consumers_resolve() {
    let (op, op_a) = Producer::<String, ()>::new();
    let op_b = op_a.clone();
    let task1 = thread::spawn(move || block_on(op_a));
    let task2 = thread::spawn(move || block_on(op_b));
    let task3 = thread::spawn(move || op.resolve(String::from("🍓")));
    task3.join().expect("The task3 thread has panicked");
    let a = task1.join().expect("The task1 thread has panicked").unwrap();
    let b = task2.join().expect("The task2 thread has panicked").unwrap();
    assert_eq!(a, b);
    assert_eq!(*a, Ok(String::from("🍓")));
}

#[test]
fn test_promise_reject() {
    let (a, b) = Producer::<String, String>::new();
    let task1 = thread::spawn(|| block_on(b));
    let task2 = thread::spawn(|| a.reject(String::from("reject!!")));
    task2.join().expect("The task2 thread has panicked");
    let value = task1.join().expect("The task1 thread has panicked").unwrap();
    assert_eq!(*value, Err(String::from("reject!!")));
}

#[test]
fn test_promise_unresolved() {
    let (op, op_a) = Producer::<String, ()>::new();
    let task1 = thread::spawn(move || block_on(op_a));
    let task2 = thread::spawn(move || {
        // Move the producer into this thread but never resolve it.
        std::mem::drop(op);
    });
    task2.join().expect("The task2 thread has panicked");
    let result = task1.join().expect("The task1 thread has panicked");
    assert!(matches!(result, Err(Error::ProducerDropped)));
}

#[test]
fn test_promise_no_consumer() {
    let (op, op_a) = Producer::<String, ()>::new();
    std::mem::drop(op_a);
    op.resolve("hi".into());
}

#[test]
fn test_settled_value_is_read_many_times() {
    let (op, op_a) = Producer::<u32, ()>::new();
    op.resolve(7);
    for _ in 0..3 {
        assert_eq!(*block_on(op_a.clone()).unwrap(), Ok(7));
    }
}
}
