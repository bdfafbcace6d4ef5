//! `Deferred` is the chainable side of a promise. Each one owns a consumer of
//! a `poly` promise. Its producer is handed to the thread running the
//! computation, or to the executor task that waits on the predecessor.
//!
use crate::executor::Executor;
use crate::poly::{Consumer, Producer};
use crate::{Error, Promise};
use futures::executor::block_on;
use log::{debug, error};
use std::panic::{self, AssertUnwindSafe};

/// A value of type `T` that becomes available later, or an error `E`.
///
/// Clones share the same outcome.
pub struct Deferred<T, E> {
    pub(crate) waiter: Consumer<T, E>,
    pub(crate) executor: Executor,
}

/// Runs `computation` on the global executor.
///
/// # Examples
///
/// ```
/// use promise_chain::spawn;
/// use std::{thread, time::Duration};
///
/// let deferred = spawn(|| {
///     thread::sleep(Duration::from_millis(10));
///     Ok::<_, String>(10)
/// });
/// assert_eq!(deferred.wait(), Ok(10));
/// ```
pub fn spawn<T, E, F>(computation: F) -> Deferred<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    Deferred::spawn_on(Executor::global(), computation)
}

/// Settles `producer` with the result of `step`. A panic in `step` drops the
/// producer unsettled.
pub(crate) fn settle<T, E, F>(producer: Producer<T, E>, step: F)
where
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(step)) {
        Ok(Ok(value)) => producer.resolve(value),
        Ok(Err(err)) => producer.reject(err),
        Err(_) => error!("deferred computation panicked, abandoning its promise"),
    }
}

impl<T, E> Deferred<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub(crate) fn spawn_on<F>(executor: &Executor, computation: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let (producer, waiter) = Producer::new();
        executor.run_blocking(move || settle(producer, computation));
        Self {
            waiter,
            executor: executor.clone(),
        }
    }

    /// Runs `f` on the value once this settles. An error skips `f` and is
    /// passed on unchanged.
    pub fn then<F>(&self, f: F) -> Deferred<T, E>
    where
        F: FnOnce(T) -> Result<T, E> + Send + 'static,
    {
        self.continue_with(move |outcome| outcome.and_then(f))
    }

    /// Runs `f` on the error once this settles. A value skips `f` and is
    /// passed on unchanged.
    pub fn catch<F>(&self, f: F) -> Deferred<T, E>
    where
        F: FnOnce(E) -> Result<T, E> + Send + 'static,
    {
        self.continue_with(move |outcome| outcome.or_else(f))
    }

    /// Runs `f` once this settles, whatever the outcome. The outcome is passed
    /// on unchanged.
    pub fn finally<F>(&self, f: F) -> Deferred<T, E>
    where
        F: FnOnce() + Send + 'static,
    {
        self.continue_with(move |outcome| {
            f();
            outcome
        })
    }

    fn continue_with<F>(&self, step: F) -> Deferred<T, E>
    where
        F: FnOnce(Result<T, E>) -> Result<T, E> + Send + 'static,
    {
        let (producer, waiter) = Producer::new();
        let predecessor = self.waiter.clone();
        let executor = self.executor.clone();
        self.executor.run(async move {
            match predecessor.await {
                Ok(outcome) => executor
                    .run_blocking(move || settle(producer, move || step((*outcome).clone()))),
                Err(err) => debug!("skipping continuation: {}", err),
            }
        });
        Deferred {
            waiter,
            executor: self.executor.clone(),
        }
    }

    /// Blocks the current thread until this settles.
    ///
    /// Computations and continuations run on their own threads, so they may
    /// wait on other deferreds too.
    ///
    /// # Panics
    ///
    /// Panics if the computation behind this deferred, or one before it in the
    /// chain, panicked. Use [`Deferred::try_wait`] to observe that instead.
    pub fn wait(&self) -> Result<T, E> {
        match self.try_wait() {
            Ok(outcome) => outcome,
            Err(err) => panic!("{}", err),
        }
    }

    /// Like [`Deferred::wait`], but reports an abandoned chain as
    /// `Error::ProducerDropped`.
    pub fn try_wait(&self) -> Result<Result<T, E>, Error> {
        let outcome = block_on(self.waiter.clone())?;
        Ok((*outcome).clone())
    }

    /// The executor this deferred's continuations are scheduled on.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            waiter: self.waiter.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").field("waiter", &self.waiter).finish()
    }
}
