use crate::deferred::Deferred;
use crate::executor::Executor;
use crate::poly::Producer;
use crate::Promise;
use log::debug;

/// Waits on every deferred and collects their values in input order.
///
/// The inputs are awaited one after another in the order given. The first
/// error by position settles the result; values and errors after it are
/// discarded. An empty input resolves to an empty vector.
///
/// # Examples
///
/// ```
/// use promise_chain::{parallel, spawn};
/// use std::{thread, time::Duration};
///
/// let slow = spawn(|| {
///     thread::sleep(Duration::from_millis(20));
///     Ok::<_, String>(100)
/// });
/// let fast = spawn(|| Ok::<_, String>(200));
/// assert_eq!(parallel(vec![slow, fast]).wait(), Ok(vec![100, 200]));
/// ```
pub fn parallel<T, E, I>(deferreds: I) -> Deferred<Vec<T>, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Deferred<T, E>>,
{
    let deferreds: Vec<Deferred<T, E>> = deferreds.into_iter().collect();
    let executor = match deferreds.first() {
        Some(first) => first.executor().clone(),
        None => Executor::global().clone(),
    };
    let waiters: Vec<_> = deferreds.into_iter().map(|deferred| deferred.waiter).collect();

    let (producer, waiter) = Producer::new();
    executor.run(async move {
        let mut values = Vec::with_capacity(waiters.len());
        for (index, input) in waiters.into_iter().enumerate() {
            let outcome = match input.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    debug!("parallel input {} abandoned: {}", index, err);
                    return;
                }
            };
            match &*outcome {
                Ok(value) => values.push(value.clone()),
                Err(err) => {
                    debug!("parallel input {} rejected", index);
                    producer.reject(err.clone());
                    return;
                }
            }
        }
        producer.resolve(values);
    });
    Deferred { waiter, executor }
}
