//! Chained promises.
//!
//! A [`Deferred`] is a value that a background computation will produce later,
//! or an error. Continuations attached with [`Deferred::then`],
//! [`Deferred::catch`] and [`Deferred::finally`] each return a new
//! `Deferred`, and [`parallel`] fans several of them into one.
//!
//! ```
//! use promise_chain::spawn;
//!
//! let result = spawn(|| Ok::<_, String>(10))
//!     .then(|v| Ok(v * 2))
//!     .then(|_| Err("something went wrong".to_string()))
//!     .then(|v| Ok(v + 100))
//!     .catch(|err| Err(format!("caught: {}", err)))
//!     .wait();
//! assert_eq!(result, Err("caught: something went wrong".to_string()));
//! ```
pub mod chain;
pub mod deferred;
pub mod executor;
pub mod parallel;
pub mod poly;

pub use chain::{double_then, Thenable};
pub use deferred::{spawn, Deferred};
pub use executor::{Config, Executor};
pub use parallel::parallel;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("the producer was dropped before settling")]
    ProducerDropped,
    #[error("failed to start the executor pool: {0}")]
    Executor(#[from] std::io::Error),
    #[error("the executor pool size must be at least one")]
    InvalidPoolSize,
}

/// The producing side of a promise.
pub trait Promise {
    type Output;
    type Error;
    type Waiter;

    fn resolve(self, value: Self::Output);
    fn reject(self, err: Self::Error);
    fn new() -> (Self, Self::Waiter)
    where
        Self: Sized;
}
