//! Chaining over any promise type whose combinators hand back that same type.
//!
use crate::deferred::Deferred;

/// A promise that chains into more of itself.
///
/// Every combinator returns `Self`, so code generic over `P: Thenable<T, E>`
/// can only ever build a chain of `P`s.
pub trait Thenable<T, E>: Sized {
    fn then<F>(&self, f: F) -> Self
    where
        F: FnOnce(T) -> Result<T, E> + Send + 'static;

    fn catch<F>(&self, f: F) -> Self
    where
        F: FnOnce(E) -> Result<T, E> + Send + 'static;

    fn finally<F>(&self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static;

    fn wait(&self) -> Result<T, E>;
}

impl<T, E> Thenable<T, E> for Deferred<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn then<F>(&self, f: F) -> Self
    where
        F: FnOnce(T) -> Result<T, E> + Send + 'static,
    {
        Deferred::then(self, f)
    }

    fn catch<F>(&self, f: F) -> Self
    where
        F: FnOnce(E) -> Result<T, E> + Send + 'static,
    {
        Deferred::catch(self, f)
    }

    fn finally<F>(&self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Deferred::finally(self, f)
    }

    fn wait(&self) -> Result<T, E> {
        Deferred::wait(self)
    }
}

/// Applies `f` twice in a row, the same as `promise.then(f).then(f)`.
///
/// # Examples
///
/// ```
/// use promise_chain::{double_then, spawn};
///
/// let doubled = double_then(&spawn(|| Ok::<_, ()>(10)), |v: i32| Ok(v * 2));
/// assert_eq!(doubled.wait(), Ok(40));
/// ```
pub fn double_then<T, E, P, F>(promise: &P, f: F) -> P
where
    P: Thenable<T, E>,
    F: FnOnce(T) -> Result<T, E> + Clone + Send + 'static,
{
    promise.then(f.clone()).then(f)
}
