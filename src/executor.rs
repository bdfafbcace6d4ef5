//! The worker pool that drives continuations, and the threads user code runs on.
//!
use crate::{deferred::Deferred, Error};
use futures::executor::ThreadPool;
use log::{debug, error, trace, warn};
use std::{env, future::Future, sync::OnceLock, thread};

/// Overrides the number of worker threads of the global executor.
pub const POOL_SIZE_VAR: &str = "PROMISE_CHAIN_POOL_SIZE";
/// Overrides the thread name prefix of the global executor.
pub const THREAD_PREFIX_VAR: &str = "PROMISE_CHAIN_THREAD_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of worker threads. `None` uses one per CPU.
    pub pool_size: Option<usize>,
    pub name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pool_size: None,
            name_prefix: "promise-chain-".into(),
        }
    }
}

impl Config {
    /// Reads the defaults, then applies `PROMISE_CHAIN_POOL_SIZE` and
    /// `PROMISE_CHAIN_THREAD_PREFIX` when they are set.
    pub fn from_env() -> Self {
        Self::from_vars(env::var(POOL_SIZE_VAR).ok(), env::var(THREAD_PREFIX_VAR).ok())
    }

    fn from_vars(pool_size: Option<String>, name_prefix: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = pool_size {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.pool_size = Some(size),
                _ => warn!("ignoring {}={:?}, expected a positive integer", POOL_SIZE_VAR, raw),
            }
        }
        if let Some(prefix) = name_prefix {
            config.name_prefix = prefix;
        }
        config
    }
}

/// A handle onto a thread pool. Clones share the same pool.
///
/// The pool only drives continuations while they wait on their predecessor.
/// Computations and callbacks each get a thread of their own, so they may
/// block, or wait on other deferreds, without starving the pool.
#[derive(Debug, Clone)]
pub struct Executor {
    pool: ThreadPool,
    name_prefix: String,
}

impl Executor {
    pub fn new() -> Result<Self, Error> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Result<Self, Error> {
        let mut builder = ThreadPool::builder();
        builder.name_prefix(config.name_prefix.clone());
        if let Some(size) = config.pool_size {
            if size == 0 {
                return Err(Error::InvalidPoolSize);
            }
            builder.pool_size(size);
        }
        builder.after_start(|index| trace!("executor worker {} started", index));
        let pool = builder.create()?;
        debug!("started executor {:?}", config);
        Ok(Self {
            pool,
            name_prefix: config.name_prefix,
        })
    }

    /// The process-wide executor used by [`crate::spawn`], started on first
    /// use with [`Config::from_env`].
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to start the worker threads.
    pub fn global() -> &'static Executor {
        static GLOBAL: OnceLock<Executor> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            Executor::with_config(Config::from_env())
                .unwrap_or_else(|err| panic!("global executor: {}", err))
        })
    }

    /// Runs `computation` on this executor and returns its deferred outcome.
    pub fn spawn<T, E, F>(&self, computation: F) -> Deferred<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        Deferred::spawn_on(self, computation)
    }

    pub(crate) fn run<Fut>(&self, task: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.pool.spawn_ok(task)
    }

    /// Runs `job` on a dedicated thread. If the thread cannot be started the
    /// job is dropped, which abandons any producer it owns.
    pub(crate) fn run_blocking<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let name = format!("{}job", self.name_prefix);
        if let Err(err) = thread::Builder::new().name(name).spawn(job) {
            error!("failed to start a job thread: {}", err);
        }
    }
}
