//! Session
//!
//! The session is the explicit entry point of a run. It is built once at program
//! start, handed by reference to every stage, and stopped at the end. It owns the
//! thread pool that executes all partition-parallel work.

use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::io::FrameReader;

/// Where the work of a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Master {
    /// A single worker thread (`local`)
    Local,
    /// One worker thread per available core (`local[*]`)
    LocalAll,
    /// A fixed number of worker threads (`local[N]`)
    LocalThreads(usize),
}

impl Master {
    /// Parses `local`, `local[*]` and `local[N]`.
    pub fn parse(master: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("invalid master `{}`", master));

        match master.trim() {
            "local" => Ok(Master::Local),
            "local[*]" => Ok(Master::LocalAll),
            other => {
                let threads = other
                    .strip_prefix("local[")
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or_else(invalid)?
                    .parse::<usize>()
                    .map_err(|_| invalid())?;
                if threads == 0 {
                    return Err(invalid());
                }
                Ok(Master::LocalThreads(threads))
            }
        }
    }

    pub fn num_threads(&self) -> usize {
        match self {
            Master::Local => 1,
            Master::LocalAll => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Master::LocalThreads(n) => *n,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionBuilder {
    app_name: String,
    master: String,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            app_name: "price-prediction".to_string(),
            master: "local[*]".to_string(),
        }
    }
}

impl SessionBuilder {
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn master(mut self, master: impl Into<String>) -> Self {
        self.master = master.into();
        self
    }

    pub fn build(self) -> Result<Session> {
        let master = Master::parse(&self.master)?;
        let num_threads = master.num_threads();
        let pool_name = self.app_name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(move |idx| format!("{}-worker-{}", pool_name, idx))
            .build()?;

        info!(
            "started session `{}` on {} with {} worker threads",
            self.app_name, self.master, num_threads
        );

        Ok(Session {
            app_name: self.app_name,
            master,
            pool,
        })
    }
}

pub struct Session {
    app_name: String,
    master: Master,
    pool: rayon::ThreadPool,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn master(&self) -> Master {
        self.master
    }

    /// Number of worker threads in the session pool
    pub fn default_parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn read(&self) -> FrameReader<'_> {
        FrameReader::new(self)
    }

    /// Shorthand for `read().load(path)`
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Frame> {
        self.read().load(path)
    }

    /// Runs `op` inside the session pool, so that rayon work spawned by `op` uses
    /// the session's worker threads.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Tears the session down.
    pub fn stop(self) {
        debug!("stopping session `{}`", self.app_name);
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        info!("session `{}` stopped", self.app_name);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("app_name", &self.app_name)
            .field("master", &self.master)
            .field("parallelism", &self.default_parallelism())
            .finish()
    }
}
