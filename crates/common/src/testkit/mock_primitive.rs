use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::primitive::{inspect_mountpoint, MountPrimitive, MountpointState, PrimitiveError};
use crate::volume::MountConfig;

#[derive(Debug, Default)]
struct Inner {
    states: HashMap<PathBuf, Result<MountpointState, io::ErrorKind>>,
    attach_error: Option<String>,
    detach_error: Option<String>,
    attaches: Vec<(PathBuf, MountConfig)>,
    detaches: Vec<PathBuf>,
    attach_delay: Option<Duration>,
    detach_delay: Option<Duration>,
}

/// Recording, scriptable [`MountPrimitive`].
#[derive(Debug, Default)]
pub struct MockPrimitive {
    inner: Mutex<Inner>,
}

impl MockPrimitive {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Report `state` for `path` until a successful detach of that path.
    pub fn set_state(&self, path: &Path, state: MountpointState) {
        self.lock().states.insert(path.to_path_buf(), Ok(state));
    }

    /// Make inspection of `path` fail with `kind`.
    pub fn fail_inspect(&self, path: &Path, kind: io::ErrorKind) {
        self.lock().states.insert(path.to_path_buf(), Err(kind));
    }

    /// Make every following attach fail with `message`.
    pub fn fail_attach(&self, message: &str) {
        self.lock().attach_error = Some(message.to_string());
    }

    /// Make every following detach fail with `message`.
    pub fn fail_detach(&self, message: &str) {
        self.lock().detach_error = Some(message.to_string());
    }

    /// Make every following attach take `delay` before it is recorded.
    pub fn delay_attach(&self, delay: Duration) {
        self.lock().attach_delay = Some(delay);
    }

    /// Make every following detach take `delay` before it is recorded.
    pub fn delay_detach(&self, delay: Duration) {
        self.lock().detach_delay = Some(delay);
    }

    pub fn reset_failures(&self) {
        let mut inner = self.lock();
        inner.attach_error = None;
        inner.detach_error = None;
    }

    /// Mountpoints of every attach attempt, in order.
    pub fn attach_calls(&self) -> Vec<PathBuf> {
        self.lock()
            .attaches
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Configurations of every attach attempt, in order.
    pub fn attach_configs(&self) -> Vec<MountConfig> {
        self.lock()
            .attaches
            .iter()
            .map(|(_, config)| config.clone())
            .collect()
    }

    /// Mountpoints of every detach attempt, in order.
    pub fn detach_calls(&self) -> Vec<PathBuf> {
        self.lock().detaches.clone()
    }
}

#[async_trait]
impl MountPrimitive for MockPrimitive {
    async fn inspect(&self, mountpoint: &Path) -> io::Result<MountpointState> {
        let scripted = self.lock().states.get(mountpoint).cloned();
        match scripted {
            Some(Ok(state)) => Ok(state),
            Some(Err(kind)) => Err(io::Error::from(kind)),
            None => inspect_mountpoint(mountpoint).await,
        }
    }

    async fn attach(&self, mountpoint: &Path, config: &MountConfig) -> Result<(), PrimitiveError> {
        let delay = self.lock().attach_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.lock();
        inner
            .attaches
            .push((mountpoint.to_path_buf(), config.clone()));
        match &inner.attach_error {
            Some(message) => Err(PrimitiveError::Message(message.clone())),
            None => Ok(()),
        }
    }

    async fn force_detach(&self, mountpoint: &Path) -> Result<(), PrimitiveError> {
        let delay = self.lock().detach_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.lock();
        inner.detaches.push(mountpoint.to_path_buf());
        match &inner.detach_error {
            Some(message) => Err(PrimitiveError::Message(message.clone())),
            None => {
                inner.states.remove(mountpoint);
                Ok(())
            }
        }
    }
}
