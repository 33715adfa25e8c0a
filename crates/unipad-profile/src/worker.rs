use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Sender};

use crate::keymap::{KeyMappingStore, KeyboardMappings};
use crate::profile::{ControllerProfile, ProfileStore};

enum Job {
    Profile(ControllerProfile),
    KeyMappings(KeyboardMappings),
    Flush(Sender<()>),
}

/// Background thread that performs profile and binding writes, so callers
/// on the input path never touch the disk.
///
/// Writes are fire-and-forget: failures are logged and dropped. Jobs are
/// written in submission order.
pub struct PersistenceWorker {
    tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    pub fn start(profiles: Arc<ProfileStore>, keys: Arc<KeyMappingStore>) -> Self {
        let (tx, rx) = unbounded::<Job>();
        let handle = thread::Builder::new()
            .name("unipad-persist".into())
            .spawn(move || {
                log::debug!("persistence worker started");
                for job in rx {
                    match job {
                        Job::Profile(profile) => {
                            let vendor = profile.vendor_name.clone();
                            if let Err(e) = profiles.save(profile) {
                                log::warn!("failed to save profile for {vendor}: {e}");
                            }
                        }
                        Job::KeyMappings(mappings) => {
                            if let Err(e) = keys.save(&mappings) {
                                log::warn!("failed to save keyboard mappings: {e}");
                            }
                        }
                        Job::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                log::debug!("persistence worker stopped");
            });
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("failed to start persistence worker: {e}");
                None
            }
        };
        Self { tx: handle.as_ref().map(|_| tx), handle }
    }

    pub fn save_profile(&self, profile: ControllerProfile) {
        self.submit(Job::Profile(profile));
    }

    pub fn save_key_mappings(&self, mappings: KeyboardMappings) {
        self.submit(Job::KeyMappings(mappings));
    }

    /// Blocks until every job submitted so far has been written.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        if self.submit(Job::Flush(ack_tx)) {
            let _ = ack_rx.recv();
        }
    }

    fn submit(&self, job: Job) -> bool {
        match &self.tx {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        // Closing the channel lets the thread finish the queue and exit
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
