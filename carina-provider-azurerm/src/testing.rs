//! Test doubles shared by the mapping tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::compute::{Disk, DiskLookupError, DisksClient};

/// Canned answer of `MockDisks`
pub(crate) enum Reply {
    Found(Disk),
    NotFound,
    Forbidden,
}

/// `DisksClient` that records every lookup and answers with a fixed reply
pub(crate) struct MockDisks {
    reply: Reply,
    calls: Mutex<Vec<(String, String)>>,
}

/// Route `log` output through the test harness; `RUST_LOG=debug` shows lookups
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl MockDisks {
    pub(crate) fn new(reply: Reply) -> Self {
        init_logger();
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (resource group, name) of each lookup, in order
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DisksClient for MockDisks {
    async fn get(&self, resource_group: &str, name: &str) -> Result<Disk, DiskLookupError> {
        self.calls
            .lock()
            .unwrap()
            .push((resource_group.to_string(), name.to_string()));
        match &self.reply {
            Reply::Found(disk) => Ok(disk.clone()),
            Reply::NotFound => Err(DiskLookupError::NotFound),
            Reply::Forbidden => Err(DiskLookupError::Api {
                status: 403,
                message: "AuthorizationFailed".to_string(),
            }),
        }
    }
}
