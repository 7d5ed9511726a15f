//! Application services and ports.

#![forbid(unsafe_code)]

mod lock_ports;
mod lock_service;
mod test_suite_ports;
mod test_suite_service;

pub use lock_ports::{
    AcquireLockInput, Clock, KeepAliveInput, LeaseRenewal, LockAcquisition, LockLease,
    LockMetadata, LockStore, ReleaseLocksInput,
};
pub use lock_service::{LockService, LockServiceConfig, MAX_BATCH_LOCK_IDS};
pub use test_suite_ports::{ComponentDeployer, NamespaceManager, RemoteSuiteLoader, TestRunner};
pub use test_suite_service::TestSuiteService;
