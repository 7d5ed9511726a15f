mod clock;
mod inputs;
mod store;

pub use clock::Clock;
pub use inputs::{
    AcquireLockInput, KeepAliveInput, LockAcquisition, LockMetadata, ReleaseLocksInput,
};
pub use store::{LeaseRenewal, LockLease, LockStore};
