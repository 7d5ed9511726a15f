//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod lock;
mod test_suite;

pub use lock::{
    DEFAULT_LEASE_SECONDS, LeaseDuration, Lock, LockId, LockOwner, LockState, MAX_LEASE_SECONDS,
};
pub use test_suite::{
    ComponentSpec, DEFAULT_PITFILE_NAME, DeployedComponent, DeployedTestSuite, Deployment, Graph,
    GraphDeploymentResult, Location, LocationType, LockManagerSettings, Namespace, PitFile,
    TestSuite,
};
