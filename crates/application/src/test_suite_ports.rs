//! Ports for the cluster collaborators the orchestrator drives.
//!
//! Concrete adapters talk to Kubernetes, git and the test runner; the
//! orchestrator only sequences them.

use async_trait::async_trait;
use pit_core::AppResult;
use pit_domain::{ComponentSpec, DeployedComponent, DeployedTestSuite, Namespace, PitFile, TestSuite};

/// Creates and removes suite namespaces.
#[async_trait]
pub trait NamespaceManager: Send + Sync {
    /// Returns a fresh namespace name for the given sequence number.
    async fn generate_name(&self, seq_number: &str) -> AppResult<Namespace>;

    /// Creates the namespace and waits until it is usable.
    async fn create(&self, namespace: &Namespace, workspace: &str) -> AppResult<()>;

    /// Deletes the namespace and waits until it is gone.
    async fn delete(&self, namespace: &Namespace, workspace: &str) -> AppResult<()>;
}

/// Deploys components, including the lock manager, into a namespace.
#[async_trait]
pub trait ComponentDeployer: Send + Sync {
    /// Deploys one component and returns the commit it was built from.
    async fn deploy_component(
        &self,
        workspace: &str,
        component: &ComponentSpec,
        namespace: &Namespace,
        params: &[String],
    ) -> AppResult<String>;

    /// Removes one deployed component.
    async fn undeploy_component(
        &self,
        namespace: &Namespace,
        workspace: &str,
        component: &DeployedComponent,
    ) -> AppResult<()>;

    /// Deploys the lock manager service into the namespace.
    async fn deploy_lock_manager(&self, namespace: &Namespace) -> AppResult<()>;

    /// Removes the lock manager service from the namespace.
    async fn undeploy_lock_manager(&self, namespace: &Namespace) -> AppResult<()>;
}

/// Fetches suites that live in remote repositories.
#[async_trait]
pub trait RemoteSuiteLoader: Send + Sync {
    /// Creates a new, empty workspace directory for the suite and returns it.
    async fn create_workspace(&self, test_suite: &TestSuite) -> AppResult<String>;

    /// Clones the suite into `destination` and parses its pitfile.
    async fn load_pitfile(&self, test_suite: &TestSuite, destination: &str) -> AppResult<PitFile>;
}

/// Runs the test apps of deployed suites.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Runs every suite, one by one.
    async fn run_all(&self, suites: &[DeployedTestSuite]) -> AppResult<()>;
}
