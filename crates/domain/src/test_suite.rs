//! Test-suite deployment model consumed by the orchestrator.

use std::fmt::{Display, Formatter};

use pit_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// File name looked up in a remote test suite when its location names none.
pub const DEFAULT_PITFILE_NAME: &str = "pitfile.yml";

/// Isolated deployment scope in the target cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(NonEmptyString);

impl Namespace {
    /// Creates a validated namespace name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the namespace name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Namespace {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Where a component or suite definition lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocationType {
    /// Inside the current workspace.
    Local,
    /// In a git repository that must be fetched first.
    Remote,
}

/// Source location of a component or test suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Local or remote.
    #[serde(rename = "type")]
    pub location_type: LocationType,
    /// Directory relative to the workspace.
    #[serde(default)]
    pub path: Option<String>,
    /// Git repository URL for remote locations.
    #[serde(default)]
    pub git_repository: Option<String>,
    /// Git ref checked out for remote locations.
    #[serde(default)]
    pub git_ref: Option<String>,
    /// Pitfile name inside a remote suite.
    #[serde(default)]
    pub pit_file: Option<String>,
}

impl Location {
    /// Creates a local location rooted at `path`.
    #[must_use]
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            location_type: LocationType::Local,
            path: Some(path.into()),
            git_repository: None,
            git_ref: None,
            pit_file: None,
        }
    }

    /// Returns the pitfile name to load from a remote suite.
    #[must_use]
    pub fn pit_file_name(&self) -> &str {
        self.pit_file.as_deref().unwrap_or(DEFAULT_PITFILE_NAME)
    }
}

/// One deployable unit in a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Source location.
    pub location: Location,
}

/// Components deployed for one suite plus the test app that drives them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Application that runs the tests.
    pub test_app: ComponentSpec,
    /// Components deployed, in order, before the test app.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

/// Deployment section of a suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Component graph.
    pub graph: Graph,
}

/// One test suite definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    /// Stable identifier, passed to the test app.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Where the suite definition lives.
    pub location: Location,
    /// Component graph.
    pub deployment: Deployment,
    /// For remote suites, the remote suite ids to run. Empty runs all.
    #[serde(default)]
    pub test_suite_ids: Vec<String>,
}

impl TestSuite {
    /// Returns whether a suite from a remote pitfile should be deployed.
    #[must_use]
    pub fn selects(&self, remote_suite_id: &str) -> bool {
        self.test_suite_ids.is_empty() || self.test_suite_ids.iter().any(|id| id == remote_suite_id)
    }
}

/// Lock manager switch in a pitfile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockManagerSettings {
    /// Whether the lock manager is deployed into each suite namespace.
    #[serde(default)]
    pub enabled: bool,
}

/// Parsed pitfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitFile {
    /// Lock manager settings.
    #[serde(default)]
    pub lock_manager: LockManagerSettings,
    /// Suites in declaration order.
    #[serde(default)]
    pub test_suites: Vec<TestSuite>,
}

/// Component deployed at a specific commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedComponent {
    /// Commit the component was deployed from.
    pub commit_sha: String,
    /// Deployed component definition.
    pub component: ComponentSpec,
}

/// Everything deployed for one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDeploymentResult {
    /// Graph components in deployment order.
    pub components: Vec<DeployedComponent>,
    /// The test app.
    pub test_app: DeployedComponent,
}

/// Suite deployed into its namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedTestSuite {
    /// Namespace holding all deployments.
    pub namespace: Namespace,
    /// Suite definition that was deployed.
    pub test_suite: TestSuite,
    /// Workspace directory the suite was deployed from.
    pub workspace: String,
    /// Whether the lock manager was deployed into the namespace.
    pub lock_manager_enabled: bool,
    /// Deployed graph.
    pub graph_deployment: GraphDeploymentResult,
}
