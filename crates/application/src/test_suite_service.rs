//! Test-suite orchestration: deploy every suite, then run the tests.

use std::sync::Arc;

use pit_core::AppResult;
use pit_domain::{
    DeployedComponent, DeployedTestSuite, Graph, GraphDeploymentResult, LocationType, Namespace,
    PitFile, TestSuite,
};
use tracing::info;

use crate::test_suite_ports::{ComponentDeployer, NamespaceManager, RemoteSuiteLoader, TestRunner};

mod teardown;

/// Orchestrates namespaces, lock manager and component graphs per suite.
#[derive(Clone)]
pub struct TestSuiteService {
    namespaces: Arc<dyn NamespaceManager>,
    deployer: Arc<dyn ComponentDeployer>,
    remote_loader: Arc<dyn RemoteSuiteLoader>,
    test_runner: Arc<dyn TestRunner>,
}

impl TestSuiteService {
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        namespaces: Arc<dyn NamespaceManager>,
        deployer: Arc<dyn ComponentDeployer>,
        remote_loader: Arc<dyn RemoteSuiteLoader>,
        test_runner: Arc<dyn TestRunner>,
    ) -> Self {
        Self {
            namespaces,
            deployer,
            remote_loader,
            test_runner,
        }
    }

    /// Deploys everything the suite needs, then runs its tests.
    ///
    /// Returns the deployed suites so the caller can tear them down.
    pub async fn process_test_suite(
        &self,
        pitfile: &PitFile,
        seq_number: &str,
        test_suite: &TestSuite,
    ) -> AppResult<Vec<DeployedTestSuite>> {
        let deployed = match test_suite.location.location_type {
            LocationType::Local => vec![
                self.deploy_local(pitfile, seq_number, test_suite, ".", None)
                    .await?,
            ],
            LocationType::Remote => self.deploy_remote(pitfile, seq_number, test_suite).await?,
        };

        info!(suites = deployed.len(), "deployment is done, running tests");
        self.test_runner.run_all(&deployed).await?;

        Ok(deployed)
    }

    async fn deploy_local(
        &self,
        pitfile: &PitFile,
        seq_number: &str,
        test_suite: &TestSuite,
        workspace: &str,
        test_app_dir: Option<&str>,
    ) -> AppResult<DeployedTestSuite> {
        info!(suite = %test_suite.name, "processing test suite");

        let namespace = self.namespaces.generate_name(seq_number).await?;
        self.namespaces.create(&namespace, workspace).await?;

        let lock_manager_enabled = pitfile.lock_manager.enabled;
        if lock_manager_enabled {
            info!(namespace = %namespace, "deploying lock manager");
            self.deployer.deploy_lock_manager(&namespace).await?;
        } else {
            info!(namespace = %namespace, "lock manager will not be deployed");
        }

        let graph_deployment = self
            .deploy_graph(
                &test_suite.id,
                &test_suite.deployment.graph,
                workspace,
                &namespace,
                test_app_dir,
            )
            .await?;

        Ok(DeployedTestSuite {
            namespace,
            test_suite: test_suite.clone(),
            workspace: workspace.to_owned(),
            lock_manager_enabled,
            graph_deployment,
        })
    }

    async fn deploy_remote(
        &self,
        pitfile: &PitFile,
        seq_number: &str,
        test_suite: &TestSuite,
    ) -> AppResult<Vec<DeployedTestSuite>> {
        let workspace = self.remote_loader.create_workspace(test_suite).await?;
        let destination = format!("{}/{}", workspace.trim_end_matches('/'), test_suite.id);
        let remote_pitfile = self
            .remote_loader
            .load_pitfile(test_suite, &destination)
            .await?;

        let mut deployed = Vec::new();
        for (index, remote_suite) in remote_pitfile.test_suites.iter().enumerate() {
            if !test_suite.selects(&remote_suite.id) {
                info!(suite = %remote_suite.name, "skipping remote test suite");
                continue;
            }

            let combined_seq_number = format!("{seq_number}e{}", index + 1);
            deployed.push(
                self.deploy_local(
                    pitfile,
                    &combined_seq_number,
                    remote_suite,
                    &workspace,
                    Some(&destination),
                )
                .await?,
            );
        }

        Ok(deployed)
    }

    async fn deploy_graph(
        &self,
        test_suite_id: &str,
        graph: &Graph,
        workspace: &str,
        namespace: &Namespace,
        test_app_dir: Option<&str>,
    ) -> AppResult<GraphDeploymentResult> {
        let total = graph.components.len();
        let mut components = Vec::with_capacity(total);
        for (index, component) in graph.components.iter().enumerate() {
            info!(
                component = %component.name,
                position = index + 1,
                total,
                "deploying graph component"
            );
            let commit_sha = self
                .deployer
                .deploy_component(workspace, component, namespace, &[])
                .await?;
            components.push(DeployedComponent {
                commit_sha,
                component: component.clone(),
            });
        }

        // A remote suite's pitfile sits inside its test app checkout.
        let mut test_app = graph.test_app.clone();
        if let Some(test_app_dir) = test_app_dir {
            info!(test_app = %test_app.name, path = test_app_dir, "overriding test app location");
            test_app.location.path = Some(test_app_dir.to_owned());
        }

        info!(test_app = %test_app.name, "deploying test app");
        let params = [test_suite_id.to_owned()];
        let commit_sha = self
            .deployer
            .deploy_component(workspace, &test_app, namespace, &params)
            .await?;

        Ok(GraphDeploymentResult {
            components,
            test_app: DeployedComponent {
                commit_sha,
                component: test_app,
            },
        })
    }
}
