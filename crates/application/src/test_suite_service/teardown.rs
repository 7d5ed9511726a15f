use pit_core::AppResult;
use pit_domain::DeployedTestSuite;
use tracing::info;

use super::TestSuiteService;

impl TestSuiteService {
    /// Removes everything deployed for the given suites, namespace last.
    pub async fn undeploy_all(&self, suites: &[DeployedTestSuite]) -> AppResult<()> {
        for suite in suites {
            info!(namespace = %suite.namespace, suite = %suite.test_suite.name, "undeploying test suite");

            if suite.lock_manager_enabled {
                self.deployer.undeploy_lock_manager(&suite.namespace).await?;
            }

            self.deployer
                .undeploy_component(
                    &suite.namespace,
                    &suite.workspace,
                    &suite.graph_deployment.test_app,
                )
                .await?;
            for component in &suite.graph_deployment.components {
                self.deployer
                    .undeploy_component(&suite.namespace, &suite.workspace, component)
                    .await?;
            }

            self.namespaces
                .delete(&suite.namespace, &suite.workspace)
                .await?;
        }

        Ok(())
    }
}
