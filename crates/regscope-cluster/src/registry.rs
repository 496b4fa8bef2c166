use tracing::{info, warn};

use regscope_types::{ResourceKind, Service};

use crate::client::ClusterClient;
use crate::error::{ClusterError, Result};
use crate::runner::CommandRunner;

/// Service fronting the integrated registry
pub const REGISTRY_SERVICE: &str = "docker-registry";

/// Namespace the integrated registry is deployed in
pub const REGISTRY_NAMESPACE: &str = "default";

/// Pull-spec prefix of the operator-managed registry, used when the service
/// lookup finds nothing
pub const DEFAULT_REGISTRY: &str = "image-registry.openshift-image-registry.svc:5000";

/// Look up the integrated registry's `clusterIP:port` from its service.
///
/// Image references pushed through the service carry this address as their
/// prefix. Clusters that expose the registry under a hostname need an explicit
/// address instead.
pub async fn discover_registry<R: CommandRunner>(client: &ClusterClient<R>) -> Result<String> {
    let service: Service = client
        .get_resource(ResourceKind::Services, REGISTRY_SERVICE, REGISTRY_NAMESPACE)
        .await?;

    let address = service
        .address()
        .ok_or_else(|| ClusterError::MissingAddress {
            namespace: REGISTRY_NAMESPACE.to_string(),
            name: REGISTRY_SERVICE.to_string(),
        })?;

    info!(%address, "discovered registry address");
    Ok(address)
}

/// Discover the registry address, falling back to [`DEFAULT_REGISTRY`]
pub async fn resolve_registry<R: CommandRunner>(client: &ClusterClient<R>) -> String {
    match discover_registry(client).await {
        Ok(address) => address,
        Err(e) => {
            warn!(
                error = %e,
                fallback = DEFAULT_REGISTRY,
                "registry discovery failed, pass --registry to override"
            );
            DEFAULT_REGISTRY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoCache;
    use crate::testing::ScriptedRunner;

    const LOOKUP: &str = "-n default get services docker-registry -o json";

    #[tokio::test]
    async fn test_discover_registry() {
        let runner = ScriptedRunner::default().with(
            LOOKUP,
            r#"{"metadata":{"name":"docker-registry"},"spec":{"clusterIP":"172.30.44.10","ports":[{"port":5000,"protocol":"TCP"}]}}"#,
        );
        let client = ClusterClient::new(&runner, Box::new(NoCache));
        assert_eq!(discover_registry(&client).await.unwrap(), "172.30.44.10:5000");
    }

    #[tokio::test]
    async fn test_discover_registry_headless_service() {
        let runner = ScriptedRunner::default().with(
            LOOKUP,
            r#"{"spec":{"clusterIP":"","ports":[{"port":5000}]}}"#,
        );
        let client = ClusterClient::new(&runner, Box::new(NoCache));
        assert!(matches!(
            discover_registry(&client).await,
            Err(ClusterError::MissingAddress { .. })
        ));
    }

    #[tokio::test]
    async fn test_discover_registry_missing_service() {
        let runner = ScriptedRunner::default();
        let client = ClusterClient::new(&runner, Box::new(NoCache));
        assert!(matches!(
            discover_registry(&client).await,
            Err(ClusterError::Command { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_registry_prefers_service() {
        let runner = ScriptedRunner::default().with(
            LOOKUP,
            r#"{"spec":{"clusterIP":"172.30.44.10","ports":[{"port":5000}]}}"#,
        );
        let client = ClusterClient::new(&runner, Box::new(NoCache));
        assert_eq!(resolve_registry(&client).await, "172.30.44.10:5000");
    }

    #[tokio::test]
    async fn test_resolve_registry_falls_back() {
        let runner = ScriptedRunner::default();
        let client = ClusterClient::new(&runner, Box::new(NoCache));
        assert_eq!(resolve_registry(&client).await, DEFAULT_REGISTRY);
        assert_eq!(runner.calls(), vec![LOOKUP]);
    }
}
