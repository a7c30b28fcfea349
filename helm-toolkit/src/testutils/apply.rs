use crate::common::{
    constants::FIELD_MANAGER,
    error::{
        ApplyObject, K8sClientGeneration, MissingObjectName, MissingTypeMeta, ResourceDiscovery,
        Result,
    },
};
use async_trait::async_trait;
use kube::{
    api::DynamicObject,
    core::GroupVersionKind,
    discovery::{pinned_kind, Scope},
    Client, ResourceExt,
};
use kube_client::{
    api::{Patch, PatchParams},
    Api,
};
use snafu::{OptionExt, ResultExt};
use tracing::{debug, info};

/// Creates Kubernetes objects, or updates them if they already exist.
#[async_trait]
pub trait ObjectApplier: Send + Sync {
    /// Creates or updates the object. Namespaced objects without a namespace are placed in
    /// `default_namespace`.
    async fn create_or_update(&self, object: &DynamicObject, default_namespace: &str)
        -> Result<()>;
}

/// Applies objects to a Kubernetes cluster using server-side apply.
#[derive(Clone)]
pub struct KubeApplier {
    client: Client,
}

impl KubeApplier {
    /// Uses the given client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Generates a client from the kubeconfig or the in-cluster environment.
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await.context(K8sClientGeneration)?;
        Ok(Self::new(client))
    }
}

/// Splits an apiVersion into its group and version. The core group is empty.
fn group_version(api_version: &str) -> (&str, &str) {
    api_version.split_once('/').unwrap_or(("", api_version))
}

#[async_trait]
impl ObjectApplier for KubeApplier {
    async fn create_or_update(
        &self,
        object: &DynamicObject,
        default_namespace: &str,
    ) -> Result<()> {
        let types = object.types.as_ref().context(MissingTypeMeta {
            name: object.name_any(),
        })?;
        let name = object.metadata.name.clone().context(MissingObjectName {
            kind: types.kind.as_str(),
        })?;

        let (group, version) = group_version(types.api_version.as_str());
        let gvk = GroupVersionKind::gvk(group, version, types.kind.as_str());
        let (resource, capabilities) =
            pinned_kind(&self.client, &gvk)
                .await
                .context(ResourceDiscovery {
                    api_version: types.api_version.as_str(),
                    kind: types.kind.as_str(),
                })?;

        let api: Api<DynamicObject> = match capabilities.scope {
            Scope::Namespaced => {
                let namespace = object
                    .namespace()
                    .unwrap_or_else(|| default_namespace.to_string());
                debug!(kind = %types.kind, %name, %namespace, "Applying namespaced object");
                Api::namespaced_with(self.client.clone(), namespace.as_str(), &resource)
            }
            Scope::Cluster => {
                debug!(kind = %types.kind, %name, "Applying cluster-scoped object");
                Api::all_with(self.client.clone(), &resource)
            }
        };

        let params = PatchParams::apply(FIELD_MANAGER).force();
        api.patch(name.as_str(), &params, &Patch::Apply(object))
            .await
            .context(ApplyObject {
                kind: types.kind.as_str(),
                name: name.as_str(),
            })?;

        info!(kind = %types.kind, %name, "Applied Kubernetes object");
        Ok(())
    }
}
