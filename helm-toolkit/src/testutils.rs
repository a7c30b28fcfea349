//! Helpers for tests which need the objects of a helm chart in a Kubernetes cluster, without a
//! helm release.

/// Creating and updating Kubernetes objects.
pub mod apply;
/// Selecting which rendered objects are applied.
pub mod filter;
/// Parsing rendered charts into Kubernetes objects.
pub mod objects;

pub use apply::{KubeApplier, ObjectApplier};
pub use filter::{
    exclude_object, extract_object_name, filter_objects, include_only, with_api_version,
    with_kind, with_name, with_namespace, ExcludeObject, ExtractObjectName, IncludeOnly,
    ObjectFilter, Predicate,
};
pub use objects::parse_objects;

use crate::{client::Helm, common::error::Result, config::default_helm, flag::Flag};
use kube::api::DynamicObject;
use tracing::debug;

/// Renders the chart with its CRDs, filters the rendered objects and creates or updates each of
/// the remaining objects, in the order they were rendered. Returns the applied objects.
pub async fn install_filtered_helm_chart_with<H, A>(
    helm: &H,
    applier: &A,
    namespace: &str,
    release: &str,
    chart: &str,
    filters: &[&dyn ObjectFilter],
) -> Result<Vec<DynamicObject>>
where
    H: Helm + ?Sized,
    A: ObjectApplier + ?Sized,
{
    let rendered = helm.template(namespace, release, chart, &[Flag::include_crds()])?;
    let objects = filter_objects(parse_objects(rendered.as_slice())?, filters);
    debug!(%chart, %release, count = objects.len(), "Applying rendered chart objects");

    for object in objects.iter() {
        applier.create_or_update(object, namespace).await?;
    }
    Ok(objects)
}

/// Same as `install_filtered_helm_chart_with`, rendering with the default helm version.
pub async fn install_filtered_helm_chart<A>(
    applier: &A,
    namespace: &str,
    release: &str,
    chart: &str,
    filters: &[&dyn ObjectFilter],
) -> Result<Vec<DynamicObject>>
where
    A: ObjectApplier + ?Sized,
{
    let helm = default_helm().await?;
    install_filtered_helm_chart_with(&helm, applier, namespace, release, chart, filters).await
}
