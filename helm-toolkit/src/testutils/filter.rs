use kube::{api::DynamicObject, ResourceExt};
use std::{ops::Not, sync::OnceLock};

/// A test on a single Kubernetes object.
pub struct Predicate(Box<dyn Fn(&DynamicObject) -> bool + Send + Sync>);

impl Predicate {
    /// Wraps a closure into a Predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&DynamicObject) -> bool + Send + Sync + 'static,
    {
        Self(Box::new(f))
    }

    /// Returns true if the object passes the test.
    pub fn matches(&self, object: &DynamicObject) -> bool {
        (self.0)(object)
    }

    /// Matches objects which pass both tests.
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        Self::new(move |o| self.matches(o) && other.matches(o))
    }

    /// Matches objects which pass either test.
    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        Self::new(move |o| self.matches(o) || other.matches(o))
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        Self::new(move |o| !self.matches(o))
    }
}

/// Matches objects of the given kind, e.g. 'Deployment'.
pub fn with_kind<K>(kind: K) -> Predicate
where
    K: ToString,
{
    let kind = kind.to_string();
    Predicate::new(move |o| o.types.as_ref().map(|t| t.kind == kind).unwrap_or(false))
}

/// Matches objects of the given apiVersion, e.g. 'apps/v1'.
pub fn with_api_version<V>(api_version: V) -> Predicate
where
    V: ToString,
{
    let api_version = api_version.to_string();
    Predicate::new(move |o| {
        o.types
            .as_ref()
            .map(|t| t.api_version == api_version)
            .unwrap_or(false)
    })
}

/// Matches objects with the given .metadata.name.
pub fn with_name<N>(name: N) -> Predicate
where
    N: ToString,
{
    let name = name.to_string();
    Predicate::new(move |o| o.metadata.name.as_deref() == Some(name.as_str()))
}

/// Matches objects with the given .metadata.namespace.
pub fn with_namespace<N>(namespace: N) -> Predicate
where
    N: ToString,
{
    let namespace = namespace.to_string();
    Predicate::new(move |o| o.metadata.namespace.as_deref() == Some(namespace.as_str()))
}

/// A transformation on the list of objects rendered from a chart.
pub trait ObjectFilter: Send + Sync {
    /// Returns the objects which are kept.
    fn filter(&self, objects: Vec<DynamicObject>) -> Vec<DynamicObject>;
}

/// Drops the objects which match the predicate.
pub struct ExcludeObject(Predicate);

/// Drops the objects which match the predicate.
pub fn exclude_object(predicate: Predicate) -> ExcludeObject {
    ExcludeObject(predicate)
}

impl ObjectFilter for ExcludeObject {
    fn filter(&self, objects: Vec<DynamicObject>) -> Vec<DynamicObject> {
        objects.into_iter().filter(|o| !self.0.matches(o)).collect()
    }
}

/// Keeps only the objects which match the predicate.
pub struct IncludeOnly(Predicate);

/// Keeps only the objects which match the predicate.
pub fn include_only(predicate: Predicate) -> IncludeOnly {
    IncludeOnly(predicate)
}

impl ObjectFilter for IncludeOnly {
    fn filter(&self, objects: Vec<DynamicObject>) -> Vec<DynamicObject> {
        objects.into_iter().filter(|o| self.0.matches(o)).collect()
    }
}

/// Keeps all objects, and records the name of the first object which matches the predicate.
pub struct ExtractObjectName {
    predicate: Predicate,
    name: OnceLock<String>,
}

/// Records the name of the first object which matches the predicate. Objects are not dropped.
pub fn extract_object_name(predicate: Predicate) -> ExtractObjectName {
    ExtractObjectName {
        predicate,
        name: OnceLock::new(),
    }
}

impl ExtractObjectName {
    /// The recorded name, if any object matched.
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }
}

impl ObjectFilter for ExtractObjectName {
    fn filter(&self, objects: Vec<DynamicObject>) -> Vec<DynamicObject> {
        if let Some(object) = objects.iter().find(|o| self.predicate.matches(o)) {
            let _ = self.name.set(object.name_any());
        }
        objects
    }
}

/// Runs the objects through each of the filters, in order.
pub fn filter_objects(
    objects: Vec<DynamicObject>,
    filters: &[&dyn ObjectFilter],
) -> Vec<DynamicObject> {
    filters
        .iter()
        .fold(objects, |objects, filter| filter.filter(objects))
}
