use crate::common::error::{ParseKubernetesObject, Result};
use kube::api::DynamicObject;
use serde::Deserialize;
use serde_yaml::Value;
use snafu::ResultExt;

/// Parses the Kubernetes objects in a multi-document YAML stream, e.g. the output of
/// 'helm template'. Empty documents are skipped and the items of '<Kind>List' documents are
/// returned in place of the list.
pub fn parse_objects(buf: &[u8]) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(buf) {
        let value = Value::deserialize(document).context(ParseKubernetesObject)?;
        collect_objects(value, &mut objects)?;
    }
    Ok(objects)
}

fn is_list(value: &Value) -> bool {
    let kind_is_list = value
        .get("kind")
        .and_then(Value::as_str)
        .map(|kind| kind.ends_with("List"))
        .unwrap_or(false);
    kind_is_list && value.get("items").map(Value::is_sequence).unwrap_or(false)
}

fn collect_objects(value: Value, objects: &mut Vec<DynamicObject>) -> Result<()> {
    if value.is_null() {
        return Ok(());
    }
    if is_list(&value) {
        if let Value::Mapping(mut list) = value {
            if let Some(Value::Sequence(items)) = list.remove("items") {
                for item in items {
                    collect_objects(item, objects)?;
                }
            }
        }
        return Ok(());
    }
    objects.push(serde_yaml::from_value(value).context(ParseKubernetesObject)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_objects;
    use crate::common::error::Error;
    use kube::ResourceExt;

    #[test]
    fn parses_rendered_chart() {
        let rendered = r#"---
# Source: test-chart/templates/namespace.yaml
apiVersion: v1
kind: Namespace
metadata:
  name: my-namespace
---
# Source: test-chart/templates/empty.yaml
---
# Source: test-chart/templates/configmap.yaml
apiVersion: v1
kind: ConfigMap
metadata:
  name: my-cm
  namespace: my-namespace
data:
  key: value
"#;
        let objects = parse_objects(rendered.as_bytes()).unwrap();

        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].types.as_ref().unwrap().kind, "Namespace");
        assert_eq!(objects[0].name_any(), "my-namespace");
        assert_eq!(objects[1].types.as_ref().unwrap().api_version, "v1");
        assert_eq!(objects[1].namespace().as_deref(), Some("my-namespace"));
        assert_eq!(objects[1].data["data"]["key"], "value");
    }

    #[test]
    fn list_items_are_flattened() {
        let rendered = r#"apiVersion: v1
kind: List
items:
  - apiVersion: v1
    kind: Secret
    metadata:
      name: first
  - apiVersion: v1
    kind: Secret
    metadata:
      name: second
"#;
        let names: Vec<_> = parse_objects(rendered.as_bytes())
            .unwrap()
            .iter()
            .map(|o| o.name_any())
            .collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn empty_output_has_no_objects() {
        assert!(parse_objects(b"").unwrap().is_empty());
        assert!(parse_objects(b"---\n# nothing rendered\n").unwrap().is_empty());
    }

    #[test]
    fn scalar_document_is_an_error() {
        assert!(matches!(
            parse_objects(b"---\njust a string\n"),
            Err(Error::ParseKubernetesObject { .. })
        ));
    }
}
