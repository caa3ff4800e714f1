// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed resource properties
//!
//! Properties are a tree of literals and references. A reference points at an
//! output attribute of another resource, which is only known after the engine
//! has created that resource. Refs are rendered into the manifest as
//! `{"$ref": ...}` and resolved later against a state snapshot.

use crate::domain::graph::resource::{ResourceId, ResourceType};
use crate::infrastructure::kubernetes::kubeconfig;
use crate::shared::error::{Result, StackError};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Reference to an output attribute of a registered resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRef {
    pub resource: ResourceId,
    pub name: String,
    pub resource_type: ResourceType,
    pub attribute: String,
}

impl OutputRef {
    pub fn is_secret(&self) -> bool {
        self.resource_type.is_secret_attribute(&self.attribute)
    }

    fn to_manifest(&self) -> Value {
        json!({
            "$ref": {
                "resource": self.name,
                "type": self.resource_type.as_str(),
                "attribute": self.attribute,
            }
        })
    }
}

/// Closed set of derivations the engine applies to resolved outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// `{}` placeholders are replaced by the arguments in order.
    Format(String),
    /// Arguments: cluster name, endpoint, CA certificate data.
    Kubeconfig,
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Format(_) => "format",
            Transform::Kubeconfig => "kubeconfig",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Transform::Format(template) => template.matches("{}").count(),
            Transform::Kubeconfig => 3,
        }
    }

    pub fn apply(&self, args: &[String]) -> Result<String> {
        let expected = self.arity();
        if args.len() != expected {
            return Err(StackError::validation_error(format!(
                "transform '{}' expects {} arguments, got {}",
                self.name(),
                expected,
                args.len()
            )));
        }

        match self {
            Transform::Format(template) => {
                let mut out = String::with_capacity(template.len());
                let mut rest = template.as_str();
                for arg in args {
                    if let Some(pos) = rest.find("{}") {
                        out.push_str(&rest[..pos]);
                        out.push_str(arg);
                        rest = &rest[pos + 2..];
                    }
                }
                out.push_str(rest);
                Ok(out)
            }
            Transform::Kubeconfig => kubeconfig::render(&args[0], &args[1], &args[2]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Literal(Value),
    Object(BTreeMap<String, Input>),
    List(Vec<Input>),
    Ref(OutputRef),
    /// Secret held in the engine's own config store, never read by this crate.
    ConfigSecret { namespace: String, key: String },
    Apply {
        transform: Transform,
        args: Vec<OutputRef>,
    },
    Secret(Box<Input>),
}

impl Input {
    pub fn literal(value: impl Into<Value>) -> Self {
        Input::Literal(value.into())
    }

    pub fn empty_object() -> Self {
        Input::Object(BTreeMap::new())
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Input)>) -> Self {
        Input::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list(items: impl IntoIterator<Item = Input>) -> Self {
        Input::List(items.into_iter().collect())
    }

    /// Converts plain JSON into an input tree, splitting objects and arrays so
    /// that references can later be placed at any path.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Input::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Input::from_json(v)))
                    .collect(),
            ),
            Value::Array(items) => Input::List(items.into_iter().map(Input::from_json).collect()),
            other => Input::Literal(other),
        }
    }

    pub fn config_secret(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Input::ConfigSecret {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    pub fn apply(transform: Transform, args: Vec<OutputRef>) -> Self {
        Input::Apply { transform, args }
    }

    pub fn secret(self) -> Self {
        match self {
            Input::Secret(_) => self,
            other => Input::Secret(Box::new(other)),
        }
    }

    /// Sets `value` at a dotted path, creating intermediate objects.
    pub fn set(&mut self, path: &str, value: Input) -> Result<()> {
        let mut current = self;
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| StackError::validation_error("empty property path"))?;

        for segment in parents {
            current = match current {
                Input::Object(map) => map
                    .entry(segment.to_string())
                    .or_insert_with(Input::empty_object),
                _ => {
                    return Err(StackError::validation_error(format!(
                        "cannot set '{}': '{}' is not an object",
                        path, segment
                    )))
                }
            };
        }

        match current {
            Input::Object(map) => {
                map.insert(last.to_string(), value);
                Ok(())
            }
            _ => Err(StackError::validation_error(format!(
                "cannot set '{}': parent is not an object",
                path
            ))),
        }
    }

    /// Looks up a dotted path. Object keys containing dots are not addressable.
    pub fn at(&self, path: &str) -> Option<&Input> {
        let mut current = self;
        for segment in path.split('.') {
            current = match current {
                Input::Object(map) => map.get(segment)?,
                Input::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                Input::Secret(inner) => inner.at(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Input::Literal(v) => Some(v),
            Input::Secret(inner) => inner.as_literal(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_literal().and_then(Value::as_str)
    }

    /// Every output reference in the tree, including transform arguments.
    pub fn refs(&self) -> Vec<&OutputRef> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a OutputRef>) {
        match self {
            Input::Literal(_) | Input::ConfigSecret { .. } => {}
            Input::Object(map) => map.values().for_each(|v| v.collect_refs(out)),
            Input::List(items) => items.iter().for_each(|v| v.collect_refs(out)),
            Input::Ref(r) => out.push(r),
            Input::Apply { args, .. } => out.extend(args.iter()),
            Input::Secret(inner) => inner.collect_refs(out),
        }
    }

    /// True when any part of the value is secret-tagged.
    pub fn is_secret(&self) -> bool {
        match self {
            Input::Literal(_) => false,
            Input::ConfigSecret { .. } | Input::Secret(_) => true,
            Input::Object(map) => map.values().any(Input::is_secret),
            Input::List(items) => items.iter().any(Input::is_secret),
            Input::Ref(r) => r.is_secret(),
            Input::Apply { args, .. } => args.iter().any(OutputRef::is_secret),
        }
    }

    /// JSON form written into the engine manifest. Literal values wrapped in
    /// `Secret` are emitted inside a `$secret` envelope.
    pub fn to_manifest(&self) -> Value {
        match self {
            Input::Literal(v) => v.clone(),
            Input::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_manifest()))
                    .collect::<Map<String, Value>>(),
            ),
            Input::List(items) => Value::Array(items.iter().map(Input::to_manifest).collect()),
            Input::Ref(r) => r.to_manifest(),
            Input::ConfigSecret { namespace, key } => json!({
                "$secret": { "config": format!("{}:{}", namespace, key) }
            }),
            Input::Apply { transform, args } => {
                let mut body = Map::new();
                body.insert("fn".to_string(), json!(transform.name()));
                if let Transform::Format(template) = transform {
                    body.insert("template".to_string(), json!(template));
                }
                body.insert(
                    "args".to_string(),
                    Value::Array(args.iter().map(OutputRef::to_manifest).collect()),
                );
                json!({ "$apply": body })
            }
            Input::Secret(inner) => json!({ "$secret": { "value": inner.to_manifest() } }),
        }
    }

    /// Evaluates the tree against resolved attributes.
    pub fn resolve(&self, lookup: &dyn AttributeLookup) -> Result<Resolved> {
        match self {
            Input::Literal(v) => Ok(Resolved::plain(v.clone())),
            Input::Object(map) => {
                let mut secret = false;
                let mut out = Map::new();
                for (k, v) in map {
                    let resolved = v.resolve(lookup)?;
                    secret |= resolved.secret;
                    out.insert(k.clone(), resolved.value);
                }
                Ok(Resolved {
                    value: Value::Object(out),
                    secret,
                })
            }
            Input::List(items) => {
                let mut secret = false;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let resolved = item.resolve(lookup)?;
                    secret |= resolved.secret;
                    out.push(resolved.value);
                }
                Ok(Resolved {
                    value: Value::Array(out),
                    secret,
                })
            }
            Input::Ref(r) => {
                let value = lookup_ref(lookup, r)?;
                Ok(Resolved {
                    value,
                    secret: r.is_secret(),
                })
            }
            Input::ConfigSecret { namespace, key } => Err(StackError::unresolved(
                format!("config:{}", namespace),
                key.clone(),
            )),
            Input::Apply { transform, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(value_to_text(&lookup_ref(lookup, arg)?));
                }
                Ok(Resolved {
                    value: Value::String(transform.apply(&values)?),
                    secret: args.iter().any(OutputRef::is_secret),
                })
            }
            Input::Secret(inner) => {
                let resolved = inner.resolve(lookup)?;
                Ok(Resolved {
                    value: resolved.value,
                    secret: true,
                })
            }
        }
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Input::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for Input {
    fn from(value: String) -> Self {
        Input::Literal(Value::String(value))
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Input::Literal(Value::Bool(value))
    }
}

impl From<u32> for Input {
    fn from(value: u32) -> Self {
        Input::Literal(Value::from(value))
    }
}

impl From<OutputRef> for Input {
    fn from(value: OutputRef) -> Self {
        Input::Ref(value)
    }
}

/// Source of resolved output attributes, typically an engine state export.
pub trait AttributeLookup {
    fn attribute(&self, reference: &OutputRef) -> Option<&Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub secret: bool,
}

impl Resolved {
    pub fn plain(value: Value) -> Self {
        Self {
            value,
            secret: false,
        }
    }
}

fn lookup_ref(lookup: &dyn AttributeLookup, r: &OutputRef) -> Result<Value> {
    lookup
        .attribute(r)
        .cloned()
        .ok_or_else(|| StackError::unresolved(r.name.clone(), r.attribute.clone()))
}

pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapLookup(HashMap<(String, String), Value>);

    impl AttributeLookup for MapLookup {
        fn attribute(&self, reference: &OutputRef) -> Option<&Value> {
            self.0.get(&(reference.name.clone(), reference.attribute.clone()))
        }
    }

    fn redis_ref(attribute: &str) -> OutputRef {
        OutputRef {
            resource: ResourceId(3),
            name: "cache".to_string(),
            resource_type: ResourceType::RedisInstance,
            attribute: attribute.to_string(),
        }
    }

    #[test]
    fn test_set_creates_nested_objects() {
        let mut input = Input::empty_object();
        input.set("settings.backupConfiguration.enabled", true.into()).unwrap();
        assert_eq!(
            input.at("settings.backupConfiguration.enabled"),
            Some(&Input::Literal(Value::Bool(true)))
        );
    }

    #[test]
    fn test_set_rejects_non_object_parent() {
        let mut input = Input::object([("tier", Input::from("BASIC"))]);
        assert!(input.set("tier.name", "x".into()).is_err());
    }

    #[test]
    fn test_refs_include_transform_arguments() {
        let input = Input::object([
            ("host", Input::Ref(redis_ref("host"))),
            (
                "url",
                Input::apply(
                    Transform::Format("redis://{}:{}".to_string()),
                    vec![redis_ref("host"), redis_ref("port")],
                ),
            ),
        ]);
        assert_eq!(input.refs().len(), 3);
    }

    #[test]
    fn test_secret_propagates_from_secret_attribute() {
        assert!(Input::Ref(redis_ref("authString")).is_secret());
        assert!(!Input::Ref(redis_ref("host")).is_secret());
        assert!(Input::from("x").secret().is_secret());
    }

    #[test]
    fn test_resolve_format_and_secret_flag() {
        let mut values = HashMap::new();
        values.insert(
            ("cache".to_string(), "host".to_string()),
            Value::String("10.0.0.3".to_string()),
        );
        values.insert(("cache".to_string(), "port".to_string()), Value::from(6379));
        values.insert(
            ("cache".to_string(), "authString".to_string()),
            Value::String("s3cr3t".to_string()),
        );
        let lookup = MapLookup(values);

        let url = Input::apply(
            Transform::Format("redis://{}:{}".to_string()),
            vec![redis_ref("host"), redis_ref("port")],
        );
        let resolved = url.resolve(&lookup).unwrap();
        assert_eq!(resolved.value, Value::String("redis://10.0.0.3:6379".to_string()));
        assert!(!resolved.secret);

        let auth = Input::Ref(redis_ref("authString")).resolve(&lookup).unwrap();
        assert!(auth.secret);
    }

    #[test]
    fn test_resolve_missing_attribute_fails() {
        let lookup = MapLookup(HashMap::new());
        let err = Input::Ref(redis_ref("host")).resolve(&lookup).unwrap_err();
        assert!(matches!(err, StackError::UnresolvedOutput { .. }));
    }

    #[test]
    fn test_format_arity_is_checked() {
        let transform = Transform::Format("user:{}".to_string());
        assert!(transform.apply(&[]).is_err());
        assert_eq!(
            transform.apply(&["a@b.com".to_string()]).unwrap(),
            "user:a@b.com"
        );
        assert_eq!(transform.arity(), 1);
        assert_eq!(Transform::Kubeconfig.arity(), 3);
        assert!(Transform::Kubeconfig
            .apply(&["c".to_string(), "10.0.0.1".to_string()])
            .is_err());
    }

    #[test]
    fn test_manifest_envelopes() {
        let secret = Input::config_secret("postgres", "userPassword").to_manifest();
        assert_eq!(secret["$secret"]["config"], "postgres:userPassword");

        let reference = Input::Ref(redis_ref("host")).to_manifest();
        assert_eq!(reference["$ref"]["resource"], "cache");
        assert_eq!(reference["$ref"]["attribute"], "host");
    }
}
