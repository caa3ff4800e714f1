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

//! Stack outputs
//!
//! Outputs are expressions over resource attributes. They stay symbolic until
//! resolved against a state snapshot. Secret-tagged outputs resolve into
//! [`Sensitive`] values, so the plain formatting and serialization paths never
//! show them.

use crate::domain::graph::{AttributeLookup, Input};
use crate::shared::error::Result;
use crate::shared::secret::{Sensitive, REDACTED};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct StackOutput {
    pub name: String,
    pub value: Input,
}

impl StackOutput {
    pub fn is_secret(&self) -> bool {
        self.value.is_secret()
    }

    /// Symbolic form shown by `plan`. Secret expressions are masked even
    /// though they hold only references.
    pub fn describe(&self) -> String {
        if self.is_secret() {
            return REDACTED.to_string();
        }
        match self.value.as_literal() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => self.value.to_manifest().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackOutputs {
    entries: Vec<StackOutput>,
}

impl StackOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export(&mut self, name: impl Into<String>, value: impl Into<Input>) {
        self.entries.push(StackOutput {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&StackOutput> {
        self.entries.iter().find(|o| o.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackOutput> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_manifest(&self) -> Value {
        let mut map = Map::new();
        for output in &self.entries {
            map.insert(
                output.name.clone(),
                json!({
                    "secret": output.is_secret(),
                    "value": output.value.to_manifest(),
                }),
            );
        }
        Value::Object(map)
    }

    /// Evaluates every output. Fails on the first attribute missing from the
    /// snapshot.
    pub fn resolve(&self, lookup: &dyn AttributeLookup) -> Result<Vec<ResolvedOutput>> {
        self.entries
            .iter()
            .map(|output| {
                let resolved = output.value.resolve(lookup)?;
                let value = if resolved.secret {
                    OutputValue::Secret(Sensitive::new(resolved.value))
                } else {
                    OutputValue::Plain(resolved.value)
                };
                Ok(ResolvedOutput {
                    name: output.name.clone(),
                    value,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    Plain(Value),
    Secret(Sensitive<Value>),
}

impl OutputValue {
    pub fn is_secret(&self) -> bool {
        matches!(self, OutputValue::Secret(_))
    }

    /// Text of the value; secrets only when `reveal` is set.
    pub fn render(&self, reveal: bool) -> String {
        match self {
            OutputValue::Plain(v) => value_text(v),
            OutputValue::Secret(v) if reveal => value_text(v.expose()),
            OutputValue::Secret(_) => REDACTED.to_string(),
        }
    }

    /// Underlying value, regardless of the secret tag.
    pub fn expose(&self) -> &Value {
        match self {
            OutputValue::Plain(v) => v,
            OutputValue::Secret(v) => v.expose(),
        }
    }
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOutput {
    pub name: String,
    pub value: OutputValue,
}

impl ResolvedOutput {
    pub fn is_secret(&self) -> bool {
        self.value.is_secret()
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
