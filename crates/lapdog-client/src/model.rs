// Copyright 2025 Chris Custine
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

//! Typed payloads returned by the API gateway.
//!
//! Bodies are decoded here, at the boundary, so that a malformed response
//! fails with a [`ClientError::Decode`] naming the endpoint instead of
//! surfacing later as a missing field in the view layer.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

/// Endpoint name used in decode errors for the health payload.
pub const STATUS_ENDPOINT: &str = "status";

/// Endpoint name used in decode errors for the workspace listing.
pub const WORKSPACES_ENDPOINT: &str = "workspaces";

/// Per-subsystem operational flags, in the order the gateway sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsystemHealth {
    entries: Vec<(String, bool)>,
}

impl SubsystemHealth {
    /// Iterate over `(name, operational)` pairs in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.entries.iter().map(|(name, up)| (name.as_str(), *up))
    }

    /// Look up a single subsystem by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, up)| *up)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for SubsystemHealth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HealthVisitor;

        impl<'de> Visitor<'de> for HealthVisitor {
            type Value = SubsystemHealth;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of subsystem names to booleans")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, bool)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));

                while let Some((name, up)) = map.next_entry::<String, bool>()? {
                    if entries.iter().any(|(existing, _)| *existing == name) {
                        return Err(de::Error::custom(format_args!(
                            "duplicate subsystem `{name}`"
                        )));
                    }
                    entries.push((name, up));
                }

                Ok(SubsystemHealth { entries })
            }
        }

        deserializer.deserialize_map(HealthVisitor)
    }
}

impl Serialize for SubsystemHealth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, up) in &self.entries {
            map.serialize_entry(name, up)?;
        }
        map.end()
    }
}

/// Decoded body of `GET <base>/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Gateway-level failure flag. Independent of the per-subsystem flags.
    #[serde(default, deserialize_with = "null_as_false")]
    pub failed: bool,

    /// Per-subsystem flags.
    pub systems: SubsystemHealth,

    /// Raw upstream health text, when the gateway includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// An opaque workspace record as listed by the gateway.
///
/// The record is passed through untouched, whatever its JSON type. The
/// accessors read the fields the gateway is known to emit and return `None`
/// when the record is not an object or a field is missing or mistyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workspace(Value);

impl Workspace {
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.str_field("namespace")
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    #[must_use]
    pub fn access_level(&self) -> Option<&str> {
        self.str_field("accessLevel")
    }

    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        self.str_field("bucket")
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    #[must_use]
    pub fn is_public(&self) -> Option<bool> {
        self.0.get("public").and_then(Value::as_bool)
    }

    /// Owner addresses; non-string entries are skipped.
    #[must_use]
    pub fn owners(&self) -> Option<Vec<&str>> {
        self.0
            .get("owners")
            .and_then(Value::as_array)
            .map(|owners| owners.iter().filter_map(Value::as_str).collect())
    }

    /// `namespace/name`, when both are present.
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        Some(format!("{}/{}", self.namespace()?, self.name()?))
    }

    /// Any field of the record, including backend-defined metadata.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The record's fields, when it is a JSON object.
    #[must_use]
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Value> for Workspace {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Decode a `/status` body.
pub fn decode_status(body: &[u8]) -> Result<StatusReport, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::decode(STATUS_ENDPOINT, &e))
}

/// Decode a `/workspaces` body. The body must be an array; its elements are
/// not inspected.
pub fn decode_workspaces(body: &[u8]) -> Result<Vec<Workspace>, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::decode(WORKSPACES_ENDPOINT, &e))
}
