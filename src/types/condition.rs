// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A status condition as reported by the control plane. Read-only for the client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl Condition {
    pub fn new(condition_type: &str, status: ConditionStatus) -> Self {
        Condition {
            condition_type: condition_type.to_string(),
            status,
            reason: None,
            message: None,
            last_transition_time: None,
            observed_generation: None,
        }
    }

    pub fn with_reason(mut self, reason: &str, message: &str) -> Self {
        self.reason = Some(reason.to_string());
        self.message = Some(message.to_string());
        self
    }

    pub fn matches(&self, condition_type: &str, status: ConditionStatus) -> bool {
        self.condition_type == condition_type && self.status == status
    }
}

/// Resources exposing a `status.conditions` list.
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];

    fn find_condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions()
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    fn has_condition(&self, condition_type: &str, status: ConditionStatus) -> bool {
        self.conditions()
            .iter()
            .any(|c| c.matches(condition_type, status))
    }
}
