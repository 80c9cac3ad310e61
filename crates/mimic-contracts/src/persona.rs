//! Persona profiles.
//!
//! A persona is a static description of the simulated user. The runtime
//! never mutates it; it only shapes the reasoning prompt.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::flow::Flow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplorationStyle {
    Linear,
    Exploratory,
}

/// Knowledge tiers, strongest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainKnowledge {
    #[serde(default)]
    pub strong: Vec<String>,
    #[serde(default)]
    pub moderate: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
}

/// A simulated user profile.
///
/// JSON documents may use the camelCase keys (`companyContext`,
/// `patienceLevel`, `flowGoals`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub role: String,
    pub seniority: String,
    #[serde(alias = "companyContext")]
    pub company_context: String,
    #[serde(alias = "goalOrientation")]
    pub goal_orientation: String,
    #[serde(alias = "domainKnowledge")]
    pub domain_knowledge: DomainKnowledge,
    #[serde(default, alias = "skillGaps")]
    pub skill_gaps: Vec<String>,
    #[serde(default, alias = "behaviorTraits")]
    pub behavior_traits: Vec<String>,
    #[serde(alias = "patienceLevel")]
    pub patience_level: Level,
    #[serde(alias = "explorationStyle")]
    pub exploration_style: ExplorationStyle,
    #[serde(alias = "trustInAutomation")]
    pub trust_in_automation: Level,
    #[serde(default, alias = "frustrationTriggers")]
    pub frustration_triggers: Vec<String>,
    #[serde(default, alias = "typicalQuestions")]
    pub typical_questions: Vec<String>,
    /// Personal goals keyed by flow name.
    #[serde(default, alias = "flowGoals")]
    pub flow_goals: BTreeMap<String, String>,
}

impl Persona {
    /// The persona's own goal for `flow`, falling back to the flow's goal.
    pub fn goal_for<'a>(&'a self, flow: &'a Flow) -> &'a str {
        self.flow_goals
            .get(&flow.name)
            .map(String::as_str)
            .unwrap_or(&flow.goal)
    }
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

impl ExplorationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorationStyle::Linear => "linear",
            ExplorationStyle::Exploratory => "exploratory",
        }
    }
}
