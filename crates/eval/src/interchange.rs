//! JSON interchange format for decision sets.
//!
//! ```json
//! {
//!   "decisions": [
//!     {
//!       "id": "decision",
//!       "hit_policy": "FIRST",
//!       "required_decisions": [],
//!       "inputs": [ { "type": "QualifiedName", "names": ["input", "category"] } ],
//!       "outputs": ["message"],
//!       "rules": [ { "input_entries": [ ... ], "output_entries": [ ... ] } ]
//!     }
//!   ]
//! }
//! ```
//!
//! Expression trees use the tagged encoding of [`dmn_feel::Node`]. A missing
//! `hit_policy` is UNIQUE.

use dmn_feel::Node;
use serde::{Deserialize, Serialize};

use crate::decision::{Decision, DecisionSet};
use crate::error::DecisionError;
use crate::table::{DecisionTable, HitPolicy, Rule};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSetDocument {
    pub decisions: Vec<DecisionDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionDocument {
    pub id: String,
    #[serde(default = "default_hit_policy")]
    pub hit_policy: String,
    #[serde(default)]
    pub required_decisions: Vec<String>,
    pub inputs: Vec<Node>,
    pub outputs: Vec<String>,
    pub rules: Vec<RuleDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDocument {
    pub input_entries: Vec<Node>,
    pub output_entries: Vec<Node>,
}

fn default_hit_policy() -> String {
    "UNIQUE".to_string()
}

impl DecisionDocument {
    fn compile(self) -> Result<Decision, DecisionError> {
        let hit_policy: HitPolicy = self.hit_policy.parse()?;
        let rules = self
            .rules
            .into_iter()
            .map(|rule| Rule {
                input_entries: rule.input_entries,
                output_entries: rule.output_entries,
            })
            .collect();
        let table = DecisionTable::new(&self.id, hit_policy, self.inputs, self.outputs, rules)?;
        Ok(Decision::new(self.id, table, self.required_decisions))
    }
}

impl DecisionSet {
    /// Build a decision set from an interchange document.
    pub fn from_interchange(document: &serde_json::Value) -> Result<Self, DecisionError> {
        let document = DecisionSetDocument::deserialize(document)?;
        Self::from_document(document)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DecisionError> {
        let document: DecisionSetDocument = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    pub fn from_document(document: DecisionSetDocument) -> Result<Self, DecisionError> {
        let decisions = document
            .decisions
            .into_iter()
            .map(DecisionDocument::compile)
            .collect::<Result<Vec<_>, _>>()?;
        DecisionSet::new(decisions)
    }
}
