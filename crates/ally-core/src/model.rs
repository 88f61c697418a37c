//! Domain model.
//!
//! These are the plain data carriers passed between the store, the code
//! generator and the HTTP layers. None of them know how they are persisted.

use serde::{Deserialize, Serialize};

/// A named unit of callable code plus natural-language usage instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,
    pub name: String,
    /// Used as the agent instructions in the generated document.
    pub description: String,
    /// Source text of one callable.
    pub code: String,
}

/// A named collection of tools sharing one set of instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolGroup {
    pub id: i64,
    pub name: String,
    pub instructions: String,
    /// Member tools, ordered by name.
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl ToolGroup {
    /// Ids of the member tools.
    pub fn member_ids(&self) -> Vec<i64> {
        self.tools.iter().map(|t| t.id).collect()
    }
}

/// A user of the manager. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// Fields accepted when creating or updating a tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
}

/// Fields accepted when creating or updating a tool group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolGroupInput {
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub tool_ids: Vec<i64>,
}

/// One row of a user's selection screen: an entity and whether it is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub id: i64,
    pub name: String,
    pub enabled: bool,
}

/// The tools and groups a user currently has enabled.
///
/// This is the explicit input of the code generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledSet {
    pub tools: Vec<Tool>,
    pub groups: Vec<ToolGroup>,
}

impl EnabledSet {
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.groups.is_empty()
    }
}
