//! Document assembly.
//!
//! [`Generator::generate`] is a pure function of the enabled tools and groups
//! handed to it. Inputs are sorted by `(name, id)` before rendering, so the
//! caller's ordering never changes the output.

use crate::kind::ToolKind;
use crate::sanitize::{derive_export_description, escape_for_string_literal, to_identifier};
use crate::templates::{self, Export, Snippet};
use ally_core::{EnabledSet, McpConfig, Tool, ToolGroup};
use std::collections::HashSet;

/// Imports every generated document starts with.
pub const PREAMBLE: &str = "from agents import Agent, function_tool\n\
import asyncio\n\
import concurrent.futures\n\
import os\n\
import random\n";

/// Settings baked into generated code.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Endpoint reserved MCP tools forward to.
    pub mcp_endpoint: String,
}

impl From<&McpConfig> for GeneratorOptions {
    fn from(config: &McpConfig) -> Self {
        Self {
            mcp_endpoint: config.endpoint_url.clone(),
        }
    }
}

/// Assembles the external tools document.
#[derive(Debug, Clone)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Render an [`EnabledSet`].
    pub fn generate_set(&self, set: &EnabledSet) -> String {
        self.generate(&set.tools, &set.groups)
    }

    /// Render the document for the given enabled tools and groups.
    pub fn generate(&self, tools: &[Tool], groups: &[ToolGroup]) -> String {
        let tools = sorted_tools(tools);
        let groups = sorted_groups(groups);

        // Reserved tools that a group already forwards are not emitted standalone.
        let grouped_reserved: HashSet<i64> = groups
            .iter()
            .flat_map(|g| g.tools.iter())
            .filter(|t| ToolKind::of(&t.name).is_reserved())
            .map(|t| t.id)
            .collect();

        let mut sections = Vec::new();
        let mut exports = Vec::new();

        for tool in &tools {
            let kind = ToolKind::of(&tool.name);
            if kind.is_reserved() && grouped_reserved.contains(&tool.id) {
                tracing::debug!(
                    tool = %tool.name,
                    "Skipping standalone MCP tool already emitted by a group"
                );
                continue;
            }

            let ident = to_identifier(&tool.name);
            let snippet = self.render_tool(tool, kind, &ident, None);

            let mut section = format!("# --- {} ---\n", escape_for_string_literal(&tool.name));
            push_snippet(&mut section, &snippet);
            section.push_str(&templates::agent_wrapper(
                &ident,
                &tool.name,
                &tool.description,
                &[snippet.callable.name().to_string()],
            ));
            sections.push(section);

            exports.push(Export {
                ident,
                description: derive_export_description(&tool.name),
            });
        }

        for group in &groups {
            let ident = to_identifier(&group.name);
            let mcp_flavored = group.tools.iter().any(|t| ToolKind::of(&t.name).is_reserved());

            let mut section = format!(
                "# --- {} Tool Group ---\n",
                escape_for_string_literal(&group.name)
            );
            if mcp_flavored {
                section.push_str(&format!(
                    "# MCP endpoint: {}\n",
                    escape_for_string_literal(&self.options.mcp_endpoint)
                ));
            }

            let mut callables: Vec<String> = Vec::new();
            for member in &group.tools {
                let kind = ToolKind::of(&member.name);
                let member_ident = to_identifier(&member.name);
                let snippet = self.render_tool(member, kind, &member_ident, Some(&ident));
                push_snippet(&mut section, &snippet);

                let name = snippet.callable.name();
                if !callables.iter().any(|c| c == name) {
                    callables.push(name.to_string());
                }
            }

            section.push_str(&templates::agent_wrapper(
                &ident,
                &group.name,
                &group.instructions,
                &callables,
            ));
            sections.push(section);

            exports.push(Export {
                ident,
                description: derive_export_description(&group.name),
            });
        }

        tracing::debug!(
            tools = tools.len(),
            groups = groups.len(),
            exports = exports.len(),
            "Generated external tools document"
        );

        let mut document = String::from(PREAMBLE);
        document.push_str("\n\n");
        for section in &sections {
            document.push_str(section);
            document.push_str("\n\n");
        }
        document.push_str(&templates::manifest(&exports));
        document
    }

    fn render_tool(
        &self,
        tool: &Tool,
        kind: ToolKind,
        ident: &str,
        group_ident: Option<&str>,
    ) -> Snippet {
        match kind {
            ToolKind::ReservedMcp(mcp) => templates::mcp_tool(
                mcp,
                group_ident,
                &self.options.mcp_endpoint,
                &tool.description,
            ),
            ToolKind::Plain => {
                let snippet = templates::plain_tool(&tool.code, ident);
                if snippet.callable.is_fallback() {
                    tracing::warn!(
                        tool = %tool.name,
                        callable = %snippet.callable.name(),
                        "No function header found in tool code, using fallback callable"
                    );
                }
                snippet
            }
        }
    }
}

fn push_snippet(section: &mut String, snippet: &Snippet) {
    if !snippet.source.is_empty() {
        section.push_str(&snippet.source);
        section.push('\n');
    }
}

fn sorted_tools(tools: &[Tool]) -> Vec<Tool> {
    let mut tools = tools.to_vec();
    tools.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
    tools
}

fn sorted_groups(groups: &[ToolGroup]) -> Vec<ToolGroup> {
    let mut groups: Vec<ToolGroup> = groups
        .iter()
        .map(|g| ToolGroup {
            tools: sorted_tools(&g.tools),
            ..g.clone()
        })
        .collect();
    groups.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
    groups
}
