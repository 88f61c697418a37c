//! Turning a discovered server into stored tools.
//!
//! Each remote tool becomes a `ToolInput` whose code is a small
//! `@function_tool` that calls the operation on the server through a
//! `fastmcp` client. Reserved tool names keep their dedicated template at
//! generation time, so the stored code only matters for the others.

use crate::discovery::{DiscoveredServer, DiscoveredTool};
use ally_codegen::sanitize::{bindable_name, escape_for_string_literal, to_identifier};
use ally_codegen::templates::run_call_block;
use ally_core::ToolInput;

impl DiscoveredServer {
    /// Instructions stored on the imported group.
    pub fn group_instructions(&self) -> String {
        match self.instructions.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!(
                "Use the tools provided by the {} MCP server at {}.",
                self.name, self.url
            ),
        }
    }

    pub fn tool_inputs(&self) -> Vec<ToolInput> {
        self.tools
            .iter()
            .map(|tool| ToolInput {
                name: tool.name.clone(),
                description: tool.description.clone(),
                code: forwarding_code(tool, &self.url),
            })
            .collect()
    }
}

fn forwarding_code(tool: &DiscoveredTool, url: &str) -> String {
    let function = match to_identifier(&tool.name) {
        ident if ident.is_empty() => "_imported_mcp_tool".to_string(),
        ident => bindable_name(&ident),
    };

    let params: Vec<(String, &str)> = tool
        .parameters
        .iter()
        .map(|p| (to_identifier(p), p.as_str()))
        .filter(|(ident, _)| !ident.is_empty())
        .map(|(ident, original)| (bindable_name(&ident), original))
        .collect();

    let signature = params
        .iter()
        .map(|(ident, _)| format!("{ident}: str"))
        .collect::<Vec<_>>()
        .join(", ");
    let arguments = params
        .iter()
        .map(|(ident, original)| format!("\"{}\": {ident}", escape_for_string_literal(original)))
        .collect::<Vec<_>>()
        .join(", ");

    let remote = escape_for_string_literal(&tool.name);
    let url = escape_for_string_literal(url);
    let docstring = match escape_for_string_literal(&tool.description) {
        d if d.is_empty() => format!("Call '{remote}' on the MCP server."),
        d => d,
    };

    let mut code = format!(
        "@function_tool\n\
         def {function}({signature}) -> str:\n\
         \x20   \"{docstring}\"\n\
         \x20   import asyncio\n\
         \x20   import concurrent.futures\n\
         \x20   from fastmcp import Client\n\
         \n\
         \x20   async def _call():\n\
         \x20       async with Client(\"{url}\") as client:\n\
         \x20           result = await client.call_tool(\"{remote}\", {{{arguments}}})\n\
         \x20           return str(result)\n\
         \n"
    );
    code.push_str(&run_call_block(&remote));
    code
}
