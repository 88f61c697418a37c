//! Python snippet templates.
//!
//! Each template returns the source text for one callable plus the identifier
//! the wrapper agent should reference. Wrapper agents and the export manifest
//! are rendered here too so the generator only decides order.

use crate::kind::McpTool;
use crate::sanitize::{agent_variable, escape_for_string_literal, export_name};
use regex::Regex;
use std::sync::LazyLock;

static FUNCTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(")
        .expect("function header pattern compiles")
});

/// Result of looking for the callable defined by a stored snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callable {
    /// Name taken from the first `def`/`async def` header in the code.
    Discovered(String),
    /// Synthetic `_<ident>_tool_func` used when no header matched.
    ///
    /// Nothing guarantees the snippet actually defines it.
    Fallback(String),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Discovered(name) | Callable::Fallback(name) => name,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Callable::Fallback(_))
    }
}

/// Find the callable defined by `code`, falling back to a synthetic name.
pub fn discover_callable(code: &str, ident: &str) -> Callable {
    FUNCTION_HEADER
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| Callable::Discovered(m.as_str().to_string()))
        .unwrap_or_else(|| Callable::Fallback(format!("_{ident}_tool_func")))
}

/// A rendered callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub source: String,
    pub callable: Callable,
}

/// Stored code, newline-normalized, with its discovered callable.
pub fn plain_tool(code: &str, ident: &str) -> Snippet {
    let normalized = code.replace("\r\n", "\n");
    let callable = discover_callable(&normalized, ident);

    let trimmed = normalized.trim_end();
    let source = if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    };

    Snippet { source, callable }
}

/// Identifier of the generated MCP forwarding function.
///
/// Inside a group the group identifier is part of the name so two groups
/// forwarding the same operation never define the same function.
pub fn mcp_callable_name(tool: McpTool, group_ident: Option<&str>) -> String {
    match group_ident {
        Some(group) => format!("_{group}_{}_mcp", tool.remote_name()),
        None => format!("_{}_mcp", tool.remote_name()),
    }
}

/// Function-body tail that runs the local `_call()` coroutine and returns its
/// result.
///
/// With no running asyncio loop it uses `asyncio.run`. Inside a loop it runs
/// the coroutine to completion on a one-off worker thread with its own loop
/// and blocks on the result. Any failure becomes an
/// `Error calling MCP tool '<remote>': ...` string. The surrounding code must
/// have `asyncio` and `concurrent.futures` imported.
pub fn run_call_block(remote: &str) -> String {
    let mut out = String::new();
    out.push_str("    try:\n");
    out.push_str("        try:\n");
    out.push_str("            asyncio.get_running_loop()\n");
    out.push_str("        except RuntimeError:\n");
    out.push_str("            return asyncio.run(_call())\n");
    out.push_str("        with concurrent.futures.ThreadPoolExecutor(max_workers=1) as pool:\n");
    out.push_str("            return pool.submit(asyncio.run, _call()).result()\n");
    out.push_str("    except Exception as e:\n");
    out.push_str(&format!(
        "        return f\"Error calling MCP tool '{remote}': {{e}}\"\n"
    ));
    out
}

/// `@function_tool` forwarding one reserved operation to the MCP server.
///
/// The call itself goes through [`run_call_block`].
pub fn mcp_tool(
    tool: McpTool,
    group_ident: Option<&str>,
    endpoint_url: &str,
    description: &str,
) -> Snippet {
    let name = mcp_callable_name(tool, group_ident);
    let remote = tool.remote_name();
    let endpoint = escape_for_string_literal(endpoint_url);

    let signature = tool
        .params()
        .iter()
        .map(|p| {
            if p.optional {
                format!("{}: str | None = None", p.name)
            } else {
                format!("{}: str", p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let required = tool
        .params()
        .iter()
        .filter(|p| !p.optional)
        .map(|p| format!("\"{0}\": {0}", p.name))
        .collect::<Vec<_>>()
        .join(", ");

    let docstring = match escape_for_string_literal(description) {
        d if d.is_empty() => format!("Call the '{remote}' operation on the MCP server."),
        d => d,
    };

    let mut source = String::new();
    source.push_str(&format!("# MCP tool: {remote} ({endpoint})\n"));
    source.push_str("@function_tool\n");
    source.push_str(&format!("def {name}({signature}) -> str:\n"));
    source.push_str(&format!("    \"\"\"{docstring}\"\"\"\n"));
    source.push_str("    async def _call():\n");
    source.push_str("        from fastmcp import Client\n");
    source.push_str(&format!("        params = {{{required}}}\n"));
    for param in tool.params().iter().filter(|p| p.optional) {
        source.push_str(&format!("        if {0} is not None:\n", param.name));
        source.push_str(&format!("            params[\"{0}\"] = {0}\n", param.name));
    }
    source.push_str(&format!("        async with Client(\"{endpoint}\") as client:\n"));
    source.push_str(&format!(
        "            result = await client.call_tool(\"{remote}\", params)\n"
    ));
    source.push_str("        return str(result)\n");
    source.push('\n');
    source.push_str(&run_call_block(remote));

    Snippet {
        source,
        callable: Callable::Discovered(name),
    }
}

/// `<ident>_agent = Agent(...)` declaration.
pub fn agent_wrapper(ident: &str, display_name: &str, instructions: &str, callables: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} = Agent(\n", agent_variable(ident)));
    out.push_str(&format!(
        "    name=\"{}\",\n",
        escape_for_string_literal(display_name)
    ));
    out.push_str(&format!(
        "    instructions=\"{}\",\n",
        escape_for_string_literal(instructions)
    ));
    out.push_str(&format!("    tools=[{}]\n", callables.join(", ")));
    out.push_str(")\n");
    out
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub ident: String,
    pub description: String,
}

/// Trailing `external_tools = [...]` list.
pub fn manifest(exports: &[Export]) -> String {
    let mut out = String::new();
    out.push_str("# List of directly usable tool objects to be imported by the main agent file\n");
    out.push_str("external_tools = [\n");

    let entries: Vec<String> = exports
        .iter()
        .map(|export| {
            format!(
                "    {}.as_tool(\n        tool_name=\"{}\",\n        tool_description=\"{}\"\n    )",
                agent_variable(&export.ident),
                export_name(&export.ident),
                escape_for_string_literal(&export.description),
            )
        })
        .collect();

    if !entries.is_empty() {
        out.push_str(&entries.join(",\n"));
        out.push('\n');
    }
    out.push_str("]\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discover_first_header() {
        let code = "@function_tool\ndef _generate_actual_random_number() -> int:\n    return 4\n\ndef helper():\n    pass\n";
        assert_eq!(
            discover_callable(code, "random_number"),
            Callable::Discovered("_generate_actual_random_number".into())
        );
    }

    #[test]
    fn test_discover_async_and_indented_headers() {
        assert_eq!(
            discover_callable("async def fetch_all(url):\n    ...", "x").name(),
            "fetch_all"
        );
        assert_eq!(
            discover_callable("    def inner (a, b):\n        return a", "x").name(),
            "inner"
        );
    }

    #[test]
    fn test_discover_ignores_non_headers() {
        let code = "undefined_name = 1\n# def commented_out(x):";
        // Comment lines do not start with `def` after whitespace, so the fallback is used.
        let callable = discover_callable(code, "my_tool");
        assert!(callable.is_fallback());
        assert_eq!(callable.name(), "_my_tool_tool_func");
    }

    #[test]
    fn test_plain_tool_normalizes_crlf() {
        let snippet = plain_tool("def a():\r\n    return 1\r\n\r\n", "a");
        assert_eq!(snippet.source, "def a():\n    return 1\n");
        assert!(!snippet.source.contains('\r'));
    }

    #[test]
    fn test_plain_tool_empty_code_falls_back() {
        let snippet = plain_tool("", "empty");
        assert_eq!(snippet.source, "");
        assert_eq!(snippet.callable, Callable::Fallback("_empty_tool_func".into()));
    }

    #[test]
    fn test_mcp_send_email_omits_optional_param() {
        let snippet = mcp_tool(McpTool::SendEmail, None, "http://localhost:8000/mcp", "");
        let src = &snippet.source;

        assert_eq!(snippet.callable.name(), "_send_email_tool_mcp");
        assert!(src.contains(
            "def _send_email_tool_mcp(recipient_email: str, subject_line: str, body_content: str, attachment_file_path: str | None = None) -> str:"
        ));
        assert!(src.contains(
            "params = {\"recipient_email\": recipient_email, \"subject_line\": subject_line, \"body_content\": body_content}"
        ));
        assert!(src.contains("if attachment_file_path is not None:"));
        assert!(src.contains("params[\"attachment_file_path\"] = attachment_file_path"));
        assert!(src.contains("async with Client(\"http://localhost:8000/mcp\") as client:"));
        assert!(src.contains("return f\"Error calling MCP tool 'send_email_tool': {e}\""));
    }

    #[test]
    fn test_run_call_block_layout() {
        let expected = r#"    try:
        try:
            asyncio.get_running_loop()
        except RuntimeError:
            return asyncio.run(_call())
        with concurrent.futures.ThreadPoolExecutor(max_workers=1) as pool:
            return pool.submit(asyncio.run, _call()).result()
    except Exception as e:
        return f"Error calling MCP tool 'get_email_body': {e}"
"#;
        assert_eq!(run_call_block("get_email_body"), expected);
    }

    #[test]
    fn test_mcp_bridges_running_loop() {
        let src = mcp_tool(McpTool::EmailSummary, None, "http://h/mcp", "").source;
        let head = r#"# MCP tool: get_recent_emails_summary (http://h/mcp)
@function_tool
def _get_recent_emails_summary_mcp() -> str:
    """Call the 'get_recent_emails_summary' operation on the MCP server."""
    async def _call():
        from fastmcp import Client
        params = {}
        async with Client("http://h/mcp") as client:
            result = await client.call_tool("get_recent_emails_summary", params)
        return str(result)

"#;
        assert_eq!(src, format!("{head}{}", run_call_block("get_recent_emails_summary")));
    }

    #[test]
    fn test_mcp_group_scoped_name() {
        assert_eq!(
            mcp_callable_name(McpTool::EmailBody, Some("inbox")),
            "_inbox_get_email_body_mcp"
        );
        assert_eq!(mcp_callable_name(McpTool::EmailBody, None), "_get_email_body_mcp");
    }

    #[test]
    fn test_mcp_docstring_uses_escaped_description() {
        let src = mcp_tool(McpTool::EmailBody, None, "http://h/mcp", "Reads the\n\"inbox\"").source;
        assert!(src.contains("    \"\"\"Reads the \\\"inbox\\\"\"\"\"\n"));
    }

    #[test]
    fn test_agent_wrapper() {
        let out = agent_wrapper(
            "random_number",
            "Random Number!",
            "Say \"hi\"\nthen stop",
            &["_generate_actual_random_number".to_string()],
        );
        assert_eq!(
            out,
            "random_number_agent = Agent(\n    name=\"Random Number!\",\n    instructions=\"Say \\\"hi\\\" then stop\",\n    tools=[_generate_actual_random_number]\n)\n"
        );
    }

    #[test]
    fn test_manifest_layout() {
        let out = manifest(&[
            Export { ident: "a".into(), description: "Call this tool for tasks related to a.".into() },
            Export { ident: "b".into(), description: "Call this tool for tasks related to b.".into() },
        ]);
        let expected = "# List of directly usable tool objects to be imported by the main agent file\n\
external_tools = [\n    a_agent.as_tool(\n        tool_name=\"get_a_from_specialist_agent\",\n        tool_description=\"Call this tool for tasks related to a.\"\n    ),\n    b_agent.as_tool(\n        tool_name=\"get_b_from_specialist_agent\",\n        tool_description=\"Call this tool for tasks related to b.\"\n    )\n]\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_manifest() {
        assert!(manifest(&[]).ends_with("external_tools = [\n]\n"));
    }
}
