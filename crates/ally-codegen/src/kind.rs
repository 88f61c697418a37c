//! Tool kinds.
//!
//! A handful of tool names are reserved: instead of embedding stored code, the
//! generator emits a wrapper that forwards the call to the configured MCP
//! server. The kind is resolved once per tool row.

use crate::sanitize::to_identifier;

/// One parameter of a reserved MCP operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McpParam {
    pub name: &'static str,
    /// Optional parameters default to `None` and are left out of the call when absent.
    pub optional: bool,
}

impl McpParam {
    const fn required(name: &'static str) -> Self {
        Self { name, optional: false }
    }

    const fn optional(name: &'static str) -> Self {
        Self { name, optional: true }
    }
}

/// Reserved operations exposed by the email MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum McpTool {
    EmailBody,
    EmailSummary,
    SendEmail,
}

const EMAIL_BODY_PARAMS: &[McpParam] = &[McpParam::required("subject")];
const SEND_EMAIL_PARAMS: &[McpParam] = &[
    McpParam::required("recipient_email"),
    McpParam::required("subject_line"),
    McpParam::required("body_content"),
    McpParam::optional("attachment_file_path"),
];

impl McpTool {
    pub const ALL: [McpTool; 3] = [McpTool::EmailBody, McpTool::EmailSummary, McpTool::SendEmail];

    /// Operation name on the remote server.
    pub fn remote_name(self) -> &'static str {
        match self {
            McpTool::EmailBody => "get_email_body",
            McpTool::EmailSummary => "get_recent_emails_summary",
            McpTool::SendEmail => "send_email_tool",
        }
    }

    /// Declared parameters, in call order.
    pub fn params(self) -> &'static [McpParam] {
        match self {
            McpTool::EmailBody => EMAIL_BODY_PARAMS,
            McpTool::EmailSummary => &[],
            McpTool::SendEmail => SEND_EMAIL_PARAMS,
        }
    }

    /// Match a tool name against the reserved vocabulary.
    pub fn from_tool_name(name: &str) -> Option<Self> {
        let ident = to_identifier(name);
        Self::ALL.into_iter().find(|t| t.remote_name() == ident)
    }
}

/// How a tool row is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Stored code emitted verbatim.
    Plain,
    /// Forwarded to the MCP server.
    ReservedMcp(McpTool),
}

impl ToolKind {
    pub fn of(name: &str) -> Self {
        McpTool::from_tool_name(name).map_or(ToolKind::Plain, ToolKind::ReservedMcp)
    }

    pub fn is_reserved(self) -> bool {
        matches!(self, ToolKind::ReservedMcp(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_resolve() {
        assert_eq!(ToolKind::of("get_email_body"), ToolKind::ReservedMcp(McpTool::EmailBody));
        assert_eq!(
            ToolKind::of("get_recent_emails_summary"),
            ToolKind::ReservedMcp(McpTool::EmailSummary)
        );
        assert_eq!(ToolKind::of("send_email_tool"), ToolKind::ReservedMcp(McpTool::SendEmail));
    }

    #[test]
    fn test_reserved_match_uses_identifier_form() {
        assert_eq!(ToolKind::of("  Send Email Tool "), ToolKind::ReservedMcp(McpTool::SendEmail));
        assert_eq!(ToolKind::of("send-email-tool"), ToolKind::Plain);
    }

    #[test]
    fn test_plain_names() {
        assert_eq!(ToolKind::of("Random Number"), ToolKind::Plain);
        assert!(!ToolKind::of("get_email").is_reserved());
    }

    #[test]
    fn test_only_attachment_is_optional() {
        let optional: Vec<_> = McpTool::ALL
            .iter()
            .flat_map(|t| t.params())
            .filter(|p| p.optional)
            .map(|p| p.name)
            .collect();
        assert_eq!(optional, vec!["attachment_file_path"]);
        assert!(McpTool::EmailSummary.params().is_empty());
    }
}
