//! Page templates for dashboard views.

use crate::templates::{
    badge, button, card, checkbox_list, code_block, empty_state, html_escape, input, layout,
    notice, page_header, post_button, stats_card, table, textarea,
};
use ally_codegen::ToolKind;
use ally_core::{AllyConfig, Selection, Tool, ToolGroup, User};
use ally_mcp::DiscoveredServer;
use ally_oauth::{ClientRecord, IssuedCredentials};
use std::path::Path;

fn notice_html(message: Option<&str>) -> String {
    message.map(|m| notice(m, true)).unwrap_or_default()
}

// =============================================================================
// Home Page
// =============================================================================

pub fn home_page(config: &AllyConfig, tools: usize, groups: usize, users: usize) -> String {
    let stats = format!(
        r##"<div class="grid grid-cols-1 md:grid-cols-3 gap-6 mb-8">
            {tools_stat}
            {groups_stat}
            {users_stat}
        </div>"##,
        tools_stat = stats_card("Tools", &tools.to_string(), "wrench", "blue"),
        groups_stat = stats_card("Tool Groups", &groups.to_string(), "layer-group", "green"),
        users_stat = stats_card("Users", &users.to_string(), "users", "purple"),
    );

    let settings = card(
        "Configuration",
        &table(
            &["Setting", "Value"],
            &[
                vec!["Listen address".into(), format!("<code>{}</code>", html_escape(&config.server.bind))],
                vec![
                    "MCP endpoint".into(),
                    format!("<code>{}</code>", html_escape(&config.mcp.endpoint_url)),
                ],
                vec![
                    "Generated file".into(),
                    format!(
                        "<code>{}</code>",
                        html_escape(&config.generator.output_path.display().to_string())
                    ),
                ],
                vec!["Default scope".into(), format!("<code>{}</code>", html_escape(&config.oauth.default_scope))],
            ],
        ),
    );

    let content = format!(
        r##"{header}
        {stats}
        {settings}"##,
        header = page_header(
            "Ally Tool Manager",
            "Curate tools, bundle them into groups and publish each user's selection to their agent.",
            None,
        ),
    );
    layout("Home", &content)
}

// =============================================================================
// Tools
// =============================================================================

fn kind_badge(name: &str) -> String {
    match ToolKind::of(name) {
        ToolKind::ReservedMcp(tool) => badge(&format!("MCP: {}", tool.remote_name()), "purple"),
        ToolKind::Plain => badge("code", "gray"),
    }
}

pub fn tools_page(tools: &[Tool], message: Option<&str>) -> String {
    let body = if tools.is_empty() {
        empty_state(
            "wrench",
            "No tools yet",
            "Create a tool or import one from an MCP server.",
            Some(("New tool", "/tools/new")),
        )
    } else {
        let rows: Vec<Vec<String>> = tools
            .iter()
            .map(|tool| {
                vec![
                    format!(
                        r#"<a href="/tools/{id}/edit" class="text-indigo-600 hover:underline">{name}</a>"#,
                        id = tool.id,
                        name = html_escape(&tool.name),
                    ),
                    kind_badge(&tool.name),
                    html_escape(&tool.description),
                    post_button(&format!("/tools/{}/delete", tool.id), "Delete", "danger"),
                ]
            })
            .collect();
        table(&["Name", "Kind", "Instructions", ""], &rows)
    };

    let content = format!(
        "{header}{notice}{body}",
        header = page_header("Tools", "Python snippets exposed to agents.", Some(("New tool", "/tools/new"))),
        notice = notice_html(message),
        body = card("All tools", &body),
    );
    layout("Tools", &content)
}

/// Create form when `tool` is `None`, edit form otherwise.
pub fn tool_editor_page(tool: Option<&Tool>) -> String {
    let (title, action) = match tool {
        Some(t) => ("Edit tool".to_string(), format!("/tools/{}", t.id)),
        None => ("New tool".to_string(), "/tools".to_string()),
    };
    let name = tool.map(|t| html_escape(&t.name)).unwrap_or_default();
    let description = tool.map(|t| html_escape(&t.description)).unwrap_or_default();
    let code = tool.map(|t| html_escape(&t.code)).unwrap_or_default();

    let form = format!(
        r##"<form method="post" action="{action}" class="space-y-4">
            {name_input}
            {description_input}
            {code_input}
            <p class="text-sm text-gray-500">The first <code>def</code> in the code is the function the agent calls.</p>
            {submit}
        </form>"##,
        name_input = input("name", "Name", "text", &name, "Random Number"),
        description_input = textarea("description", "Instructions", &description, 3, false),
        code_input = textarea("code", "Code", &code, 14, true),
        submit = button("Save", "primary", r#"type="submit""#),
    );

    layout(&title, &format!("{}{}", page_header(&title, "", None), card("Tool", &form)))
}

// =============================================================================
// Tool groups
// =============================================================================

pub fn groups_page(groups: &[ToolGroup], message: Option<&str>) -> String {
    let body = if groups.is_empty() {
        empty_state(
            "layer-group",
            "No tool groups yet",
            "Group related tools behind one specialist agent.",
            Some(("New group", "/groups/new")),
        )
    } else {
        let rows: Vec<Vec<String>> = groups
            .iter()
            .map(|group| {
                let members = group
                    .tools
                    .iter()
                    .map(|t| html_escape(&t.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    format!(
                        r#"<a href="/groups/{id}/edit" class="text-indigo-600 hover:underline">{name}</a>"#,
                        id = group.id,
                        name = html_escape(&group.name),
                    ),
                    members,
                    post_button(&format!("/groups/{}/delete", group.id), "Delete", "danger"),
                ]
            })
            .collect();
        table(&["Name", "Tools", ""], &rows)
    };

    let content = format!(
        "{header}{notice}{body}",
        header = page_header(
            "Tool Groups",
            "Each group becomes one agent with all of its tools.",
            Some(("New group", "/groups/new")),
        ),
        notice = notice_html(message),
        body = card("All groups", &body),
    );
    layout("Tool Groups", &content)
}

pub fn group_editor_page(group: Option<&ToolGroup>, tools: &[Tool]) -> String {
    let (title, action) = match group {
        Some(g) => ("Edit tool group".to_string(), format!("/groups/{}", g.id)),
        None => ("New tool group".to_string(), "/groups".to_string()),
    };
    let members = group.map(ToolGroup::member_ids).unwrap_or_default();
    let items: Vec<(i64, String, bool)> = tools
        .iter()
        .map(|t| (t.id, t.name.clone(), members.contains(&t.id)))
        .collect();

    let form = format!(
        r##"<form method="post" action="{action}" class="space-y-4">
            {name_input}
            {instructions_input}
            <div>
                <p class="block text-sm font-medium text-gray-700 mb-2">Tools</p>
                {checkboxes}
            </div>
            {submit}
        </form>"##,
        name_input = input(
            "name",
            "Name",
            "text",
            &group.map(|g| html_escape(&g.name)).unwrap_or_default(),
            "Email",
        ),
        instructions_input = textarea(
            "instructions",
            "Instructions",
            &group.map(|g| html_escape(&g.instructions)).unwrap_or_default(),
            4,
            false,
        ),
        checkboxes = checkbox_list("tool_id", &items),
        submit = button("Save", "primary", r#"type="submit""#),
    );

    layout(&title, &format!("{}{}", page_header(&title, "", None), card("Tool group", &form)))
}

pub fn import_mcp_page(default_url: &str, timeout_secs: u64) -> String {
    let form = format!(
        r##"<form method="post" action="/groups/import" class="space-y-4">
            {url_input}
            <p class="text-sm text-gray-500">Discovery gives up after {timeout_secs} seconds.</p>
            {submit}
        </form>"##,
        url_input = input("url", "MCP server URL", "url", &html_escape(default_url), "http://localhost:8000/mcp"),
        submit = button("Discover and import", "primary", r#"type="submit""#),
    );
    let content = format!(
        "{}{}",
        page_header(
            "Import MCP Server",
            "Lists the server's tools and stores them as one tool group.",
            None,
        ),
        card("Server", &form)
    );
    layout("Import MCP Server", &content)
}

pub fn import_result_page(server: &DiscoveredServer, group: &ToolGroup) -> String {
    let rows: Vec<Vec<String>> = server
        .tools
        .iter()
        .map(|t| {
            vec![
                html_escape(&t.name),
                html_escape(&t.description),
                html_escape(&t.parameters.join(", ")),
            ]
        })
        .collect();

    let content = format!(
        "{header}{notice}{tools}",
        header = page_header(&html_escape(&server.name), &html_escape(&server.url), None),
        notice = notice(
            &format!("Imported {} tools into group '{}'.", server.tools.len(), group.name),
            true,
        ),
        tools = card(
            "Discovered tools",
            &format!(
                r#"{}<a href="/groups/{}/edit" class="mt-4 inline-block text-indigo-600 hover:underline">Edit group</a>"#,
                table(&["Name", "Description", "Parameters"], &rows),
                group.id
            ),
        ),
    );
    layout("MCP Import", &content)
}

// =============================================================================
// Users
// =============================================================================

pub fn users_page(users: &[User], message: Option<&str>) -> String {
    let list = if users.is_empty() {
        empty_state("users", "No users yet", "Add a user to start selecting tools.", None)
    } else {
        let rows: Vec<Vec<String>> = users
            .iter()
            .map(|user| {
                vec![
                    user.id.to_string(),
                    format!(
                        r#"<a href="/users/{id}" class="text-indigo-600 hover:underline">{name}</a>"#,
                        id = user.id,
                        name = html_escape(&user.name),
                    ),
                    format!(
                        r#"<a href="/users/{}/credentials" class="text-indigo-600 hover:underline">Credentials</a>"#,
                        user.id
                    ),
                    post_button(&format!("/users/{}/delete", user.id), "Delete", "danger"),
                ]
            })
            .collect();
        table(&["ID", "Name", "OAuth", ""], &rows)
    };

    let form = format!(
        r##"<form method="post" action="/users" class="flex items-end gap-4">
            <div class="flex-1">{name_input}</div>
            {submit}
        </form>"##,
        name_input = input("name", "Name", "text", "", "alice"),
        submit = button("Add user", "primary", r#"type="submit""#),
    );

    let content = format!(
        "{header}{notice}{list}{form}",
        header = page_header("Users", "Each user has their own enabled tools and OAuth client.", None),
        notice = notice_html(message),
        list = card("All users", &list),
        form = card("New user", &form),
    );
    layout("Users", &content)
}

pub fn user_selections_page(
    user: &User,
    tools: &[Selection],
    groups: &[Selection],
    message: Option<&str>,
) -> String {
    let items = |selections: &[Selection]| -> Vec<(i64, String, bool)> {
        selections
            .iter()
            .map(|s| (s.id, s.name.clone(), s.enabled))
            .collect()
    };

    let form = format!(
        r##"<form method="post" action="/users/{id}/selections" class="space-y-6">
            <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                <div>
                    <h4 class="font-medium text-gray-900 mb-2">Tools</h4>
                    {tool_boxes}
                </div>
                <div>
                    <h4 class="font-medium text-gray-900 mb-2">Tool groups</h4>
                    {group_boxes}
                </div>
            </div>
            {submit}
        </form>"##,
        id = user.id,
        tool_boxes = checkbox_list("tool_id", &items(tools)),
        group_boxes = checkbox_list("group_id", &items(groups)),
        submit = button("Save selection", "primary", r#"type="submit""#),
    );

    let publish = format!(
        r##"<p class="text-gray-600 mb-4">Regenerate the external tools file from the saved selection.</p>
        <div class="flex gap-3">
            {generate}
            <a href="/users/{id}/preview" class="px-4 py-2 rounded-lg bg-gray-200 hover:bg-gray-300 text-gray-700 font-medium">Preview</a>
        </div>"##,
        id = user.id,
        generate = post_button(&format!("/users/{}/generate", user.id), "Update external tools", "success"),
    );

    let name = html_escape(&user.name);
    let content = format!(
        "{header}{notice}{selection}{publish}",
        header = page_header(
            &name,
            &format!(r#"<a href="/users/{}/credentials" class="text-indigo-600 hover:underline">OAuth credentials</a>"#, user.id),
            None,
        ),
        notice = notice_html(message),
        selection = card("Enabled tools", &form),
        publish = card("External tools", &publish),
    );
    layout(&user.name, &content)
}

pub fn generated_page(user: &User, path: &Path, document: &str) -> String {
    let content = format!(
        "{header}{notice}{document}",
        header = page_header(&html_escape(&user.name), "External tools updated.", None),
        notice = notice(&format!("Wrote {}", path.display()), true),
        document = card("Generated document", &code_block(document, "python")),
    );
    layout("External tools", &content)
}

// =============================================================================
// Credentials
// =============================================================================

/// `issued` is set right after a rotation: the only time the secret is shown.
pub fn credentials_page(
    user: &User,
    client: Option<&ClientRecord>,
    issued: Option<&IssuedCredentials>,
    token_url: &str,
) -> String {
    let secret_html = issued.map_or(String::new(), |creds| {
        card(
            "New client secret",
            &format!(
                r##"{warning}
                <dl class="space-y-2">
                    <dt class="text-sm text-gray-500">client_id</dt>
                    <dd><code>{client_id}</code></dd>
                    <dt class="text-sm text-gray-500">client_secret</dt>
                    <dd><code id="client-secret">{secret}</code></dd>
                </dl>"##,
                warning = notice("Copy the secret now. It will not be shown again.", false),
                client_id = html_escape(&creds.client_id),
                secret = html_escape(&creds.client_secret),
            ),
        )
    });

    let client_html = match client {
        Some(client) => {
            let status = if client.revoked {
                badge("revoked", "red")
            } else {
                badge("active", "green")
            };
            let revoke = if client.revoked {
                String::new()
            } else {
                post_button(&format!("/users/{}/credentials/revoke", user.id), "Revoke", "danger")
            };
            format!(
                r##"{details}
                <div class="mt-4 flex gap-3">
                    {rotate}
                    {revoke}
                </div>"##,
                details = table(
                    &["Field", "Value"],
                    &[
                        vec!["client_id".into(), format!("<code>{}</code>", html_escape(&client.client_id))],
                        vec!["Name".into(), html_escape(&client.client_name)],
                        vec!["Status".into(), status],
                        vec!["Grant types".into(), html_escape(&client.grant_types.join(", "))],
                        vec!["Created".into(), client.created_at.format("%Y-%m-%d %H:%M UTC").to_string()],
                    ],
                ),
                rotate = post_button(
                    &format!("/users/{}/credentials/regenerate", user.id),
                    "Regenerate secret",
                    "primary",
                ),
            )
        }
        None => format!(
            r##"<p class="text-gray-600 mb-4">No OAuth client yet.</p>{create}"##,
            create = post_button(
                &format!("/users/{}/credentials/regenerate", user.id),
                "Create client",
                "primary",
            ),
        ),
    };

    let usage = format!(
        "curl -X POST {token_url} \\\n  -d grant_type=client_credentials \\\n  -d client_id=<client_id> \\\n  -d client_secret=<client_secret>"
    );

    let content = format!(
        "{header}{secret_html}{client}{usage}",
        header = page_header(
            &format!("{} credentials", html_escape(&user.name)),
            "OAuth 2.0 client credentials for this user's agent.",
            None,
        ),
        client = card("Client", &client_html),
        usage = card("Requesting a token", &code_block(&usage, "bash")),
    );
    layout("Credentials", &content)
}
