//! HTML templates for the dashboard.
//!
//! Uses a simple template approach with Tailwind CSS. Every value that comes
//! from the database or a form goes through [`html_escape`] first.

/// Base HTML layout wrapper.
pub fn layout(title: &str, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Ally Dashboard</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
</head>
<body class="bg-gray-50 min-h-screen">
    {NAV}

    <div class="flex">
        {SIDEBAR}

        <main class="flex-1 p-6 lg:p-8">
            <div class="max-w-6xl mx-auto">
                {content}
            </div>
        </main>
    </div>
</body>
</html>"##,
        title = html_escape(title),
        NAV = nav_template(),
        SIDEBAR = sidebar_template(),
    )
}

fn nav_template() -> &'static str {
    r##"<nav class="bg-indigo-600 text-white px-4 py-3 sticky top-0 z-50 shadow-lg">
        <div class="flex items-center justify-between">
            <a href="/dashboard" class="flex items-center gap-2 font-semibold">
                <i class="fas fa-robot"></i>
                <span>Ally</span>
                <span class="text-sm bg-indigo-500 px-2 py-1 rounded">Tool Manager</span>
            </a>
        </div>
    </nav>"##
}

fn sidebar_template() -> &'static str {
    r##"<aside class="w-64 bg-white border-r border-gray-200 min-h-[calc(100vh-56px)]">
            <nav class="p-4 space-y-2">
                <a href="/dashboard" class="flex items-center gap-3 px-4 py-3 text-gray-700 hover:bg-indigo-50 rounded-lg">
                    <i class="fas fa-home w-5"></i>
                    <span>Home</span>
                </a>

                <div class="pt-4 pb-2 px-4 text-xs font-semibold text-gray-400 uppercase tracking-wider">
                    Catalog
                </div>
                <a href="/tools" class="flex items-center gap-3 px-4 py-3 text-gray-700 hover:bg-indigo-50 rounded-lg">
                    <i class="fas fa-wrench w-5"></i>
                    <span>Tools</span>
                </a>
                <a href="/groups" class="flex items-center gap-3 px-4 py-3 text-gray-700 hover:bg-indigo-50 rounded-lg">
                    <i class="fas fa-layer-group w-5"></i>
                    <span>Tool Groups</span>
                </a>
                <a href="/groups/import" class="flex items-center gap-3 px-4 py-3 text-gray-700 hover:bg-indigo-50 rounded-lg">
                    <i class="fas fa-plug w-5"></i>
                    <span>Import MCP Server</span>
                </a>

                <div class="pt-4 pb-2 px-4 text-xs font-semibold text-gray-400 uppercase tracking-wider">
                    Access
                </div>
                <a href="/users" class="flex items-center gap-3 px-4 py-3 text-gray-700 hover:bg-indigo-50 rounded-lg">
                    <i class="fas fa-users w-5"></i>
                    <span>Users</span>
                </a>
            </nav>
        </aside>"##
}

/// Escape text for HTML element content and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Page heading with an optional action link on the right.
pub fn page_header(title: &str, subtitle: &str, action: Option<(&str, &str)>) -> String {
    let action_html = action.map_or(String::new(), |(text, href)| {
        format!(
            r##"<a href="{href}" class="inline-flex items-center gap-2 bg-indigo-600 hover:bg-indigo-700 text-white px-4 py-2 rounded-lg font-medium">
                <i class="fas fa-plus"></i> {text}
            </a>"##
        )
    });
    format!(
        r##"<div class="mb-8 flex items-center justify-between">
            <div>
                <h1 class="text-3xl font-bold text-gray-900">{title}</h1>
                <p class="mt-2 text-gray-600">{subtitle}</p>
            </div>
            {action_html}
        </div>"##
    )
}

/// Card component.
pub fn card(title: &str, content: &str) -> String {
    format!(
        r##"<div class="bg-white rounded-xl shadow-sm border border-gray-200 overflow-hidden mb-6">
            <div class="px-6 py-4 border-b border-gray-200">
                <h3 class="text-lg font-semibold text-gray-900">{title}</h3>
            </div>
            <div class="p-6">
                {content}
            </div>
        </div>"##
    )
}

/// Stats card component.
pub fn stats_card(title: &str, value: &str, icon: &str, color: &str) -> String {
    format!(
        r##"<div class="bg-white rounded-xl shadow-sm border border-gray-200 p-6">
            <div class="flex items-center justify-between">
                <div>
                    <p class="text-sm text-gray-500">{title}</p>
                    <p class="text-2xl font-bold text-gray-900 mt-1">{value}</p>
                </div>
                <div class="w-12 h-12 rounded-full bg-{color}-100 flex items-center justify-center">
                    <i class="fas fa-{icon} text-{color}-500 text-xl"></i>
                </div>
            </div>
        </div>"##
    )
}

/// Green or red banner shown after an action.
pub fn notice(message: &str, success: bool) -> String {
    let (color, icon) = if success {
        ("green", "circle-check")
    } else {
        ("red", "circle-exclamation")
    };
    format!(
        r##"<div class="mb-6 flex items-center gap-3 px-4 py-3 rounded-lg bg-{color}-50 text-{color}-800 border border-{color}-200">
            <i class="fas fa-{icon}"></i>
            <span>{message}</span>
        </div>"##,
        message = html_escape(message),
    )
}

/// Submit button component.
pub fn button(text: &str, variant: &str, attrs: &str) -> String {
    let (bg, hover, text_color) = match variant {
        "primary" => ("bg-indigo-600", "hover:bg-indigo-700", "text-white"),
        "danger" => ("bg-red-600", "hover:bg-red-700", "text-white"),
        "success" => ("bg-green-600", "hover:bg-green-700", "text-white"),
        _ => ("bg-gray-200", "hover:bg-gray-300", "text-gray-700"),
    };

    format!(
        r##"<button class="{bg} {hover} {text_color} px-4 py-2 rounded-lg font-medium transition-colors" {attrs}>{text}</button>"##
    )
}

/// A one-button form posting to `action`.
pub fn post_button(action: &str, text: &str, variant: &str) -> String {
    format!(
        r##"<form method="post" action="{action}" class="inline">{button}</form>"##,
        button = button(text, variant, r#"type="submit""#),
    )
}

/// Input field component. `value` must already be escaped.
pub fn input(name: &str, label: &str, input_type: &str, value: &str, placeholder: &str) -> String {
    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700">{label}</label>
            <input type="{input_type}" name="{name}" id="{name}" value="{value}" placeholder="{placeholder}"
                   class="w-full px-4 py-2 border border-gray-300 rounded-lg bg-white text-gray-900 focus:ring-2 focus:ring-indigo-500">
        </div>"##
    )
}

/// Multi-line text field. `value` must already be escaped.
pub fn textarea(name: &str, label: &str, value: &str, rows: usize, monospace: bool) -> String {
    let font = if monospace { "font-mono text-sm" } else { "" };
    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700">{label}</label>
            <textarea name="{name}" id="{name}" rows="{rows}"
                      class="w-full px-4 py-2 border border-gray-300 rounded-lg bg-white text-gray-900 {font}">{value}</textarea>
        </div>"##
    )
}

/// A checkbox per `(id, label, checked)` entry, all submitted under `name`.
pub fn checkbox_list(name: &str, items: &[(i64, String, bool)]) -> String {
    if items.is_empty() {
        return r#"<p class="text-sm text-gray-500">Nothing to select yet.</p>"#.to_string();
    }
    items
        .iter()
        .map(|(id, label, checked)| {
            let checked = if *checked { " checked" } else { "" };
            format!(
                r##"<label class="flex items-center gap-3 py-1">
                <input type="checkbox" name="{name}" value="{id}"{checked} class="rounded border-gray-300 text-indigo-600">
                <span class="text-gray-800">{label}</span>
            </label>"##,
                label = html_escape(label),
            )
        })
        .collect()
}

/// Badge component.
pub fn badge(text: &str, color: &str) -> String {
    format!(
        r##"<span class="inline-flex items-center px-2.5 py-0.5 rounded-full text-xs font-medium bg-{color}-100 text-{color}-800">{text}</span>"##
    )
}

/// Table component. Cells are inserted as-is.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let headers_html: String = headers
        .iter()
        .map(|h| format!(r#"<th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">{h}</th>"#))
        .collect();

    let rows_html: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!(r#"<td class="px-6 py-4 text-sm text-gray-900">{cell}</td>"#))
                .collect();
            format!(r#"<tr class="hover:bg-gray-50">{cells}</tr>"#)
        })
        .collect();

    format!(
        r##"<div class="overflow-x-auto">
            <table class="min-w-full divide-y divide-gray-200">
                <thead class="bg-gray-50">
                    <tr>{headers_html}</tr>
                </thead>
                <tbody class="bg-white divide-y divide-gray-200">
                    {rows_html}
                </tbody>
            </table>
        </div>"##
    )
}

/// Empty state component.
pub fn empty_state(icon: &str, title: &str, description: &str, action: Option<(&str, &str)>) -> String {
    let action_html = action.map_or(String::new(), |(text, href)| {
        format!(r##"<a href="{href}" class="mt-4 inline-flex items-center gap-2 bg-indigo-600 hover:bg-indigo-700 text-white px-4 py-2 rounded-lg font-medium">
            {text}
        </a>"##)
    });

    format!(
        r##"<div class="text-center py-12">
            <i class="fas fa-{icon} text-4xl text-gray-400 mb-4"></i>
            <h3 class="text-lg font-medium text-gray-900">{title}</h3>
            <p class="mt-1 text-gray-500">{description}</p>
            {action_html}
        </div>"##
    )
}

/// Code block component. The code is escaped here.
pub fn code_block(code: &str, language: &str) -> String {
    format!(
        r##"<pre class="bg-gray-900 text-gray-100 rounded-lg p-4 overflow-x-auto text-sm"><code class="language-{language}">{code}</code></pre>"##,
        code = html_escape(code),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_checkbox_list_marks_checked_and_escapes() {
        let html = checkbox_list(
            "tool_id",
            &[(1, "A <b>".to_string(), true), (2, "B".to_string(), false)],
        );
        assert!(html.contains(r#"name="tool_id" value="1" checked"#));
        assert!(html.contains(r#"name="tool_id" value="2" class"#));
        assert!(html.contains("A &lt;b&gt;"));
    }

    #[test]
    fn test_layout_escapes_title() {
        let page = layout("<Tools>", "<p>body</p>");
        assert!(page.contains("<title>&lt;Tools&gt; - Ally Dashboard</title>"));
        assert!(page.contains("<p>body</p>"));
    }
}
