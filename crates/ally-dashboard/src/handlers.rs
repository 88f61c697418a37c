//! Request handlers for the dashboard.

use crate::error::DashboardError;
use crate::pages;
use crate::state::AppState;
use ally_codegen::write_document;
use ally_core::{ToolGroupInput, ToolInput};
use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use serde::Deserialize;

pub type DashboardResult<T> = Result<T, DashboardError>;

/// `?notice=...` set by redirects after a successful action.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

fn redirect_with_notice(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?notice={}", urlencoding::encode(message)))
}

/// First value submitted under `key`, or empty.
fn field(fields: &[(String, String)], key: &str) -> String {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .unwrap_or_default()
}

/// Every id submitted under `key` (one per checked checkbox).
fn ids(fields: &[(String, String)], key: &str) -> DashboardResult<Vec<i64>> {
    fields
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| DashboardError::InvalidRequest(format!("{key} must be an integer")))
        })
        .collect()
}

// =============================================================================
// Home
// =============================================================================

pub async fn home(State(state): State<AppState>) -> DashboardResult<Html<String>> {
    let store = state.store();
    let tools = store.list_tools().await?.len();
    let groups = store.list_groups().await?.len();
    let users = store.list_users().await?.len();
    Ok(Html(pages::home_page(state.config(), tools, groups, users)))
}

// =============================================================================
// Tools
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ToolForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
}

impl From<ToolForm> for ToolInput {
    fn from(form: ToolForm) -> Self {
        ToolInput {
            name: form.name,
            description: form.description,
            code: form.code,
        }
    }
}

pub async fn tools_list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> DashboardResult<Html<String>> {
    let tools = state.store().list_tools().await?;
    Ok(Html(pages::tools_page(&tools, query.notice.as_deref())))
}

pub async fn tool_new() -> Html<String> {
    Html(pages::tool_editor_page(None))
}

pub async fn tool_create(
    State(state): State<AppState>,
    Form(form): Form<ToolForm>,
) -> DashboardResult<Redirect> {
    let tool = state.store().create_tool(form.into()).await?;
    Ok(redirect_with_notice("/tools", &format!("Created tool '{}'", tool.name)))
}

pub async fn tool_edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<Html<String>> {
    let tool = state.store().get_tool(id).await?;
    Ok(Html(pages::tool_editor_page(Some(&tool))))
}

pub async fn tool_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ToolForm>,
) -> DashboardResult<Redirect> {
    let tool = state.store().update_tool(id, form.into()).await?;
    Ok(redirect_with_notice("/tools", &format!("Saved tool '{}'", tool.name)))
}

pub async fn tool_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<Redirect> {
    state.store().delete_tool(id).await?;
    Ok(redirect_with_notice("/tools", "Deleted tool"))
}

// =============================================================================
// Tool groups
// =============================================================================

fn group_input(fields: &[(String, String)]) -> DashboardResult<ToolGroupInput> {
    Ok(ToolGroupInput {
        name: field(fields, "name"),
        instructions: field(fields, "instructions"),
        tool_ids: ids(fields, "tool_id")?,
    })
}

pub async fn groups_list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> DashboardResult<Html<String>> {
    let groups = state.store().list_groups().await?;
    Ok(Html(pages::groups_page(&groups, query.notice.as_deref())))
}

pub async fn group_new(State(state): State<AppState>) -> DashboardResult<Html<String>> {
    let tools = state.store().list_tools().await?;
    Ok(Html(pages::group_editor_page(None, &tools)))
}

pub async fn group_create(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> DashboardResult<Redirect> {
    let group = state.store().create_group(group_input(&fields)?).await?;
    Ok(redirect_with_notice("/groups", &format!("Created group '{}'", group.name)))
}

pub async fn group_edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<Html<String>> {
    let group = state.store().get_group(id).await?;
    let tools = state.store().list_tools().await?;
    Ok(Html(pages::group_editor_page(Some(&group), &tools)))
}

pub async fn group_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(fields): Form<Vec<(String, String)>>,
) -> DashboardResult<Redirect> {
    let group = state.store().update_group(id, group_input(&fields)?).await?;
    Ok(redirect_with_notice("/groups", &format!("Saved group '{}'", group.name)))
}

pub async fn group_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<Redirect> {
    state.store().delete_group(id).await?;
    Ok(redirect_with_notice("/groups", "Deleted group"))
}

// =============================================================================
// MCP import
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ImportForm {
    pub url: String,
}

pub async fn import_form(State(state): State<AppState>) -> Html<String> {
    let mcp = &state.config().mcp;
    Html(pages::import_mcp_page(&mcp.endpoint_url, mcp.discovery_timeout_secs))
}

pub async fn import_submit(
    State(state): State<AppState>,
    Form(form): Form<ImportForm>,
) -> DashboardResult<Html<String>> {
    let url = form.url.trim();
    if url.is_empty() {
        return Err(DashboardError::InvalidRequest("url is required".into()));
    }

    let server = state.discovery().discover(url).await?;
    let group = state
        .store()
        .create_group_with_tools(&server.name, &server.group_instructions(), server.tool_inputs())
        .await?;

    Ok(Html(pages::import_result_page(&server, &group)))
}

// =============================================================================
// Users and selections
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UserForm {
    pub name: String,
}

pub async fn users_list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> DashboardResult<Html<String>> {
    let users = state.store().list_users().await?;
    Ok(Html(pages::users_page(&users, query.notice.as_deref())))
}

pub async fn user_create(
    State(state): State<AppState>,
    Form(form): Form<UserForm>,
) -> DashboardResult<Redirect> {
    let user = state.store().create_user(&form.name).await?;
    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

pub async fn user_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<Redirect> {
    state.store().delete_user(id).await?;
    Ok(redirect_with_notice("/users", "Deleted user"))
}

pub async fn user_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<NoticeQuery>,
) -> DashboardResult<Html<String>> {
    let store = state.store();
    let user = store.get_user(id).await?;
    let tools = store.tool_selections(id).await?;
    let groups = store.group_selections(id).await?;
    Ok(Html(pages::user_selections_page(
        &user,
        &tools,
        &groups,
        query.notice.as_deref(),
    )))
}

/// Replace the user's selection with exactly the checked boxes.
pub async fn user_save_selections(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(fields): Form<Vec<(String, String)>>,
) -> DashboardResult<Redirect> {
    let tool_ids = ids(&fields, "tool_id")?;
    let group_ids = ids(&fields, "group_id")?;
    state.store().set_selections(id, &tool_ids, &group_ids).await?;
    Ok(redirect_with_notice(&format!("/users/{id}"), "Selection saved"))
}

/// Regenerate the external tools document and overwrite the output file.
pub async fn user_generate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<Html<String>> {
    let user = state.store().get_user(id).await?;
    let set = state.store().enabled_set(id).await?;
    let document = state.generator().generate_set(&set);

    let path = state.output_path().to_path_buf();
    let text = document.clone();
    let target = path.clone();
    tokio::task::spawn_blocking(move || write_document(&target, &text))
        .await
        .map_err(anyhow::Error::from)??;

    tracing::info!(
        user_id = id,
        tools = set.tools.len(),
        groups = set.groups.len(),
        path = %path.display(),
        "Updated external tools"
    );
    Ok(Html(pages::generated_page(&user, &path, &document)))
}

/// The document the user's current selection would generate, without writing it.
pub async fn user_preview(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<impl IntoResponse> {
    let set = state.store().enabled_set(id).await?;
    let document = state.generator().generate_set(&set);
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], document))
}

// =============================================================================
// Credentials
// =============================================================================

fn token_url(state: &AppState) -> String {
    format!("http://{}/oauth/token", state.config().server.bind)
}

pub async fn credentials(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<Html<String>> {
    let user = state.store().get_user(id).await?;
    let client = state.issuer().client_for_user(id).await?;
    Ok(Html(pages::credentials_page(
        &user,
        client.as_ref(),
        None,
        &token_url(&state),
    )))
}

/// Create or rotate the user's client and show the new secret once.
pub async fn credentials_regenerate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<impl IntoResponse> {
    let user = state.store().get_user(id).await?;
    let issued = state.issuer().rotate_secret(id).await?;
    let client = state.issuer().client_for_user(id).await?;

    let page = pages::credentials_page(&user, client.as_ref(), Some(&issued), &token_url(&state));
    Ok(([(header::CACHE_CONTROL, "no-store")], Html(page)))
}

pub async fn credentials_revoke(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> DashboardResult<Redirect> {
    state.store().get_user(id).await?;
    state.issuer().revoke_client(id).await?;
    Ok(Redirect::to(&format!("/users/{id}/credentials")))
}
