//! Tools and tool groups.

use crate::error::{StoreError, required};
use crate::SqliteStore;
use ally_core::{Tool, ToolGroup, ToolGroupInput, ToolInput};
use sqlx::{Sqlite, Transaction};
use std::collections::HashMap;

type ToolRow = (i64, String, String, String);

fn tool_from_row((id, name, description, code): ToolRow) -> Tool {
    Tool {
        id,
        name,
        description,
        code,
    }
}

impl SqliteStore {
    /// All tools, ordered by name then id.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, StoreError> {
        let rows = sqlx::query_as::<_, ToolRow>(
            "SELECT id, name, description, code FROM tools ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(tool_from_row).collect())
    }

    pub async fn get_tool(&self, id: i64) -> Result<Tool, StoreError> {
        sqlx::query_as::<_, ToolRow>("SELECT id, name, description, code FROM tools WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(tool_from_row)
            .ok_or(StoreError::NotFound { entity: "tool", id })
    }

    pub async fn create_tool(&self, input: ToolInput) -> Result<Tool, StoreError> {
        let name = required(&input.name, "name")?;
        let id = sqlx::query("INSERT INTO tools (name, description, code) VALUES (?, ?, ?)")
            .bind(&name)
            .bind(&input.description)
            .bind(&input.code)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        tracing::info!(tool_id = id, name = %name, "Created tool");
        Ok(Tool {
            id,
            name,
            description: input.description,
            code: input.code,
        })
    }

    pub async fn update_tool(&self, id: i64, input: ToolInput) -> Result<Tool, StoreError> {
        let name = required(&input.name, "name")?;
        let affected = sqlx::query("UPDATE tools SET name = ?, description = ?, code = ? WHERE id = ?")
            .bind(&name)
            .bind(&input.description)
            .bind(&input.code)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(StoreError::NotFound { entity: "tool", id });
        }
        tracing::info!(tool_id = id, name = %name, "Updated tool");
        Ok(Tool {
            id,
            name,
            description: input.description,
            code: input.code,
        })
    }

    /// Delete a tool. Group memberships and user selections cascade.
    pub async fn delete_tool(&self, id: i64) -> Result<(), StoreError> {
        let affected = sqlx::query("DELETE FROM tools WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound { entity: "tool", id });
        }
        tracing::info!(tool_id = id, "Deleted tool");
        Ok(())
    }

    /// All groups with their members, both ordered by name then id.
    pub async fn list_groups(&self) -> Result<Vec<ToolGroup>, StoreError> {
        let groups = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, instructions FROM tool_groups ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        self.with_members(groups).await
    }

    pub async fn get_group(&self, id: i64) -> Result<ToolGroup, StoreError> {
        let group = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, instructions FROM tool_groups WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { entity: "tool group", id })?;

        let mut groups = self.with_members(vec![group]).await?;
        groups.pop().ok_or(StoreError::NotFound { entity: "tool group", id })
    }

    pub async fn create_group(&self, input: ToolGroupInput) -> Result<ToolGroup, StoreError> {
        let name = required(&input.name, "name")?;
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO tool_groups (name, instructions) VALUES (?, ?)")
            .bind(&name)
            .bind(&input.instructions)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        replace_members(&mut tx, id, &input.tool_ids).await?;
        tx.commit().await?;

        tracing::info!(group_id = id, name = %name, members = input.tool_ids.len(), "Created tool group");
        self.get_group(id).await
    }

    /// Update a group's fields and replace its member set.
    pub async fn update_group(&self, id: i64, input: ToolGroupInput) -> Result<ToolGroup, StoreError> {
        let name = required(&input.name, "name")?;
        let mut tx = self.pool.begin().await?;

        let affected = sqlx::query("UPDATE tool_groups SET name = ?, instructions = ? WHERE id = ?")
            .bind(&name)
            .bind(&input.instructions)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound { entity: "tool group", id });
        }
        replace_members(&mut tx, id, &input.tool_ids).await?;
        tx.commit().await?;

        tracing::info!(group_id = id, name = %name, members = input.tool_ids.len(), "Updated tool group");
        self.get_group(id).await
    }

    pub async fn delete_group(&self, id: i64) -> Result<(), StoreError> {
        let affected = sqlx::query("DELETE FROM tool_groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound { entity: "tool group", id });
        }
        tracing::info!(group_id = id, "Deleted tool group");
        Ok(())
    }

    /// Create several tools and one group containing all of them, atomically.
    ///
    /// Used to import the tool list of an MCP server.
    pub async fn create_group_with_tools(
        &self,
        group_name: &str,
        instructions: &str,
        tools: Vec<ToolInput>,
    ) -> Result<ToolGroup, StoreError> {
        let group_name = required(group_name, "name")?;
        let mut tx = self.pool.begin().await?;

        let mut tool_ids = Vec::with_capacity(tools.len());
        for tool in &tools {
            let name = required(&tool.name, "tool name")?;
            let id = sqlx::query("INSERT INTO tools (name, description, code) VALUES (?, ?, ?)")
                .bind(&name)
                .bind(&tool.description)
                .bind(&tool.code)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
            tool_ids.push(id);
        }

        let group_id = sqlx::query("INSERT INTO tool_groups (name, instructions) VALUES (?, ?)")
            .bind(&group_name)
            .bind(instructions)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        replace_members(&mut tx, group_id, &tool_ids).await?;
        tx.commit().await?;

        tracing::info!(group_id, name = %group_name, tools = tool_ids.len(), "Imported tool group");
        self.get_group(group_id).await
    }

    /// Attach members to `(id, name, instructions)` rows, preserving row order.
    pub(crate) async fn with_members(
        &self,
        groups: Vec<(i64, String, String)>,
    ) -> Result<Vec<ToolGroup>, StoreError> {
        let rows = sqlx::query_as::<_, (i64, i64, String, String, String)>(
            "SELECT gt.group_id, t.id, t.name, t.description, t.code \
             FROM tool_group_tools gt JOIN tools t ON t.id = gt.tool_id \
             ORDER BY t.name, t.id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut members: HashMap<i64, Vec<Tool>> = HashMap::new();
        for (group_id, id, name, description, code) in rows {
            members
                .entry(group_id)
                .or_default()
                .push(tool_from_row((id, name, description, code)));
        }

        Ok(groups
            .into_iter()
            .map(|(id, name, instructions)| ToolGroup {
                id,
                name,
                instructions,
                tools: members.remove(&id).unwrap_or_default(),
            })
            .collect())
    }
}

async fn replace_members(
    tx: &mut Transaction<'_, Sqlite>,
    group_id: i64,
    tool_ids: &[i64],
) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM tool_group_tools WHERE group_id = ?")
        .bind(group_id)
        .execute(&mut **tx)
        .await?;

    for &tool_id in tool_ids {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM tools WHERE id = ?")
            .bind(tool_id)
            .fetch_optional(&mut **tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound { entity: "tool", id: tool_id });
        }

        sqlx::query("INSERT OR IGNORE INTO tool_group_tools (group_id, tool_id) VALUES (?, ?)")
            .bind(group_id)
            .bind(tool_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
