//! Users and their enabled tool/group selections.

use crate::error::{StoreError, required};
use crate::{SqliteStore, is_unique_violation};
use ally_core::{EnabledSet, Selection, Tool, User};
use chrono::Utc;

impl SqliteStore {
    pub async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM users ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, name)| User { id, name }).collect())
    }

    pub async fn get_user(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id, name)| User { id, name })
            .ok_or(StoreError::NotFound { entity: "user", id })
    }

    /// Create a user. Names are unique.
    pub async fn create_user(&self, name: &str) -> Result<User, StoreError> {
        let name = required(name, "name")?;
        let result = sqlx::query("INSERT INTO users (name, created_at) VALUES (?, ?)")
            .bind(&name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await;

        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Conflict { entity: "user", name });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = id, name = %name, "Created user");
        Ok(User { id, name })
    }

    /// Delete a user with their selections and OAuth client.
    pub async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        let affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound { entity: "user", id });
        }
        tracing::info!(user_id = id, "Deleted user");
        Ok(())
    }

    /// Every tool with the user's enabled flag (default false).
    pub async fn tool_selections(&self, user_id: i64) -> Result<Vec<Selection>, StoreError> {
        self.get_user(user_id).await?;
        let rows = sqlx::query_as::<_, (i64, String, i64)>(
            "SELECT t.id, t.name, COALESCE(s.enabled, 0) \
             FROM tools t \
             LEFT JOIN user_tool_selections s ON s.tool_id = t.id AND s.user_id = ? \
             ORDER BY t.name, t.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name, enabled)| Selection {
                id,
                name,
                enabled: enabled != 0,
            })
            .collect())
    }

    /// Every group with the user's enabled flag (default false).
    pub async fn group_selections(&self, user_id: i64) -> Result<Vec<Selection>, StoreError> {
        self.get_user(user_id).await?;
        let rows = sqlx::query_as::<_, (i64, String, i64)>(
            "SELECT g.id, g.name, COALESCE(s.enabled, 0) \
             FROM tool_groups g \
             LEFT JOIN user_tool_group_selections s ON s.group_id = g.id AND s.user_id = ? \
             ORDER BY g.name, g.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name, enabled)| Selection {
                id,
                name,
                enabled: enabled != 0,
            })
            .collect())
    }

    pub async fn set_tool_enabled(&self, user_id: i64, tool_id: i64, enabled: bool) -> Result<(), StoreError> {
        self.get_user(user_id).await?;
        self.get_tool(tool_id).await?;
        sqlx::query(
            "INSERT INTO user_tool_selections (user_id, tool_id, enabled) VALUES (?, ?, ?) \
             ON CONFLICT(user_id, tool_id) DO UPDATE SET enabled = excluded.enabled",
        )
        .bind(user_id)
        .bind(tool_id)
        .bind(enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_group_enabled(&self, user_id: i64, group_id: i64, enabled: bool) -> Result<(), StoreError> {
        self.get_user(user_id).await?;
        self.get_group(group_id).await?;
        sqlx::query(
            "INSERT INTO user_tool_group_selections (user_id, group_id, enabled) VALUES (?, ?, ?) \
             ON CONFLICT(user_id, group_id) DO UPDATE SET enabled = excluded.enabled",
        )
        .bind(user_id)
        .bind(group_id)
        .bind(enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace the user's whole selection: exactly the given tools and groups end up enabled.
    pub async fn set_selections(
        &self,
        user_id: i64,
        tool_ids: &[i64],
        group_ids: &[i64],
    ) -> Result<(), StoreError> {
        self.get_user(user_id).await?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE user_tool_selections SET enabled = 0 WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE user_tool_group_selections SET enabled = 0 WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for &tool_id in tool_ids {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM tools WHERE id = ?")
                .bind(tool_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(StoreError::NotFound { entity: "tool", id: tool_id });
            }
            sqlx::query(
                "INSERT INTO user_tool_selections (user_id, tool_id, enabled) VALUES (?, ?, 1) \
                 ON CONFLICT(user_id, tool_id) DO UPDATE SET enabled = 1",
            )
            .bind(user_id)
            .bind(tool_id)
            .execute(&mut *tx)
            .await?;
        }

        for &group_id in group_ids {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM tool_groups WHERE id = ?")
                .bind(group_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(StoreError::NotFound { entity: "tool group", id: group_id });
            }
            sqlx::query(
                "INSERT INTO user_tool_group_selections (user_id, group_id, enabled) VALUES (?, ?, 1) \
                 ON CONFLICT(user_id, group_id) DO UPDATE SET enabled = 1",
            )
            .bind(user_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(
            user_id,
            tools = tool_ids.len(),
            groups = group_ids.len(),
            "Saved selections"
        );
        Ok(())
    }

    /// The user's enabled tools and groups (with members), ordered by name then id.
    pub async fn enabled_set(&self, user_id: i64) -> Result<EnabledSet, StoreError> {
        self.get_user(user_id).await?;

        let tools = sqlx::query_as::<_, (i64, String, String, String)>(
            "SELECT t.id, t.name, t.description, t.code \
             FROM tools t JOIN user_tool_selections s ON s.tool_id = t.id \
             WHERE s.user_id = ? AND s.enabled = 1 \
             ORDER BY t.name, t.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(id, name, description, code)| Tool {
            id,
            name,
            description,
            code,
        })
        .collect();

        let groups = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT g.id, g.name, g.instructions \
             FROM tool_groups g JOIN user_tool_group_selections s ON s.group_id = g.id \
             WHERE s.user_id = ? AND s.enabled = 1 \
             ORDER BY g.name, g.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(EnabledSet {
            tools,
            groups: self.with_members(groups).await?,
        })
    }
}
