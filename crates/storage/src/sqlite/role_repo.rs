use sqlx::Row;
use study_core::model::{Role, UserId};

use super::SqliteRepository;
use super::mapping::{conn, ser, uuid_text};
use crate::repository::{RoleRepository, StorageError};

#[async_trait::async_trait]
impl RoleRepository for SqliteRepository {
    async fn roles_for(&self, user_id: UserId) -> Result<Vec<Role>, StorageError> {
        let rows = sqlx::query("SELECT role FROM user_roles WHERE user_id = ?1 ORDER BY role ASC")
            .bind(uuid_text(user_id.value()))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.try_get("role").map_err(ser)?;
            roles.push(Role::parse(&raw).map_err(ser)?);
        }
        Ok(roles)
    }

    async fn grant_role(&self, user_id: UserId, role: Role) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_roles (user_id, role)
            VALUES (?1, ?2)
            ON CONFLICT(user_id, role) DO NOTHING
            ",
        )
        .bind(uuid_text(user_id.value()))
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
