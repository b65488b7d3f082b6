use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

/// A retail branch with its geofence anchor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub geofence_radius_m: f64,
}

/// Branch lookup used by the punch recorder.
pub trait BranchDirectory {
    fn find_by_name_ci(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Branch>>> + Send;
}

pub struct SqlBranchDirectory {
    pool: MySqlPool,
}

impl SqlBranchDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl BranchDirectory for SqlBranchDirectory {
    async fn find_by_name_ci(&self, name: &str) -> Result<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(
            r#"
            SELECT name, latitude, longitude, geofence_radius_m
            FROM branches
            WHERE LOWER(name) = LOWER(?)
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }
}

/// In-memory directory for tests.
#[cfg(test)]
pub struct MemoryBranchDirectory {
    pub branches: Vec<Branch>,
}

#[cfg(test)]
impl BranchDirectory for MemoryBranchDirectory {
    async fn find_by_name_ci(&self, name: &str) -> Result<Option<Branch>> {
        Ok(self
            .branches
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}
