// src/db/outlet_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::outlet::{Outlet, Supervisor},
};

#[derive(Clone)]
pub struct OutletRepository {
    pool: PgPool,
}

impl OutletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_outlet(&self, outlet_id: Uuid) -> Result<Option<Outlet>, AppError> {
        let outlet = sqlx::query_as::<_, Outlet>("SELECT * FROM outlets WHERE id = $1")
            .bind(outlet_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(outlet)
    }

    pub async fn create_outlet(
        &self,
        name: &str,
        code: &str,
        uses_till_netting: bool,
    ) -> Result<Outlet, AppError> {
        let outlet = sqlx::query_as::<_, Outlet>(
            r#"
            INSERT INTO outlets (name, code, uses_till_netting)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(uses_till_netting)
        .fetch_one(&self.pool)
        .await?;
        Ok(outlet)
    }

    pub async fn create_supervisor(
        &self,
        outlet_id: Uuid,
        code: &str,
        name: &str,
    ) -> Result<Supervisor, AppError> {
        let supervisor = sqlx::query_as::<_, Supervisor>(
            r#"
            INSERT INTO supervisors (outlet_id, code, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (outlet_id, code)
            DO UPDATE SET name = EXCLUDED.name, is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(code)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(supervisor)
    }

    pub async fn active_supervisors(&self, outlet_id: Uuid) -> Result<Vec<Supervisor>, AppError> {
        let rows = sqlx::query_as::<_, Supervisor>(
            "SELECT * FROM supervisors WHERE outlet_id = $1 AND is_active = TRUE ORDER BY code ASC",
        )
        .bind(outlet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
