// src/db/pricing_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{pricing::PriceRow, stock::Item},
};

#[derive(Clone)]
pub struct PricingRepository {
    pool: PgPool,
}

impl PricingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all_items(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY item_key ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get_item(&self, item_key: &str) -> Result<Option<Item>, AppError> {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE item_key = $1")
            .bind(item_key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn create_item(
        &self,
        item_key: &str,
        name: &str,
        unit: &str,
        default_sell_price: Decimal,
    ) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (item_key, name, unit, default_sell_price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(item_key)
        .bind(name)
        .bind(unit)
        .bind(default_sell_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::ValidationError({
                        let mut errors = validator::ValidationErrors::new();
                        let mut err = validator::ValidationError::new("unique");
                        err.message = Some("An item with this key already exists.".into());
                        errors.add("itemKey", err);
                        errors
                    });
                }
            }
            e.into()
        })
    }

    pub async fn get_outlet_prices(&self, outlet_id: Uuid) -> Result<Vec<PriceRow>, AppError> {
        let rows = sqlx::query_as::<_, PriceRow>(
            "SELECT * FROM price_rows WHERE outlet_id = $1 ORDER BY item_key ASC",
        )
        .bind(outlet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Upserts one outlet price. Rotation calls this for every line of the
    /// submitted price snapshot.
    pub async fn upsert_price<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        item_key: &str,
        sell_price: Decimal,
        is_active: bool,
    ) -> Result<PriceRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, PriceRow>(
            r#"
            INSERT INTO price_rows (outlet_id, item_key, sell_price, is_active, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (outlet_id, item_key)
            DO UPDATE SET sell_price = EXCLUDED.sell_price,
                          is_active = EXCLUDED.is_active,
                          updated_at = now()
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(item_key)
        .bind(sell_price)
        .bind(is_active)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }
}
