use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::pagination::PageWindow;

/// A soft-deletable table the generic store can operate on. Every table has
/// an `id` uuid primary key, an `is_active` flag and an `updated_at` stamp.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Unpin + Send + Sync {
    const TABLE: &'static str;
    const COLUMNS: &'static str;
    const DEFAULT_ORDER: &'static str;
}

#[derive(Debug, Clone)]
enum FilterValue {
    Bool(bool),
    Text(String),
}

/// Equality filters ANDed onto the implicit `is_active = TRUE` clause.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(&'static str, FilterValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq_bool(mut self, column: &'static str, value: bool) -> Self {
        self.clauses.push((column, FilterValue::Bool(value)));
        self
    }

    pub fn eq_text(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push((column, FilterValue::Text(value.into())));
        self
    }

    fn apply(&self, builder: &mut QueryBuilder<Postgres>) {
        for (column, value) in &self.clauses {
            builder.push(" AND ");
            builder.push(column);
            builder.push(" = ");
            match value {
                FilterValue::Bool(b) => builder.push_bind(*b),
                FilterValue::Text(s) => builder.push_bind(s.clone()),
            };
        }
    }
}

/// One page of active rows plus the total count of the filtered set. The two
/// queries run concurrently; they are independent reads with no cross-call
/// consistency guarantee.
pub async fn list<E: Entity>(
    db: &PgPool,
    filter: &Filter,
    window: &PageWindow,
) -> anyhow::Result<(Vec<E>, i64)> {
    let mut page_query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM {} WHERE is_active = TRUE",
        E::COLUMNS,
        E::TABLE
    ));
    filter.apply(&mut page_query);
    page_query.push(format!(" ORDER BY {} LIMIT ", E::DEFAULT_ORDER));
    page_query.push_bind(window.limit);
    page_query.push(" OFFSET ");
    page_query.push_bind(window.skip);

    let mut count_query = QueryBuilder::<Postgres>::new(format!(
        "SELECT COUNT(*) FROM {} WHERE is_active = TRUE",
        E::TABLE
    ));
    filter.apply(&mut count_query);

    let rows = page_query.build_query_as::<E>().fetch_all(db);
    let total = count_query.build_query_scalar::<i64>().fetch_one(db);
    let (rows, total) = tokio::try_join!(rows, total)?;

    Ok((rows, total))
}

pub async fn get<E: Entity>(db: &PgPool, id: Uuid) -> anyhow::Result<Option<E>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1 AND is_active = TRUE",
        E::COLUMNS,
        E::TABLE
    );
    let row = sqlx::query_as::<_, E>(&sql).bind(id).fetch_optional(db).await?;
    Ok(row)
}

/// Flips `is_active` off and stamps `updated_at`. Returns `None` when the row
/// is missing or already inactive, so repeated deletes read as not-found.
pub async fn soft_delete<E: Entity>(db: &PgPool, id: Uuid) -> anyhow::Result<Option<E>> {
    let sql = format!(
        "UPDATE {} SET is_active = FALSE, updated_at = now()
         WHERE id = $1 AND is_active = TRUE
         RETURNING {}",
        E::TABLE,
        E::COLUMNS
    );
    let row = sqlx::query_as::<_, E>(&sql).bind(id).fetch_optional(db).await?;
    Ok(row)
}
