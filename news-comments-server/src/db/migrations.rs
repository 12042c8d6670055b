//! Schema for the comments table

use sqlx::PgPool;

/// Create the `comments` schema, table and thread index if missing.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running comment migrations...");

    sqlx::query("CREATE SCHEMA IF NOT EXISTS comments")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments.comments (
            id BIGSERIAL PRIMARY KEY,
            parent_id BIGINT,
            text TEXT NOT NULL,
            news_id BIGINT NOT NULL,
            pub_date TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS comments_news_id_pub_date_idx
        ON comments.comments (news_id, pub_date DESC)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Comment migrations complete");
    Ok(())
}
