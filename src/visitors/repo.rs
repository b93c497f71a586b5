use sqlx::PgPool;

use crate::visitors::VisitorInfo;

pub async fn record(db: &PgPool, visitor: &VisitorInfo) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO visitors (ip, user_agent, platform, browser, language, path)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&visitor.ip)
    .bind(&visitor.user_agent)
    .bind(&visitor.platform)
    .bind(&visitor.browser)
    .bind(&visitor.language)
    .bind(&visitor.path)
    .execute(db)
    .await?;
    Ok(())
}
