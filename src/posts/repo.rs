use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::validation::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "post_category", rename_all = "lowercase")]
pub enum Category {
    Love,
    Nature,
    Life,
    Other,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "love" => Some(Self::Love),
            "nature" => Some(Self::Nature),
            "life" => Some(Self::Life),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "post_status", rename_all = "lowercase")]
pub enum PostStatus {
    Published,
    Draft,
}

impl PostStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "published" => Some(Self::Published),
            "draft" => Some(Self::Draft),
            _ => None,
        }
    }
}

/// `jumlahSuka` is the like count's wire name, kept for the original
/// frontend; it caches the row count of `post_likes` for this post.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub category: Category,
    pub media_url: Option<String>,
    #[serde(rename = "jumlahSuka")]
    pub like_count: i64,
    pub view_count: i64,
    pub status: PostStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub category: Category,
    pub media_url: Option<String>,
    pub status: PostStatus,
}

#[derive(Debug)]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub media_url: Option<String>,
    pub status: PostStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Recent,
    Oldest,
    Popular,
}

impl SortBy {
    /// Unrecognized values sort by recency, matching the list endpoint's
    /// lenient contract.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("oldest") => Self::Oldest,
            Some("popular") => Self::Popular,
            _ => Self::Recent,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            Self::Recent => "created_at DESC",
            Self::Oldest => "created_at ASC",
            Self::Popular => "like_count DESC, created_at DESC",
        }
    }
}

#[derive(Debug, Default)]
pub struct ListFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

const POST_COLS: &str = "id, title, content, author_id, author_name, category, media_url, \
                         like_count, view_count, status, created_at, updated_at";

pub async fn create(db: &PgPool, new: NewPost) -> anyhow::Result<Post> {
    let post = sqlx::query_as::<_, Post>(&format!(
        "INSERT INTO posts (title, content, author_id, author_name, category, media_url, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {POST_COLS}"
    ))
    .bind(&new.title)
    .bind(&new.content)
    .bind(new.author_id)
    .bind(&new.author_name)
    .bind(new.category)
    .bind(&new.media_url)
    .bind(new.status)
    .fetch_one(db)
    .await?;
    Ok(post)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLS} FROM posts WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(post)
}

/// Fetch a post and bump its view counter in the same statement.
pub async fn find_and_bump_views(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(&format!(
        "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING {POST_COLS}"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(post)
}

pub async fn list_published(
    db: &PgPool,
    filter: &ListFilter,
    sort: SortBy,
    page: Pagination,
) -> anyhow::Result<(Vec<Post>, i64)> {
    const WHERE: &str = "status = 'published'
           AND ($1::post_category IS NULL OR category = $1)
           AND ($2::text IS NULL
                OR title ILIKE '%' || $2 || '%'
                OR content ILIKE '%' || $2 || '%')";

    let posts = sqlx::query_as::<_, Post>(&format!(
        "SELECT {POST_COLS} FROM posts
         WHERE {WHERE}
         ORDER BY {order}
         LIMIT $3 OFFSET $4",
        order = sort.order_clause(),
    ))
    .bind(filter.category)
    .bind(&filter.search)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(db)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT count(*) FROM posts WHERE {WHERE}"
    ))
    .bind(filter.category)
    .bind(&filter.search)
    .fetch_one(db)
    .await?;

    Ok((posts, total))
}

pub async fn list_popular(db: &PgPool, limit: i64) -> anyhow::Result<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        "SELECT {POST_COLS} FROM posts
         WHERE status = 'published'
         ORDER BY like_count DESC, created_at DESC
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(posts)
}

pub async fn list_by_author(
    db: &PgPool,
    author_id: Uuid,
    status: Option<PostStatus>,
    page: Pagination,
) -> anyhow::Result<(Vec<Post>, i64)> {
    const WHERE: &str = "author_id = $1 AND ($2::post_status IS NULL OR status = $2)";

    let posts = sqlx::query_as::<_, Post>(&format!(
        "SELECT {POST_COLS} FROM posts
         WHERE {WHERE}
         ORDER BY created_at DESC
         LIMIT $3 OFFSET $4"
    ))
    .bind(author_id)
    .bind(status)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(db)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT count(*) FROM posts WHERE {WHERE}"
    ))
    .bind(author_id)
    .bind(status)
    .fetch_one(db)
    .await?;

    Ok((posts, total))
}

pub async fn update(db: &PgPool, id: Uuid, update: PostUpdate) -> anyhow::Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(&format!(
        "UPDATE posts
         SET title = $2, content = $3, category = $4, media_url = $5, status = $6,
             updated_at = now()
         WHERE id = $1
         RETURNING {POST_COLS}"
    ))
    .bind(id)
    .bind(&update.title)
    .bind(&update.content)
    .bind(update.category)
    .bind(&update.media_url)
    .bind(update.status)
    .fetch_optional(db)
    .await?;
    Ok(post)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn likers(db: &PgPool, post_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT user_id FROM post_likes WHERE post_id = $1 ORDER BY created_at ASC",
    )
    .bind(post_id)
    .fetch_all(db)
    .await?;
    Ok(ids)
}

/// Toggle one user's like in a single transaction. The post row is locked
/// first, so concurrent toggles on the same post serialize and the cached
/// count is always recomputed from the membership rows it caches.
/// Returns `None` when the post does not exist.
pub async fn toggle_like(
    db: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<(bool, i64)>> {
    let mut tx = db.begin().await?;

    let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM posts WHERE id = $1 FOR UPDATE")
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Ok(None);
    }

    let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = removed == 0;
    if liked {
        sqlx::query(
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    let count = sqlx::query_scalar::<_, i64>(
        "UPDATE posts
         SET like_count = (SELECT count(*) FROM post_likes WHERE post_id = $1)
         WHERE id = $1
         RETURNING like_count",
    )
    .bind(post_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some((liked, count)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_is_closed() {
        assert_eq!(Category::parse("love"), Some(Category::Love));
        assert_eq!(Category::parse("nature"), Some(Category::Nature));
        assert_eq!(Category::parse("life"), Some(Category::Life));
        assert_eq!(Category::parse("other"), Some(Category::Other));
        assert_eq!(Category::parse("romance"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn status_parse() {
        assert_eq!(PostStatus::parse("published"), Some(PostStatus::Published));
        assert_eq!(PostStatus::parse("draft"), Some(PostStatus::Draft));
        assert_eq!(PostStatus::parse("archived"), None);
    }

    #[test]
    fn sort_parse_defaults_to_recent() {
        assert_eq!(SortBy::parse(Some("popular")), SortBy::Popular);
        assert_eq!(SortBy::parse(Some("oldest")), SortBy::Oldest);
        assert_eq!(SortBy::parse(Some("anything")), SortBy::Recent);
        assert_eq!(SortBy::parse(None), SortBy::Recent);
    }

    #[test]
    fn post_serializes_with_wire_names() {
        let post = Post {
            id: Uuid::new_v4(),
            title: "Rain".into(),
            content: "soft rain on the roof".into(),
            author_id: Uuid::new_v4(),
            author_name: "Sari".into(),
            category: Category::Nature,
            media_url: None,
            like_count: 3,
            view_count: 7,
            status: PostStatus::Published,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&post).unwrap();
        assert!(json.contains(r#""jumlahSuka":3"#));
        assert!(json.contains(r#""authorName":"Sari""#));
        assert!(json.contains(r#""category":"nature""#));
        assert!(json.contains(r#""status":"published""#));
        assert!(json.contains(r#""viewCount":7"#));
    }
}
