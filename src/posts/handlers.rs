use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::{AuthUser, MaybeAuthUser},
    error::ApiError,
    posts::{
        dto::{
            CreatePostRequest, DeletePostResponse, LikeResponse, ListQuery, MineQuery, PagedPosts,
            PopularQuery, PostDetail, PostResponse, UpdatePostRequest,
        },
        repo::{self, Category, ListFilter, NewPost, Post, PostStatus, PostUpdate, SortBy},
    },
    state::AppState,
    validation::{is_valid_url, sanitize_text, validate_pagination},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list).post(create))
        .route("/posts/popular", get(popular))
        .route("/posts/mine", get(mine))
        .route("/posts/:id", get(detail).put(update).delete(remove))
        .route("/posts/:id/like", post(toggle_like))
}

fn checked_title(raw: &str) -> Result<String, ApiError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    if title.chars().count() > 100 {
        return Err(ApiError::Validation(
            "title must be at most 100 characters".into(),
        ));
    }
    Ok(sanitize_text(title))
}

fn checked_content(raw: &str) -> Result<String, ApiError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("content is required".into()));
    }
    if content.chars().count() > 5000 {
        return Err(ApiError::Validation(
            "content must be at most 5000 characters".into(),
        ));
    }
    Ok(sanitize_text(content))
}

fn checked_category(raw: &str) -> Result<Category, ApiError> {
    Category::parse(raw)
        .ok_or_else(|| ApiError::Validation("category must be love, nature, life or other".into()))
}

/// Empty string clears the media URL; anything else must parse as a URL.
fn checked_media_url(raw: Option<&str>) -> Result<Option<String>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) if is_valid_url(url) => Ok(Some(url.to_string())),
        Some(_) => Err(ApiError::Validation("media url is not valid".into())),
    }
}

fn checked_status(raw: Option<&str>, default: PostStatus) -> Result<PostStatus, ApiError> {
    match raw {
        None => Ok(default),
        Some(s) => PostStatus::parse(s)
            .ok_or_else(|| ApiError::Validation("status must be published or draft".into())),
    }
}

/// Edit and delete are owner-only; a mismatch is a 403 regardless of role.
fn ensure_owner(post: &Post, user_id: Uuid) -> Result<(), ApiError> {
    if post.author_id != user_id {
        return Err(ApiError::Forbidden(
            "you do not have access to this post".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PagedPosts>, ApiError> {
    let page = validate_pagination(query.page.as_deref(), query.limit.as_deref())
        .map_err(ApiError::Validation)?;

    let category = match query.category.as_deref() {
        None | Some("all") | Some("") => None,
        Some(raw) => Some(checked_category(raw)?),
    };
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let sort = SortBy::parse(query.sort.as_deref());

    let filter = ListFilter { category, search };
    let (posts, total) = repo::list_published(&state.db, &filter, sort, page).await?;
    Ok(Json(PagedPosts::new(posts, total, page.page, page.limit)))
}

#[instrument(skip(state))]
pub async fn popular(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let limit = query
        .limit
        .as_deref()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(5)
        .clamp(1, 100);
    let posts = repo::list_popular(&state.db, limit).await?;
    Ok(Json(posts))
}

#[instrument(skip(state))]
pub async fn mine(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<MineQuery>,
) -> Result<Json<PagedPosts>, ApiError> {
    let page = validate_pagination(query.page.as_deref(), query.limit.as_deref())
        .map_err(ApiError::Validation)?;
    let status = match query.status.as_deref() {
        None | Some("all") | Some("") => None,
        Some(raw) => Some(checked_status(Some(raw), PostStatus::Published)?),
    };

    let (posts, total) = repo::list_by_author(&state.db, user.id, status, page).await?;
    Ok(Json(PagedPosts::new(posts, total, page.page, page.limit)))
}

#[instrument(skip(state, visitor))]
pub async fn detail(
    State(state): State<AppState>,
    MaybeAuthUser(visitor): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = repo::find_and_bump_views(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;

    let likes = repo::likers(&state.db, id).await?;
    let liked = visitor.map(|user| likes.contains(&user.id));

    Ok(Json(PostDetail { post, likes, liked }))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let title = checked_title(payload.title.as_deref().unwrap_or_default())?;
    let content = checked_content(payload.content.as_deref().unwrap_or_default())?;
    let category = checked_category(payload.category.as_deref().unwrap_or_default())?;
    let media_url = checked_media_url(payload.media_url.as_deref())?;
    let status = checked_status(payload.status.as_deref(), PostStatus::Published)?;

    let post = repo::create(
        &state.db,
        NewPost {
            title,
            content,
            author_id: user.id,
            author_name: user.name.clone(),
            category,
            media_url,
            status,
        },
    )
    .await?;

    info!(post_id = %post.id, author_id = %user.id, "post created");

    let notifier = state.notifier.clone();
    let (title, content, author) = (post.title.clone(), post.content.clone(), user.name.clone());
    let category = post.category;
    tokio::spawn(async move {
        notifier
            .notify_new_post(&title, &content, category, &author)
            .await;
    });

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            message: "post created".into(),
            post,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;
    ensure_owner(&post, user.id)?;

    // Absent fields keep their stored value; stored text is already
    // sanitized, so only fresh input goes through the checks.
    let title = match payload.title.as_deref() {
        Some(raw) => checked_title(raw)?,
        None => post.title.clone(),
    };
    let content = match payload.content.as_deref() {
        Some(raw) => checked_content(raw)?,
        None => post.content.clone(),
    };
    let category = match payload.category.as_deref() {
        Some(raw) => checked_category(raw)?,
        None => post.category,
    };
    let media_url = match payload.media_url.as_deref() {
        Some(raw) => checked_media_url(Some(raw))?,
        None => post.media_url.clone(),
    };
    let status = checked_status(payload.status.as_deref(), post.status)?;

    let updated = repo::update(
        &state.db,
        id,
        PostUpdate {
            title,
            content,
            category,
            media_url,
            status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("post not found".into()))?;

    info!(post_id = %id, "post updated");
    Ok(Json(PostResponse {
        message: "post updated".into(),
        post: updated,
    }))
}

#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletePostResponse>, ApiError> {
    let post = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;
    ensure_owner(&post, user.id)?;

    repo::delete(&state.db, id).await?;

    info!(post_id = %id, author_id = %user.id, "post deleted");
    Ok(Json(DeletePostResponse {
        message: "post deleted".into(),
        deleted_id: id,
    }))
}

#[instrument(skip(state))]
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, ApiError> {
    let (liked, like_count) = repo::toggle_like(&state.db, id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;

    info!(post_id = %id, user_id = %user.id, liked, "like toggled");
    Ok(Json(LikeResponse {
        message: if liked { "post liked" } else { "post unliked" }.into(),
        liked,
        like_count,
    }))
}
