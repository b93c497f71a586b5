use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::posts::repo::Post;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub media_url: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub media_url: Option<String>,
    pub status: Option<String>,
}

/// Query string for the public list. Page and limit stay raw strings so
/// non-numeric values fall back to defaults instead of a deserializer
/// rejection.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MineQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedPosts {
    pub posts: Vec<Post>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PagedPosts {
    pub fn new(posts: Vec<Post>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = (total + limit - 1) / limit;
        Self {
            posts,
            total,
            total_pages,
            current_page: page,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Single-post view: the post plus its liker set, and for a signed-in
/// caller whether they are in it.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub likes: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub message: String,
    pub post: Post,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostResponse {
    pub message: String,
    pub deleted_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub message: String,
    pub liked: bool,
    #[serde(rename = "jumlahSuka")]
    pub like_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_math() {
        let paged = PagedPosts::new(Vec::new(), 25, 2, 10);
        assert_eq!(paged.total_pages, 3);
        assert!(paged.has_next);
        assert!(paged.has_prev);

        let last = PagedPosts::new(Vec::new(), 25, 3, 10);
        assert!(!last.has_next);

        let empty = PagedPosts::new(Vec::new(), 0, 1, 10);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn like_response_wire_name() {
        let response = LikeResponse {
            message: "post liked".into(),
            liked: true,
            like_count: 2,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""jumlahSuka":2"#));
        assert!(json.contains(r#""liked":true"#));
    }
}
