//! Post handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use newsroom_core::DomainError;
use newsroom_core::domain::{Author, Post, PostId, PostSubmission, PostType};
use newsroom_core::filter::PostFilter;
use newsroom_core::services::CreateOutcome;
use newsroom_shared::ApiResponse;
use newsroom_shared::dto::{
    AuthorResponse, CategoryResponse, PageQuery, PostForm, PostFormInitial, PostPageResponse,
    PostResponse, SearchResponse,
};

use super::redirect;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const LISTING_PATH: &str = "/news/";

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        post_type: post.post_type.to_string(),
        title: post.title,
        text: post.text,
        created_at: post.created_at.to_rfc3339(),
        author_id: post.author_id,
        categories: post
            .categories
            .into_iter()
            .map(|c| CategoryResponse {
                id: c.id,
                name: c.name,
            })
            .collect(),
    }
}

fn author_response(author: Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        user_id: author.user_id.to_string(),
        rating: author.rating,
    }
}

/// Parse a submitted form. Malformed identifiers are unresolvable references.
fn parse_submission(form: PostForm) -> Result<PostSubmission, DomainError> {
    let category_ids = form
        .categories
        .iter()
        .map(|c| c.parse().map_err(DomainError::ReferenceResolution))
        .collect::<Result<Vec<_>, _>>()?;
    let post_type: PostType = form.post_type.parse()?;
    let author_id = form
        .author
        .parse()
        .map_err(DomainError::ReferenceResolution)?;

    Ok(PostSubmission {
        post_type,
        title: form.title,
        text: form.text,
        author_id,
        category_ids,
    })
}

/// GET /news/?page=N
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.news.list(query.page.unwrap_or(1)).await?;
    let (has_next, has_previous) = (page.has_next(), page.has_previous());
    let page = page.map(post_response);

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostPageResponse {
        posts: page.items,
        page: page.number,
        num_pages: page.num_pages,
        total: page.total,
        has_next,
        has_previous,
        time_now: Utc::now().to_rfc3339(),
    })))
}

/// GET /news/{id}/
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.news.detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// GET /news/search/?title=..&author=..&category=..&post_type=..&created_after=..
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<PostFilter>,
) -> AppResult<HttpResponse> {
    let filter = query.into_inner();
    let posts = state.news.search(&filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SearchResponse {
        posts: posts.into_iter().map(post_response).collect(),
        filter,
    })))
}

/// GET /news/create/ - form pre-filled with the session user's author profile.
pub async fn create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let author = state.news.author_for_user(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostFormInitial {
        author: author_response(author),
    })))
}

/// POST /news/create/
///
/// Redirects to the listing whether or not the daily limit let the post through.
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let submission = parse_submission(body.into_inner())?;

    match state.news.create(submission, Utc::now()).await? {
        CreateOutcome::Published(post) => {
            tracing::debug!(post_id = post.id, "Redirecting after publish");
        }
        CreateOutcome::DailyLimitReached {
            author_id,
            posts_today,
        } => {
            tracing::debug!(author_id, posts_today, "Redirecting after discarded post");
        }
    }

    Ok(redirect(LISTING_PATH))
}

/// GET /news/{id}/update/
pub async fn edit_form(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.news.detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// POST /news/{id}/update/
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    // On edit, bad references are ordinary form errors.
    let submission = parse_submission(body.into_inner()).map_err(|e| match e {
        DomainError::ReferenceResolution(msg) => DomainError::Validation(msg),
        other => other,
    })?;

    let post = state.news.update(path.into_inner(), submission).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// GET /news/{id}/delete/ - the post to confirm.
pub async fn delete_form(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.news.detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// POST /news/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    state.news.delete(path.into_inner()).await?;
    Ok(redirect(LISTING_PATH))
}
