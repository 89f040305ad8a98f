//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait, DbConn,
    EntityTrait, LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use newsroom_core::domain::{
    Author, AuthorId, Category, CategoryId, NewPost, NewSubscription, Post, PostId, Subscription,
};
use newsroom_core::error::RepoError;
use newsroom_core::filter::PostFilter;
use newsroom_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, PostRepository, SubscriptionRepository,
};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity, PostKind};
use super::entity::post_category::{self, Entity as PostCategoryEntity};
use super::entity::subscription::{self, Entity as SubscriptionEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL subscription repository.
pub type PostgresSubscriptionRepository = PostgresBaseRepository<SubscriptionEntity>;

/// Half-open `[start, end)` UTC range covering one calendar day.
fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + TimeDelta::days(1))
}

/// `%needle%` with LIKE wildcards in the needle matched literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn link_models(post_id: PostId, category_ids: &[CategoryId]) -> Vec<post_category::ActiveModel> {
    category_ids
        .iter()
        .map(|category_id| post_category::ActiveModel {
            post_id: Set(post_id),
            category_id: Set(*category_id),
        })
        .collect()
}

/// PostgreSQL post repository.
///
/// Not built on [`PostgresBaseRepository`] because posts are loaded together
/// with their categories.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn with_categories(&self, rows: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let categories = rows
            .load_many_to_many(CategoryEntity, PostCategoryEntity, &self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .zip(categories)
            .map(|(row, categories)| row.into_post(categories))
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for PostgresPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match row {
            Some(row) => Ok(self.with_categories(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count(&self) -> Result<u64, RepoError> {
        PostEntity::find().count(&self.db).await.map_err(map_db_err)
    }

    async fn list_newest(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        self.with_categories(rows).await
    }

    async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find();

        if let Some(needle) = filter.title_needle() {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(post::Column::Title)))
                    .like(LikeExpr::new(contains_pattern(&needle)).escape('\\')),
            );
        }
        if let Some(author_id) = filter.author {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(category_id) = filter.category {
            query = query.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_category::Column::PostId)
                        .from(PostCategoryEntity)
                        .and_where(post_category::Column::CategoryId.eq(category_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(post_type) = filter.post_type {
            query = query.filter(post::Column::PostType.eq(PostKind::from(post_type)));
        }
        if let Some(day) = filter.created_after {
            let (start, _) = day_bounds(day);
            query = query.filter(post::Column::CreatedAt.gte(start));
        }

        let rows = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        self.with_categories(rows).await
    }

    async fn count_by_author_on(
        &self,
        author_id: AuthorId,
        day: NaiveDate,
    ) -> Result<u64, RepoError> {
        let (start, end) = day_bounds(day);

        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::CreatedAt.gte(start))
            .filter(post::Column::CreatedAt.lt(end))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn insert(
        &self,
        new_post: NewPost,
        category_ids: &[CategoryId],
    ) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let row = post::ActiveModel {
            id: NotSet,
            post_type: Set(new_post.post_type.into()),
            title: Set(new_post.title),
            text: Set(new_post.text),
            created_at: Set(new_post.created_at.into()),
            author_id: Set(new_post.author_id),
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;

        if !category_ids.is_empty() {
            PostCategoryEntity::insert_many(link_models(row.id, category_ids))
                .exec_without_returning(&txn)
                .await
                .map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(row.into_post(Vec::new()))
    }

    async fn replace(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = PostEntity::find_by_id(post.id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        post::ActiveModel {
            id: Unchanged(existing.id),
            post_type: Set(post.post_type.into()),
            title: Set(post.title.clone()),
            text: Set(post.text.clone()),
            created_at: Unchanged(existing.created_at),
            author_id: Set(post.author_id),
        }
        .update(&txn)
        .await
        .map_err(map_db_err)?;

        PostCategoryEntity::delete_many()
            .filter(post_category::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let category_ids = post.category_ids();
        if !category_ids.is_empty() {
            PostCategoryEntity::insert_many(link_models(post.id, &category_ids))
                .exec_without_returning(&txn)
                .await
                .map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(post_id = post.id, "Post row replaced");

        Ok(post)
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = CategoryEntity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        tracing::debug!(%user_id, "Finding author by user");

        let row = AuthorEntity::find()
            .filter(author::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert(&self, new: NewSubscription) -> Result<Subscription, RepoError> {
        let row = subscription::ActiveModel {
            id: NotSet,
            user_id: Set(new.user_id),
            category_id: Set(new.category_id),
            created_at: Set(new.created_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(row.into())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepoError> {
        let rows = SubscriptionEntity::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .order_by_asc(subscription::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
