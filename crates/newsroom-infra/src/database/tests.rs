#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use newsroom_core::domain::{
        Author, Category, NewPost, NewSubscription, Post, PostType,
    };
    use newsroom_core::error::RepoError;
    use newsroom_core::filter::PostFilter;
    use newsroom_core::ports::{
        AuthorRepository, BaseRepository, CategoryRepository, PostRepository,
        SubscriptionRepository,
    };
    use sea_orm::{
        DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, Statement,
        Value,
    };
    use uuid::Uuid;

    use crate::database::entity::post::PostKind;
    use crate::database::entity::{author, category, post, subscription};
    use crate::database::postgres_repo::{
        PostgresAuthorRepository, PostgresCategoryRepository, PostgresPostRepository,
        PostgresSubscriptionRepository,
    };

    #[tokio::test]
    async fn test_find_author_by_user_id() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![author::Model {
                id: 4,
                user_id,
                rating: 12,
            }]])
            .into_connection();

        let repo = PostgresAuthorRepository::new(db);
        let author = repo.find_by_user_id(user_id).await.unwrap().unwrap();

        assert_eq!(
            author,
            Author {
                id: 4,
                user_id,
                rating: 12
            }
        );
    }

    #[tokio::test]
    async fn test_find_category_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![category::Model {
                id: 1,
                name: "politics".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(db);
        let found: Option<newsroom_core::domain::Category> =
            BaseRepository::find_by_id(&repo, 1).await.unwrap();

        assert_eq!(found.unwrap().name, "politics");
    }

    #[tokio::test]
    async fn test_find_categories_skips_query_for_empty_ids() {
        // No query results appended: any query would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let repo = PostgresCategoryRepository::new(db);
        let found = repo.find_by_ids(&[]).await.unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_categories_returns_only_existing_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                category::Model {
                    id: 1,
                    name: "politics".to_owned(),
                },
                category::Model {
                    id: 2,
                    name: "sport".to_owned(),
                },
            ]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(db);
        let found = repo.find_by_ids(&[1, 2, 999]).await.unwrap();

        let ids: Vec<i64> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_count_by_author_on_day() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![BTreeMap::from([(
                "num_items",
                Into::<Value>::into(2i64),
            )])]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        assert_eq!(repo.count_by_author_on(3, day).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = BaseRepository::delete(&repo, 42).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_insert_subscription_returns_stored_row() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![subscription::Model {
                id: 9,
                user_id,
                category_id: 2,
                created_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresSubscriptionRepository::new(db);
        let stored = repo
            .insert(NewSubscription::new(user_id, 2))
            .await
            .unwrap();

        assert_eq!(stored.id, 9);
        assert_eq!(stored.user_id, user_id);
        assert_eq!(stored.category_id, 2);
    }

    fn may_day(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn post_row(id: i64, title: &str) -> post::Model {
        post::Model {
            id,
            post_type: PostKind::News,
            title: title.to_owned(),
            text: "body".to_owned(),
            created_at: may_day(9).into(),
            author_id: 3,
        }
    }

    fn no_posts() -> Vec<post::Model> {
        Vec::new()
    }

    /// Every statement the mock saw, in order, flattened across transactions.
    fn statements(db: DatabaseConnection) -> Vec<Statement> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().to_vec())
            .collect()
    }

    fn values(stmt: &Statement) -> Vec<Value> {
        stmt.values
            .as_ref()
            .map(|values| values.0.clone())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_search_title_matches_wildcards_literally() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![no_posts()])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let filter = PostFilter {
            title: Some("50%_OFF".to_owned()),
            ..PostFilter::default()
        };
        assert!(repo.search(&filter).await.unwrap().is_empty());

        let log = statements(db);
        assert_eq!(log.len(), 1);
        let sql = &log[0].sql;
        assert!(sql.contains("LOWER("), "{sql}");
        assert!(sql.contains("LIKE"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(values(&log[0]).contains(&Value::from("%50\\%\\_off%")));
    }

    #[tokio::test]
    async fn test_search_by_category_uses_link_subquery() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![no_posts()])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let filter = PostFilter {
            category: Some(7),
            post_type: Some(PostType::Article),
            ..PostFilter::default()
        };
        repo.search(&filter).await.unwrap();

        let log = statements(db);
        let sql = &log[0].sql;
        assert!(sql.contains("IN (SELECT"), "{sql}");
        assert!(sql.contains(r#""post_categories""#), "{sql}");
        let bound = values(&log[0]);
        assert!(bound.contains(&Value::from(7i64)));
        assert!(bound.contains(&Value::from("article")));
    }

    #[tokio::test]
    async fn test_search_created_after_starts_at_midnight() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![no_posts()])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let filter = PostFilter {
            created_after: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..PostFilter::default()
        };
        repo.search(&filter).await.unwrap();

        let log = statements(db);
        let sql = &log[0].sql;
        assert!(sql.contains(r#""created_at" >="#), "{sql}");
        assert!(sql.contains(r#""created_at" DESC"#), "{sql}");
        assert!(values(&log[0]).contains(&Value::from(may_day(0))));
    }

    #[tokio::test]
    async fn test_list_newest_orders_and_pages() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![no_posts()])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        repo.list_newest(6, 3).await.unwrap();

        let log = statements(db);
        let sql = &log[0].sql;
        assert!(
            sql.contains(r#""created_at" DESC, "posts"."id" DESC"#),
            "{sql}"
        );
        assert!(sql.contains("LIMIT"), "{sql}");
        assert!(sql.contains("OFFSET"), "{sql}");
        let bound = values(&log[0]);
        assert!(bound.contains(&Value::from(3u64)));
        assert!(bound.contains(&Value::from(6u64)));
    }

    #[tokio::test]
    async fn test_count_by_author_covers_one_day_half_open() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![BTreeMap::from([(
                "num_items",
                Into::<Value>::into(1i64),
            )])]])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        repo.count_by_author_on(3, day).await.unwrap();

        let log = statements(db);
        let sql = &log[0].sql;
        assert!(sql.contains(r#""created_at" >="#), "{sql}");
        assert!(sql.contains(r#""created_at" <"#), "{sql}");
        let bound = values(&log[0]);
        assert!(bound.contains(&Value::from(3i64)));
        assert!(bound.contains(&Value::from(may_day(0))));
        assert!(bound.contains(&Value::from(
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
        )));
    }

    #[tokio::test]
    async fn test_insert_writes_post_and_links_in_one_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_row(11, "Cup final")]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let stored = repo
            .insert(
                NewPost {
                    post_type: PostType::News,
                    title: "Cup final".to_owned(),
                    text: "body".to_owned(),
                    author_id: 3,
                    created_at: may_day(9),
                },
                &[1, 2],
            )
            .await
            .unwrap();
        assert_eq!(stored.id, 11);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql: Vec<&str> = log[0]
            .statements()
            .iter()
            .map(|stmt| stmt.sql.as_str())
            .collect();
        assert_eq!(sql.len(), 4, "{sql:?}");
        assert_eq!(sql[0], "BEGIN");
        assert!(sql[1].starts_with(r#"INSERT INTO "posts""#), "{}", sql[1]);
        assert!(
            sql[2].starts_with(r#"INSERT INTO "post_categories""#),
            "{}",
            sql[2]
        );
        assert_eq!(sql[3], "COMMIT");
    }

    #[tokio::test]
    async fn test_insert_rolls_back_when_linking_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_row(11, "Cup final")]])
            .append_exec_errors(vec![DbErr::Custom("foreign key violation".to_owned())])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let result = repo
            .insert(
                NewPost {
                    post_type: PostType::News,
                    title: "Cup final".to_owned(),
                    text: "body".to_owned(),
                    author_id: 3,
                    created_at: may_day(9),
                },
                &[999],
            )
            .await;
        assert!(result.is_err());

        let log = statements(db);
        assert_eq!(log.first().map(|stmt| stmt.sql.as_str()), Some("BEGIN"));
        assert_eq!(log.last().map(|stmt| stmt.sql.as_str()), Some("ROLLBACK"));
        assert!(log.iter().all(|stmt| stmt.sql != "COMMIT"));
    }

    #[tokio::test]
    async fn test_replace_rewrites_links_in_one_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![
                vec![post_row(11, "Cup final")],
                vec![post_row(11, "Cup final, replay")],
            ])
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let repo = PostgresPostRepository::new(db.clone());

        let updated = repo
            .replace(Post {
                id: 11,
                post_type: PostType::Article,
                title: "Cup final, replay".to_owned(),
                text: "body".to_owned(),
                created_at: may_day(9),
                author_id: 3,
                categories: vec![Category {
                    id: 5,
                    name: "sport".to_owned(),
                }],
            })
            .await
            .unwrap();
        assert_eq!(updated.category_ids(), vec![5]);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql: Vec<&str> = log[0]
            .statements()
            .iter()
            .map(|stmt| stmt.sql.as_str())
            .collect();
        assert_eq!(sql.len(), 6, "{sql:?}");
        assert_eq!(sql[0], "BEGIN");
        assert!(sql[1].starts_with("SELECT"), "{}", sql[1]);
        assert!(sql[2].starts_with(r#"UPDATE "posts""#), "{}", sql[2]);
        assert!(
            sql[3].starts_with(r#"DELETE FROM "post_categories""#),
            "{}",
            sql[3]
        );
        assert!(
            sql[4].starts_with(r#"INSERT INTO "post_categories""#),
            "{}",
            sql[4]
        );
        assert_eq!(sql[5], "COMMIT");
    }
}
