use std::time::Duration;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;

use codeprep_server::entity::api_key;

use crate::common::{API_KEY, TestApp, routes};

async fn insert_key(app: &TestApp, key: &str, active: bool) {
    api_key::ActiveModel {
        name: Set("ci".into()),
        key: Set(key.into()),
        is_active: Set(active),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .expect("insert api key");
}

mod rejected {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_key(routes::PROBLEMS, &json!({"title": "T", "slug": "t"}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"], "Unauthorized");
        assert_eq!(res.body["message"], "Invalid or missing x-api-key header");
    }

    #[tokio::test]
    async fn every_write_route_requires_a_key() {
        let app = TestApp::spawn().await;
        let body = json!({"name": "x", "slug": "x"});

        let statuses = [
            app.post_without_key(routes::CATEGORIES, &body).await.status,
            app.put_without_key(&routes::category(1), &body).await.status,
            app.delete_without_key(&routes::category(1)).await.status,
            app.post_without_key(routes::TAGS, &body).await.status,
            app.put_without_key(&routes::tag(1), &body).await.status,
            app.delete_without_key(&routes::tag(1)).await.status,
            app.put_without_key(&routes::problem("x"), &body).await.status,
            app.delete_without_key(&routes::problem("x")).await.status,
            app.get(routes::ADMIN_STATS).await.status,
            app.get(routes::ADMIN_PROBLEMS).await.status,
        ];

        assert!(statuses.iter().all(|&s| s == 401), "{statuses:?}");
    }

    #[tokio::test]
    async fn unknown_key_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_key(routes::TAGS, &json!({"name": "A", "slug": "a"}), "cp_wrong")
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn blank_key_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_key(routes::TAGS, &json!({"name": "A", "slug": "a"}), "   ")
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn inactive_key_is_unauthorized() {
        let app = TestApp::spawn().await;
        insert_key(&app, "cp_revoked", false).await;

        let res = app
            .post_with_key(routes::TAGS, &json!({"name": "A", "slug": "a"}), "cp_revoked")
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn rejected_write_changes_nothing() {
        let app = TestApp::spawn().await;

        app.post_with_key(routes::TAGS, &json!({"name": "A", "slug": "a"}), "cp_wrong")
            .await;

        let res = app.get(routes::TAGS).await;
        assert_eq!(res.body["data"], json!([]));
    }
}

mod accepted {
    use super::*;

    #[tokio::test]
    async fn public_reads_need_no_key() {
        let app = TestApp::spawn().await;

        for path in [
            routes::PROBLEMS,
            routes::CATEGORIES,
            routes::TAGS,
            routes::LEVELS,
            routes::SEARCH,
            routes::HOME,
        ] {
            assert_eq!(app.get(path).await.status, 200, "{path}");
        }
    }

    #[tokio::test]
    async fn any_active_key_is_accepted() {
        let app = TestApp::spawn().await;
        insert_key(&app, "cp_second", true).await;

        let res = app
            .post_with_key(routes::TAGS, &json!({"name": "A", "slug": "a"}), "cp_second")
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn successful_use_records_last_used_at() {
        let app = TestApp::spawn().await;

        let res = app.get_with_key(routes::ADMIN_STATS, API_KEY).await;
        assert_eq!(res.status, 200);

        let mut last_used = None;
        for _ in 0..50 {
            let key = api_key::Entity::find()
                .filter(api_key::Column::Key.eq(API_KEY))
                .one(&app.db)
                .await
                .unwrap()
                .unwrap();
            if key.last_used_at.is_some() {
                last_used = key.last_used_at;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(last_used.is_some(), "last_used_at was never set");
    }
}
