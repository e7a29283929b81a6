use serde_json::json;

use crate::common::{API_KEY, TestApp, routes};

mod stats {
    use super::*;

    #[tokio::test]
    async fn counts_every_status() {
        let app = TestApp::spawn().await;
        app.create_category("Arrays", "arrays").await;
        app.create_tag("Hashing", "hashing").await;
        app.create_tag("Graphs", "graphs").await;
        app.publish("A", "a", "easy").await;
        app.publish("B", "b", "hard").await;
        app.create_tutorial(json!({"title": "C", "slug": "c", "difficulty": "hard"}))
            .await;
        for _ in 0..3 {
            app.get(&routes::problem("a")).await;
        }
        app.get(&routes::problem("b")).await;

        let res = app.get_with_key(routes::ADMIN_STATS, API_KEY).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let data = &res.body["data"];
        assert_eq!(data["total_tutorials"], 3);
        assert_eq!(data["published_tutorials"], 2);
        assert_eq!(data["draft_tutorials"], 1);
        assert_eq!(data["total_categories"], 1);
        assert_eq!(data["total_tags"], 2);
        assert_eq!(data["total_views"], 4);
        assert_eq!(
            data["difficulty_counts"],
            json!({"easy": 1, "medium": 0, "hard": 2})
        );
        let recent: Vec<&str> = data["recent"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["slug"].as_str().unwrap())
            .collect();
        assert_eq!(recent, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn empty_site_has_zero_views() {
        let app = TestApp::spawn().await;

        let res = app.get_with_key(routes::ADMIN_STATS, API_KEY).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["total_views"], 0);
        assert_eq!(res.body["data"]["recent"], json!([]));
    }

    #[tokio::test]
    async fn recent_is_capped_at_five() {
        let app = TestApp::spawn().await;
        for i in 0..7 {
            app.create_tutorial(json!({"title": format!("T{i}"), "slug": format!("t-{i}")}))
                .await;
        }

        let res = app.get_with_key(routes::ADMIN_STATS, API_KEY).await;

        assert_eq!(res.body["data"]["recent"].as_array().unwrap().len(), 5);
        assert_eq!(res.body["data"]["recent"][0]["slug"], "t-6");
    }
}

mod problem_list {
    use super::*;

    #[tokio::test]
    async fn includes_drafts_newest_created_first() {
        let app = TestApp::spawn().await;
        app.publish("Published", "published", "easy").await;
        app.create_tutorial(json!({"title": "Draft", "slug": "draft"}))
            .await;

        let res = app.get_with_key(routes::ADMIN_PROBLEMS, API_KEY).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.slugs(), vec!["draft", "published"]);
        assert_eq!(res.body["data"][0]["status"], "draft");
        assert_eq!(res.body["pagination"]["per_page"], 10);
    }

    #[tokio::test]
    async fn pages_by_ten() {
        let app = TestApp::spawn().await;
        for i in 0..12 {
            app.create_tutorial(json!({"title": format!("T{i}"), "slug": format!("t-{i}")}))
                .await;
        }

        let res = app
            .get_with_key(&format!("{}?page=2", routes::ADMIN_PROBLEMS), API_KEY)
            .await;

        assert_eq!(res.slugs(), vec!["t-1", "t-0"]);
        assert_eq!(res.body["pagination"]["total"], 12);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
    }

    #[tokio::test]
    async fn search_matches_titles_only() {
        let app = TestApp::spawn().await;
        app.create_tutorial(json!({
            "title": "Binary Search",
            "slug": "binary-search",
            "description": "Halve the range",
        }))
        .await;
        app.create_tutorial(json!({
            "title": "Two Sum",
            "slug": "two-sum",
            "description": "Search for a complement",
        }))
        .await;

        let res = app
            .get_with_key(&format!("{}?search=SEARCH", routes::ADMIN_PROBLEMS), API_KEY)
            .await;

        assert_eq!(res.slugs(), vec!["binary-search"]);
    }
}
