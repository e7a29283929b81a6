use serde_json::json;

use crate::common::{API_KEY, PAGE_SIZE, TestApp, routes};

/// Seed a small catalog:
///
/// | slug            | difficulty | category | tags                |
/// |-----------------|------------|----------|---------------------|
/// | two-sum         | easy       | arrays   | hashing             |
/// | three-sum       | medium     | arrays   | two-pointers        |
/// | word-ladder     | hard       | graphs   | bfs                 |
/// | course-schedule | medium     | graphs   | bfs, topo-sort      |
/// | lru-cache       | medium     | (none)   | hashing             |
/// | secret-draft    | easy       | arrays   | hashing (draft)     |
async fn seed_catalog(app: &TestApp) {
    let arrays = app.create_category("Arrays", "arrays").await;
    let graphs = app.create_category("Graphs", "graphs").await;
    let hashing = app.create_tag("Hashing", "hashing").await;
    let pointers = app.create_tag("Two Pointers", "two-pointers").await;
    let bfs = app.create_tag("BFS", "bfs").await;
    let topo = app.create_tag("Topological Sort", "topo-sort").await;
    app.create_tag("Unused", "unused").await;

    for (title, slug, difficulty, category, tags, description) in [
        ("Two Sum", "two-sum", "easy", Some(arrays), vec![hashing], "Find a pair with a target sum"),
        ("Three Sum", "three-sum", "medium", Some(arrays), vec![pointers], "Find all zero-sum triplets"),
        ("Word Ladder", "word-ladder", "hard", Some(graphs), vec![bfs], "Shortest transformation sequence"),
        ("Course Schedule", "course-schedule", "medium", Some(graphs), vec![bfs, topo], "Detect a cycle in prerequisites"),
        ("LRU Cache", "lru-cache", "medium", None, vec![hashing], "Design a least recently used cache"),
    ] {
        app.create_tutorial(json!({
            "title": title,
            "slug": slug,
            "difficulty": difficulty,
            "category_id": category,
            "tag_ids": tags,
            "description": description,
            "status": "published",
        }))
        .await;
    }

    app.create_tutorial(json!({
        "title": "Secret Draft Sum",
        "slug": "secret-draft",
        "difficulty": "easy",
        "category_id": arrays,
        "tag_ids": [hashing],
    }))
    .await;
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

mod unfiltered {
    use super::*;

    #[tokio::test]
    async fn lists_published_newest_first_one_page_at_a_time() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app.get(routes::PROBLEMS).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.slugs(),
            vec!["lru-cache", "course-schedule", "word-ladder"]
        );
        let pagination = &res.body["pagination"];
        assert_eq!(pagination["page"], 1);
        assert_eq!(pagination["per_page"], PAGE_SIZE);
        assert_eq!(pagination["total"], 5);
        assert_eq!(pagination["total_pages"], 2);

        let res = app.get(&format!("{}?page=2", routes::PROBLEMS)).await;
        assert_eq!(res.slugs(), vec!["three-sum", "two-sum"]);
    }

    #[tokio::test]
    async fn list_items_carry_their_category() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app.get(&format!("{}?page=2", routes::PROBLEMS)).await;
        assert_eq!(res.body["data"][0]["category"]["slug"], "arrays");

        let res = app.get(routes::PROBLEMS).await;
        assert!(res.body["data"][0]["category"].is_null());
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app.get(&format!("{}?page=9", routes::PROBLEMS)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"], json!([]));
        assert_eq!(res.body["pagination"]["total"], 5);
    }

    #[tokio::test]
    async fn largest_page_number_is_empty() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app
            .get(&format!("{}?page={}", routes::PROBLEMS, u64::MAX))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"], json!([]));
        assert_eq!(res.body["pagination"]["total"], 5);
    }

    #[tokio::test]
    async fn ties_on_publish_time_page_by_id() {
        let app = TestApp::spawn().await;
        let mut ids = Vec::new();
        for i in 0..7 {
            let res = app
                .create_tutorial(json!({
                    "title": format!("Same Time {i}"),
                    "slug": format!("same-time-{i}"),
                    "status": "published",
                    "published_at": "2024-05-01T12:00:00Z",
                }))
                .await;
            ids.push(res.id());
        }
        ids.reverse();

        let mut seen = Vec::new();
        for page in 1..=3 {
            let res = app
                .get(&format!("{}?page={page}", routes::PROBLEMS))
                .await;
            assert_eq!(res.body["pagination"]["total_pages"], 3);
            seen.extend(
                res.body["data"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|t| t["id"].as_i64().unwrap() as i32),
            );
        }

        assert_eq!(seen, ids);
    }

    #[tokio::test]
    async fn bad_page_means_first_page() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        for q in ["page=0", "page=-3", "page=abc"] {
            let res = app.get(&format!("{}?{q}", routes::PROBLEMS)).await;
            assert_eq!(res.status, 200, "{q}");
            assert_eq!(res.body["pagination"]["page"], 1, "{q}");
        }
    }

    #[tokio::test]
    async fn reports_published_counts_per_difficulty() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app.get(routes::PROBLEMS).await;

        assert_eq!(
            res.body["difficulty_counts"],
            json!({"easy": 1, "medium": 3, "hard": 1})
        );
    }

    #[tokio::test]
    async fn empty_catalog_has_no_pages() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::PROBLEMS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"], json!([]));
        assert_eq!(res.body["pagination"]["total_pages"], 0);
    }
}

mod filtered {
    use super::*;

    #[tokio::test]
    async fn difficulty_accepts_a_list() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app
            .get(&format!("{}?difficulty=easy,hard", routes::PROBLEMS))
            .await;

        assert_eq!(res.slugs(), vec!["word-ladder", "two-sum"]);
        assert_eq!(res.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn unknown_difficulty_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&format!("{}?difficulty=easy,insane", routes::PROBLEMS))
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["error"].as_str().unwrap().contains("insane"));
    }

    #[tokio::test]
    async fn category_restricts_to_members() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app.get(&format!("{}?category=graphs", routes::PROBLEMS)).await;
        assert_eq!(res.slugs(), vec!["course-schedule", "word-ladder"]);

        let res = app
            .get(&format!("{}?category=graphs,arrays", routes::PROBLEMS))
            .await;
        assert_eq!(res.body["pagination"]["total"], 4);
    }

    #[tokio::test]
    async fn unknown_category_yields_nothing() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app
            .get(&format!("{}?category=no-such-category", routes::PROBLEMS))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"], json!([]));
        assert_eq!(res.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn topics_match_any_listed_tag() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app
            .get(&format!("{}?topic=topo-sort,two-pointers", routes::PROBLEMS))
            .await;
        assert_eq!(
            sorted(res.slugs()),
            vec!["course-schedule", "three-sum"]
        );

        // A tutorial carrying several of the tags appears once.
        let res = app.get(&format!("{}?topic=bfs,topo-sort", routes::PROBLEMS)).await;
        assert_eq!(res.slugs(), vec!["course-schedule", "word-ladder"]);
    }

    #[tokio::test]
    async fn unknown_or_unused_topic_yields_nothing() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        for topic in ["no-such-topic", "unused"] {
            let res = app.get(&format!("{}?topic={topic}", routes::PROBLEMS)).await;
            assert_eq!(res.status, 200);
            assert_eq!(res.body["data"], json!([]), "{topic}");
        }
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_description() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app.get(&format!("{}?q=SUM", routes::PROBLEMS)).await;
        assert_eq!(res.slugs(), vec!["three-sum", "two-sum"]);

        let res = app.get(&format!("{}?q=cycle", routes::PROBLEMS)).await;
        assert_eq!(res.slugs(), vec!["course-schedule"]);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app.get(&format!("{}?q=%25", routes::PROBLEMS)).await;
        assert_eq!(res.body["data"], json!([]));
    }

    #[tokio::test]
    async fn search_with_accented_letters_matches_as_typed() {
        let app = TestApp::spawn().await;
        app.publish("Éclair Stacks", "eclair-stacks", "easy").await;

        for q in ["%C3%89clair", "%C3%89CLAIR"] {
            let res = app.get(&format!("{}?q={q}", routes::PROBLEMS)).await;
            assert_eq!(res.status, 200, "{q}");
            assert_eq!(res.slugs(), vec!["eclair-stacks"], "{q}");
        }
    }

    #[tokio::test]
    async fn dimensions_combine_with_and() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app
            .get(&format!(
                "{}?topic=hashing&difficulty=medium",
                routes::PROBLEMS
            ))
            .await;
        assert_eq!(res.slugs(), vec!["lru-cache"]);

        let res = app
            .get(&format!(
                "{}?category=arrays&topic=hashing&q=pair",
                routes::PROBLEMS
            ))
            .await;
        assert_eq!(res.slugs(), vec!["two-sum"]);

        let res = app
            .get(&format!(
                "{}?category=graphs&difficulty=easy",
                routes::PROBLEMS
            ))
            .await;
        assert_eq!(res.body["data"], json!([]));
    }

    #[tokio::test]
    async fn drafts_never_match() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app.get(&format!("{}?q=secret", routes::PROBLEMS)).await;
        assert_eq!(res.body["data"], json!([]));

        let res = app
            .get(&format!("{}?category=arrays&difficulty=easy", routes::PROBLEMS))
            .await;
        assert_eq!(res.slugs(), vec!["two-sum"]);
    }

    #[tokio::test]
    async fn filtered_results_paginate() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app
            .get(&format!("{}?difficulty=medium,hard&page=2", routes::PROBLEMS))
            .await;

        assert_eq!(res.slugs(), vec!["three-sum"]);
        assert_eq!(res.body["pagination"]["total"], 4);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
    }

    #[tokio::test]
    async fn unpublishing_removes_from_results() {
        let app = TestApp::spawn().await;
        seed_catalog(&app).await;

        let res = app
            .put_with_key(
                &routes::problem("word-ladder"),
                &json!({"status": "draft"}),
                API_KEY,
            )
            .await;
        assert_eq!(res.status, 200);

        let res = app.get(&format!("{}?topic=bfs", routes::PROBLEMS)).await;
        assert_eq!(res.slugs(), vec!["course-schedule"]);
    }
}
