use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{admin, catalog, category, problem, tag};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/problems", problem_routes())
        .nest("/categories", category_routes())
        .nest("/tags", tag_routes())
        .nest("/levels", level_routes())
        .nest("/search", OpenApiRouter::new().routes(routes!(catalog::search)))
        .nest("/home", OpenApiRouter::new().routes(routes!(catalog::get_home)))
        .nest("/admin", admin_routes())
}

fn problem_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(problem::list_problems, problem::create_problem))
        .routes(routes!(
            problem::get_problem,
            problem::update_problem,
            problem::delete_problem
        ))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(category::list_categories, category::create_category))
        .routes(routes!(
            category::get_category,
            category::update_category,
            category::delete_category
        ))
}

fn tag_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(tag::list_tags, tag::create_tag))
        .routes(routes!(tag::get_tag, tag::update_tag, tag::delete_tag))
}

fn level_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(catalog::list_levels))
        .routes(routes!(catalog::get_level))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(admin::get_stats))
        .routes(routes!(admin::list_problems))
}
