pub mod catalog;
pub mod category;
pub mod shared;
pub mod tag;
pub mod tutorial;

use serde::Serialize;

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn deleted() -> Self {
        Self {
            message: "Deleted successfully".into(),
        }
    }
}
