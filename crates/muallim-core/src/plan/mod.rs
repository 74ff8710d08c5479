//! Lesson plans: data model, output schema, request construction, service.

pub mod request;
pub mod schema;
pub mod service;
pub mod types;

pub use request::{
    Contents, DEFAULT_MODEL, GenerationConfig, GenerationRequest, InlineData, Part, build_request,
};
pub use schema::lesson_plan_schema;
pub use service::{PlanError, generate_lesson_plan};
pub use types::{ActivityType, LessonContext, LessonPlan, LessonSection};
