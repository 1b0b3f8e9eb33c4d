pub mod config;
pub mod message;
pub mod record;

pub use config::{
    Backend, CrewConfig, HttpConfig, LlmConfig, PipelineOptions, RunOverrides, CONFIG_FILE,
};
pub use message::{ChatRole, ChatTurn, Content, Message, HUMAN_SENDER};
pub use record::{
    Component, ComponentChild, PageSection, PageSpec, Prd, RecordKind, RoleAssignment, RolePlan,
    StructuredRecord, TaskItem, TaskPlan, NO_TASK,
};
