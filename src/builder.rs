#[path = "builder/backend.rs"]
mod backend;

#[path = "builder/profile.rs"]
mod profile;

#[path = "builder/state.rs"]
mod state;

#[path = "builder/helpers.rs"]
mod helpers;

#[path = "builder/judge_builder.rs"]
mod judge_builder;

pub use backend::JudgeBackend;
pub use judge_builder::JudgeBuilder;
pub use profile::ModelProfile;
