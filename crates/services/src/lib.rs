#![forbid(unsafe_code)]

pub mod answer_service;
pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod seed;
pub mod sessions;

pub use quiz_core::Clock;

pub use answer_service::AnswerService;
pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use error::{CatalogError, PlayError};
pub use seed::{SeedReport, seed_demo_catalog};
pub use sessions::{
    EndReason, PlayMode, PlayRequest, PlayService, PlaySession, PlayStep, PlaySummary,
    StartedPlay, Submission, SubmitOutcome,
};
