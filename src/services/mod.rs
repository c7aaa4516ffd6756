//! Harness services shared by every platform

pub mod case_store;
pub mod judge_client;
pub mod reporter;
pub mod samples;

pub use case_store::CaseStore;
pub use judge_client::{JudgeClient, KattisClient, SolutionUpload, SubmissionReceipt};
pub use reporter::{Reporter, classify};
pub use samples::SampleCache;
