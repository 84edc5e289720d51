//! Authorization and application-lifecycle engine for a two-sided job board.
//!
//! Employers publish job postings and review applicants; applicants browse postings and
//! submit applications that the owning employer accepts or rejects. Everything that
//! decides who may touch which record, and how an application's status may move, lives
//! in this crate. Presentation is a consumer of [`router::board_router`].

pub mod access;
pub mod aggregation;
pub mod applications;
pub mod board;
pub mod config;
pub mod error;
pub mod identity;
pub mod jobs;
pub mod router;
pub mod storage;
pub mod telemetry;

pub use board::JobBoard;
pub use error::{AppError, BoardError};
