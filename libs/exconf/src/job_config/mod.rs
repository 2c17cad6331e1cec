// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Low-level job configuration consumed by the execution workers.
//!
//! A job is a submission header followed by tasks in execution order. Empty
//! optional fields are omitted from the serialized document.

#[allow(clippy::module_inception)]
mod job_config;
mod job_id;
mod limits;
mod sandbox;
mod task;

pub use job_config::{JobConfig, JobType, SubmissionHeader};
pub use job_id::JobId;
pub use limits::{BoundDirectory, Limits};
pub use sandbox::SandboxConfig;
pub use task::{Command, Task, TaskType};
