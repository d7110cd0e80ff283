//! mailview-core: Core library for mailview.
//!
//! This crate provides the foundation for the mailview clients, including:
//! - Configuration management and path discovery
//! - Wire types for the `/api/emails` resource
//! - The HTTP service client and the `MailBackend` seam
//! - The optimistic-update view state machine
//! - The polling view controller that hosts it

pub mod config;
pub mod controller;
pub mod error;
pub mod paths;
pub mod poller;
pub mod service;
pub mod types;
pub mod view;

pub use config::AppConfig;
pub use controller::MailView;
pub use error::{Error, Result};
pub use paths::AppPaths;
pub use poller::Poller;
pub use service::{MailBackend, ServiceClient};
pub use types::{Ack, EmailId, EmailSummary, NewEmail};
pub use view::{Outcome, Request, ViewState};
