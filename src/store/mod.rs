//! PostgreSQL persistence for accounts, licenses, projects, prototype data
//! and upload metadata.

pub mod client;
pub mod connection;
pub mod demo_data;
pub mod error;
pub mod files;
pub mod licenses;
pub mod projects;
pub mod schema;
pub mod users;

pub use client::Store;
pub use connection::DbConfig;
pub use demo_data::DemoData;
pub use error::{Result, StoreError};
pub use files::{FileUpload, NewFileUpload};
pub use licenses::{License, LicenseRecord, LicenseStatus};
pub use projects::{NewProject, Project, ProjectChanges};
pub use users::User;
