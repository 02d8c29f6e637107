//! Domain model module declarations.

pub mod access_request;
pub mod app;
pub mod permission;
pub mod user;

pub use access_request::{AccessRequest, AccessRequestStatus, AccessRequestSubmission};
pub use app::{App, AppSettings, GroupsProvisioning};
pub use permission::Permission;
pub use user::User;
