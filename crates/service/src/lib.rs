//! `userward-service` — user lifecycle and listing operations behind the
//! authorization gate.
//!
//! Control flow per request: resolve the target (when the action needs one),
//! evaluate the gate for the acting principal, then run the operation against
//! the store and hand structured data back for rendering.

pub mod lifecycle;
pub mod listing;
pub mod reply;
pub mod service;
pub mod telemetry;

pub use lifecycle::{NewUser, UserPatch};
pub use listing::ListParams;
pub use reply::{
    Confirmation, CreatedUser, ListPage, Outcome, ServiceError, UpdateReply, UserSummary,
    UserTemplate, UserView,
};
pub use service::UserService;
