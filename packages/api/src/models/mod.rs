//! Data models shared by the gate, the synchronizer and the UI.

mod user;

pub use user::{is_truthy, AuthUser, Session, SessionState, UserData};
