//! Client side of the hosted backend.
//!
//! Authentication, record storage, and remote function execution all live in
//! a hosted backend-as-a-service. This crate defines the [`SessionGateway`]
//! contract the rest of the application talks to, a REST implementation of
//! it, the owned [`SessionContext`] that tracks who is signed in, and a
//! [`MockGateway`] for tests.

pub mod error;
pub mod gateway;
pub mod mock;
pub mod query;
pub mod rest;
pub mod session;

pub use error::GatewayError;
pub use gateway::{
    AuthEvent, AuthEventKind, ChatbotReply, ChatbotRequest, SessionGateway, SignUpOutcome,
};
pub use mock::MockGateway;
pub use rest::RestGateway;
pub use session::{AuthSubscription, SessionContext, SessionState};
