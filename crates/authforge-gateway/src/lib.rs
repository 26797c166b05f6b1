//! Session verification gateway for Authforge.
//!
//! The gateway is the per-request interception point: before a request
//! reaches application logic, [`Gateway::evaluate`] decides whether to let
//! it through, bounce an already-authenticated user off the auth pages, or
//! send an unauthenticated one to login (remembering where they were
//! going).
//!
//! Cookies are untrusted input. The gateway never judges them locally — it
//! forwards them to the identity provider and lets the system of record
//! decide. Any ambiguity (rejection, network failure, timeout) resolves
//! toward *denying* access, never granting it.
//!
//! # Key types
//!
//! - [`RouteTable`] — declarative path classification (public, auth page,
//!   protected) plus the static-asset exemption list
//! - [`Gateway`] — the decision logic
//! - [`Decision`] — allow, or redirect to a target
//! - [`GatewayConfig`] — the verification timeout bound
//!
//! The gateway holds no per-request state: one instance serves unbounded
//! concurrent requests, each performing at most one outbound verification
//! call.

mod gateway;
mod routes;

pub use gateway::{Decision, Gateway, GatewayConfig};
pub use routes::{RouteClass, RoutePattern, RouteTable};
