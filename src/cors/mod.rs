//! CORS negotiation.
//!
//! [`CorsPolicy::negotiate`] decides, per request, between four outcomes:
//!
//! ```text
//! no Origin ─────────────────────────────► Forward
//! Origin ─► rejected ────────────────────► Reject 403
//!        └► accepted ─► not a preflight ─► Simple (forward + annotate)
//!                     └► preflight ─► method not allowed ─► Reject 405
//!                                   └► header not allowed ─► Reject 403
//!                                   └► ok ─────────────────► Preflight 204
//! ```
//!
//! The decision is plain data; [`crate::middleware::cors::Cors`] turns it into
//! forwarding or a terminal response.

mod negotiate;
mod policy;

pub use negotiate::{Decision, Rejection};
pub use policy::{CorsPolicy, CorsPolicyBuilder, Validator, allow_any, origins_from_list};
