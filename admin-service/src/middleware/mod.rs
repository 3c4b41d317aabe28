mod caller;

pub use caller::{caller_context_middleware, CallerClaims, CallerContext};
