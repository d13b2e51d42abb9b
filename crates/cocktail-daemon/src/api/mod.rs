mod handlers;
mod middleware;
mod responses;
mod server;

pub use middleware::{ApiAuthenticator, ApiContext, ApiRateLimiter, AuthResult, RateLimitResult};
pub use responses::*;
pub use server::ApiServer;

#[cfg(test)]
mod tests;
