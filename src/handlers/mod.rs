// handlers/mod.rs - Route handlers grouped by access tier
//
// Public (no token) → Protected (x-token resolved by the auth middleware)
pub mod protected;
pub mod public;
