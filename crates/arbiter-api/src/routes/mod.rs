//! # API Route Modules
//!
//! - `health` — liveness probes (`GET /`, `GET /health`).
//! - `arbitrate` — dispute arbitration, unary (`POST /arbitrate`) and
//!   streaming (`POST /arbitrate/stream`).

pub mod arbitrate;
pub mod health;
