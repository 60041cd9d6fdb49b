//! HTTP API
//!
//! Thin dispatcher over the core pipeline: every handler parses its
//! parameters, consults the response cache and hands off to the
//! planner and renderers.

mod agenda;
mod data_list;
mod docs;
mod health;
mod purge;

pub use agenda::agenda_routes;
pub use data_list::data_list_routes;
pub use docs::docs_routes;
pub use health::health_routes;
pub use purge::purge_routes;
