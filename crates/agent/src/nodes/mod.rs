//! Node handlers of the routing machine.

pub mod answer;
pub mod rag;
pub mod router;
pub mod web;
