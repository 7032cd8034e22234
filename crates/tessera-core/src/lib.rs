//! Tessera Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Tessera diagram
//! engine. It includes:
//!
//! - **Model**: The diagram input schema ([`model::DiagramData`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Draw**: Backend-neutral drawing primitives ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod model;
