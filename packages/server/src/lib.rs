//! Collaborative session server library.
//!
//! Rooms of two kinds (shared text and drawing canvas) are created and joined
//! over a WebSocket; every state change is fanned out to the other members of
//! the room and persisted through a room store.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
