#![deny(missing_docs)]

//! # Skybook Models
//!
//! Core data types shared by the skybook flight-booking client, its mock
//! backend and the command-line front end.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`flight`] | The `Flight` record exchanged with the booking service |
//! | [`validation`] | Field predicates, their composition and the round-trip check |
//! | [`form`] | Form fields carrying value, touched/dirty flags and errors |
//! | [`error`] | `ModelError` and `ValidationError` |

pub mod error;
pub mod flight;
pub mod form;
pub mod validation;

// Re-export all public types at crate root for convenience.
pub use error::*;
pub use flight::*;
pub use form::*;
pub use validation::*;
