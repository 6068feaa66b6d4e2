//! In-memory form document.
//!
//! `formdom` models the slice of a browser document that form validation
//! cares about: an element tree with classes and attributes, native
//! constraint validation, focus and native form submission.

pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod validity;

pub use document::{Document, Submission};
pub use element::{find_element, Element, Tag};
pub use error::DomError;
pub use event::Event;
pub use validity::ValidityState;
