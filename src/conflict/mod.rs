//! Conflict detection and resolution.
//!
//! # Detection
//!
//! [`detect`] is a structural, deliberately conservative check over
//! *declared* usage: it flags every pair of trains routed over a section
//! that more trains use than the section can hold, whether or not a later
//! schedule would serialize them. [`detect_in_schedule`] checks committed
//! segments instead and only flags real temporal overlaps.
//!
//! # Resolution
//!
//! [`resolve`] recommends holding the lower-priority train of each
//! conflict for the smallest delay that clears the shared section.

mod detector;
mod resolver;

pub use detector::{detect, detect_in_schedule};
pub use resolver::{resolve, HIGH_CONFIDENCE, TIED_CONFIDENCE};
