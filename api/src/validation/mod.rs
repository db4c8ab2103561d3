//! Field validation engine
//!
//! - `patterns`: regexes, blacklists and bounds
//! - `gibberish`: repeated-block and consonant-ratio heuristics
//! - `age`: age arithmetic and the clock seam
//! - `fields`: per-field rules shared by live checks and submission
//! - `interactive`: single-field evaluation with the uniqueness lookup
//! - `sanitizers`, `requests`, `extractors`: request cleaning

pub mod age;
pub mod extractors;
pub mod fields;
pub mod gibberish;
pub mod interactive;
pub mod patterns;
pub mod requests;
pub mod sanitizers;

pub use age::{age_in_years, Clock, FixedClock, SystemClock};
pub use extractors::{Sanitize, SanitizedJson};
pub use fields::{check_dob, check_field, Field, Mode, ValidationContext, Violation, ViolationKind};
pub use gibberish::is_gibberish;
