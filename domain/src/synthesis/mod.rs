//! Synthesis value objects: the structured output of the external
//! synthesizer (analyses, resolution advice) and the request shapes it
//! consumes.

pub mod advice;
pub mod analysis;
pub mod position;
