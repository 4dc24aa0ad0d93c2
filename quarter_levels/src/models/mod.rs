//! Plain value types shared by every stage of the pipeline.

pub mod bar;
pub mod level;
pub mod outcome;
pub mod range;
