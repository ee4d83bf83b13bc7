//! Property-based tests over randomly generated scene trees

mod resolution;
