// Copyright 2024 Martin Pool

//! Exit codes from cc-mutants.
//!
//! A completed run exits 0 whatever the mutation score; the score is in the
//! report, not the exit status.

/// The run completed (even if mutants survived, or it was interrupted).
pub const SUCCESS: i32 = 0;

/// Wrong arguments, or no usable source or test files.
pub const USAGE: i32 = 1;

/// An internal software error, from sysexit.
pub const SOFTWARE: i32 = 70;
