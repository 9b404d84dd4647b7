//! Crate-internal test support.

pub(crate) mod support;
