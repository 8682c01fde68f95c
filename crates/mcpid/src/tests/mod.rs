//! Test suites and shared harness for the session server.

pub(crate) mod support;
