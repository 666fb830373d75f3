//! Shared test utilities for leaf-store tests.
