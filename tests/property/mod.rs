//! Property-based tests for convergence guarantees
