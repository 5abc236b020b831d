// src/services/policy.rs

//! Failure handling strategies for backend calls.
//!
//! Page-generating content reads propagate failures so the caller can render
//! a not-found state. Engagement calls and search mask failures: the error is
//! logged and the caller gets the type's neutral value (empty list, zero,
//! `None`, `false`) so the page still renders.

use crate::error::Result;

/// How a client reports a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the error to the caller.
    Propagate,
    /// Log the error and return `T::default()`.
    Mask,
}

impl FailurePolicy {
    /// Apply the policy to the outcome of one operation.
    ///
    /// Under [`FailurePolicy::Mask`] the returned result is always `Ok`.
    pub fn apply<T: Default>(self, operation: &str, result: Result<T>) -> Result<T> {
        match (self, result) {
            (_, Ok(value)) => Ok(value),
            (FailurePolicy::Propagate, Err(e)) => Err(e),
            (FailurePolicy::Mask, Err(e)) => {
                log::error!("Error {operation}: {e}");
                Ok(T::default())
            }
        }
    }
}
