//! Credential resolution for the generative API.

pub mod env;
