//! Core library for introgen
//!
//! This crate implements the **Functional Core** of the introgen application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! - **`introgen_core`** (this crate): Pure transformation functions with zero I/O
//! - **`introgen`**: the relay server, the form client and every network call
//!
//! # Module Organization
//!
//! - [`form`]: the five outline fields, the request model and its validators
//! - [`prompt`]: the instruction template and placeholder substitution
//! - [`gemini`]: `generateContent` wire types and text extraction
//! - [`result`]: the relay/client result contract and its fixed messages
//! - [`session`]: the form client's state machine (in-flight flag, result, controls)
//!
//! # Example Usage
//!
//! ```rust
//! use introgen_core::form::GenerationRequest;
//! use introgen_core::prompt::{render_prompt, DEFAULT_TEMPLATE};
//!
//! let request = GenerationRequest {
//!     main_topic: "Robot spatial perception".to_string(),
//!     specific_problem: "Scarce 4D data".to_string(),
//!     old_methods: "Multi-view capture rigs".to_string(),
//!     solution: "Single-image 4D generation".to_string(),
//!     benefits: "Cheap and general".to_string(),
//! };
//!
//! assert!(request.validate_for_relay().is_ok());
//! let prompt = render_prompt(DEFAULT_TEMPLATE, &request);
//! assert!(prompt.contains("Scarce 4D data"));
//! ```

pub mod form;
pub mod gemini;
pub mod prompt;
pub mod result;
pub mod session;
