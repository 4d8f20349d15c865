//! Oracle adapters
//!
//! The Gemini adapter talks to the `generateContent` REST endpoint and is
//! compiled with the `gemini` feature. Wire types are always available so
//! request building and response parsing can be tested offline.

#[cfg(feature = "gemini")]
mod gemini;
pub mod types;

#[cfg(feature = "gemini")]
pub use gemini::GeminiOracle;
