//! # babbler-reply
//!
//! Reply generation for the babbler chat brain:
//!
//! - **[`keywords`]**: swap/ban/aux filtered keyword extraction with the
//!   auxiliary fallback pass
//! - **[`generator`]**: seeding, forward/backward babble walks over the
//!   tree, and the deadline-bounded candidate loop
//! - **[`surprise`]**: the pluggable candidate scoring strategy
//! - **[`process`]**: text-level orchestration (parse, learn, reply,
//!   render) consumed by the CLI

#![deny(unsafe_code)]

pub mod generator;
pub mod keywords;
pub mod process;
pub mod surprise;

pub use generator::{ReplyOptions, generate, reply};
pub use keywords::extract_keywords;
pub use process::{learn_text, parse, render, reply_text};
pub use surprise::{ConstantSurprise, Surprise};
