//! The LC-B batch protocol: frame transport, the request/response wire
//! format, and the dispatch shell that evaluates a batch against a
//! registry of contract handlers.
//!
//! Layering: [`frame`] carries raw length-prefixed payloads over a
//! stream; [`batch`] encodes/decodes those payloads as a `BatchRequest`
//! or `BatchResponse`; [`dispatch`] evaluates a decoded `BatchRequest`
//! against a [`dispatch::HandlerRegistry`] and produces a `BatchResponse`.

pub mod batch;
pub mod dispatch;
mod error;
pub mod frame;
pub mod resolve;

pub use batch::{BatchRequest, BatchResponse, BatchResult, Instruction};
pub use dispatch::{evaluate_batch, Handler, HandlerRegistry, ParamEnv, ParamSpec};
pub use error::HlxError;
pub use resolve::resolve;
