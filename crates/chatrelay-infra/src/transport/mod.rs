//! Reply sinks for the transports chatrelay ships with.
//!
//! - [`ConsoleSink`]: writes replies to a terminal (or any writer).
//! - [`BufferedSink`]: keeps replies in memory so a request/response
//!   transport such as HTTP can return them to its caller.

pub mod buffered;
pub mod console;

pub use buffered::BufferedSink;
pub use console::ConsoleSink;
