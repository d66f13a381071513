//! Helpers around the event model.

pub mod call_assembler;

pub use call_assembler::ToolCallAssembler;
