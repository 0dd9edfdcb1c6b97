//! Analysis engine adapters
//!
//! The whole-program analyzer runs out of process. These adapters turn its
//! output into an `EdgeSource`: a live analyzer process, a captured dump, or
//! an in-memory list.

pub mod dump;
pub mod jsonl;
pub mod memory;
pub mod process;

pub use dump::DumpFileEngine;
pub use jsonl::JsonlEdgeStream;
pub use memory::MemoryEdgeSource;
pub use process::ExternalEngine;
