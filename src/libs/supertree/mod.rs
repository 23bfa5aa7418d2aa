//! Min-cut supertree engine (Semple & Steel 2000, with the ROD1
//! uncontradicted-nesting contraction extension): combine a set of
//! overlapping rooted, leaf-labeled trees into one consistent supertree
//! via proper-cluster graphs, Stoer-Wagner global min-cut, and
//! Picard-Queyranne all-minimum-cuts extraction.

pub mod allmincuts;
pub mod clustergraph;
pub mod config;
pub mod contract;
pub mod error;
pub mod label;
pub mod mincut;
pub mod mrp;
pub mod node;
pub mod parser;
pub mod restrict;
pub mod stgraph;
pub mod supertree;
pub mod tree;
pub mod writer;

pub use config::RunConfig;
pub use error::SupertreeError;
pub use label::{LabelId, LabelTable};
pub use supertree::{build_supertree, build_supertree_with_dump, Dumper};
pub use tree::Tree;
