//! Shiplog Changelog - commit classification and changelog rendering
//!
//! Raw commits are parsed into [`CommitRecord`]s, evaluated for breaking
//! changes, assembled into a [`ChangelogDocument`] and rendered as markdown,
//! HTML or JSON. All of it is synchronous and deterministic; the optional
//! narrative summary lives in `shiplog-ai`.

pub mod assembler;
pub mod breaking;
pub mod formatter;
pub mod generator;
pub mod parser;
pub mod types;

pub use assembler::ChangelogAssembler;
pub use breaking::BreakingDetector;
pub use formatter::{ChangelogRenderer, RendererRegistry};
pub use generator::ChangelogGenerator;
pub use parser::{CommitParser, ConventionalParser};
pub use types::{
    BreakingChange, ChangelogDocument, CommitRecord, CommitRef, DocumentMetadata, Entry, Footer,
    NarrativeSummary, Section,
};
