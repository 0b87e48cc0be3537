// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # agora
//!
//! Gradual-argumentation scoring of social-media conversations. A post and its
//! reply thread become an argument tree; every reply is labeled as supporting,
//! attacking or neutral towards its parent, and each argument receives an
//! acceptability degree in `[0, 1]` from its engagement and the degrees of the
//! arguments answering it.
//!
//! ## Architecture
//!
//! - **Posts** (`post`): ids, labels, engagement counters, raw input records
//! - **Tree** (`tree`): adjacency-stored argument tree and its builder
//! - **Metrics** (`metrics`): engagement bounds, sentiment majorities, strongest argument
//! - **Scoring** (`argumentation`): base strength and the acceptability valuation
//! - **Export** (`export`): nested JSON view of a scored tree
//! - **Collaborators** (`services`): classifiers, keyword extraction, conversation sources
//! - **Orchestration** (`analyzer`): source → labels → tree → grafts → score
//!
//! ## Library usage
//!
//! ```no_run
//! use agora::analyzer::Analyzer;
//! use agora::services::ThreadFile;
//!
//! let source = ThreadFile::load("thread.json".as_ref()).unwrap();
//! let analysis = Analyzer::default().analyze(&source, source.root_id()).unwrap();
//! println!("{}", serde_json::to_string_pretty(&analysis.export()).unwrap());
//! ```

pub mod analyzer;
pub mod argumentation;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod post;
pub mod services;
pub mod tree;
