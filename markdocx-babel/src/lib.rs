//! Bidirectional Markdown ⇄ DOCX conversion
//!
//!     This crate converts GitHub-flavoured Markdown with `$`-delimited math into Office Open XML
//!     word-processing packages and back. Formulas travel as native Office Math (OMML) so they stay
//!     editable in a word processor, and list numbering, tables, code and images survive the trip.
//!
//!     TLDR: For format authors:
//!         - Markdown text is the hub. Every format parses into it and serializes out of it.
//!         - Parsing and XML handling are delegated to libraries (comrak, roxmltree, zip); the code here
//!           adapts their trees to ours.
//!         - Per-node failures degrade to literal text and never abort a document. Only the two
//!           structural failures (missing main document on import, failed integrity check on export)
//!           reach the caller.
//!
//! Architecture
//!
//!     Each direction is a pipeline of small, separately tested stages over explicit trees:
//!
//!         export: Markdown ─normalize─▶ Markdown ─comrak─▶ MdNode ─forward─▶ OfficeDocument ─write─▶ bytes ─validate─▶ bytes
//!         import: bytes ─zip─▶ parts ─roxmltree─▶ XmlNode ─reverse─▶ blocks ─render─▶ Markdown
//!
//!     This is a pure lib: it powers markdocx-cli but supposes no shell environment, no std printing
//!     and no environment variables.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # FormatError and integrity issues
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── formats
//!     │   ├── markdown            # comrak parsing + math notation normalizer
//!     │   └── docx                # export, package, import
//!     ├── ir                      # MdNode, Office tree, generic XML tree
//!     ├── math                    # LaTeX ⇄ OMML
//!     ├── common                  # list numbering, degradable conversion results
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     ├── lib.rs                  # aggregates the per-area modules below
//!     ├── common/mod.rs           # in-memory package builders
//!     ├── markdown/               # parser node shapes, normalizer examples and properties
//!     ├── math/                   # LaTeX → OMML → LaTeX
//!     └── docx/                   # import, export and round trips
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Core Algorithms
//!
//!     - The math normalizer (./formats/markdown/normalize.rs) scans text once into code, math and
//!       prose spans and only ever rewrites prose.
//!     - List numbering (./common/numbering.rs) replays Word's per-level counters in document order.
//!     - The math translator (./math) goes LaTeX → MathML → OMML on export and OMML → LaTeX on import.
//!
//! Library Choices
//!
//!     Markdown parsing is comrak (GFM tables, task lists, strikethrough, dollar math). LaTeX is
//!     rendered to MathML by latex2mathml before the OMML rewrite. Packages are built with docx-rs;
//!     only the OMML splice touches the written XML directly. Images are decoded and re-encoded
//!     with the image crate, remote images come from reqwest (feature `remote-images`).
//!
pub mod error;
pub mod format;
pub mod formats;
pub mod registry;

pub mod common;
pub mod ir;
pub mod math;

pub use error::{FormatError, IntegrityIssue};
pub use format::{Format, SerializedDocument};
pub use formats::docx::{
    ensure_docx_extension, export_markdown, import_docx, DocxFormat, ExportOptions, ImportOptions,
};
pub use formats::markdown::{normalize_math, parse_markdown, MarkdownFormat};
pub use registry::FormatRegistry;
