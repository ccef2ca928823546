#![forbid(unsafe_code)]

//! Treemap document model and style resolution (headless).
//!
//! This crate turns a treemap JSON document into typed data:
//! - [`Document`]: the node tree plus its raw settings blocks
//! - [`resolve_settings`]: validated effective settings for one render pass
//! - [`Hierarchy`]: the weighted, optionally sorted node arena the layout writes into
//! - [`StyleResolver`]: per-node answers to "which color / size / alignment applies here"
//!
//! Geometry, text fitting and SVG output live in `etreemap-render`.

pub mod cascade;
pub mod color;
pub mod detect;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod settings;
pub mod style;

pub use cascade::{ResolvedSettings, SettingsPatch, resolve_settings};
pub use color::{ColorOverride, Hsla, Paint, PartialHsla};
pub use detect::is_treemap_block;
pub use error::{Error, Result, SettingsError, SettingsErrors};
pub use hierarchy::{HierNode, Hierarchy, Rect};
pub use model::{DOCUMENT_TYPE, Document, TreeNode};
pub use settings::{HAlign, TreemapSettings, VAlign};
pub use style::{Role, StyleResolver};
