#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # rjsmerge
//!
//! Deterministic aggregation of module-loader build configuration.
//!
//! Every frontend package ships a partial loader configuration: module
//! aliases, shims for legacy scripts, mixins, module substitutions, eagerly
//! loaded modules. This library merges those fragments into the single
//! build file the optimizer consumes, resolving overrides by precedence and
//! producing byte-identical output for identical input.
//!
//! ## Core Types
//!
//! - [`ConfigFragment`] and [`FragmentPayload`]: validated partial configurations
//! - [`Aggregator`] and [`MergeOptions`]: the merge run
//! - [`MergedConfig`]: the merged document
//! - [`DiagnosticLog`](merge::DiagnosticLog): overrides and warnings from a run
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! Fragments are read from JSON, YAML or build files by [`source`], and from
//! a storefront's generated `requirejs-config.js` by [`generated`].
//!
//! ## Examples
//!
//! ```
//! use rjsmerge::serialize::DocumentFormat;
//! use rjsmerge::{Aggregator, ConfigFragment, MergeOptions};
//!
//! let ui = ConfigFragment::from_json_str(
//!     "Magento_Ui",
//!     0,
//!     r#"{"shim": {"jquery/ui": {"deps": ["jquery"]}}}"#,
//! )
//! .unwrap();
//! let theme = ConfigFragment::from_json_str(
//!     "Magento_Theme",
//!     1,
//!     r#"{"shim": {"jquery/ui": {"deps": ["jquery/jquery-migrate"]}}}"#,
//! )
//! .unwrap();
//!
//! let result = Aggregator::new(MergeOptions::default())
//!     .aggregate(&[ui, theme])
//!     .unwrap();
//! let deps = result.config.shim["jquery/ui"].deps.as_ref().unwrap();
//! assert_eq!(deps, &["jquery", "jquery/jquery-migrate"]);
//!
//! let document = DocumentFormat::BuildFile
//!     .create_renderer()
//!     .render(&result.config)
//!     .unwrap();
//! assert!(document.starts_with("({"));
//! ```

pub mod bundles;
pub mod error;
pub mod fragment;
pub mod generated;
pub mod logging;
pub mod merge;
pub mod model;
pub mod serialize;
pub mod source;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use fragment::{ConfigFragment, FragmentPayload};
pub use logging::{init_logger, LogLevel, Logger};
pub use merge::{aggregate, Aggregation, Aggregator, MergeOptions};
pub use model::{BuildModule, MergedConfig, ModuleId, ShimEntry};
