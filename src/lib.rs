//! clover-md - Clover coverage reports as Markdown
//!
//! A library for turning Clover-style coverage XML into two Markdown
//! documents suitable for pull-request annotations:
//! - A per-package summary table
//! - A per-class detail breakdown
//!
//! Packages are inferred from filesystem manifests (`composer.json` /
//! `package.json`), not from the document's own grouping.

pub mod aggregate;
pub mod clover;
pub mod discovery;
pub mod metrics;
pub mod report;
pub mod resolver;

pub use aggregate::{aggregate, Aggregate};
pub use clover::{parse_clover, parse_clover_string, CloverDocument, DocumentShape};
pub use metrics::{ClassMetric, Metric, Package, PackageMetric, SummaryMetric};
pub use report::{metric_row, ReportAssembler};
pub use resolver::{FsManifestReader, ManifestReader, PackageResolver, UNKNOWN_PACKAGE};
