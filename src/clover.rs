//! Clover XML format parser
//!
//! Parses a Clover-style coverage document into an explicit tree, then
//! normalizes the known document shapes into one flat file list. Counter
//! attributes must be decimal integers; a malformed counter aborts the parse
//! rather than being silently zeroed.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

use crate::metrics::Metric;

/// A parsed Clover document.
#[derive(Debug, Clone, Default)]
pub struct CloverDocument {
    pub project: ProjectNode,
}

/// The `<project>` element: its own totals plus files, either directly
/// nested or grouped under `<package>` nodes.
#[derive(Debug, Clone, Default)]
pub struct ProjectNode {
    pub metrics: ProjectTotals,
    pub files: Vec<FileNode>,
    pub packages: Vec<PackageNode>,
}

/// Project-level totals from `<project><metrics .../>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectTotals {
    pub files: u64,
    pub metrics: Metric,
}

#[derive(Debug, Clone, Default)]
pub struct PackageNode {
    pub name: String,
    pub files: Vec<FileNode>,
}

#[derive(Debug, Clone, Default)]
pub struct FileNode {
    pub name: String,
    pub metrics: Metric,
    pub classes: Vec<ClassNode>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassNode {
    pub name: String,
    pub complexity: u64,
    pub metrics: Metric,
}

/// The closed set of document shapes a Clover report can take.
///
/// Files listed under one or many `<package>` nodes collapse into the same
/// variant; the document's own grouping is discarded during aggregation
/// because package attribution comes from the filesystem, not the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// Files nested directly under `<project>`.
    ProjectFiles,
    /// Files nested under `<package>` nodes.
    PackageFiles,
}

impl ProjectNode {
    /// Shape check: directly-nested files win when both forms are present.
    pub fn shape(&self) -> DocumentShape {
        if !self.files.is_empty() {
            DocumentShape::ProjectFiles
        } else {
            DocumentShape::PackageFiles
        }
    }

    /// Normalize to the canonical flat file list, in document order.
    pub fn flattened_files(&self) -> Vec<&FileNode> {
        match self.shape() {
            DocumentShape::ProjectFiles => self.files.iter().collect(),
            DocumentShape::PackageFiles => {
                self.packages.iter().flat_map(|p| p.files.iter()).collect()
            }
        }
    }
}

/// Parse a Clover XML file.
pub fn parse_clover(path: &Path) -> Result<CloverDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))?;
    parse_clover_string(&content)
}

/// Parse Clover XML content from a string.
pub fn parse_clover_string(content: &str) -> Result<CloverDocument> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut project: Option<ProjectNode> = None;
    let mut project_totals: Option<ProjectTotals> = None;
    let mut current_package: Option<PackageNode> = None;
    let mut current_file: Option<FileNode> = None;
    let mut current_class: Option<ClassNode> = None;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.name().as_ref() {
                    b"project" => {
                        project = Some(ProjectNode::default());
                    }
                    b"package" => {
                        if project.is_some() {
                            let mut package = PackageNode::default();
                            for attr in e.attributes().filter_map(|a| a.ok()) {
                                if attr.key.as_ref() == b"name" {
                                    package.name = String::from_utf8_lossy(&attr.value).to_string();
                                }
                            }
                            current_package = Some(package);
                        }
                    }
                    b"file" => {
                        if project.is_some() {
                            let mut file = FileNode::default();
                            for attr in e.attributes().filter_map(|a| a.ok()) {
                                if attr.key.as_ref() == b"name" {
                                    file.name = String::from_utf8_lossy(&attr.value).to_string();
                                }
                            }
                            current_file = Some(file);
                        }
                    }
                    b"class" => {
                        if current_file.is_some() {
                            let mut class = ClassNode::default();
                            for attr in e.attributes().filter_map(|a| a.ok()) {
                                if attr.key.as_ref() == b"name" {
                                    class.name = String::from_utf8_lossy(&attr.value).to_string();
                                }
                            }
                            current_class = Some(class);
                        }
                    }
                    b"metrics" => {
                        let attrs = parse_metric_attrs(e)?;
                        if let Some(ref mut class) = current_class {
                            class.complexity = attrs.complexity;
                            class.metrics = attrs.metrics;
                        } else if let Some(ref mut file) = current_file {
                            file.metrics = attrs.metrics;
                        } else if current_package.is_some() {
                            // Package-level totals are not authoritative.
                        } else if project.is_some() {
                            project_totals = Some(ProjectTotals {
                                files: attrs.files,
                                metrics: attrs.metrics,
                            });
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"class" => {
                    if let (Some(ref mut file), Some(class)) =
                        (&mut current_file, current_class.take())
                    {
                        file.classes.push(class);
                    }
                }
                b"file" => {
                    if let Some(file) = current_file.take() {
                        if let Some(ref mut package) = current_package {
                            package.files.push(file);
                        } else if let Some(ref mut proj) = project {
                            proj.files.push(file);
                        }
                    }
                }
                b"package" => {
                    if let (Some(ref mut proj), Some(package)) =
                        (&mut project, current_package.take())
                    {
                        proj.packages.push(package);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("Error parsing Clover XML: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    let mut project = project.context("Malformed Clover report: no <project> element")?;
    project.metrics =
        project_totals.context("Malformed Clover report: <project> has no <metrics>")?;

    Ok(CloverDocument { project })
}

struct MetricAttrs {
    metrics: Metric,
    complexity: u64,
    files: u64,
}

/// Parse the counter attributes of one `<metrics>` element.
fn parse_metric_attrs(e: &BytesStart) -> Result<MetricAttrs> {
    let mut metrics = Metric::default();
    let mut complexity = 0u64;
    let mut files = 0u64;

    for attr in e.attributes().filter_map(|a| a.ok()) {
        let value = String::from_utf8_lossy(&attr.value).to_string();
        let target = match attr.key.as_ref() {
            b"loc" => &mut metrics.loc,
            b"ncloc" => &mut metrics.ncloc,
            b"methods" => &mut metrics.methods,
            b"coveredmethods" => &mut metrics.coveredmethods,
            b"conditionals" => &mut metrics.conditionals,
            b"coveredconditionals" => &mut metrics.coveredconditionals,
            b"statements" => &mut metrics.statements,
            b"coveredstatements" => &mut metrics.coveredstatements,
            b"elements" => &mut metrics.elements,
            b"coveredelements" => &mut metrics.coveredelements,
            b"classes" => &mut metrics.classes,
            b"complexity" => &mut complexity,
            b"files" => &mut files,
            _ => continue,
        };
        *target = value.parse().with_context(|| {
            format!(
                "Invalid counter {}=\"{}\"",
                String::from_utf8_lossy(attr.key.as_ref()),
                value
            )
        })?;
    }

    Ok(MetricAttrs {
        metrics,
        complexity,
        files,
    })
}
