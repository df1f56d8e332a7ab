//! Metrics aggregation
//!
//! Turns the canonical flat file list of a parsed document into per-package
//! rollups plus the project summary. Package attribution comes from the
//! resolver, not from the document's own grouping.

use indexmap::IndexMap;

use crate::clover::{ClassNode, CloverDocument};
use crate::metrics::{ClassMetric, Metric, Package, SummaryMetric};
use crate::resolver::{ManifestReader, PackageResolver};

/// The result of one aggregation pass over a document.
#[derive(Debug, Clone)]
pub struct Aggregate {
    /// Packages in first-seen order.
    pub packages: IndexMap<String, Package>,
    pub summary: SummaryMetric,
}

/// Aggregate a parsed document into package rollups and the project summary.
pub fn aggregate<R: ManifestReader>(
    doc: &CloverDocument,
    resolver: &mut PackageResolver<R>,
) -> Aggregate {
    let mut packages: IndexMap<String, Package> = IndexMap::new();

    for file in doc.project.flattened_files() {
        let package_name = resolver.resolve(&file.name);
        let package = packages
            .entry(package_name.clone())
            .or_insert_with(|| Package::new(&package_name));

        package.metrics.metrics.add_file_counters(&file.metrics);

        for class in &file.classes {
            let covered = if is_fully_covered(class) { 1 } else { 0 };

            let mut class_counters = class.metrics;
            class_counters.classes = 1;
            class_counters.coveredclasses = covered;

            // Last write wins on the value; the first-seen position stays.
            package.classes.insert(
                class.name.clone(),
                ClassMetric {
                    name: class.name.clone(),
                    complexity: class.complexity,
                    metrics: class_counters,
                },
            );
            package.metrics.metrics.coveredclasses += covered;
        }
    }

    // Project totals come straight from the document, except the covered
    // class count, which Clover does not report at project level.
    let mut totals: Metric = doc.project.metrics.metrics;
    totals.coveredclasses = packages
        .values()
        .map(|p| p.metrics.metrics.coveredclasses)
        .sum();

    Aggregate {
        packages,
        summary: SummaryMetric {
            files: doc.project.metrics.files,
            metrics: totals,
        },
    }
}

/// A class counts as covered when its truncated statement percentage is 100.
/// Zero statements means not covered.
fn is_fully_covered(class: &ClassNode) -> bool {
    class.metrics.statements > 0
        && class.metrics.coveredstatements * 100 / class.metrics.statements == 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clover::parse_clover_string;
    use crate::resolver::UNKNOWN_PACKAGE;
    use std::collections::HashMap;
    use std::path::Path;

    struct TableReader(HashMap<String, String>);

    impl TableReader {
        fn new(answers: &[(&str, &str)]) -> Self {
            Self(
                answers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ManifestReader for TableReader {
        fn package_name(&self, dir: &Path) -> Option<String> {
            self.0.get(&dir.to_string_lossy().to_string()).cloned()
        }
    }

    fn file_xml(name: &str, statements: u64, covered: u64, class_name: &str) -> String {
        format!(
            r#"<file name="{name}">
  <metrics classes="1" loc="20" ncloc="18" methods="2" coveredmethods="1"
           conditionals="0" coveredconditionals="0" statements="{statements}" coveredstatements="{covered}"
           elements="{statements}" coveredelements="{covered}"/>
  <class name="{class_name}">
    <metrics complexity="2" loc="20" ncloc="18" methods="2" coveredmethods="1"
             conditionals="0" coveredconditionals="0" statements="{statements}" coveredstatements="{covered}"
             elements="{statements}" coveredelements="{covered}"/>
  </class>
</file>"#
        )
    }

    fn two_package_report(wrap_in_packages: bool) -> String {
        let file_a = file_xml("/repo/pkg-a/src/A.php", 10, 10, "A");
        let file_b = file_xml("/repo/pkg-b/src/B.php", 10, 5, "B");
        let body = if wrap_in_packages {
            format!(
                "<package name=\"ignored-a\">{file_a}</package><package name=\"ignored-b\">{file_b}</package>"
            )
        } else {
            format!("{file_a}{file_b}")
        };
        format!(
            r#"<coverage>
  <project>
    <metrics files="2" loc="40" ncloc="36" classes="2" methods="4" coveredmethods="2"
             conditionals="0" coveredconditionals="0" statements="20" coveredstatements="15"
             elements="20" coveredelements="15"/>
    {body}
  </project>
</coverage>"#
        )
    }

    fn resolver_for_two_packages() -> PackageResolver<TableReader> {
        PackageResolver::with_reader(TableReader::new(&[
            ("/repo/pkg-a", "acme/pkg-a"),
            ("/repo/pkg-b", "acme/pkg-b"),
        ]))
    }

    #[test]
    fn test_two_package_rollup() {
        let doc = parse_clover_string(&two_package_report(false)).unwrap();
        let mut resolver = resolver_for_two_packages();

        let agg = aggregate(&doc, &mut resolver);

        let names: Vec<&String> = agg.packages.keys().collect();
        assert_eq!(names, vec!["acme/pkg-a", "acme/pkg-b"]);

        let pkg_a = &agg.packages["acme/pkg-a"];
        assert_eq!(pkg_a.metrics.metrics.statements, 10);
        assert_eq!(pkg_a.metrics.metrics.coveredclasses, 1);
        assert!(pkg_a.classes.contains_key("A"));

        let pkg_b = &agg.packages["acme/pkg-b"];
        assert_eq!(pkg_b.metrics.metrics.coveredclasses, 0);

        assert_eq!(agg.summary.files, 2);
        assert_eq!(agg.summary.metrics.statements, 20);
        assert_eq!(agg.summary.metrics.coveredstatements, 15);
        assert_eq!(agg.summary.metrics.classes, 2);
        // Reconstructed, not read from the document.
        assert_eq!(agg.summary.metrics.coveredclasses, 1);
    }

    #[test]
    fn test_package_grouping_is_ignored() {
        let direct = parse_clover_string(&two_package_report(false)).unwrap();
        let grouped = parse_clover_string(&two_package_report(true)).unwrap();

        let direct_agg = aggregate(&direct, &mut resolver_for_two_packages());
        let grouped_agg = aggregate(&grouped, &mut resolver_for_two_packages());

        let direct_names: Vec<&String> = direct_agg.packages.keys().collect();
        let grouped_names: Vec<&String> = grouped_agg.packages.keys().collect();
        assert_eq!(direct_names, grouped_names);
        assert_eq!(direct_agg.summary, grouped_agg.summary);
        for (name, package) in &direct_agg.packages {
            assert_eq!(package.metrics.metrics, grouped_agg.packages[name].metrics.metrics);
        }
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let doc = parse_clover_string(&two_package_report(false)).unwrap();
        let mut resolver = resolver_for_two_packages();

        let first = aggregate(&doc, &mut resolver);
        let second = aggregate(&doc, &mut resolver);

        assert_eq!(first.summary, second.summary);
        assert_eq!(first.packages.len(), second.packages.len());
        for (name, package) in &first.packages {
            assert_eq!(package.metrics.metrics, second.packages[name].metrics.metrics);
        }
    }

    #[test]
    fn test_duplicate_class_name_last_write_wins() {
        let xml = format!(
            r#"<coverage>
  <project>
    <metrics files="2" loc="40" ncloc="36" classes="2" methods="4" coveredmethods="2"
             conditionals="0" coveredconditionals="0" statements="20" coveredstatements="15"
             elements="20" coveredelements="15"/>
    {}
    {}
  </project>
</coverage>"#,
            file_xml("/repo/pkg-a/src/A.php", 10, 10, "Dup"),
            file_xml("/repo/pkg-a/lib/B.php", 10, 5, "Dup"),
        );

        let doc = parse_clover_string(&xml).unwrap();
        let mut resolver =
            PackageResolver::with_reader(TableReader::new(&[("/repo/pkg-a", "acme/pkg-a")]));
        let agg = aggregate(&doc, &mut resolver);

        let pkg = &agg.packages["acme/pkg-a"];
        assert_eq!(pkg.classes.len(), 1);
        assert_eq!(pkg.classes["Dup"].metrics.coveredstatements, 5);
        // Both sightings still feed the covered-class counter.
        assert_eq!(pkg.metrics.metrics.coveredclasses, 1);
    }

    #[test]
    fn test_file_without_classes_contributes_counters_only() {
        let xml = r#"<coverage>
  <project>
    <metrics files="1" loc="20" ncloc="18" classes="0" methods="2" coveredmethods="2"
             conditionals="0" coveredconditionals="0" statements="10" coveredstatements="10"
             elements="12" coveredelements="12"/>
    <file name="/repo/pkg-a/helpers.php">
      <metrics classes="0" loc="20" ncloc="18" methods="2" coveredmethods="2"
               conditionals="0" coveredconditionals="0" statements="10" coveredstatements="10"
               elements="12" coveredelements="12"/>
    </file>
  </project>
</coverage>"#;

        let doc = parse_clover_string(xml).unwrap();
        let mut resolver =
            PackageResolver::with_reader(TableReader::new(&[("/repo/pkg-a", "acme/pkg-a")]));
        let agg = aggregate(&doc, &mut resolver);

        let pkg = &agg.packages["acme/pkg-a"];
        assert!(pkg.classes.is_empty());
        assert_eq!(pkg.metrics.metrics.statements, 10);
        assert_eq!(pkg.metrics.metrics.coveredclasses, 0);
    }

    #[test]
    fn test_unresolvable_files_bucket_under_unknown() {
        let doc = parse_clover_string(&two_package_report(false)).unwrap();
        let mut resolver = PackageResolver::with_reader(TableReader::new(&[]));

        let agg = aggregate(&doc, &mut resolver);

        assert_eq!(agg.packages.len(), 1);
        assert!(agg.packages.contains_key(UNKNOWN_PACKAGE));
    }

    #[test]
    fn test_zero_statement_class_is_not_covered() {
        let xml = format!(
            r#"<coverage>
  <project>
    <metrics files="1" loc="20" ncloc="18" classes="1" methods="0" coveredmethods="0"
             conditionals="0" coveredconditionals="0" statements="0" coveredstatements="0"
             elements="0" coveredelements="0"/>
    {}
  </project>
</coverage>"#,
            file_xml("/repo/pkg-a/src/Empty.php", 0, 0, "Empty"),
        );

        let doc = parse_clover_string(&xml).unwrap();
        let mut resolver =
            PackageResolver::with_reader(TableReader::new(&[("/repo/pkg-a", "acme/pkg-a")]));
        let agg = aggregate(&doc, &mut resolver);

        assert_eq!(agg.packages["acme/pkg-a"].metrics.metrics.coveredclasses, 0);
        assert_eq!(agg.summary.metrics.coveredclasses, 0);
    }
}
