//! Coverage metric types
//!
//! Counter records for the three rollup levels (class, package, project)
//! and the `Package` aggregate that holds them.

use indexmap::IndexMap;

/// Raw coverage counters as reported by a Clover document.
///
/// Every `coveredX` is expected to be `<= X`; the input is trusted and this
/// is not validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metric {
    pub loc: u64,
    pub ncloc: u64,
    pub methods: u64,
    pub coveredmethods: u64,
    pub conditionals: u64,
    pub coveredconditionals: u64,
    pub statements: u64,
    pub coveredstatements: u64,
    pub elements: u64,
    pub coveredelements: u64,
    pub classes: u64,
    pub coveredclasses: u64,
}

impl Metric {
    /// Add a file's counters into this rollup.
    ///
    /// `coveredclasses` is skipped: at package level it is derived from
    /// per-class statement coverage, not from file attributes.
    pub fn add_file_counters(&mut self, file: &Metric) {
        self.loc += file.loc;
        self.ncloc += file.ncloc;
        self.methods += file.methods;
        self.coveredmethods += file.coveredmethods;
        self.conditionals += file.conditionals;
        self.coveredconditionals += file.coveredconditionals;
        self.statements += file.statements;
        self.coveredstatements += file.coveredstatements;
        self.elements += file.elements;
        self.coveredelements += file.coveredelements;
        self.classes += file.classes;
    }
}

/// Metrics for one source class, keyed by class name within its package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetric {
    pub name: String,
    pub complexity: u64,
    pub metrics: Metric,
}

/// Accumulated metrics for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetric {
    pub name: String,
    pub metrics: Metric,
}

/// Project-wide totals.
///
/// `metrics.coveredclasses` is never read from the document (Clover does not
/// report it at project level); it is reconstructed as the sum over packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryMetric {
    pub files: u64,
    pub metrics: Metric,
}

/// One inferred package: its rollup plus its classes in first-seen order.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub metrics: PackageMetric,
    pub classes: IndexMap<String, ClassMetric>,
}

impl Package {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metrics: PackageMetric {
                name: name.to_string(),
                metrics: Metric::default(),
            },
            classes: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_counters_skips_covered_classes() {
        let mut rollup = Metric::default();
        let file = Metric {
            loc: 10,
            ncloc: 8,
            methods: 4,
            coveredmethods: 2,
            statements: 20,
            coveredstatements: 15,
            elements: 24,
            coveredelements: 17,
            classes: 2,
            coveredclasses: 2,
            ..Metric::default()
        };

        rollup.add_file_counters(&file);
        rollup.add_file_counters(&file);

        assert_eq!(rollup.loc, 20);
        assert_eq!(rollup.statements, 40);
        assert_eq!(rollup.coveredstatements, 30);
        assert_eq!(rollup.classes, 4);
        assert_eq!(rollup.coveredclasses, 0);
    }

    #[test]
    fn test_new_package_is_zeroed() {
        let package = Package::new("acme/core");
        assert_eq!(package.metrics.name, "acme/core");
        assert_eq!(package.metrics.metrics, Metric::default());
        assert!(package.classes.is_empty());
    }
}
