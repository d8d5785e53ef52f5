//! Filters parsed from the `;`-separated pattern language.
//!
//! ```text
//! pattern := clause (';' clause)*
//! clause  := limit | ['!'] [module '/'] name
//! limit   := ('maxarray' | 'maxdepth' | 'maxrefs' | 'maxbytes') '=' ['+'] digits
//! name    := Class | pkg '.*' | pkg '.**' | prefix '*'
//! ```
//!
//! Class clauses are tried left to right and the first match decides.
//! For each limit keyword the last assignment wins. A limit is exceeded
//! only when the observed value is strictly greater than it.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Filter, FilterError};
use crate::types::{FilterInfo, SerialClass, Status};

static MODULE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}_$][\w$]*(\.[\p{L}_$][\w$]*)*$").unwrap());
static CLASS_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w$.]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unknown limit: {name}")]
    UnknownLimit { name: String },

    #[error("invalid limit value in \"{clause}\": {value:?}")]
    InvalidLimitValue { clause: String, value: String },

    #[error("negative limit in \"{clause}\": {value}")]
    NegativeLimit { clause: String, value: String },

    #[error("module name is missing in: \"{clause}\"")]
    MissingModule { clause: String },

    #[error("invalid module name {module:?} in: \"{clause}\"")]
    InvalidModule { clause: String, module: String },

    #[error("package missing in: \"{clause}\"")]
    MissingPackage { clause: String },

    #[error("class or package missing in: \"{clause}\"")]
    MissingClass { clause: String },

    #[error("misplaced wildcard in: \"{clause}\"")]
    MisplacedWildcard { clause: String },

    #[error("invalid class name in: \"{clause}\"")]
    InvalidClassName { clause: String },
}

/// Resource ceilings. `None` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_array: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_refs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
}

impl Limits {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn exceeded_by(&self, info: &FilterInfo) -> bool {
        fn over(limit: Option<u64>, value: u64) -> bool {
            limit.is_some_and(|max| value > max)
        }

        over(self.max_depth, info.depth())
            || over(self.max_refs, info.references())
            || over(self.max_bytes, info.stream_bytes())
            || info
                .array_length()
                .is_some_and(|len| over(self.max_array, len))
    }

    fn assign(&mut self, clause: &str, name: &str, value: &str) -> Result<(), PatternError> {
        let slot = match name {
            "maxarray" => &mut self.max_array,
            "maxdepth" => &mut self.max_depth,
            "maxrefs" => &mut self.max_refs,
            "maxbytes" => &mut self.max_bytes,
            _ => {
                return Err(PatternError::UnknownLimit {
                    name: name.to_string(),
                });
            }
        };
        *slot = Some(parse_limit_value(clause, value)?);
        Ok(())
    }
}

fn parse_limit_value(clause: &str, value: &str) -> Result<u64, PatternError> {
    let parsed: i64 = value
        .parse()
        .map_err(|_| PatternError::InvalidLimitValue {
            clause: clause.to_string(),
            value: value.to_string(),
        })?;
    u64::try_from(parsed).map_err(|_| PatternError::NegativeLimit {
        clause: clause.to_string(),
        value: value.to_string(),
    })
}

/// Name test of a single class clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassMatcher {
    /// `pkg.Class`
    Exact(String),
    /// `pkg.*`: classes directly in the package.
    Package(String),
    /// `pkg.**`: the package and its sub-packages. Stored with the trailing dot.
    PackageTree(String),
    /// `prefix*`, and bare `*` as the empty prefix.
    Prefix(String),
}

impl ClassMatcher {
    pub fn matches(&self, class: &SerialClass) -> bool {
        match self {
            ClassMatcher::Exact(name) => class.name() == name,
            ClassMatcher::Package(pkg) => class.package_name() == pkg,
            ClassMatcher::PackageTree(prefix) | ClassMatcher::Prefix(prefix) => {
                class.name().starts_with(prefix.as_str())
            }
        }
    }

    fn parse(clause: &str, body: &str) -> Result<Self, PatternError> {
        if let Some(pkg) = body.strip_suffix(".**") {
            if pkg.is_empty() {
                return Err(PatternError::MissingPackage {
                    clause: clause.to_string(),
                });
            }
            check_name(clause, pkg)?;
            return Ok(ClassMatcher::PackageTree(format!("{pkg}.")));
        }
        if let Some(pkg) = body.strip_suffix(".*") {
            if pkg.is_empty() {
                return Err(PatternError::MissingPackage {
                    clause: clause.to_string(),
                });
            }
            check_name(clause, pkg)?;
            return Ok(ClassMatcher::Package(pkg.to_string()));
        }
        if let Some(prefix) = body.strip_suffix('*') {
            if !prefix.is_empty() {
                check_name(clause, prefix)?;
            }
            return Ok(ClassMatcher::Prefix(prefix.to_string()));
        }
        if body.is_empty() {
            return Err(PatternError::MissingClass {
                clause: clause.to_string(),
            });
        }
        check_name(clause, body)?;
        Ok(ClassMatcher::Exact(body.to_string()))
    }
}

fn check_name(clause: &str, name: &str) -> Result<(), PatternError> {
    if name.contains('*') {
        return Err(PatternError::MisplacedWildcard {
            clause: clause.to_string(),
        });
    }
    if !CLASS_NAME.is_match(name) {
        return Err(PatternError::InvalidClassName {
            clause: clause.to_string(),
        });
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ClassClause {
    module: Option<String>,
    matcher: ClassMatcher,
    negate: bool,
}

impl ClassClause {
    fn parse(clause: &str) -> Result<Self, PatternError> {
        let (negate, rest) = match clause.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, clause),
        };

        let (module, body) = match rest.split_once('/') {
            Some(("", _)) => {
                return Err(PatternError::MissingModule {
                    clause: clause.to_string(),
                });
            }
            Some((module, body)) => {
                if !MODULE_NAME.is_match(module) {
                    return Err(PatternError::InvalidModule {
                        clause: clause.to_string(),
                        module: module.to_string(),
                    });
                }
                (Some(module.to_string()), body)
            }
            None => (None, rest),
        };

        Ok(Self {
            module,
            matcher: ClassMatcher::parse(clause, body)?,
            negate,
        })
    }

    fn evaluate(&self, class: &SerialClass) -> Status {
        if let Some(module) = &self.module
            && class.module() != Some(module.as_str())
        {
            return Status::Undecided;
        }
        match (self.matcher.matches(class), self.negate) {
            (false, _) => Status::Undecided,
            (true, false) => Status::Allowed,
            (true, true) => Status::Rejected,
        }
    }
}

/// Filter compiled from a pattern string.
///
/// # Example
///
/// ```rust
/// use serial_filter::filter::PatternFilter;
/// use serial_filter::{FilterInfo, SerialClass, Status};
///
/// let filter = PatternFilter::parse("java.lang.Integer;!java.lang.**")
///     .unwrap()
///     .unwrap();
/// let integer = FilterInfo::for_class(SerialClass::object("java.lang.Integer"));
/// let long = FilterInfo::for_class(SerialClass::object("java.lang.Long"));
/// assert_eq!(filter.evaluate(&integer), Status::Allowed);
/// assert_eq!(filter.evaluate(&long), Status::Rejected);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternFilter {
    pattern: String,
    clauses: Vec<ClassClause>,
    limits: Limits,
}

impl PatternFilter {
    /// Parse `pattern`. Returns `Ok(None)` when it contains no clauses.
    pub fn parse(pattern: &str) -> Result<Option<Self>, PatternError> {
        let mut clauses = Vec::new();
        let mut limits = Limits::default();
        let mut seen_clause = false;

        for clause in pattern.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            seen_clause = true;
            if let Some((name, value)) = clause.split_once('=') {
                limits.assign(clause, name, value)?;
            } else {
                clauses.push(ClassClause::parse(clause)?);
            }
        }

        if !seen_clause {
            return Ok(None);
        }

        tracing::trace!(
            pattern,
            class_clauses = clauses.len(),
            limits = ?limits,
            "parsed filter pattern"
        );

        Ok(Some(Self {
            pattern: pattern.to_string(),
            clauses,
            limits,
        }))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn class_clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn evaluate(&self, info: &FilterInfo) -> Status {
        if self.limits.exceeded_by(info) {
            return Status::Rejected;
        }
        let Some(class) = info.serial_class() else {
            return Status::Undecided;
        };
        let base = class.base_component();
        if base.is_primitive() {
            return Status::Undecided;
        }
        self.clauses
            .iter()
            .map(|clause| clause.evaluate(base))
            .find(|status| !status.is_undecided())
            .unwrap_or(Status::Undecided)
    }
}

impl Filter for PatternFilter {
    fn check_input(&self, info: &FilterInfo) -> Result<Status, FilterError> {
        Ok(self.evaluate(info))
    }
}

impl fmt::Display for PatternFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    fn parse(pattern: &str) -> PatternFilter {
        PatternFilter::parse(pattern).unwrap().unwrap()
    }

    fn class(name: &str) -> FilterInfo {
        FilterInfo::for_class(SerialClass::object(name))
    }

    #[test]
    fn test_first_match_wins() {
        let filter = parse("java.lang.Integer;!java.lang.**");
        assert_eq!(filter.evaluate(&class("java.lang.Integer")), Status::Allowed);
        assert_eq!(filter.evaluate(&class("java.lang.Long")), Status::Rejected);
        assert_eq!(filter.evaluate(&class("java.util.List")), Status::Undecided);
    }

    #[test]
    fn test_package_wildcards() {
        let direct = parse("java.util.*");
        assert_eq!(direct.evaluate(&class("java.util.List")), Status::Allowed);
        assert_eq!(
            direct.evaluate(&class("java.util.concurrent.Future")),
            Status::Undecided
        );

        let tree = parse("java.util.**");
        assert_eq!(tree.evaluate(&class("java.util.List")), Status::Allowed);
        assert_eq!(
            tree.evaluate(&class("java.util.concurrent.Future")),
            Status::Allowed
        );
        assert_eq!(tree.evaluate(&class("java.utility.X")), Status::Undecided);
    }

    #[test]
    fn test_prefix_and_star() {
        let prefix = parse("java.lang.Str*");
        assert_eq!(prefix.evaluate(&class("java.lang.String")), Status::Allowed);
        assert_eq!(
            prefix.evaluate(&class("java.lang.StringBuilder")),
            Status::Allowed
        );
        assert_eq!(prefix.evaluate(&class("java.lang.Long")), Status::Undecided);

        let all = parse("!*");
        assert_eq!(all.evaluate(&class("anything.At.All")), Status::Rejected);
    }

    #[test]
    fn test_module_clause() {
        let filter = parse("java.base/java.lang.*;!*");
        let base = FilterInfo::for_class(SerialClass::object("java.lang.Integer").in_module("java.base"));
        let other = FilterInfo::for_class(SerialClass::object("java.lang.Integer").in_module("app"));
        assert_eq!(filter.evaluate(&base), Status::Allowed);
        assert_eq!(filter.evaluate(&other), Status::Rejected);
        assert_eq!(filter.evaluate(&class("java.lang.Integer")), Status::Rejected);

        let negated = parse("!app/com.example.**");
        let app = FilterInfo::for_class(SerialClass::object("com.example.A").in_module("app"));
        assert_eq!(negated.evaluate(&app), Status::Rejected);
    }

    #[test]
    fn test_limit_boundaries() {
        let filter = parse("maxarray=5");
        let ints = SerialClass::array_of(&SerialClass::primitive(Primitive::Int));
        assert_eq!(
            filter.evaluate(&FilterInfo::for_array(ints.clone(), 5)),
            Status::Undecided
        );
        assert_eq!(
            filter.evaluate(&FilterInfo::for_array(ints, 6)),
            Status::Rejected
        );
    }

    #[test]
    fn test_last_limit_wins() {
        let filter = parse("maxarray=10;maxarray=20");
        assert_eq!(filter.limits().max_array, Some(20));
        let objects = SerialClass::array_of(&SerialClass::object("java.lang.Object"));
        assert!(!filter.evaluate(&FilterInfo::for_array(objects.clone(), 20)).is_rejected());
        assert!(filter.evaluate(&FilterInfo::for_array(objects, 21)).is_rejected());

        let filter = parse("maxdepth=3;java.util.*;maxdepth=+7");
        assert_eq!(filter.limits().max_depth, Some(7));
    }

    #[test]
    fn test_limits_override_class_verdict() {
        let filter = parse("java.util.*;maxdepth=2;maxrefs=10;maxbytes=100");
        let ok = class("java.util.List").with_depth(2).with_references(10);
        assert_eq!(filter.evaluate(&ok), Status::Allowed);
        assert_eq!(filter.evaluate(&ok.clone().with_depth(3)), Status::Rejected);
        assert_eq!(
            filter.evaluate(&ok.clone().with_references(11)),
            Status::Rejected
        );
        assert_eq!(filter.evaluate(&ok.with_stream_bytes(101)), Status::Rejected);
    }

    #[test]
    fn test_limits_without_class() {
        let filter = parse("maxrefs=1");
        let info = FilterInfo::limits_only().with_references(1);
        assert_eq!(filter.evaluate(&info), Status::Undecided);
        assert_eq!(filter.evaluate(&info.with_references(2)), Status::Rejected);
    }

    #[test]
    fn test_arrays_match_base_type() {
        let filter = parse("!java.lang.Long");
        let longs = SerialClass::array_of(&SerialClass::array_of(&SerialClass::object(
            "java.lang.Long",
        )));
        assert_eq!(filter.evaluate(&FilterInfo::for_array(longs, 1)), Status::Rejected);

        let ints = SerialClass::array_of(&SerialClass::primitive(Primitive::Int));
        assert_eq!(
            parse("!*").evaluate(&FilterInfo::for_array(ints, 1)),
            Status::Undecided
        );
    }

    #[test]
    fn test_whitespace_and_empty_clauses() {
        let filter = parse("  java.util.List ; ;; !java.io.* ");
        assert_eq!(filter.class_clause_count(), 2);
        assert_eq!(filter.evaluate(&class("java.util.List")), Status::Allowed);
        assert_eq!(filter.evaluate(&class("java.io.File")), Status::Rejected);
        assert!(PatternFilter::parse(";;;").unwrap().is_none());
    }

    #[test]
    fn test_limit_errors() {
        assert!(matches!(
            PatternFilter::parse("maxdepth=-1"),
            Err(PatternError::NegativeLimit { .. })
        ));
        assert!(matches!(
            PatternFilter::parse("maxdepth="),
            Err(PatternError::InvalidLimitValue { .. })
        ));
        assert!(matches!(
            PatternFilter::parse("maxrefs=ten"),
            Err(PatternError::InvalidLimitValue { .. })
        ));
        assert!(matches!(
            PatternFilter::parse("maxobjects=5"),
            Err(PatternError::UnknownLimit { .. })
        ));
        assert!(matches!(
            PatternFilter::parse("maxdepth =5"),
            Err(PatternError::UnknownLimit { .. })
        ));
    }

    #[test]
    fn test_class_clause_errors() {
        let cases = [
            ("/java.lang.Integer", "missing module"),
            ("!/x.Y", "missing module"),
            ("java base/x.Y", "invalid module"),
            ("java.*.lang", "wildcard"),
            ("java.lang.***", "wildcard"),
            (".*", "package"),
            (".**", "package"),
            ("!", "class"),
            ("java.base/", "class"),
            ("a/b/C", "class name"),
        ];
        for (pattern, hint) in cases {
            let err = PatternFilter::parse(pattern).unwrap_err();
            assert!(
                err.to_string().contains(hint.split(' ').next_back().unwrap()),
                "{pattern}: {err}"
            );
        }
    }

    #[test]
    fn test_display_is_pattern() {
        let filter = parse("java.util.*;maxdepth=4");
        assert_eq!(filter.to_string(), "java.util.*;maxdepth=4");
        assert_eq!(filter.pattern(), "java.util.*;maxdepth=4");
    }
}
