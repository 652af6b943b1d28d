//! Package and capability model shared by all backends.

use std::{cmp::Ordering, fmt, sync::Arc};

use serde::Serialize;

use crate::{error::YumError, version::Evr, YumResult};

/// Relational operator of a versioned capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Comparison {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Comparison {
    /// Parses the `flags` attribute used in repository metadata (`LT`, `LE`, ...).
    pub fn from_flags(flags: &str) -> Option<Self> {
        match flags {
            "LT" => Some(Self::Lt),
            "LE" => Some(Self::Le),
            "EQ" => Some(Self::Eq),
            "GE" => Some(Self::Ge),
            "GT" => Some(Self::Gt),
            _ => None,
        }
    }

    /// Parses an operator as written in a requirement string.
    pub fn from_operator(op: &str) -> Option<Self> {
        match op {
            "<" => Some(Self::Lt),
            "<=" | "=<" => Some(Self::Le),
            "=" | "==" => Some(Self::Eq),
            ">=" | "=>" => Some(Self::Ge),
            ">" => Some(Self::Gt),
            _ => None,
        }
    }

    pub fn as_operator(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }

    fn less(self) -> bool {
        matches!(self, Self::Lt | Self::Le)
    }

    fn equal(self) -> bool {
        matches!(self, Self::Le | Self::Eq | Self::Ge)
    }

    fn greater(self) -> bool {
        matches!(self, Self::Gt | Self::Ge)
    }
}

/// Version range attached to a capability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Constraint {
    pub op: Comparison,
    pub evr: Evr,
}

impl Constraint {
    /// Whether the ranges described by `self` and `other` intersect.
    pub fn overlaps(&self, other: &Constraint) -> bool {
        match self.evr.compare_for_range(&other.evr) {
            Ordering::Less => self.op.greater() || other.op.less(),
            Ordering::Greater => self.op.less() || other.op.greater(),
            Ordering::Equal => {
                (self.op.equal() && other.op.equal())
                    || (self.op.less() && other.op.less())
                    || (self.op.greater() && other.op.greater())
            }
        }
    }
}

/// A named capability, optionally restricted to a version range.
///
/// Used both for what a package provides and for what it (or a query) requires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub name: String,
    pub constraint: Option<Constraint>,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
        }
    }

    pub fn with_constraint(name: impl Into<String>, op: Comparison, evr: Evr) -> Self {
        Self {
            name: name.into(),
            constraint: Some(Constraint { op, evr }),
        }
    }

    /// Parses `name [op evr]`, e.g. `libc.so.6`, `bash >= 5.1` or `python3 = 3:3.9.18-1`.
    pub fn parse(requirement: &str) -> YumResult<Self> {
        let invalid = || YumError::InvalidRequirement(requirement.to_string());
        let mut parts = requirement.split_whitespace();

        let name = parts.next().ok_or_else(invalid)?;
        let Some(op) = parts.next() else {
            return Ok(Self::new(name));
        };

        let op = Comparison::from_operator(op).ok_or_else(invalid)?;
        let evr = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::with_constraint(name, op, Evr::parse(evr)))
    }

    /// Whether this provided capability satisfies `required`.
    ///
    /// An unversioned side matches any version of the same name.
    pub fn satisfies(&self, required: &Capability) -> bool {
        if self.name != required.name {
            return false;
        }
        match (&self.constraint, &required.constraint) {
            (Some(provided), Some(required)) => provided.overlaps(required),
            _ => true,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(constraint) => {
                write!(
                    f,
                    "{} {} {}",
                    self.name,
                    constraint.op.as_operator(),
                    constraint.evr
                )
            }
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    pub arch: String,
    pub evr: Evr,
    pub summary: String,
    /// Path of the RPM relative to the repository base URL.
    pub location: String,
    pub provides: Vec<Capability>,
    pub requires: Vec<Capability>,
    pub files: Vec<String>,
}

impl Package {
    pub fn version(&self) -> &str {
        &self.evr.version
    }

    pub fn release(&self) -> &str {
        self.evr.release.as_deref().unwrap_or("")
    }

    /// `name-[epoch:]version-release.arch`
    pub fn nevra(&self) -> String {
        format!("{}-{}.{}", self.name, self.evr, self.arch)
    }

    /// Whether the package answers a name query with optional exact version and
    /// release.
    pub fn matches_name(&self, name: &str, version: Option<&str>, release: Option<&str>) -> bool {
        self.name == name
            && version.map_or(true, |v| self.version() == v)
            && release.map_or(true, |r| self.release() == r)
    }

    /// Whether the package satisfies `required` through its own name, one of its
    /// provides, or (for paths) one of its files.
    pub fn provides_capability(&self, required: &Capability) -> bool {
        let own = Capability::with_constraint(self.name.clone(), Comparison::Eq, self.evr.clone());
        if own.satisfies(required) {
            return true;
        }

        if self.provides.iter().any(|p| p.satisfies(required)) {
            return true;
        }

        required.constraint.is_none()
            && required.name.starts_with('/')
            && self.files.iter().any(|f| *f == required.name)
    }
}

/// Returns the package with the highest EVR, keeping the first one on ties.
pub fn latest<'a, I>(packages: I) -> Option<&'a Arc<Package>>
where
    I: IntoIterator<Item = &'a Arc<Package>>,
{
    packages.into_iter().fold(None, |best, pkg| {
        match best {
            Some(current) if pkg.evr.compare(&current.evr) != Ordering::Greater => Some(current),
            _ => Some(pkg),
        }
    })
}

/// Newest package named `name`, optionally pinned to a version and release.
pub fn find_latest_matching_name(
    packages: &[Arc<Package>],
    name: &str,
    version: Option<&str>,
    release: Option<&str>,
) -> YumResult<Arc<Package>> {
    latest(
        packages
            .iter()
            .filter(|pkg| pkg.matches_name(name, version, release)),
    )
    .cloned()
    .ok_or_else(|| {
        let mut query = name.to_string();
        if let Some(version) = version {
            query.push_str(&format!("-{version}"));
        }
        if let Some(release) = release {
            query.push_str(&format!("-{release}"));
        }
        YumError::PackageNotFound(query)
    })
}

/// Newest package satisfying the requirement string `requirement`.
pub fn find_latest_matching_require(
    packages: &[Arc<Package>],
    requirement: &str,
) -> YumResult<Arc<Package>> {
    let required = Capability::parse(requirement)?;
    latest(
        packages
            .iter()
            .filter(|pkg| pkg.provides_capability(&required)),
    )
    .cloned()
    .ok_or_else(|| YumError::PackageNotFound(requirement.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str, evr: &str) -> Arc<Package> {
        Arc::new(Package {
            name: name.to_string(),
            arch: "x86_64".to_string(),
            evr: Evr::parse(evr),
            ..Default::default()
        })
    }

    #[test]
    fn test_capability_parse() {
        assert_eq!(Capability::parse("libc.so.6").unwrap(), Capability::new("libc.so.6"));
        assert_eq!(
            Capability::parse("bash >= 5.1").unwrap(),
            Capability::with_constraint("bash", Comparison::Ge, Evr::parse("5.1"))
        );
        assert_eq!(
            Capability::parse("python3 == 3:3.9.18-1").unwrap(),
            Capability::with_constraint("python3", Comparison::Eq, Evr::parse("3:3.9.18-1"))
        );
        assert!(Capability::parse("").is_err());
        assert!(Capability::parse("bash ~> 5").is_err());
        assert!(Capability::parse("bash >=").is_err());
        assert!(Capability::parse("bash >= 5 6").is_err());
    }

    #[test]
    fn test_satisfies() {
        let provided = Capability::with_constraint("bash", Comparison::Eq, Evr::parse("5.1.8-9"));
        assert!(provided.satisfies(&Capability::parse("bash").unwrap()));
        assert!(provided.satisfies(&Capability::parse("bash >= 5.1").unwrap()));
        assert!(provided.satisfies(&Capability::parse("bash = 5.1.8").unwrap()));
        assert!(!provided.satisfies(&Capability::parse("bash > 5.1.8-9").unwrap()));
        assert!(!provided.satisfies(&Capability::parse("bash < 5").unwrap()));
        assert!(!provided.satisfies(&Capability::parse("zsh").unwrap()));

        let unversioned = Capability::new("webserver");
        assert!(unversioned.satisfies(&Capability::parse("webserver >= 2").unwrap()));
    }

    #[test]
    fn test_provides_capability_files_and_name() {
        let mut pkg = Package {
            name: "bash".into(),
            evr: Evr::parse("5.1.8-9.el9"),
            files: vec!["/usr/bin/bash".into()],
            provides: vec![Capability::new("/bin/sh")],
            ..Default::default()
        };
        assert!(pkg.provides_capability(&Capability::parse("/usr/bin/bash").unwrap()));
        assert!(pkg.provides_capability(&Capability::parse("/bin/sh").unwrap()));
        assert!(pkg.provides_capability(&Capability::parse("bash >= 5").unwrap()));
        assert!(!pkg.provides_capability(&Capability::parse("bash >= 6").unwrap()));

        pkg.files.clear();
        assert!(!pkg.provides_capability(&Capability::parse("/usr/bin/bash").unwrap()));
    }

    #[test]
    fn test_find_latest_matching_name() {
        let packages = vec![
            package("bash", "5.1.8-6.el9"),
            package("bash", "5.1.8-9.el9"),
            package("bash", "5.0.17-2.el9"),
            package("zsh", "5.8-9.el9"),
        ];

        let pkg = find_latest_matching_name(&packages, "bash", None, None).unwrap();
        assert_eq!(pkg.release(), "9.el9");

        let pkg = find_latest_matching_name(&packages, "bash", Some("5.1.8"), Some("6.el9")).unwrap();
        assert_eq!(pkg.nevra(), "bash-5.1.8-6.el9.x86_64");

        assert!(matches!(
            find_latest_matching_name(&packages, "fish", None, None),
            Err(YumError::PackageNotFound(name)) if name == "fish"
        ));
    }

    #[test]
    fn test_find_latest_matching_require() {
        let mut old = (*package("coreutils", "8.32-31.el9")).clone();
        old.provides.push(Capability::with_constraint(
            "coreutils-common",
            Comparison::Eq,
            Evr::parse("8.32-31.el9"),
        ));
        let mut new = (*package("coreutils", "8.32-34.el9")).clone();
        new.provides.push(Capability::with_constraint(
            "coreutils-common",
            Comparison::Eq,
            Evr::parse("8.32-34.el9"),
        ));
        let packages = vec![Arc::new(old), Arc::new(new)];

        let pkg = find_latest_matching_require(&packages, "coreutils-common").unwrap();
        assert_eq!(pkg.release(), "34.el9");

        let pkg =
            find_latest_matching_require(&packages, "coreutils-common < 8.32-33").unwrap();
        assert_eq!(pkg.release(), "31.el9");

        assert!(find_latest_matching_require(&packages, "busybox").is_err());
    }

    #[test]
    fn test_latest_keeps_first_on_tie() {
        let first = package("bash", "5.1-1");
        let second = package("bash", "0:5.1-1");
        let packages = [first.clone(), second];
        assert!(Arc::ptr_eq(latest(&packages).unwrap(), &first));
    }
}
