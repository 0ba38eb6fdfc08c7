//! Layering lint for the geodata service crate.
//!
//! Every Rust file under `backend/src/{domain,inbound,middleware,outbound}` is
//! parsed with `syn` and checked against two kinds of rule:
//!
//! - **Module reach.** The domain names no adapter module. Inbound code and
//!   the request middleware never name `crate::outbound`. Outbound adapters
//!   never name inbound code, and never name a sibling outbound adapter: the
//!   in-memory store cannot borrow from Diesel, token signing cannot borrow
//!   from credential hashing.
//! - **Crate homes.** Each infrastructure crate may be named by exactly one
//!   adapter. Argon2 lives in `outbound/credentials`, `jsonwebtoken` in
//!   `outbound/tokens`, Diesel and bb8 in `outbound/persistence`, and Actix in
//!   `inbound/http` plus `middleware`. Anything else reaches them through a
//!   domain port.
//!
//! Run it with `cargo run -p architecture-lint`, optionally passing the
//! service crate directory.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Name the service crate is imported under from its own tests and docs.
const SERVICE_CRATE: &str = "geodata";

/// Top-level directories of `src/` that the lint reads.
const LINTED_ROOTS: [&str; 4] = ["domain", "inbound", "middleware", "outbound"];

/// The two families of rule a [`Violation`] can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    /// A layer named a module it must not depend on.
    ModuleReach,
    /// An infrastructure crate was used outside its adapter.
    CrateHome,
}

/// A single rule breach in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path relative to the service crate's `src/`.
    pub file: PathBuf,
    pub rule: Rule,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Reasons the lint can fail.
#[derive(Debug)]
pub enum ArchitectureLintError {
    Io(io::Error),
    /// A file could not be parsed, or sits outside every known layer.
    Parse { file: PathBuf, message: String },
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read service sources: {err}"),
            Self::Parse { file, message } => {
                write!(f, "could not lint {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "{} layering violation(s):", violations.len())?;
                for violation in violations {
                    writeln!(f, "- {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse { .. } | Self::Violations(_) => None,
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to the service crate's `src/`.
    pub file: PathBuf,
    pub contents: String,
}

/// Lint the service crate rooted at `service_dir` (the directory holding its
/// `Cargo.toml`).
pub fn lint_service_sources(service_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src_dir = service_dir.join("src");
    let mut sources = Vec::new();
    for root in LINTED_ROOTS {
        let dir = src_dir.join(root);
        if dir.is_dir() {
            collect_sources(&src_dir, &dir, &mut sources)?;
        }
    }
    lint_sources(&sources)
}

/// Lint in-memory sources; every violation across every file is reported.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let location =
            Location::from_relative(&source.file).ok_or_else(|| ArchitectureLintError::Parse {
                file: source.file.clone(),
                message: format!("file is not under one of {LINTED_ROOTS:?}"),
            })?;
        let parsed =
            syn::parse_file(&source.contents).map_err(|err| ArchitectureLintError::Parse {
                file: source.file.clone(),
                message: err.to_string(),
            })?;
        violations.extend(check_file(&source.file, &location, &parsed));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Middleware,
    Outbound,
}

impl Layer {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "domain" => Some(Self::Domain),
            "inbound" => Some(Self::Inbound),
            "middleware" => Some(Self::Middleware),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Middleware => "middleware",
            Self::Outbound => "outbound",
        }
    }

    /// Sibling layers this layer may never name.
    fn unreachable_layers(self) -> &'static [Layer] {
        match self {
            Self::Domain => &[Self::Inbound, Self::Middleware, Self::Outbound],
            Self::Inbound => &[Self::Outbound],
            Self::Middleware => &[Self::Inbound, Self::Outbound],
            Self::Outbound => &[Self::Inbound, Self::Middleware],
        }
    }
}

/// Where a file sits: its layer and, below that, its adapter directory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
    layer: Layer,
    adapter: Option<String>,
}

impl Location {
    fn from_relative(path: &Path) -> Option<Self> {
        let mut parts = path
            .components()
            .map(|part| part.as_os_str().to_string_lossy().into_owned());
        let layer = Layer::from_segment(&parts.next()?)?;
        let adapter = parts
            .next()
            .map(|part| part.trim_end_matches(".rs").to_owned())
            .filter(|part| part != "mod");
        Some(Self { layer, adapter })
    }

    fn is_within(&self, home: &Home) -> bool {
        self.layer == home.layer
            && home
                .adapter
                .is_none_or(|adapter| self.adapter.as_deref() == Some(adapter))
    }

    fn describe(&self) -> String {
        match &self.adapter {
            Some(adapter) => format!("{}/{adapter}", self.layer.name()),
            None => self.layer.name().to_owned(),
        }
    }
}

/// The only place an infrastructure crate may be named.
#[derive(Debug, Clone, Copy)]
struct Home {
    layer: Layer,
    adapter: Option<&'static str>,
}

impl fmt::Display for Home {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.adapter {
            Some(adapter) => write!(f, "{}/{adapter}", self.layer.name()),
            None => f.write_str(self.layer.name()),
        }
    }
}

const fn home(layer: Layer, adapter: &'static str) -> Home {
    Home {
        layer,
        adapter: Some(adapter),
    }
}

const CREDENTIALS: &[Home] = &[home(Layer::Outbound, "credentials")];
const TOKENS: &[Home] = &[home(Layer::Outbound, "tokens")];
const PERSISTENCE: &[Home] = &[home(Layer::Outbound, "persistence")];
const WEB: &[Home] = &[
    home(Layer::Inbound, "http"),
    Home {
        layer: Layer::Middleware,
        adapter: None,
    },
];

const CRATE_HOMES: &[(&str, &[Home])] = &[
    ("argon2", CREDENTIALS),
    ("password_hash", CREDENTIALS),
    ("jsonwebtoken", TOKENS),
    ("bb8", PERSISTENCE),
    ("diesel", PERSISTENCE),
    ("diesel_async", PERSISTENCE),
    ("diesel_migrations", PERSISTENCE),
    ("actix", WEB),
    ("actix_http", WEB),
    ("actix_service", WEB),
    ("actix_web", WEB),
    ("awc", WEB),
];

fn crate_homes(root: &str) -> Option<&'static [Home]> {
    CRATE_HOMES
        .iter()
        .find(|(name, _)| *name == root)
        .map(|(_, homes)| *homes)
}

fn check_file(file: &Path, location: &Location, parsed: &syn::File) -> Vec<Violation> {
    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut found = BTreeSet::new();
    for segments in &collector.paths {
        if let Some(message) = module_reach_breach(location, segments) {
            found.insert((Rule::ModuleReach, message));
        }
        if let Some(message) = crate_home_breach(location, segments) {
            found.insert((Rule::CrateHome, message));
        }
    }

    found
        .into_iter()
        .map(|(rule, message)| Violation {
            file: file.to_path_buf(),
            rule,
            message,
        })
        .collect()
}

fn module_reach_breach(location: &Location, segments: &[String]) -> Option<String> {
    let (target, adapter) = internal_target(segments)?;
    let from = location.describe();
    if location.layer.unreachable_layers().contains(&target) {
        return Some(format!("{from} must not reach crate::{}", target.name()));
    }
    let same_layer_sibling = location.layer == Layer::Outbound
        && target == Layer::Outbound
        && adapter.is_some()
        && location.adapter.is_some()
        && adapter != location.adapter.as_deref();
    same_layer_sibling.then(|| {
        format!(
            "{from} must not reach sibling adapter crate::outbound::{}",
            adapter.unwrap_or_default()
        )
    })
}

fn crate_home_breach(location: &Location, segments: &[String]) -> Option<String> {
    let root = external_root(segments)?;
    let homes = crate_homes(root)?;
    if homes.iter().any(|home| location.is_within(home)) {
        return None;
    }
    let allowed = homes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    Some(format!(
        "`{root}` belongs to {allowed}; {} must use a domain port instead",
        location.describe()
    ))
}

fn is_relative_segment(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// The layer (and adapter, if named) an internal path points into.
fn internal_target(segments: &[String]) -> Option<(Layer, Option<&str>)> {
    let first = segments.first()?.as_str();
    let start = if is_relative_segment(first) {
        segments
            .iter()
            .position(|segment| !is_relative_segment(segment))?
    } else if first == SERVICE_CRATE {
        1
    } else {
        0
    };
    let layer = Layer::from_segment(segments.get(start)?)?;
    let adapter = segments
        .get(start + 1)
        .map(String::as_str)
        .filter(|segment| *segment != "*");
    Some((layer, adapter))
}

fn external_root(segments: &[String]) -> Option<&str> {
    let root = segments.first()?.as_str();
    if is_relative_segment(root) || root == SERVICE_CRATE {
        return None;
    }
    Some(root)
}

/// Every multi-segment path, `use` tree, and `extern crate` in a file.
#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_path(&mut self, path: &syn::Path) {
        // Single bare identifiers are locals, fields or prelude items.
        if path.segments.len() < 2 && path.leading_colon.is_none() {
            return;
        }
        self.paths.insert(
            path.segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect(),
        );
    }

    fn record_use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        self.record_path(node);
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }

    fn visit_item_extern_crate(&mut self, node: &'ast syn::ItemExternCrate) {
        self.paths.insert(vec![node.ident.to_string()]);
    }
}

fn collect_sources(
    src_root: &Path,
    dir: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_sources(src_root, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let file = path
                .strip_prefix(src_root)
                .map_err(|err| ArchitectureLintError::Parse {
                    file: path.clone(),
                    message: err.to_string(),
                })?
                .to_path_buf();
            sources.push(LintSource {
                contents: fs::read_to_string(&path)?,
                file,
            });
        }
    }
    Ok(())
}
