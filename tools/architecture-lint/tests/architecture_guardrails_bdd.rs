//! Behaviour tests for the layering lint, run against a scratch copy of the
//! service crate's adapter layout written to disk.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use architecture_lint::{ArchitectureLintError, LintSource, Rule, Violation};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

/// A well-layered miniature of the service: one file per adapter.
const LAYOUT: [(&str, &str); 7] = [
    (
        "domain/account_service.rs",
        "use crate::domain::ports::{TokenService, UserRepository}; pub struct AccountService;",
    ),
    (
        "domain/shape.rs",
        "use super::{OwnedRecord, RecordId}; pub struct Shape { pub id: RecordId }",
    ),
    (
        "inbound/http/accounts.rs",
        "use actix_web::{HttpResponse, web}; use crate::domain::ports::LoginService;",
    ),
    (
        "middleware/trace.rs",
        "use actix_web::dev::ServiceRequest; use crate::domain::TraceId;",
    ),
    (
        "outbound/tokens/jwt.rs",
        "use jsonwebtoken::{Algorithm, Validation}; use super::SigningKey;",
    ),
    (
        "outbound/credentials/argon2_verifier.rs",
        "use argon2::{Argon2, Params}; use password_hash::PasswordHasher;",
    ),
    (
        "outbound/persistence/pool.rs",
        "use diesel_async::AsyncPgConnection; use diesel_async::pooled_connection::bb8::Pool;",
    ),
];

#[derive(Debug, Default)]
struct LintWorld {
    sources: Vec<LintSource>,
    outcome: Option<Result<(), ArchitectureLintError>>,
}

impl LintWorld {
    fn put(&mut self, file: &str, contents: &str) {
        let file = PathBuf::from(file);
        self.sources.retain(|source| source.file != file);
        self.sources.push(LintSource {
            file,
            contents: contents.to_owned(),
        });
    }

    fn violations(&self) -> &[Violation] {
        match self.outcome.as_ref().expect("lint must have run") {
            Ok(()) => &[],
            Err(ArchitectureLintError::Violations(violations)) => violations,
            Err(other) => panic!("lint could not run: {other}"),
        }
    }
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

#[fixture]
fn world() -> RefCell<LintWorld> {
    RefCell::new(LintWorld::default())
}

#[given("the geodata adapter layout")]
fn the_adapter_layout(world: &RefCell<LintWorld>) {
    let mut world = world.borrow_mut();
    for (file, contents) in LAYOUT {
        world.put(file, contents);
    }
}

#[given("{file} contains {code}")]
fn file_contains(world: &RefCell<LintWorld>, file: String, code: String) {
    world.borrow_mut().put(unquote(&file), unquote(&code));
}

#[when("the architecture lint runs")]
fn the_lint_runs(world: &RefCell<LintWorld>) {
    let scratch = TempDir::new().expect("scratch dir");
    let service_dir = scratch.path().join("backend");
    for source in &world.borrow().sources {
        let path = service_dir.join("src").join(&source.file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create source dirs");
        }
        fs::write(&path, &source.contents).expect("write source");
    }

    let outcome = architecture_lint::lint_service_sources(&service_dir);
    world.borrow_mut().outcome = Some(outcome);
}

#[then("the lint succeeds")]
fn the_lint_succeeds(world: &RefCell<LintWorld>) {
    let world = world.borrow();
    assert!(
        world.violations().is_empty(),
        "unexpected violations: {:?}",
        world.violations()
    );
}

#[then("{count} violations are reported")]
fn violations_are_reported(world: &RefCell<LintWorld>, count: usize) {
    let world = world.borrow();
    assert_eq!(world.violations().len(), count, "{:?}", world.violations());
}

fn assert_breach(world: &RefCell<LintWorld>, file: &str, rule: Rule, fragment: &str) {
    let world = world.borrow();
    let file = PathBuf::from(unquote(file));
    let fragment = unquote(fragment);
    assert!(
        world.violations().iter().any(|violation| {
            violation.file == file && violation.rule == rule && violation.message.contains(fragment)
        }),
        "expected {rule:?} in {file:?} naming {fragment:?}, got: {:?}",
        world.violations()
    );
}

#[then("{file} breaks the crate home rule naming {fragment}")]
fn breaks_crate_home(world: &RefCell<LintWorld>, file: String, fragment: String) {
    assert_breach(world, &file, Rule::CrateHome, &fragment);
}

#[then("{file} breaks the module reach rule naming {fragment}")]
fn breaks_module_reach(world: &RefCell<LintWorld>, file: String, fragment: String) {
    assert_breach(world, &file, Rule::ModuleReach, &fragment);
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "The service layout passes as written"
)]
fn the_service_layout_passes(world: RefCell<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "The domain cannot sign tokens itself"
)]
fn the_domain_cannot_sign_tokens(world: RefCell<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "Handlers cannot hash passwords directly"
)]
fn handlers_cannot_hash_passwords(world: RefCell<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "The in-memory store cannot use Diesel"
)]
fn the_memory_store_cannot_use_diesel(world: RefCell<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "Handlers cannot reach storage adapters"
)]
fn handlers_cannot_reach_storage(world: RefCell<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "Outbound adapters stay independent of each other"
)]
fn outbound_adapters_stay_independent(world: RefCell<LintWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "Every violation is reported in one run"
)]
fn every_violation_is_reported(world: RefCell<LintWorld>) {
    let _ = world;
}
