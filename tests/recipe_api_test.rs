//! Integration tests for recipes run through the public API.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use hostcook::config::{Environment, Settings, COMPUTERS, USERS};
use hostcook::provision::{MockProvisioner, ProvisionCall, Provisioner};
use hostcook::recipe::{Recipe, RecipeContext, RecipeRegistry, VhostRecipe};
use hostcook::runner::{Operation, RecipeRunner, RecipeStatus};
use hostcook::CookError;
use serde_json::json;
use tempfile::TempDir;

const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIExample ops@example.com";

fn environment() -> Environment {
    Environment::new()
        .with_entity(USERS, "example_com", json!({ "ssh_public_key": KEY }))
        .with_entity(
            COMPUTERS,
            "web1",
            json!({ "host": "10.0.0.5", "server_name": "example.com" }),
        )
}

/// Project with a `packages/example_com` file set holding a site config.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let site = temp
        .path()
        .join("packages/example_com/etc/nginx/sites-available");
    fs::create_dir_all(&site).unwrap();
    fs::write(
        site.join("example_com.tmpl"),
        "server {\n  server_name ${computer.server_name};\n  root /srv/www/example_com;\n}\n",
    )
    .unwrap();
    temp
}

fn recipe(root: &Path, env: Environment, prov: &Arc<MockProvisioner>) -> VhostRecipe {
    let ctx = Arc::new(RecipeContext::new(Settings::default(), env, root));
    let prov: Arc<dyn Provisioner> = prov.clone();
    VhostRecipe::example_com(ctx, prov)
}

#[test]
fn missing_user_fails_checks_without_touching_host() {
    let temp = project();
    let env = Environment::new().with_entity(COMPUTERS, "web1", json!({}));
    let prov = Arc::new(MockProvisioner::new());
    let recipes: Vec<Box<dyn Recipe>> = vec![Box::new(recipe(temp.path(), env, &prov))];

    let report = RecipeRunner::new(&recipes).run(Operation::Apply, "web1");

    assert!(!report.success());
    assert_eq!(report.failed_recipe(), Some("example_com"));
    match report.error {
        Some(CookError::RecipeValidation { ref message, .. }) => {
            assert_eq!(message, "example_com user not defined in environment");
        }
        ref other => panic!("unexpected error: {:?}", other),
    }
    assert!(prov.calls().is_empty());
}

#[test]
fn apply_provisions_everything_in_order() {
    let temp = project();
    let prov = Arc::new(MockProvisioner::new());
    let recipe = recipe(temp.path(), environment(), &prov);

    recipe.pre_apply_checks("web1").unwrap();
    recipe.apply("web1").unwrap();

    assert!(prov.has_user("example_com"));
    assert_eq!(prov.authorized_keys("example_com"), vec![KEY]);
    let web = prov.directory("/home/example_com/www").unwrap();
    assert_eq!(web.mode.as_deref(), Some("755"));
    assert_eq!(web.owner.as_deref(), Some("example_com"));
    assert_eq!(
        prov.link_target("/srv/www/example_com").as_deref(),
        Some("/home/example_com/www")
    );
    assert_eq!(
        prov.link_target("/etc/nginx/sites-enabled/example_com").as_deref(),
        Some("/etc/nginx/sites-available/example_com")
    );

    let site = prov.file("/etc/nginx/sites-available/example_com").unwrap();
    let site = String::from_utf8(site).unwrap();
    assert!(site.contains("server_name example.com;"));

    let calls = prov.calls();
    let push = calls
        .iter()
        .position(|c| matches!(c, ProvisionCall::PushFileSet { .. }))
        .unwrap();
    let enable = calls
        .iter()
        .position(|c| {
            matches!(c, ProvisionCall::Link { dest, .. } if dest.ends_with("sites-enabled/example_com"))
        })
        .unwrap();
    assert!(push < enable);
    assert_eq!(
        calls.last(),
        Some(&ProvisionCall::Sudo("service nginx restart".to_string()))
    );
}

#[test]
fn second_apply_creates_nothing() {
    let temp = project();
    let prov = Arc::new(MockProvisioner::new());
    let recipe = recipe(temp.path(), environment(), &prov);

    recipe.apply("web1").unwrap();
    prov.clear_calls();
    recipe.apply("web1").unwrap();

    let calls = prov.calls();
    assert!(!calls.iter().any(ProvisionCall::is_creation), "{:?}", calls);
    assert_eq!(prov.authorized_keys("example_com").len(), 1);
    assert_eq!(prov.sudo_commands(), vec!["service nginx restart"]);
}

#[test]
fn existing_user_keeps_password() {
    let temp = project();
    let prov = Arc::new(MockProvisioner::new().with_user("example_com"));
    let recipe = recipe(temp.path(), environment(), &prov);

    recipe.apply("web1").unwrap();

    assert!(!prov
        .calls()
        .iter()
        .any(|c| matches!(c, ProvisionCall::DisablePassword(_))));
}

#[test]
fn restart_failure_propagates() {
    let temp = project();
    let prov = Arc::new(MockProvisioner::new().failing_command("service nginx restart"));
    let recipes: Vec<Box<dyn Recipe>> =
        vec![Box::new(recipe(temp.path(), environment(), &prov))];

    let report = RecipeRunner::new(&recipes).run(Operation::Apply, "web1");

    assert!(matches!(report.error, Some(CookError::CommandFailed { .. })));
    assert_eq!(report.recipes[0].status, RecipeStatus::Failed);
}

#[test]
fn missing_file_set_stops_before_enabling_site() {
    let temp = TempDir::new().unwrap();
    let prov = Arc::new(MockProvisioner::new());
    let recipe = recipe(temp.path(), environment(), &prov);

    let err = recipe.apply("web1").unwrap_err();

    assert!(matches!(err, CookError::FileSetNotFound { .. }));
    assert!(prov
        .link_target("/etc/nginx/sites-enabled/example_com")
        .is_none());
    assert!(prov.sudo_commands().is_empty());
}

#[test]
fn cleanup_leaves_linked_serve_dir() {
    let temp = project();
    let prov = Arc::new(
        MockProvisioner::new().with_link("/home/example_com/www", "/srv/www/example_com"),
    );
    let recipe = recipe(temp.path(), environment(), &prov);

    recipe.cleanup("web1").unwrap();

    assert!(prov.calls().is_empty());
    assert!(prov.link_target("/srv/www/example_com").is_some());
}

#[test]
fn cleanup_removes_real_serve_dir() {
    let temp = project();
    let prov = Arc::new(MockProvisioner::new().with_directory("/srv/www/example_com"));
    let recipe = recipe(temp.path(), environment(), &prov);

    recipe.cleanup("web1").unwrap();

    assert_eq!(prov.sudo_commands(), vec!["rm -rf /srv/www/example_com"]);
    assert!(prov.directory("/srv/www/example_com").is_none());
}

#[test]
fn registry_builds_runnable_recipes() {
    let temp = project();
    let ctx = Arc::new(RecipeContext::new(
        Settings::default(),
        environment(),
        temp.path(),
    ));
    let mock = Arc::new(MockProvisioner::new());
    let prov: Arc<dyn Provisioner> = mock.clone();

    let recipes = RecipeRegistry::builtin()
        .create_all(&["example_com".to_string()], &ctx, &prov)
        .unwrap();
    let report = RecipeRunner::new(&recipes).run(Operation::Apply, "web1");

    assert!(report.success(), "{:?}", report.error);
    assert_eq!(report.recipes[0].status, RecipeStatus::Applied);
    assert!(mock.has_user("example_com"));
}
