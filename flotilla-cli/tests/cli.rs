use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;
use zip::write::FileOptions;

fn flotilla() -> Command {
    Command::cargo_bin("flotilla").expect("binary builds")
}

/// Zip snapshot shaped like the prod branch of the template repository.
fn template_zip(dir: &Path) -> PathBuf {
    let entries: &[(&str, &str)] = &[
        (
            "microservices-prod/template/new/package.json",
            "{\n  \"name\": \"microservice-name\"\n}\n",
        ),
        ("microservices-prod/template/new/README.md", "# microservice-name\n"),
        (
            "microservices-prod/template/new/src/constants/index.ts",
            "const constants = {\n  msNameDefault: 'microservice-name',\n  withDb: false,\n};\n",
        ),
        (
            "microservices-prod/template/new/src/config/start.ts",
            "export default {\n  // dbOptions: {},\n  // GetDbConfig,\n};\n",
        ),
        (
            "microservices-prod/template/new/src/index.ts",
            "import { start } from './config/start';\nexport default start;\n",
        ),
    ];

    let zip_path = dir.join("template.zip");
    let file = fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, contents) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    zip_path
}

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let fleet_root = tmp.path().join("microservices");
    fs::create_dir_all(&fleet_root).unwrap();
    let archive = template_zip(tmp.path());
    (tmp, fleet_root, archive)
}

#[test]
fn list_reports_empty_fleet() {
    let (_tmp, fleet_root, _archive) = setup();

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No microservices found"));
}

#[test]
fn create_then_list_shows_the_project() {
    let (_tmp, fleet_root, archive) = setup();

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .arg("--template-archive")
        .arg(&archive)
        .args(["create", "demo"])
        .assert()
        .success()
        .stdout(contains("'demo' created"));

    let constants =
        fs::read_to_string(fleet_root.join("demo/src/constants/index.ts")).unwrap();
    assert!(constants.contains("msNameDefault: 'demo'"));

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("demo"));
}

#[test]
fn feature_add_is_idempotent_at_the_cli() {
    let (_tmp, fleet_root, archive) = setup();

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .arg("--template-archive")
        .arg(&archive)
        .args(["create", "demo"])
        .assert()
        .success();

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .arg("--template-archive")
        .arg(&archive)
        .args(["feature", "demo", "add", "--feature", "db"])
        .assert()
        .success()
        .stdout(contains("added"));

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .arg("--template-archive")
        .arg(&archive)
        .args(["feature", "demo", "add", "--feature", "db"])
        .assert()
        .success()
        .stdout(contains("already present, nothing to do"));

    let constants =
        fs::read_to_string(fleet_root.join("demo/src/constants/index.ts")).unwrap();
    assert!(constants.contains("withDb: true"));
}

#[test]
fn feature_on_unknown_project_fails() {
    let (_tmp, fleet_root, archive) = setup();

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .arg("--template-archive")
        .arg(&archive)
        .args(["feature", "ghost", "add", "--feature", "db"])
        .assert()
        .failure()
        .stderr(contains("ghost"));
}

#[test]
fn unknown_feature_name_is_a_usage_error() {
    let (_tmp, fleet_root, archive) = setup();

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .arg("--template-archive")
        .arg(&archive)
        .args(["feature", "demo", "add", "--feature", "telemetry"])
        .assert()
        .failure()
        .stderr(contains("telemetry"));
}

#[test]
fn update_env_rewrites_init_lines() {
    let tmp = TempDir::new().unwrap();
    let configs = tmp.path().join("configs");
    fs::create_dir_all(&configs).unwrap();
    fs::write(configs.join("middlewares.json"), "[{\"name\": \"cors\"}]").unwrap();
    fs::write(configs.join("config.json"), "{\"a\": 1}").unwrap();
    let env_path = tmp.path().join(".env");
    fs::write(
        &env_path,
        "PORT=3000\nMS_INIT_MIDDLEWARES='[]'\nMS_INIT_CONFIGS='{}'\nMS_INIT_TASKS='[]'\n",
    )
    .unwrap();

    flotilla()
        .arg("--fleet-root")
        .arg(tmp.path().join("microservices"))
        .arg("--env-path")
        .arg(&env_path)
        .args(["update-env", "dev"])
        .assert()
        .success();

    let env = fs::read_to_string(&env_path).unwrap();
    assert!(env.contains("MS_INIT_MIDDLEWARES='[{\"name\":\"cors\"}]'"));
    assert!(env.contains("MS_INIT_CONFIGS='{\"a\":1}'"));
    assert!(env.contains("PORT=3000"));
}

#[test]
fn only_filter_restricts_discovery() {
    let (_tmp, fleet_root, _archive) = setup();
    for name in ["alpha", "beta"] {
        let dir = fleet_root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), "{}").unwrap();
    }

    flotilla()
        .arg("--fleet-root")
        .arg(&fleet_root)
        .args(["--only", "alpha", "list"])
        .assert()
        .success()
        .stdout(contains("alpha").and(contains("beta").not()));
}
