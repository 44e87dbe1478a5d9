//! Integration tests for placeholder substitution in manifest files.

mod common;

use std::fs;

use pypi_bump::error::ManifestError;
use pypi_bump::manifest::{DEFAULT_PLACEHOLDER, apply_placeholder, read_version_field};
use pypi_bump::version::Version;

use common::{manifest_fixture, read_fixture, temp_test_dir, write_manifest};

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

#[test]
fn test_fixture_substitution_changes_only_the_token() {
    let dir = temp_test_dir();
    let template = read_fixture(manifest_fixture("pyproject.toml"));
    let path = write_manifest(dir.path(), &template);

    let replaced = apply_placeholder(&path, DEFAULT_PLACEHOLDER, &v("2.5.8")).unwrap();
    assert_eq!(replaced, 1);

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, template.replace("<CURRENT_VERSION>", "2.5.8"));
    assert!(content.contains("# set at publish time"));
    assert_eq!(read_version_field(&path).unwrap().as_deref(), Some("2.5.8"));
}

#[test]
fn test_every_occurrence_is_replaced() {
    let dir = temp_test_dir();
    let path = write_manifest(
        dir.path(),
        "[project]\nname = \"pkg\"\nversion = \"<CURRENT_VERSION>\"\n\n[tool.pkg]\nbanner = \"pkg <CURRENT_VERSION> (<CURRENT_VERSION>)\"\n",
    );

    let replaced = apply_placeholder(&path, DEFAULT_PLACEHOLDER, &v("1.2.4")).unwrap();
    assert_eq!(replaced, 3);

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("<CURRENT_VERSION>"));
    assert!(content.contains("banner = \"pkg 1.2.4 (1.2.4)\""));
}

#[test]
fn test_absent_placeholder_leaves_file_byte_identical() {
    let dir = temp_test_dir();
    let original = "[project]\r\nname = \"pkg\"\r\nversion = \"0.0.0\"\r\n\t# tabs and CRLF kept\r\n";
    let path = write_manifest(dir.path(), original);
    let modified_before = fs::metadata(&path).unwrap().modified().unwrap();

    let replaced = apply_placeholder(&path, DEFAULT_PLACEHOLDER, &v("9.9.9")).unwrap();
    assert_eq!(replaced, 0);
    assert_eq!(fs::read(&path).unwrap(), original.as_bytes());
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified_before);
}

#[test]
fn test_custom_token() {
    let dir = temp_test_dir();
    let path = write_manifest(dir.path(), "[project]\nname = \"pkg\"\nversion = \"@@VERSION@@\"\n");

    apply_placeholder(&path, "@@VERSION@@", &v("3.0.1")).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[project]\nname = \"pkg\"\nversion = \"3.0.1\"\n"
    );
}

#[test]
fn test_result_that_breaks_toml_is_rejected() {
    let dir = temp_test_dir();
    // Unquoted placeholder: substituting a dotted version yields invalid TOML.
    let original = "[project]\nname = \"pkg\"\nversion = VERSION\n";
    let path = write_manifest(dir.path(), original);

    let result = apply_placeholder(&path, "VERSION", &v("1.2.3"));
    assert!(matches!(result, Err(ManifestError::InvalidToml { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_non_toml_manifest_is_not_validated() {
    let dir = temp_test_dir();
    let path = dir.path().join("VERSION");
    fs::write(&path, "<CURRENT_VERSION>\n").unwrap();

    apply_placeholder(&path, DEFAULT_PLACEHOLDER, &v("0.0.2")).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "0.0.2\n");
}

#[test]
fn test_missing_manifest() {
    let dir = temp_test_dir();
    let result = apply_placeholder(&dir.path().join("pyproject.toml"), DEFAULT_PLACEHOLDER, &v("1.0.0"));
    assert!(matches!(result, Err(ManifestError::ReadFailed { .. })));
}
