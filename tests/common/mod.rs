//! Common test utilities and helpers

use std::path::Path;

/// Load a fixture file from the fixtures directory
#[allow(dead_code)]
pub fn load_fixture(relative_path: &str) -> String {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/common/fixtures");
    let fixture_path = fixtures_dir.join(relative_path);
    std::fs::read_to_string(&fixture_path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {:?}: {}", fixture_path, e))
}

/// 0-based line index of the first occurrence of `needle`
#[allow(dead_code)]
pub fn line_of(haystack: &str, needle: &str) -> usize {
    let idx = haystack
        .find(needle)
        .unwrap_or_else(|| panic!("expected {:?} in {:?}", needle, haystack));
    haystack[..idx].matches('\n').count()
}
