//! Verify that transformed output re-parses cleanly under the declared
//! script kind, the way a downstream language front-end consumes it

mod common;

use common::load_fixture;
use sfc_transform::{transform, ScriptKind};
use tree_sitter::{Language, Parser};

fn language_for(kind: ScriptKind) -> Language {
    match kind {
        ScriptKind::Jsx | ScriptKind::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        ScriptKind::Js | ScriptKind::Ts => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    }
}

fn assert_parses_cleanly(contents: &str) {
    let result = transform(contents);

    let mut parser = Parser::new();
    parser
        .set_language(&language_for(result.script_kind))
        .expect("failed to set parser language");

    let tree = parser
        .parse(&result.output, None)
        .expect("failed to parse transformed output");

    assert!(
        !tree.root_node().has_error(),
        "transformed output has syntax errors:\n{}",
        result.output
    );
}

#[test]
fn test_typed_block_output_parses() {
    assert_parses_cleanly(&load_fixture("basic_ts.vue"));
}

#[test]
fn test_shim_output_parses() {
    assert_parses_cleanly(&load_fixture("no_script.vue"));
}

#[test]
fn test_unwrapped_setup_output_parses() {
    assert_parses_cleanly(&load_fixture("setup_only.vue"));
}

#[test]
fn test_wrapped_setup_plus_normal_output_parses() {
    assert_parses_cleanly(&load_fixture("setup_and_normal.vue"));
}

#[test]
fn test_padded_regions_do_not_break_parsing() {
    assert_parses_cleanly(
        "<template>\n  <div>{{ x < 2 ? 'a' : 'b' }}</div>\n</template>\n<script>const x = 1\n</script>\n",
    );
}
