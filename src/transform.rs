//! Single-pass transform of an SFC document into a position-preserving
//! script source buffer.
//!
//! Everything outside top-level script blocks is replaced by whitespace
//! padding with the same line count and byte length, so line/column
//! positions in the synthesized output address the same content as in
//! the original document. A downstream language front-end re-parses the
//! output under the returned [`ScriptKind`] and can map its diagnostics
//! back without any offset translation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::syntax::ScriptKind;
use crate::tokenizer::{Attribute, TagEvent, Tokenizer};

/// Wrapper injected around setup-block content so that constructs only
/// legal inside a function body (top-level `await`, return-style
/// scoping) stay parseable while the block is transcribed.
pub const SETUP_PREFIX: &str = ";(()=>{";
pub const SETUP_SUFFIX: &str = "})();";

/// Default-export shim substituted when a document carries no usable
/// script content of its own.
pub const COMPONENT_SHIM: &str =
    "import componentDefinition from '*.vue'; export default componentDefinition;";

/// Heuristic match for an import statement with a quoted module
/// specifier. Not a real parse: line continuations or comments that
/// contain the word `import` can confuse it.
static IMPORT_SPECIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import[^'"]*['"]([^'"]*)['"]"#).expect("import pattern is valid"));

/// Options for a transform run
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Treat `/>` as an immediate open+close pair
    pub recognize_self_closing: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            recognize_self_closing: true,
        }
    }
}

/// Outcome of one transform run
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// Script-only source buffer, padded to the original offsets
    pub output: String,
    /// Dialect the downstream front-end should re-parse `output` under
    pub script_kind: ScriptKind,
}

/// Transform an SFC document into a script-only source buffer plus the
/// script kind a downstream front-end should use for it.
///
/// Total over its input domain: malformed markup degrades to
/// best-effort output, and a document without usable script content
/// yields the default-export shim with the kind forced to TypeScript.
#[must_use]
pub fn transform(contents: &str) -> TransformResult {
    transform_with_options(contents, TransformOptions::default())
}

/// Transform with explicit tokenizer options
#[must_use]
pub fn transform_with_options(contents: &str, options: TransformOptions) -> TransformResult {
    let mut extractor = ScriptExtractor::new(contents);
    for event in Tokenizer::with_self_closing(contents, options.recognize_self_closing) {
        extractor.apply(&event);
    }
    extractor.finish()
}

/// Mutable state for one extraction run. Created fresh per document,
/// fed events in document order, finalized exactly once. Not reusable
/// across documents.
#[derive(Debug)]
pub struct ScriptExtractor<'a> {
    contents: &'a str,
    result: String,
    /// Bytes of the original document accounted for so far, either
    /// copied verbatim or replaced by equal-length padding.
    /// Monotonically non-decreasing.
    last_index: usize,
    level: usize,
    is_script: bool,
    in_script_setup: bool,
    added_setup_prefix: bool,
    had_script_setup: bool,
    had_script_normal: bool,
    /// Output offsets of the wrapper around the most recently opened
    /// setup block. Single slot: with several setup blocks in one
    /// document, the last one wins.
    setup_start_loc: Option<usize>,
    setup_end_loc: Option<usize>,
    script_kind: ScriptKind,
}

impl<'a> ScriptExtractor<'a> {
    #[must_use]
    pub fn new(contents: &'a str) -> Self {
        Self {
            contents,
            result: String::new(),
            last_index: 0,
            level: 0,
            is_script: false,
            in_script_setup: false,
            added_setup_prefix: false,
            had_script_setup: false,
            had_script_normal: false,
            setup_start_loc: None,
            setup_end_loc: None,
            script_kind: ScriptKind::Js,
        }
    }

    /// Feed one tag event. Events must arrive in document order.
    pub fn apply(&mut self, event: &TagEvent<'_>) {
        match event {
            TagEvent::Open {
                name, attributes, ..
            } => self.on_open(name, attributes),
            TagEvent::Text { data, start, end } => self.on_text(data, *start, *end),
            TagEvent::Close { .. } => self.on_close(),
        }
    }

    fn on_open(&mut self, name: &str, attributes: &[Attribute<'_>]) {
        if self.level == 0 && name.eq_ignore_ascii_case("script") {
            self.is_script = true;
            self.in_script_setup = false;
            for attribute in attributes {
                if attribute.name.eq_ignore_ascii_case("lang") {
                    let value = attribute.value.to_ascii_lowercase();
                    self.script_kind = self.script_kind.widen(&value);
                }
                if attribute.name.eq_ignore_ascii_case("setup") {
                    self.in_script_setup = true;
                    self.added_setup_prefix = false;
                    self.had_script_setup = true;
                }
            }
            self.had_script_normal = self.had_script_normal || !self.in_script_setup;
            trace!(
                setup = self.in_script_setup,
                kind = ?self.script_kind,
                "entered top-level script block"
            );
        }
        self.level += 1;
    }

    fn on_text(&mut self, data: &str, start: usize, end: usize) {
        if !self.is_script {
            return;
        }
        // Reproduce the skipped original range as padding with the same
        // line count and byte length, so offsets stay addressable.
        let skipped = self.contents.get(self.last_index..start).unwrap_or_default();
        let line_count = skipped.matches('\n').count();
        let mut space_count = skipped.len() - line_count;
        if self.in_script_setup && !self.added_setup_prefix {
            self.added_setup_prefix = true;
            self.setup_start_loc = Some(self.result.len());
            self.result.push_str(SETUP_PREFIX);
            // The prefix does not exist in the original document; it
            // stands in for an equal number of padding bytes.
            space_count = space_count.saturating_sub(SETUP_PREFIX.len());
        }
        self.result.push_str(&" ".repeat(space_count));
        self.result.push_str(&"\n".repeat(line_count));
        self.result.push_str(data);
        self.last_index = end;
    }

    /// A close tag of any name leaves script mode; the tokenizer is
    /// permissive about tag-name matching and so is the extractor.
    fn on_close(&mut self) {
        if self.in_script_setup {
            self.setup_end_loc = Some(self.result.len());
            self.result.push_str(SETUP_SUFFIX);
            self.in_script_setup = false;
            // The suffix stands in for an equal number of bytes of the
            // original closing tag, keeping both offset spaces aligned.
            self.last_index += SETUP_SUFFIX.len();
        }
        self.is_script = false;
        self.level = self.level.saturating_sub(1);
    }

    /// Finalize the run and apply the post-processing policies.
    #[must_use]
    pub fn finish(mut self) -> TransformResult {
        if self.result.trim().is_empty() {
            // No usable script content at all. The shim keeps the
            // default-export contract and overrides any lang attribute.
            self.result = COMPONENT_SHIM.to_string();
            self.script_kind = ScriptKind::Ts;
        } else if self.had_script_setup && !self.had_script_normal {
            self.result.push_str("; ");
            self.result.push_str(COMPONENT_SHIM);

            // The wrapper only had to keep the setup body parseable
            // during transcription. With no normal block the whole
            // output is module code, so blank it out in place without
            // shifting any offsets.
            if let Some(start) = self.setup_start_loc {
                blank_range(&mut self.result, start, SETUP_PREFIX.len());
            }
            if let Some(end) = self.setup_end_loc {
                blank_range(&mut self.result, end, SETUP_SUFFIX.len());
            }
        } else if self.had_script_setup && self.had_script_normal {
            self.result.push_str("\n;");

            // Import bindings inside the wrapper are invisible to the
            // rest of the file; replay their side effects as bare
            // imports appended at the end. Only the module specifier
            // survives, not the bindings.
            let start = self.setup_start_loc.unwrap_or(0);
            let end = self.setup_end_loc.unwrap_or(0);
            if start < end {
                let specifiers: Vec<String> = IMPORT_SPECIFIER
                    .captures_iter(&self.result[start..end])
                    .map(|captures| captures[1].to_string())
                    .collect();
                for specifier in specifiers {
                    self.result.push_str("import \"");
                    self.result.push_str(&specifier);
                    self.result.push_str("\";\n");
                }
            }
        }

        debug!(
            kind = ?self.script_kind,
            output_bytes = self.result.len(),
            "transformed sfc document"
        );

        TransformResult {
            output: self.result,
            script_kind: self.script_kind,
        }
    }
}

/// Replace `len` bytes at `start` with spaces, in place. Callers only
/// pass ranges covering ASCII wrapper text written by the extractor.
fn blank_range(result: &mut String, start: usize, len: usize) {
    let end = (start + len).min(result.len());
    if start < end {
        result.replace_range(start..end, &" ".repeat(end - start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_preserves_byte_offsets() {
        let contents = "<template>\n  <div>hi</div>\n</template>\n<script>const a=1</script>\n";
        let result = transform(contents);
        assert_eq!(result.output.find("const a=1"), contents.find("const a=1"));
    }

    #[test]
    fn test_padding_preserves_line_numbers() {
        let contents = "<template>\n  <div>hi</div>\n</template>\n<script>\nconst a=1\n</script>\n";
        let result = transform(contents);
        let original_line = line_of(contents, "const a=1");
        let output_line = line_of(&result.output, "const a=1");
        assert_eq!(original_line, output_line);
    }

    #[test]
    fn test_non_script_regions_become_whitespace() {
        let contents = "<template><div>secret</div></template><script>ok()</script>";
        let result = transform(contents);
        assert!(!result.output.contains("secret"));
        assert!(!result.output.contains("div"));
        let before_script = &result.output[..contents.find("ok()").unwrap()];
        assert!(before_script.chars().all(|c| c == ' ' || c == '\n'));
    }

    #[test]
    fn test_nested_script_is_not_extracted() {
        let contents = "<template><script>nested()</script></template>";
        let result = transform(contents);
        assert!(!result.output.contains("nested()"));
        assert_eq!(result.output, COMPONENT_SHIM);
        assert_eq!(result.script_kind, ScriptKind::Ts);
    }

    #[test]
    fn test_close_of_any_name_leaves_script_mode() {
        let contents = "<script>a=1</template>after";
        let mut extractor = ScriptExtractor::new(contents);
        extractor.apply(&TagEvent::Open {
            name: "script",
            attributes: vec![],
            start: 0,
        });
        extractor.apply(&TagEvent::Text {
            data: "a=1",
            start: 8,
            end: 11,
        });
        extractor.apply(&TagEvent::Close { name: "template" });
        extractor.apply(&TagEvent::Text {
            data: "after",
            start: 22,
            end: 27,
        });
        let result = extractor.finish();
        assert!(result.output.contains("a=1"));
        assert!(!result.output.contains("after"));
    }

    #[test]
    fn test_depth_saturates_on_stray_close() {
        let contents = "</div><script>ok()</script>";
        let mut extractor = ScriptExtractor::new(contents);
        extractor.apply(&TagEvent::Close { name: "div" });
        extractor.apply(&TagEvent::Open {
            name: "script",
            attributes: vec![],
            start: 6,
        });
        extractor.apply(&TagEvent::Text {
            data: "ok()",
            start: 14,
            end: 18,
        });
        extractor.apply(&TagEvent::Close { name: "script" });
        let result = extractor.finish();
        assert!(result.output.contains("ok()"));
    }

    #[test]
    fn test_last_setup_block_wins() {
        let contents = "<script setup>first()</script>\n<script setup>second()</script>";
        let result = transform(contents);
        // Only the last setup block's wrapper is blanked; the first
        // one's wrapper text survives in the output.
        assert_eq!(result.output.matches(SETUP_PREFIX).count(), 1);
        assert!(result.output.contains("first()"));
        assert!(result.output.contains("second()"));
        assert!(result.output.ends_with(COMPONENT_SHIM));
    }

    #[test]
    fn test_self_closing_setup_block_blanks_orphan_suffix() {
        let result = transform("<script setup/>");
        // No text ever arrived, so no prefix was written; the suffix
        // appended at close is blanked in the setup-only policy.
        assert!(!result.output.contains(SETUP_SUFFIX));
        assert!(result.output.starts_with("     ; "));
        assert!(result.output.ends_with(COMPONENT_SHIM));
        assert_eq!(result.script_kind, ScriptKind::Js);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: TransformOptions = serde_json::from_str("{}").expect("valid options json");
        assert!(options.recognize_self_closing);

        let options: TransformOptions =
            serde_json::from_str(r#"{"recognizeSelfClosing": false}"#).expect("valid options json");
        assert!(!options.recognize_self_closing);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = transform("<script lang=\"ts\">const a=1</script>");
        let json = serde_json::to_string(&result).expect("result serializes");
        assert!(json.contains(r#""scriptKind":"ts""#));
        assert!(json.contains(r#""output""#));
    }

    fn line_of(haystack: &str, needle: &str) -> usize {
        let idx = haystack.find(needle).expect("needle present");
        haystack[..idx].matches('\n').count()
    }
}
