//! Script kind classification for embedded SFC script blocks.
//!
//! The kind tells a downstream language front-end which syntax dialect
//! to re-parse the transformed output under.

use serde::{Deserialize, Serialize};

/// Syntax dialect of an embedded script block
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScriptKind {
    /// Plain JavaScript
    #[default]
    Js,
    /// JavaScript with JSX
    Jsx,
    /// TypeScript
    Ts,
    /// TypeScript with JSX
    Tsx,
}

impl ScriptKind {
    /// Widen the kind according to a `lang` attribute value (already
    /// lowercased). Widening is monotone across the script blocks of a
    /// document: once `Tsx` is reached, no later value narrows it.
    /// Unknown values leave the kind unchanged.
    #[must_use]
    pub fn widen(self, lang: &str) -> Self {
        match lang {
            "jsx" => match self {
                Self::Js => Self::Jsx,
                _ => Self::Tsx,
            },
            "ts" => match self {
                Self::Js => Self::Ts,
                Self::Jsx => Self::Tsx,
                other => other,
            },
            "tsx" => Self::Tsx,
            _ => self,
        }
    }
}
