use bon::bon;
use strum::{AsRefStr, Display, EnumString};

use crate::namespace::KeyMap;

/// Which side of a labeled row the equation tag is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum TagSide {
    /// Tags on the left (`leqno`).
    Left,
    /// Tags on the right.
    #[default]
    Right,
}

/// Resolved engine configuration.
///
/// Unlike the builder inputs, every field has a concrete value. Construct it
/// with [`Settings::builder`].
#[derive(Debug, Clone)]
pub struct Settings {
    /// Name of the equation numbering policy (`none`, `ams`, `all`, or one
    /// contributed by a package).
    pub tags: String,
    /// Placement of tag cells in labeled rows.
    pub tag_side: TagSide,
    /// Minimum spacing between a tag and its equation.
    pub tag_indent: String,
    /// Whether generated ids are derived from `\label` names when present.
    pub use_label_ids: bool,
    /// Whether a repeated `\label` is tolerated.
    pub ignore_duplicate_labels: bool,
    /// Limit on macro substitutions in one top-level parse.
    pub max_macros: usize,
    /// Limit, in bytes, on the working buffer after macro substitution.
    pub max_buffer: usize,
    /// Limit on nested argument parses, such as the operands of `\frac`.
    pub max_nesting: usize,
    /// Optional bound on replays of one expression. The engine itself never
    /// retries on its own; this only caps host-driven replays.
    pub max_retries: Option<usize>,
    /// Whether top-level local definitions outlive the parse that made them.
    pub global_group: bool,
    /// Whether each parse runs inside a sandbox frame, keeping its global
    /// definitions from leaking into the document.
    pub sandbox: bool,
    /// Macros defined before any input is read: name (without backslash)
    /// to replacement text. The argument count is the highest `#n` used.
    pub macros: KeyMap<String, String>,
    /// Prefix used for `\ref` link targets.
    pub base_url: String,
}

#[bon]
impl Settings {
    /// Creates a new [`Settings`] instance, filling every unset option with
    /// its default.
    ///
    /// # Default Values
    /// - `tags`: `"none"`
    /// - `tag_side`: [`TagSide::Right`]
    /// - `tag_indent`: `"0.8em"`
    /// - `use_label_ids`: `true`
    /// - `ignore_duplicate_labels`: `false`
    /// - `max_macros`: `10000`
    /// - `max_buffer`: `5 * 1024`
    /// - `max_nesting`: `32`
    /// - `max_retries`: none
    /// - `global_group`: `false`
    /// - `sandbox`: `false`
    /// - `macros`: empty
    /// - `base_url`: `""`
    #[must_use]
    #[builder]
    pub fn new(
        /// Numbering policy name.
        tags: Option<String>,
        /// Side for equation tags.
        tag_side: Option<TagSide>,
        /// Minimum label spacing.
        tag_indent: Option<String>,
        /// Derive ids from labels.
        use_label_ids: Option<bool>,
        /// Tolerate duplicate labels.
        ignore_duplicate_labels: Option<bool>,
        /// Macro substitution limit.
        max_macros: Option<usize>,
        /// Working buffer size limit.
        max_buffer: Option<usize>,
        /// Nested parse limit.
        max_nesting: Option<usize>,
        /// Host retry bound.
        max_retries: Option<usize>,
        /// Persist top-level local definitions.
        global_group: Option<bool>,
        /// Run each parse in a sandbox frame.
        sandbox: Option<bool>,
        /// Preset macros.
        macros: Option<KeyMap<String, String>>,
        /// Link prefix for references.
        base_url: Option<String>,
    ) -> Self {
        Self {
            tags: tags.unwrap_or_else(|| "none".to_owned()),
            tag_side: tag_side.unwrap_or_default(),
            tag_indent: tag_indent.unwrap_or_else(|| "0.8em".to_owned()),
            use_label_ids: use_label_ids.unwrap_or(true),
            ignore_duplicate_labels: ignore_duplicate_labels.unwrap_or(false),
            max_macros: max_macros.unwrap_or(10_000),
            max_buffer: max_buffer.unwrap_or(5 * 1024),
            max_nesting: max_nesting.unwrap_or(32),
            max_retries,
            global_group: global_group.unwrap_or(false),
            sandbox: sandbox.unwrap_or(false),
            macros: macros.unwrap_or_default(),
            base_url: base_url.unwrap_or_default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::builder().build()
    }
}
