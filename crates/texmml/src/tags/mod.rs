//! Equation numbering and labels.
//!
//! A [`TagManager`] lives across parses: counters and label tables carry
//! over from one displayed formula to the next unless reset. Within one
//! parse it keeps a stack of [`TagInfo`] contexts, one per numbering
//! environment being parsed. Everything recorded during a parse is staged in
//! per-equation tables and only merged into the document-wide ones by
//! [`TagManager::finish_equation`], so an abandoned attempt leaves no trace.

mod policy;

pub use policy::{AllTags, AmsTags, NoTags, TagOperation, TagPolicy, all_tags, ams_tags, no_tags};

use alloc::sync::Arc;

use log::trace;

use crate::namespace::{KeyMap, KeySet};
use crate::node::{MmlNode, NodeKind};
use crate::types::{ParseError, ParseErrorKind, Settings, TagSide};

/// Tag and id a label resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Tag text, without formatting.
    pub tag: String,
    /// Element id of the tagged row.
    pub id: String,
}

impl Default for Label {
    fn default() -> Self {
        Self {
            tag: "???".to_owned(),
            id: String::new(),
        }
    }
}

/// State of one numbering context.
#[derive(Debug, Clone, Default)]
pub struct TagInfo {
    /// Environment that opened the context, empty at top level.
    pub env: String,
    /// Whether `\tag` may be used.
    pub taggable: bool,
    /// Whether rows are numbered without an explicit `\tag`.
    pub default_tags: bool,
    /// Pending tag text.
    pub tag: Option<String>,
    /// Pending tag as displayed.
    pub tag_format: String,
    /// Set by `\notag`.
    pub no_tag: bool,
    /// Pending `\label`.
    pub label: String,
    /// Id generated for the pending tag.
    pub tag_id: String,
}

impl TagInfo {
    fn new(env: &str, taggable: bool, default_tags: bool) -> Self {
        Self {
            env: env.to_owned(),
            taggable,
            default_tags,
            ..Self::default()
        }
    }
}

/// Equation numbering state.
#[derive(Debug, Clone)]
pub struct TagManager {
    policy: Arc<dyn TagPolicy>,
    side: TagSide,
    indent: String,
    use_label_ids: bool,
    ignore_duplicate_labels: bool,
    base_url: String,

    start_number: usize,
    counter: usize,
    all_counter: usize,
    labels: KeyMap<String, Label>,
    all_labels: KeyMap<String, Label>,
    ids: KeySet<String>,
    all_ids: KeySet<String>,

    current: TagInfo,
    stack: Vec<TagInfo>,
    history: Vec<TagInfo>,
    redo: bool,
}

impl TagManager {
    /// A manager using `policy`, configured from `settings`.
    #[must_use]
    pub fn new(policy: Arc<dyn TagPolicy>, settings: &Settings) -> Self {
        Self {
            policy,
            side: settings.tag_side,
            indent: settings.tag_indent.clone(),
            use_label_ids: settings.use_label_ids,
            ignore_duplicate_labels: settings.ignore_duplicate_labels,
            base_url: settings.base_url.clone(),
            start_number: 0,
            counter: 0,
            all_counter: 0,
            labels: KeyMap::default(),
            all_labels: KeyMap::default(),
            ids: KeySet::default(),
            all_ids: KeySet::default(),
            current: TagInfo::default(),
            stack: Vec::new(),
            history: Vec::new(),
            redo: false,
        }
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> &dyn TagPolicy {
        &*self.policy
    }

    /// The innermost numbering context.
    #[must_use]
    pub const fn current(&self) -> &TagInfo {
        &self.current
    }

    /// Last number handed out.
    #[must_use]
    pub const fn counter(&self) -> usize {
        self.counter
    }

    /// Offset numbering was last reset to.
    #[must_use]
    pub const fn start_number(&self) -> usize {
        self.start_number
    }

    /// Fails when the policy refuses `operation`.
    pub fn check(&self, operation: TagOperation) -> Result<(), ParseError> {
        if self.policy.supports(operation) {
            Ok(())
        } else {
            Err(ParseError::new(ParseErrorKind::IncompatibleTagPolicy {
                operation: operation.to_string(),
                policy: self.policy.name().to_owned(),
            }))
        }
    }

    /// Opens a numbering context for `env`.
    pub fn start(&mut self, env: &str, taggable: bool, default_tags: bool) {
        let label = core::mem::take(&mut self.current.label);
        let outer = core::mem::replace(&mut self.current, TagInfo::new(env, taggable, default_tags));
        self.stack.push(outer);
        self.current.label = label;
        trace!("tag context '{env}' opened (taggable: {taggable}, numbered: {default_tags})");
    }

    /// Closes the innermost numbering context.
    pub fn end(&mut self) {
        let label = core::mem::take(&mut self.current.label);
        let inner = core::mem::replace(&mut self.current, self.stack.pop().unwrap_or_default());
        self.history.push(inner);
        if self.current.label.is_empty() {
            self.current.label = label;
        }
    }

    /// Sets the pending tag. With `raw` the text is displayed as given.
    pub fn tag(&mut self, tag: &str, raw: bool) {
        self.current.tag = Some(tag.to_owned());
        self.current.tag_format = if raw {
            tag.to_owned()
        } else {
            self.policy.format_tag(tag)
        };
        self.current.no_tag = false;
    }

    /// Suppresses the tag of the current row.
    pub fn notag(&mut self) {
        self.tag("", true);
        self.current.no_tag = true;
    }

    /// Hands out the next number, unless a tag is already pending or the
    /// policy does not number automatically.
    pub fn auto_tag(&mut self) {
        if self.current.tag.is_none() && self.policy.auto_numbers() {
            self.counter += 1;
            let number = self.policy.format_number(self.counter);
            self.tag(&number, false);
        }
    }

    /// Forgets the pending tag and label.
    pub fn clear_tag(&mut self) {
        self.current.label.clear();
        self.current.tag = None;
        self.current.tag_format.clear();
        self.current.no_tag = false;
        self.current.tag_id.clear();
    }

    /// The finished tag cell of the current row, if it gets one.
    ///
    /// With `force` the row is numbered whatever the context says.
    pub fn get_tag(&mut self, force: bool) -> Option<MmlNode> {
        if force {
            self.auto_tag();
            return self.current.tag.is_some().then(|| self.make_tag());
        }
        let current = &self.current;
        if current.taggable && !current.no_tag {
            if current.default_tags {
                self.auto_tag();
            }
            if self.current.tag.is_some() {
                return Some(self.make_tag());
            }
        }
        None
    }

    fn make_id(&mut self) {
        let tag = self.current.tag.clone().unwrap_or_default();
        let key = if self.use_label_ids && !self.current.label.is_empty() {
            self.current.label.clone()
        } else {
            tag
        };
        self.current.tag_id = self.policy.format_id(&key);
    }

    fn make_tag(&mut self) -> MmlNode {
        self.make_id();
        let id = self.current.tag_id.clone();
        if !self.current.label.is_empty() {
            self.labels.insert(
                self.current.label.clone(),
                Label {
                    tag: self.current.tag.clone().unwrap_or_default(),
                    id: id.clone(),
                },
            );
        }
        self.ids.insert(id.clone());
        trace!("tag '{}' made with id '{id}'", self.current.tag_format);
        MmlNode::with_children(
            NodeKind::Mtd,
            vec![MmlNode::token(NodeKind::Mtext, self.current.tag_format.clone())],
        )
        .attr("id", id)
    }

    /// Wraps `node` in a one-row labeled table carrying `tag`.
    #[must_use]
    pub fn en_tag(&self, node: MmlNode, tag: MmlNode) -> MmlNode {
        let cell = MmlNode::with_children(NodeKind::Mtd, vec![node]);
        let row = MmlNode::with_children(NodeKind::Mlabeledtr, vec![tag, cell]);
        MmlNode::with_children(NodeKind::Mtable, vec![row])
            .attr("side", self.side.as_ref())
            .attr("minlabelspacing", self.indent.clone())
            .attr("displaystyle", "true")
    }

    /// Numbers a finished top-level formula where the policy asks for it.
    #[must_use]
    pub fn finalize(&mut self, node: MmlNode, display: bool) -> MmlNode {
        if !display {
            return node;
        }
        if self.policy.tags_every_display() {
            if self.history.iter().any(|info| info.taggable) {
                return node;
            }
            return match self.get_tag(true) {
                Some(tag) => self.en_tag(node, tag),
                None => node,
            };
        }
        if !self.current.env.is_empty() || self.current.tag.is_none() {
            return node;
        }
        let tag = self.make_tag();
        self.en_tag(node, tag)
    }

    /// Records a `\label`.
    pub fn label(&mut self, label: &str) -> Result<(), ParseError> {
        if !self.current.label.is_empty() {
            return Err(ParseError::new(ParseErrorKind::MultipleCommand {
                name: "\\label".to_owned(),
            }));
        }
        if (self.labels.contains_key(label) || self.all_labels.contains_key(label))
            && !self.ignore_duplicate_labels
        {
            return Err(ParseError::new(ParseErrorKind::MultipleLabel {
                label: label.to_owned(),
            }));
        }
        self.current.label = label.to_owned();
        self.labels.insert(label.to_owned(), Label::default());
        Ok(())
    }

    /// Resolves a reference. An unknown label resolves to the placeholder
    /// `???` and marks the document for a rerun.
    pub fn reference(&mut self, label: &str) -> Label {
        match self
            .all_labels
            .get(label)
            .or_else(|| self.labels.get(label))
        {
            Some(found) if !found.id.is_empty() => found.clone(),
            _ => {
                self.redo = true;
                Label::default()
            }
        }
    }

    /// Looks up a label in the document-wide table.
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<&Label> {
        self.all_labels.get(label)
    }

    /// Whether `id` was already generated in this document.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.all_ids.contains(id) || self.ids.contains(id)
    }

    /// Whether a reference was resolved before its label was seen.
    #[must_use]
    pub const fn needs_rerun(&self) -> bool {
        self.redo
    }

    /// Link target for a label id.
    #[must_use]
    pub fn url(&self, id: &str) -> String {
        self.policy.format_url(id, &self.base_url)
    }

    /// Restarts numbering at `offset`. Unless `keep_labels` is set, every
    /// label and id recorded so far is forgotten.
    pub fn reset(&mut self, offset: usize, keep_labels: bool) {
        self.start_number = offset;
        self.counter = offset;
        self.all_counter = offset;
        if !keep_labels {
            self.all_labels.clear();
            self.all_ids.clear();
        }
        self.redo = false;
    }

    /// Prepares for a new top-level formula.
    pub fn start_equation(&mut self) {
        self.history.clear();
        self.stack.clear();
        self.current = TagInfo::default();
        self.labels.clear();
        self.ids.clear();
        self.counter = self.all_counter;
        self.redo = false;
    }

    /// Merges what the formula just parsed recorded into the document tables.
    pub fn finish_equation(&mut self) {
        self.all_counter = self.counter;
        self.all_ids.extend(self.ids.drain());
        self.all_labels.extend(self.labels.drain());
    }
}
