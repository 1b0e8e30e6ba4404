//! Table assembly for array-like environments.

use alloc::collections::BTreeMap;

use crate::node::{MmlNode, NodeKind};
use crate::types::{ParseError, ParseErrorKind};

use super::item::fenced;

/// A table being assembled: finished rows, the cells of the current row, and
/// the line and frame bookkeeping applied when the table ends.
#[derive(Debug, Clone, Default)]
pub struct ArrayState {
    /// Environment name, for messages.
    pub name: String,
    /// Finished rows.
    pub table: Vec<MmlNode>,
    /// Finished cells of the current row.
    pub row: Vec<MmlNode>,
    /// Attributes of the `mtable`.
    pub attrs: BTreeMap<String, String>,
    /// Delimiter placed before the table.
    pub open: Option<String>,
    /// Delimiter placed after the table.
    pub close: Option<String>,
    /// Framed sides (`top`, `bottom`, `left`, `right`).
    pub frame: Vec<String>,
    /// Line style below each row.
    pub rowlines: Vec<String>,
}

impl ArrayState {
    /// Empty state for environment `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Builder-style table attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Builder-style fencing delimiters.
    #[must_use]
    pub fn fenced(mut self, open: &str, close: &str) -> Self {
        self.open = Some(open.to_owned());
        self.close = Some(close.to_owned());
        self
    }

    /// Applies an array preamble such as `c|cl` or `|r|`: column alignment,
    /// lines between columns, and vertical frame sides.
    pub fn preamble(&mut self, spec: &str) -> Result<(), ParseError> {
        let mut align = Vec::new();
        let mut lines = Vec::new();
        let mut line = "none";
        for c in spec.chars().filter(|c| !c.is_whitespace()) {
            match c {
                'l' | 'c' | 'r' => {
                    if !align.is_empty() {
                        lines.push(line);
                    } else if line != "none" {
                        self.frame.push("left".to_owned());
                    }
                    line = "none";
                    align.push(match c {
                        'l' => "left",
                        'r' => "right",
                        _ => "center",
                    });
                }
                '|' => line = "solid",
                ':' => line = "dashed",
                _ => {
                    return Err(ParseError::new(ParseErrorKind::Misplaced {
                        name: c.to_string(),
                    }));
                }
            }
        }
        if line != "none" {
            self.frame.push("right".to_owned());
        }
        if !align.is_empty() {
            self.attrs.insert("columnalign".to_owned(), align.join(" "));
        }
        if lines.iter().any(|l| *l != "none") {
            self.attrs.insert("columnlines".to_owned(), lines.join(" "));
        }
        Ok(())
    }

    /// Closes the current cell holding `nodes`.
    pub fn end_entry(&mut self, nodes: Vec<MmlNode>) {
        self.row.push(MmlNode::with_children(NodeKind::Mtd, nodes));
    }

    /// Closes the current row. A `label` cell is appended and then rotated
    /// to the front, turning the row into a labeled row.
    pub fn end_row(&mut self, label: Option<MmlNode>) {
        let cells = core::mem::take(&mut self.row);
        let row = match label {
            Some(label) => {
                let mut labeled = Vec::with_capacity(cells.len() + 1);
                labeled.push(label);
                labeled.extend(cells);
                MmlNode::with_children(NodeKind::Mlabeledtr, labeled)
            }
            None => MmlNode::with_children(NodeKind::Mtr, cells),
        };
        self.table.push(row);
    }

    /// Draws a line at the current row boundary.
    pub fn hline(&mut self, cell_is_empty: bool, style: &str) -> Result<(), ParseError> {
        if !self.row.is_empty() || !cell_is_empty {
            return Err(ParseError::new(ParseErrorKind::Misplaced {
                name: "\\hline".to_owned(),
            }));
        }
        match self.table.len().checked_sub(1) {
            None => self.frame.push("top".to_owned()),
            Some(last) => {
                if self.rowlines.len() <= last {
                    self.rowlines.resize(last + 1, "none".to_owned());
                }
                self.rowlines[last] = style.to_owned();
            }
        }
        Ok(())
    }

    /// Closes whatever row is still open, then settles row lines and frame.
    ///
    /// Returns whether a final row was closed here.
    pub fn end_table(&mut self, nodes: Vec<MmlNode>) -> bool {
        let open_row = !nodes.is_empty() || !self.row.is_empty();
        if open_row {
            self.end_entry(nodes);
        }
        open_row
    }

    /// Applies the line bookkeeping. Called after the last row is closed.
    pub fn check_lines(&mut self) {
        let rows = self.table.len();
        if rows > 0 && self.rowlines.len() >= rows {
            if let Some(last) = self.rowlines.pop()
                && last != "none"
            {
                self.frame.push("bottom".to_owned());
            }
            self.rowlines.truncate(rows - 1);
        }
        if self.rowlines.iter().any(|l| l != "none") {
            self.rowlines.resize(rows.saturating_sub(1), "none".to_owned());
            self.attrs
                .insert("rowlines".to_owned(), self.rowlines.join(" "));
        }
    }

    /// The finished table, framed and fenced as requested.
    #[must_use]
    pub fn into_mml(self) -> MmlNode {
        let mut table = MmlNode::with_children(NodeKind::Mtable, self.table);
        table.attributes = self.attrs;
        let sides = ["top", "bottom", "left", "right"];
        if sides.iter().all(|s| self.frame.iter().any(|f| f == s)) {
            table.set_attr("frame", "solid");
        } else if !self.frame.is_empty() {
            table = MmlNode::with_children(NodeKind::Menclose, vec![table])
                .attr("notation", self.frame.join(" "));
        }
        match (self.open, self.close) {
            (None, None) => table,
            (open, close) => fenced(
                open.as_deref().unwrap_or_default(),
                vec![table],
                close.as_deref().unwrap_or_default(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> Vec<MmlNode> {
        vec![MmlNode::token(NodeKind::Mi, text)]
    }

    #[test]
    fn test_rows_and_cells() {
        let mut array = ArrayState::new("matrix");
        array.end_entry(cell("a"));
        array.end_entry(cell("b"));
        array.end_row(None);
        assert!(array.end_table(cell("c")));
        array.end_row(None);
        array.check_lines();
        let table = array.into_mml();
        assert_eq!(table.kind, NodeKind::Mtable);
        assert_eq!(table.children.len(), 2);
        assert_eq!(table.children[0].children.len(), 2);
        assert_eq!(table.children[1].children.len(), 1);
    }

    #[test]
    fn test_labeled_row_puts_label_first() {
        let mut array = ArrayState::new("align");
        array.end_entry(cell("x"));
        array.end_row(Some(MmlNode::token(NodeKind::Mtext, "(1)")));
        let row = &array.table[0];
        assert_eq!(row.kind, NodeKind::Mlabeledtr);
        assert_eq!(row.children[0].text(), "(1)");
    }

    #[test]
    fn test_hlines_become_rowlines_and_frame() {
        let mut array = ArrayState::new("array");
        array.hline(true, "solid").unwrap();
        array.end_entry(cell("a"));
        array.end_row(None);
        array.hline(true, "dashed").unwrap();
        array.end_entry(cell("b"));
        array.end_row(None);
        array.hline(true, "solid").unwrap();
        array.check_lines();
        assert_eq!(array.attrs.get("rowlines").map(String::as_str), Some("dashed"));
        assert_eq!(array.frame, ["top", "bottom"]);
        let node = array.into_mml();
        assert_eq!(node.kind, NodeKind::Menclose);
        assert_eq!(node.get_attr("notation"), Some("top bottom"));
    }

    #[test]
    fn test_hline_mid_row_is_misplaced() {
        let mut array = ArrayState::new("array");
        array.end_entry(cell("a"));
        let err = array.hline(true, "solid").unwrap_err();
        assert_eq!(err.id(), "Misplaced");
    }

    #[test]
    fn test_preamble() {
        let mut array = ArrayState::new("array");
        array.preamble("|c|l r|").unwrap();
        assert_eq!(
            array.attrs.get("columnalign").map(String::as_str),
            Some("center left right")
        );
        assert_eq!(
            array.attrs.get("columnlines").map(String::as_str),
            Some("solid none")
        );
        assert_eq!(array.frame, ["left", "right"]);
        assert!(array.preamble("x").is_err());
    }
}
