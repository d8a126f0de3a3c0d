use chrono::Duration;
use serde::Serialize;

use crate::utils::time::duration_to_seconds;

use super::hierarchy::TagNode;

/// Separator used to join tag path segments into row ids. Kept readable because
/// chart tooltips tend to show the id when a label is ambiguous.
pub const ID_SEPARATOR: &str = " > ";

/// One flattened node of the tag tree, ready for a drill-down radial chart.
/// `parent` is the id of the enclosing row, or empty for top level rows. Values
/// follow branch-values-as-totals semantics: a row's value already includes all
/// of its descendants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunburstRow {
    pub id: String,
    pub label: String,
    pub parent: String,
    #[serde(serialize_with = "serialize_seconds")]
    pub value: Duration,
}

fn serialize_seconds<S: serde::Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration_to_seconds(*value))
}

/// Flattens the tag tree into parallel chart rows via depth-first traversal.
/// Rows with zero value are suppressed so the chart gets no degenerate segments;
/// descendants past `max_depth` are already folded into their ancestor's value
/// because [TagNode::value] sums recursively.
pub fn flatten(root: &TagNode, max_depth: usize) -> Vec<SunburstRow> {
    let mut rows = Vec::new();
    traverse(root, "", 1, max_depth, &mut rows);
    rows
}

fn traverse(
    node: &TagNode,
    parent_id: &str,
    depth: usize,
    max_depth: usize,
    rows: &mut Vec<SunburstRow>,
) {
    for (label, child) in &node.children {
        let id = if parent_id.is_empty() {
            label.clone()
        } else {
            format!("{parent_id}{ID_SEPARATOR}{label}")
        };

        let value = child.value();
        if value > Duration::zero() {
            rows.push(SunburstRow {
                id: id.clone(),
                label: label.clone(),
                parent: parent_id.to_string(),
                value,
            });
        }

        if depth < max_depth {
            traverse(child, &id, depth + 1, max_depth, rows);
        }
    }
}

/// Checks the branch-values-as-totals property over flattened rows: for every
/// row, the values of its direct children must not exceed its own value. Strict
/// inequality is legal when the parent carries direct time of its own, so a
/// violation points at broken input data or config rather than at the chart.
/// Returns the offending row ids.
pub fn conservation_violations(rows: &[SunburstRow]) -> Vec<String> {
    rows.iter()
        .filter(|row| {
            let children_total = rows
                .iter()
                .filter(|candidate| candidate.parent == row.id)
                .fold(Duration::zero(), |acc, child| acc + child.value);
            children_total > row.value
        })
        .map(|row| row.id.clone())
        .collect()
}
