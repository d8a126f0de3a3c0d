use std::collections::BTreeMap;

use chrono::Duration;

use crate::storage::entities::TimeRecordEntity;

use super::period_tags::NO_TAGS;

/// One node of the tag tree. A leaf is simply a node without children; there is
/// no separate leaf representation.
///
/// `self_total` holds the time of records whose (depth-truncated) tag path ends
/// exactly here. Interior nodes created only as intermediate path steps keep a
/// zero `self_total` and get their value derived from descendants on read.
#[derive(Debug, Clone, PartialEq)]
pub struct TagNode {
    pub children: BTreeMap<String, TagNode>,
    pub self_total: Duration,
}

impl TagNode {
    pub fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            self_total: Duration::zero(),
        }
    }

    /// Total time under this node: its own `self_total` plus the value of every
    /// child. When tag paths of different depths share a prefix, a node can carry
    /// both a nonzero `self_total` ("time recorded at this tag level") and
    /// children ("time attributed deeper"); summing both is what conserves the
    /// total duration.
    pub fn value(&self) -> Duration {
        self.children
            .values()
            .fold(self.self_total, |acc, child| acc + child.value())
    }
}

impl Default for TagNode {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the tag tree for the drill-down view. Each record's tag sequence,
/// truncated to `max_depth`, is walked as a path; the whole record duration is
/// added to the terminal node of that path only. Tagless records accumulate in a
/// reserved [NO_TAGS] branch.
pub fn build_hierarchy(records: &[TimeRecordEntity], max_depth: usize) -> TagNode {
    let mut root = TagNode::new();

    for record in records {
        let duration = record.duration();
        let path = &record.tags[..record.tags.len().min(max_depth)];

        if path.is_empty() {
            let branch = root
                .children
                .entry(NO_TAGS.to_string())
                .or_insert_with(TagNode::new);
            branch.self_total = branch.self_total + duration;
            continue;
        }

        let mut node = &mut root;
        for tag in path {
            node = node
                .children
                .entry(tag.clone())
                .or_insert_with(TagNode::new);
        }
        node.self_total = node.self_total + duration;
    }

    root
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::storage::entities::TimeRecordEntity;

    use super::{build_hierarchy, TagNode, NO_TAGS};

    fn utc_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, hour, 0, 0).unwrap()
    }

    fn record(description: &str, hours: i64) -> TimeRecordEntity {
        TimeRecordEntity::from_store_row(
            description.to_string(),
            Some(utc_hour(0)),
            Some(utc_hour(0) + Duration::hours(hours)),
            description.to_string(),
        )
    }

    #[test]
    fn whole_duration_lands_on_the_terminal_node() {
        let records = [record("#work #projA #review", 2)];
        let root = build_hierarchy(&records, 3);

        let work = &root.children["work"];
        let proj_a = &work.children["projA"];
        let review = &proj_a.children["review"];

        assert_eq!(work.self_total, Duration::zero());
        assert_eq!(proj_a.self_total, Duration::zero());
        assert_eq!(review.self_total, Duration::hours(2));
        assert_eq!(root.value(), Duration::hours(2));
    }

    #[test]
    fn paths_are_truncated_to_max_depth() {
        let records = [record("#work #projA #review", 2)];
        let root = build_hierarchy(&records, 1);

        let work = &root.children["work"];
        assert!(work.children.is_empty());
        assert_eq!(work.self_total, Duration::hours(2));
    }

    #[test]
    fn tagless_records_accumulate_in_the_reserved_branch() {
        let records = [record("nothing to see", 1), record("still nothing", 2)];
        let root = build_hierarchy(&records, 3);

        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[NO_TAGS].self_total, Duration::hours(3));
    }

    #[test]
    fn mixed_depth_paths_sum_self_total_and_children() {
        // one record ends at #work, another goes deeper through it
        let records = [record("#work", 1), record("#work #projA", 2)];
        let root = build_hierarchy(&records, 2);

        let work = &root.children["work"];
        assert_eq!(work.self_total, Duration::hours(1));
        assert_eq!(work.children["projA"].self_total, Duration::hours(2));
        // both the direct time and the descendant time count
        assert_eq!(work.value(), Duration::hours(3));
        assert_eq!(root.value(), Duration::hours(3));
    }

    #[test]
    fn root_value_is_invariant_under_max_depth() {
        let records = [
            record("#work #projA #review", 2),
            record("#work #projB", 1),
            record("#play", 4),
            record("untagged", 3),
        ];
        let expected = Duration::hours(10);
        for max_depth in 1..=5 {
            let root = build_hierarchy(&records, max_depth);
            assert_eq!(root.value(), expected, "max_depth {max_depth}");
        }
    }

    #[test]
    fn records_without_endpoints_add_no_time_but_keep_their_path() {
        let records = [TimeRecordEntity::from_store_row(
            "open".into(),
            Some(utc_hour(9)),
            None,
            "#work #projA".into(),
        )];
        let root = build_hierarchy(&records, 2);

        assert_eq!(root.value(), Duration::zero());
        assert!(root.children["work"].children.contains_key("projA"));
    }

    #[test]
    fn empty_input_gives_an_empty_root() {
        let root = build_hierarchy(&[], 3);
        assert_eq!(root, TagNode::new());
        assert_eq!(root.value(), Duration::zero());
    }
}
