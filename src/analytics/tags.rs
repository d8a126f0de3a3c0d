use std::sync::LazyLock;

use regex::Regex;

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

/// Extracts tags from a record description. A tag is a `#` followed by one or more
/// word characters, and the leading `#` is not part of the tag. Tags are returned
/// in order of first appearance, verbatim and with duplicates kept.
pub fn extract_tags(description: &str) -> Vec<String> {
    TAG_PATTERN
        .captures_iter(description)
        .map(|capture| capture[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::extract_tags;

    #[test]
    fn extracts_tags_in_order_of_appearance() {
        assert_eq!(
            extract_tags("#work on the #projA backlog, then #work again"),
            vec!["work", "projA", "work"]
        );
    }

    #[test]
    fn empty_description_yields_no_tags() {
        assert_eq!(extract_tags(""), Vec::<String>::new());
        assert_eq!(extract_tags("no tags here"), Vec::<String>::new());
    }

    #[test]
    fn tags_are_taken_verbatim() {
        // no case folding or other normalization
        assert_eq!(extract_tags("#Work #WORK #work"), vec!["Work", "WORK", "work"]);
    }

    #[test]
    fn tag_bodies_are_word_characters_only() {
        assert_eq!(extract_tags("#dev-ops #a_b2"), vec!["dev", "a_b2"]);
        // a bare # matches nothing, a doubled # still yields the tag after it
        assert_eq!(extract_tags("# ##deep"), vec!["deep"]);
    }

    #[test]
    fn unicode_letters_count_as_word_characters() {
        assert_eq!(extract_tags("#büro day"), vec!["büro"]);
    }
}
