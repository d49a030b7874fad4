//! Container selection by label.

use crate::builder::labels::{LABEL_PROXYTAG, LABEL_VHOST};
use crate::builder::Container;

/// Selects the containers the monitor should consider.
///
/// A container must carry the vhost label (any value) and, when a proxy tag
/// is configured, a `com.chameth.proxytag` label equal to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilter {
    proxytag: Option<String>,
}

impl LabelFilter {
    /// An empty tag is treated as no tag.
    pub fn new(proxytag: Option<String>) -> Self {
        Self {
            proxytag: proxytag.filter(|tag| !tag.is_empty()),
        }
    }

    pub fn matches(&self, container: &Container) -> bool {
        if container.label(LABEL_VHOST).is_none() {
            return false;
        }
        match &self.proxytag {
            Some(tag) => container.label(LABEL_PROXYTAG) == Some(tag.as_str()),
            None => true,
        }
    }

    /// Keep only matching containers, preserving order.
    pub fn apply(&self, containers: Vec<Container>) -> Vec<Container> {
        containers.into_iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_vhost_label() {
        let filter = LabelFilter::new(None);
        assert!(filter.matches(&Container::new("a").with_label(LABEL_VHOST, "")));
        assert!(!filter.matches(&Container::new("b")));
    }

    #[test]
    fn proxytag_must_match_exactly() {
        let filter = LabelFilter::new(Some("edge".into()));
        let tagged = Container::new("a")
            .with_label(LABEL_VHOST, "a.com")
            .with_label(LABEL_PROXYTAG, "edge");
        let other = Container::new("b")
            .with_label(LABEL_VHOST, "b.com")
            .with_label(LABEL_PROXYTAG, "internal");
        let untagged = Container::new("c").with_label(LABEL_VHOST, "c.com");

        let kept = filter.apply(vec![tagged, other, untagged]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "a");
    }

    #[test]
    fn empty_tag_disables_tag_check() {
        let filter = LabelFilter::new(Some(String::new()));
        assert_eq!(filter, LabelFilter::default());
    }
}
