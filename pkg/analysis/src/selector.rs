//! Label-subset matching.
//!
//! A selector matches when every one of its `(key, value)` pairs appears with
//! an identical value on the other side; an empty selector matches anything.
//! What the other side is matters: a concrete pod label set, or another
//! selector (an intent's). The two are kept distinct through [`Target`] so
//! call sites say which relationship they are testing. Values are compared
//! as exact strings; there are no value wildcards.

use pkg_types::labels::LabelMap;

/// The label set a selector is checked against.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Labels actually carried by a pod (or treated as such).
    Observed(&'a LabelMap),
    /// An intent's selector. A candidate carrying a key the intent does not
    /// declare does not cover it, even if that key would match any real pod.
    IntentSelector(&'a LabelMap),
}

impl<'a> Target<'a> {
    fn labels(&self) -> &'a LabelMap {
        match self {
            Target::Observed(labels) | Target::IntentSelector(labels) => labels,
        }
    }
}

/// Whether `selector` covers `target`.
pub fn selector_matches(selector: &LabelMap, target: Target<'_>) -> bool {
    if selector.is_empty() {
        return true;
    }
    let labels = target.labels();
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

/// True iff `selector` is empty or is a subset of `observed`.
pub fn observed_covered_by_selector(observed: &LabelMap, selector: &LabelMap) -> bool {
    selector_matches(selector, Target::Observed(observed))
}

/// True iff `candidate` is empty or is a subset of `intent_selector`.
pub fn selector_covers_intent_selector(candidate: &LabelMap, intent_selector: &LabelMap) -> bool {
    selector_matches(candidate, Target::IntentSelector(intent_selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::labels::labels;

    #[test]
    fn empty_selector_matches_everything() {
        let observed = labels([("app", "web"), ("env", "prod")]);
        assert!(observed_covered_by_selector(&observed, &LabelMap::new()));
        assert!(observed_covered_by_selector(&LabelMap::new(), &LabelMap::new()));
        assert!(selector_covers_intent_selector(&LabelMap::new(), &observed));
    }

    #[test]
    fn subset_semantics() {
        let observed = labels([("app", "web"), ("env", "prod")]);
        assert!(observed_covered_by_selector(&observed, &labels([("app", "web")])));
        assert!(observed_covered_by_selector(&observed, &observed.clone()));
        assert!(!observed_covered_by_selector(&observed, &labels([("app", "api")])));
        assert!(!observed_covered_by_selector(
            &observed,
            &labels([("app", "web"), ("tier", "frontend")])
        ));
        assert!(!observed_covered_by_selector(&LabelMap::new(), &labels([("app", "web")])));
    }

    #[test]
    fn candidate_with_extra_key_does_not_cover_intent() {
        let intent_src = labels([("app", "web")]);
        assert!(selector_covers_intent_selector(&labels([("app", "web")]), &intent_src));
        assert!(!selector_covers_intent_selector(
            &labels([("app", "web"), ("team", "a")]),
            &intent_src
        ));
        // Broader candidate covers a narrower intent.
        assert!(selector_covers_intent_selector(
            &labels([("app", "web")]),
            &labels([("app", "web"), ("team", "a")])
        ));
    }

    #[test]
    fn values_compare_exactly() {
        let observed = labels([("app", "web-frontend")]);
        assert!(!observed_covered_by_selector(&observed, &labels([("app", "web")])));
        assert!(!observed_covered_by_selector(&observed, &labels([("app", "*")])));
    }
}
