use std::collections::BTreeMap;

/// Label set of a pod or namespace, or the labels a selector requires.
///
/// Ordered so that serialization and iteration are deterministic.
/// An empty map used as a selector matches everything.
pub type LabelMap = BTreeMap<String, String>;

/// Canonical form of a label set: `k=v` pairs sorted by key, comma-separated.
/// The empty set canonicalizes to the empty string.
pub fn canonical_labels(labels: &LabelMap) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Human-readable form used in descriptions: `{app=web, team=a}`.
pub fn display_labels(labels: &LabelMap) -> String {
    let pairs = labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", pairs)
}

/// Build a `LabelMap` from string pairs.
pub fn labels<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> LabelMap {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
