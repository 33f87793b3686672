use crate::storage::entities::{BlockValue, Blocks};

/// Number of completed leaves in `blocks`. Groups are walked recursively, anything that isn't a
/// `true` flag contributes nothing.
pub fn flatten_true_count(blocks: &Blocks) -> u32 {
    blocks.values().map(true_count).sum()
}

/// Number of completed leaves inside a single block value.
pub fn true_count(value: &BlockValue) -> u32 {
    match value {
        BlockValue::Leaf(true) => 1,
        BlockValue::Group(group) => flatten_true_count(group),
        BlockValue::Leaf(false) | BlockValue::Other(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::storage::entities::{BlockValue, Blocks};

    use super::flatten_true_count;

    fn blocks(value: serde_json::Value) -> Blocks {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn flat_blocks() {
        let value = blocks(json!({ "morningPrayer": true, "workout": false, "reading": true }));
        assert_eq!(flatten_true_count(&value), 2);
    }

    #[test]
    fn nested_group_counts_each_true() {
        let value = blocks(json!({ "deepWork": { "focus": true, "research": false } }));
        assert_eq!(flatten_true_count(&value), 1);
    }

    #[test]
    fn mixed_shapes_in_one_record() {
        let value = blocks(json!({
            "workout": true,
            "deepWork": { "focus": true, "research": true },
            "reading": false,
        }));
        assert_eq!(flatten_true_count(&value), 3);
    }

    #[test]
    fn malformed_values_count_as_zero() {
        let value = blocks(json!({
            "workout": null,
            "reading": "true",
            "journaling": 1,
            "deepWork": { "focus": [true], "research": null },
        }));
        assert_eq!(flatten_true_count(&value), 0);
        assert_eq!(flatten_true_count(&Blocks::new()), 0);
    }

    #[test]
    fn key_order_does_not_matter() {
        let entries = [
            ("a", BlockValue::Leaf(true)),
            ("b", BlockValue::Leaf(false)),
            ("c", BlockValue::Group(Blocks::from([("x".into(), true.into())]))),
        ];
        let forward = entries
            .iter()
            .cloned()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<Blocks>();
        let backward = entries
            .iter()
            .rev()
            .cloned()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<Blocks>();
        assert_eq!(flatten_true_count(&forward), flatten_true_count(&backward));
        assert_eq!(flatten_true_count(&forward), 2);
    }
}
