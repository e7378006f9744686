use serde::Serialize;
use serde_json::Value;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

/// One field-type example is extracted per this many samples.
const MARK_WINDOW: u64 = 1000;
const NUM_EXAMPLES: usize = 10;
const MAX_OBJECT_KEYS: usize = 10;

/// Per-node match counters. Mutated atomically during evaluation; the
/// matcher tree itself stays immutable.
pub(crate) struct NodeStats {
    name: String,
    checked: AtomicU64,
    matched: AtomicU64,
}

impl NodeStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checked: AtomicU64::new(0),
            matched: AtomicU64::new(0),
        }
    }

    pub fn mark(&self, matched: bool) {
        self.checked.fetch_add(1, Ordering::Relaxed);
        if matched {
            self.matched.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self, children: Vec<MatchStats>) -> MatchStats {
        MatchStats {
            node_name: self.name.clone(),
            checked: self.checked.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            children,
        }
    }
}

/// A point-in-time view of one matcher node's counters, in depth-first
/// order. Counters progress monotonically across snapshots, though two
/// snapshots taken during concurrent evaluation need not be mutually
/// consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub node_name: String,
    #[serde(rename = "times_checked")]
    pub checked: u64,
    #[serde(rename = "times_matched")]
    pub matched: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MatchStats>,
}

const NUM_SLOTS: usize = 12;

const SLOT_NAMES: [&str; NUM_SLOTS] = [
    "string",
    "string (in array)",
    "number",
    "number (in array)",
    "boolean",
    "boolean (in array)",
    "object",
    "object (in array)",
    "array",
    "array (in array)",
    "null",
    "null (in array)",
];

fn slot_of(value: &Value, in_array: bool) -> usize {
    let base = match value {
        Value::String(_) => 0,
        Value::Number(_) => 2,
        Value::Bool(_) => 4,
        Value::Object(_) => 6,
        Value::Array(_) => 8,
        Value::Null => 10,
    };
    base + usize::from(in_array)
}

#[derive(Default)]
struct ExampleRing {
    entries: Vec<String>,
    next: usize,
}

impl ExampleRing {
    fn add(&mut self, example: String) {
        if self.entries.len() < NUM_EXAMPLES {
            self.entries.push(example);
        } else {
            self.entries[self.next] = example;
            self.next = (self.next + 1) % NUM_EXAMPLES;
        }
    }
}

#[derive(Default)]
struct Encountered {
    seen: AtomicU64,
    examples: Mutex<ExampleRing>,
}

/// A histogram of the JSON types observed at one expression's field path,
/// with a rotating buffer of sampled example values.
pub(crate) struct FieldStats {
    sampled: AtomicU64,
    slots: [Encountered; NUM_SLOTS],
}

impl FieldStats {
    pub fn new() -> Self {
        Self {
            sampled: AtomicU64::new(0),
            slots: std::array::from_fn(|_| Encountered::default()),
        }
    }

    pub fn observe(&self, values: &[&Value]) {
        let sample = self.sampled.fetch_add(1, Ordering::Relaxed) + 1;
        let take_example = sample % MARK_WINDOW == 0;
        for &value in values {
            self.mark(value, false, take_example);
            if let Value::Array(items) = value {
                for item in items {
                    self.mark(item, true, take_example);
                }
            }
        }
    }

    fn mark(&self, value: &Value, in_array: bool, take_example: bool) {
        let slot = &self.slots[slot_of(value, in_array)];
        slot.seen.fetch_add(1, Ordering::Relaxed);
        if take_example && !value.is_array() {
            if let Ok(mut ring) = slot.examples.lock() {
                ring.add(render_example(value));
            }
        }
    }

    pub fn snapshot(&self) -> FieldStatsSnapshot {
        let mut encountered = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            let seen = slot.seen.load(Ordering::Relaxed);
            if seen == 0 {
                continue;
            }
            let examples = slot
                .examples
                .lock()
                .map(|ring| ring.entries.clone())
                .unwrap_or_default();
            encountered.push(FieldTypeStats {
                json_type: SLOT_NAMES[i].to_string(),
                seen,
                examples,
            });
        }
        FieldStatsSnapshot {
            sampled: self.sampled.load(Ordering::Relaxed),
            encountered,
        }
    }
}

fn render_example(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<String> = map
                .keys()
                .take(MAX_OBJECT_KEYS)
                .map(|k| format!("{k:?}"))
                .collect();
            if map.len() > MAX_OBJECT_KEYS {
                keys.push("...".to_string());
            }
            format!("<object with keys: {}>", keys.join(","))
        }
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

/// Wire-friendly view of one field's [`FieldStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStatsSnapshot {
    #[serde(rename = "times_sampled")]
    pub sampled: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub encountered: Vec<FieldTypeStats>,
}

/// Seen-count and sampled examples for one JSON type at one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldTypeStats {
    #[serde(rename = "type")]
    pub json_type: String,
    #[serde(rename = "times_seen")]
    pub seen: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_counters() {
        let stats = NodeStats::new("AND");
        stats.mark(true);
        stats.mark(false);
        stats.mark(true);
        let snap = stats.snapshot(Vec::new());
        assert_eq!(snap.node_name, "AND");
        assert_eq!(snap.checked, 3);
        assert_eq!(snap.matched, 2);
    }

    #[test]
    fn field_histogram() {
        let stats = FieldStats::new();
        let string_value = json!("hello");
        let array_value = json!([1, "two"]);
        stats.observe(&[&string_value, &array_value]);
        stats.observe(&[&string_value]);

        let snap = stats.snapshot();
        assert_eq!(snap.sampled, 2);
        let by_type: Vec<(&str, u64)> = snap
            .encountered
            .iter()
            .map(|e| (e.json_type.as_str(), e.seen))
            .collect();
        assert!(by_type.contains(&("string", 2)));
        assert!(by_type.contains(&("array", 1)));
        assert!(by_type.contains(&("number (in array)", 1)));
        assert!(by_type.contains(&("string (in array)", 1)));
    }

    #[test]
    fn example_ring_rotates() {
        let mut ring = ExampleRing::default();
        for i in 0..25 {
            ring.add(format!("e{i}"));
        }
        assert_eq!(ring.entries.len(), NUM_EXAMPLES);
        assert!(ring.entries.contains(&"e24".to_string()));
    }
}
