//! Field-level payload transformation
//!
//! Applies the ordered rule set for a (source, target) module pair to a
//! payload. Pure: no I/O, no shared state, deterministic for a given input.

use tracing::debug;

use crate::types::{Payload, TransformRule};

/// Apply `rules` in order to `payload`, producing the target payload.
///
/// Only fields explicitly mapped by a rule appear in the result; unmapped
/// fields are dropped. A source field that is present but null carries the
/// null through, while an absent source field yields an absent target field.
/// Later rules targeting the same field overwrite earlier ones.
pub fn transform(payload: &Payload, rules: &[TransformRule]) -> Payload {
    let mut result = Payload::new();

    for rule in rules {
        let Some((source_field, target_field)) = rule.fields() else {
            debug!("Skipping rule without field descriptors: {:?}", rule);
            continue;
        };

        if let Some(value) = payload.get(source_field) {
            result.insert(target_field.to_string(), value.clone());
        }
    }

    result
}
