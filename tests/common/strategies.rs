use proptest::prelude::*;
use wizard_core::wizard::{StepPayload, StepSequence};

/// Optional flag per step, between one and eight steps
pub fn step_layout_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..8)
}

/// Small payloads over a narrow key space so that overwrites are common
pub fn payload_strategy() -> impl Strategy<Value = StepPayload> {
    prop::collection::btree_map("[a-f]", any::<i64>(), 0..4).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(key, value)| (key, serde_json::Value::from(value)))
            .collect()
    })
}

pub fn sequence_from_layout(layout: &[bool]) -> StepSequence {
    layout
        .iter()
        .enumerate()
        .fold(StepSequence::builder(), |builder, (index, optional)| {
            let label = format!("Step {index}");
            if *optional {
                builder.optional_step(label)
            } else {
                builder.step(label)
            }
        })
        .build()
        .expect("generated layout is non-empty")
}
