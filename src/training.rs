use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::point_cloud::PointCloud;

/// one labeled training example; immutable once constructed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub label: String,
    pub points: PointCloud,
}

impl Gesture {
    pub fn new(label: impl Into<String>, points: PointCloud) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// growable collection of training examples; insertion order is irrelevant to
/// classification but kept for debugging
#[derive(Clone, Debug, Default)]
pub struct TrainingSet {
    gestures: Vec<Gesture>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_gestures(gestures: Vec<Gesture>) -> Self {
        Self { gestures }
    }

    /// in-memory append; never fails, visible to the next classify call
    pub fn add(&mut self, gesture: Gesture) {
        self.gestures.push(gesture);
    }

    pub fn extend(&mut self, gestures: impl IntoIterator<Item = Gesture>) {
        self.gestures.extend(gestures);
    }

    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// distinct labels, sorted, with example counts
    pub fn label_counts(&self) -> Vec<(String, usize)> {
        self.gestures
            .iter()
            .map(|g| g.label.clone())
            .sorted()
            .chunk_by(|label| label.clone())
            .into_iter()
            .map(|(label, group)| (label, group.count()))
            .collect()
    }
}
