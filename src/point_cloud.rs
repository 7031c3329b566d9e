use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// one recorded pointer position, tagged with the stroke it belongs to
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub stroke_id: u32,
}

/// ordered samples of one gesture; insertion order carries the temporal and
/// stroke structure and is never reordered
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointCloud {
    samples: Vec<Sample>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn append(&mut self, x: f64, y: f64, stroke_id: u32) {
        self.samples.push(Sample { x, y, stroke_id });
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// owned copy of the samples as they stand, handed to the classifier at commit time
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn stroke_count(&self) -> usize {
        self.samples.iter().map(|s| s.stroke_id).dedup().count()
    }

    /// samples grouped by stroke id, in first-appearance order
    pub fn strokes(&self) -> Vec<(u32, Vec<Sample>)> {
        self.samples
            .iter()
            .chunk_by(|s| s.stroke_id)
            .into_iter()
            .map(|(id, group)| (id, group.copied().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let mut cloud = PointCloud::new();
        cloud.append(1.0, -2.0, 0);
        cloud.append(3.0, -4.0, 0);
        cloud.append(5.0, -6.0, 1);

        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.samples()[0].x, 1.0);
        assert_eq!(cloud.samples()[1].y, -4.0);
        assert_eq!(cloud.samples()[2].stroke_id, 1);
    }

    #[test]
    fn negative_coordinates_are_valid() {
        let mut cloud = PointCloud::new();
        cloud.append(-10.0, -20.0, 0);
        assert_eq!(cloud.samples()[0].x, -10.0);
        assert_eq!(cloud.samples()[0].y, -20.0);
    }

    #[test]
    fn strokes_group_by_id_in_order() {
        let mut cloud = PointCloud::new();
        cloud.append(0.0, 0.0, 0);
        cloud.append(1.0, 0.0, 0);
        cloud.append(0.0, 1.0, 1);
        cloud.append(1.0, 1.0, 1);
        cloud.append(2.0, 1.0, 1);

        let strokes = cloud.strokes();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].0, 0);
        assert_eq!(strokes[0].1.len(), 2);
        assert_eq!(strokes[1].0, 1);
        assert_eq!(strokes[1].1.len(), 3);
        assert_eq!(cloud.stroke_count(), 2);
    }

    #[test]
    fn snapshot_is_independent_of_later_appends() {
        let mut cloud = PointCloud::new();
        cloud.append(1.0, 1.0, 0);

        let snap = cloud.snapshot();
        cloud.append(2.0, 2.0, 0);

        assert_eq!(snap.len(), 1);
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn clear_empties_the_cloud() {
        let mut cloud = PointCloud::new();
        cloud.append(1.0, 1.0, 0);
        cloud.append(2.0, 2.0, 1);
        cloud.clear();

        assert!(cloud.is_empty());
        assert_eq!(cloud.stroke_count(), 0);
    }

    #[test]
    fn serializes_as_a_bare_sample_list() {
        let mut cloud = PointCloud::new();
        cloud.append(1.5, -2.5, 0);

        let json = serde_json::to_string(&cloud).unwrap();
        assert!(json.starts_with('['), "expected a top-level array: {json}");

        let back: PointCloud = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cloud);
    }
}
