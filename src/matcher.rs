use crate::classify::{ClassificationResult, Classifier, ClassifyError};
use crate::point_cloud::PointCloud;
use crate::training::TrainingSet;

/// Point-cloud template matcher used when no external classifier is plugged
/// in. Candidate and template are resampled to a fixed point budget,
/// normalized into a unit box, and compared by symmetric mean
/// nearest-neighbour distance; the distance maps linearly onto a [0, 1]
/// confidence score.
#[derive(Clone, Copy, Debug)]
pub struct CloudMatcher {
    point_budget: usize,
}

/// resampled points per gesture
const DEFAULT_POINT_BUDGET: usize = 32;

/// normalized distance at which the score bottoms out at 0.0
const DISTANCE_SPAN: f64 = 0.35;

impl CloudMatcher {
    pub fn new(point_budget: usize) -> Self {
        Self {
            point_budget: point_budget.max(2),
        }
    }

    /// similarity of two clouds in [0, 1]
    pub fn similarity(&self, a: &PointCloud, b: &PointCloud) -> f64 {
        let a = normalize(&resample(a, self.point_budget));
        let b = normalize(&resample(b, self.point_budget));
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let dist = (mean_nearest_distance(&a, &b) + mean_nearest_distance(&b, &a)) / 2.0;
        (1.0 - dist / DISTANCE_SPAN).clamp(0.0, 1.0)
    }
}

impl Default for CloudMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_POINT_BUDGET)
    }
}

impl Classifier for CloudMatcher {
    fn classify(
        &self,
        candidate: &PointCloud,
        training: &TrainingSet,
    ) -> Result<ClassificationResult, ClassifyError> {
        if candidate.is_empty() {
            return Err(ClassifyError::EmptyCandidate);
        }

        let mut best: Option<(String, f64)> = None;
        for gesture in training.gestures() {
            if gesture.points.is_empty() {
                continue;
            }
            let score = self.similarity(candidate, &gesture.points);
            match &best {
                Some((_, top)) if score <= *top => {}
                _ => best = Some((gesture.label.clone(), score)),
            }
        }

        best.map(|(label, score)| ClassificationResult { label, score })
            .ok_or(ClassifyError::EmptyTrainingSet)
    }
}

/// Arc-length resampling, stroke by stroke. Each stroke receives a share of
/// the budget proportional to its path length, so pen-lift structure survives
/// without interpolating across the gap between strokes.
fn resample(cloud: &PointCloud, budget: usize) -> Vec<(f64, f64)> {
    let strokes: Vec<Vec<(f64, f64)>> = cloud
        .strokes()
        .into_iter()
        .map(|(_, samples)| samples.iter().map(|s| (s.x, s.y)).collect())
        .collect();
    if strokes.is_empty() {
        return vec![];
    }

    let lengths: Vec<f64> = strokes.iter().map(|s| path_length(s)).collect();
    let total: f64 = lengths.iter().sum();

    let mut out = Vec::with_capacity(budget);
    for (stroke, length) in strokes.iter().zip(&lengths) {
        let share = if total > 0.0 {
            ((budget as f64) * length / total).round() as usize
        } else {
            1
        };
        resample_stroke(stroke, share.max(1), &mut out);
    }
    out
}

fn path_length(stroke: &[(f64, f64)]) -> f64 {
    stroke
        .windows(2)
        .map(|w| distance(w[0], w[1]))
        .sum()
}

fn resample_stroke(stroke: &[(f64, f64)], count: usize, out: &mut Vec<(f64, f64)>) {
    let length = path_length(stroke);
    if stroke.is_empty() {
        return;
    }
    if length == 0.0 || count == 1 || stroke.len() == 1 {
        out.push(stroke[0]);
        return;
    }

    let step = length / (count - 1) as f64;
    out.push(stroke[0]);
    let mut walked = 0.0;
    let mut emitted = 1;
    for w in stroke.windows(2) {
        let (mut from, to) = (w[0], w[1]);
        let mut seg = distance(from, to);
        while emitted < count && walked + seg >= step * emitted as f64 {
            let need = step * emitted as f64 - walked;
            let t = need / distance(from, to).max(f64::MIN_POSITIVE);
            let p = (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
            out.push(p);
            emitted += 1;
            seg -= need;
            walked += need;
            from = p;
        }
        walked += seg;
    }
    while emitted < count {
        out.push(*stroke.last().unwrap_or(&stroke[0]));
        emitted += 1;
    }
}

/// Translate the bounding-rect centre to the origin and scale by the larger
/// dimension; a degenerate (zero-extent) cloud collapses to the origin.
fn normalize(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if points.is_empty() {
        return vec![];
    }
    let (mut min_x, mut min_y) = points[0];
    let (mut max_x, mut max_y) = points[0];
    for &(x, y) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let side = (max_x - min_x).max(max_y - min_y);
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    if side == 0.0 {
        return vec![(0.0, 0.0); points.len()];
    }
    points
        .iter()
        .map(|&(x, y)| ((x - cx) / side, (y - cy) / side))
        .collect()
}

fn mean_nearest_distance(from: &[(f64, f64)], to: &[(f64, f64)]) -> f64 {
    let sum: f64 = from
        .iter()
        .map(|&p| {
            to.iter()
                .map(|&q| distance(p, q))
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    sum / from.len() as f64
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}
