use thiserror::Error;

use crate::point_cloud::PointCloud;
use crate::training::TrainingSet;

/// raw classifier output for one candidate gesture
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    /// similarity to the best-matching training example, in [0, 1]
    pub score: f64,
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Candidate gesture has no samples")]
    EmptyCandidate,
}

/// Matching seam. The pipeline only depends on this contract; the algorithm
/// behind it is interchangeable.
pub trait Classifier {
    /// Match `candidate` against `training` and return the best label with
    /// its confidence score. Must fail with a defined error on an empty
    /// training set rather than panic.
    fn classify(
        &self,
        candidate: &PointCloud,
        training: &TrainingSet,
    ) -> Result<ClassificationResult, ClassifyError>;
}
