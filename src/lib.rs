// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod classify;
pub mod commit;
pub mod config;
pub mod decision;
pub mod events;
pub mod matcher;
pub mod point_cloud;
pub mod runtime;
pub mod sketch;
pub mod stats;
pub mod store;
pub mod training;

pub use classify::{ClassificationResult, Classifier, ClassifyError};
pub use decision::{decide, Verdict, INCORRECT_SYMBOL};
pub use point_cloud::{PointCloud, Sample};
pub use sketch::{Sketch, SketchParams};
pub use training::{Gesture, TrainingSet};
