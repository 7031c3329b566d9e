use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::classify::{ClassificationResult, Classifier};
use crate::commit::CommitTimer;
use crate::decision::{decide, Verdict};
use crate::events::{Notifier, RecognitionEvent};
use crate::matcher::CloudMatcher;
use crate::point_cloud::PointCloud;
use crate::stats::{OutcomeDb, OutcomeStat};
use crate::store::{GestureStore, StoreError};
use crate::training::{Gesture, TrainingSet};

/// tunable knobs for one sketch session
#[derive(Clone, Debug, PartialEq)]
pub struct SketchParams {
    pub minimum_confidence: f64,
    pub expected: Option<String>,
    pub commit_delay: Duration,
    /// when true, moves outside the capture area are dropped
    pub gated: bool,
}

impl Default for SketchParams {
    fn default() -> Self {
        Self {
            minimum_confidence: 0.90,
            expected: None,
            commit_delay: Duration::from_millis(1000),
            gated: true,
        }
    }
}

/// represents one in-progress drawing surface and its recognition pipeline
pub struct Sketch {
    points: PointCloud,
    /// screen-space polyline per stroke, kept for display; the area-exit
    /// policy clears the active one without touching recorded samples
    trails: Vec<Vec<(f64, f64)>>,
    current_stroke: Option<u32>,
    is_dragging: bool,
    pub within_bounds: bool,
    pub gated: bool,
    timer: CommitTimer,
    pub training: TrainingSet,
    classifier: Box<dyn Classifier>,
    pub notifier: Notifier,
    pub minimum_confidence: f64,
    pub expected: Option<String>,
    pub last_verdict: Option<Verdict>,
    commit_seq: u64,
    pub outcome_db: Option<OutcomeDb>,
    pub log_path: Option<PathBuf>,
}

impl Sketch {
    pub fn new(
        params: SketchParams,
        training: TrainingSet,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            points: PointCloud::new(),
            trails: vec![],
            current_stroke: None,
            is_dragging: false,
            within_bounds: !params.gated,
            gated: params.gated,
            timer: CommitTimer::new(params.commit_delay),
            training,
            classifier,
            notifier: Notifier::new(),
            minimum_confidence: params.minimum_confidence,
            expected: params.expected,
            last_verdict: None,
            commit_seq: 0,
            outcome_db: None,
            log_path: None,
        }
    }

    /// session backed by the built-in point-cloud matcher
    pub fn with_matcher(params: SketchParams, training: TrainingSet) -> Self {
        Self::new(params, training, Box::new(CloudMatcher::default()))
    }

    /// A new stroke begins: any pending commit is cancelled (the gesture
    /// continues), the stroke id advances, and the first sample lands
    /// unconditionally. y is negated here to match the classifier's
    /// coordinate orientation.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.timer.cancel();

        let id = self.current_stroke.map_or(0, |s| s + 1);
        self.current_stroke = Some(id);
        self.points.append(x, -y, id);
        self.trails.push(vec![(x, y)]);
        self.is_dragging = true;

        self.notifier
            .emit(&RecognitionEvent::InteractionStart { x, y });
    }

    /// Samples while dragging; a move outside the capture area is dropped
    /// entirely when gating is on.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.is_dragging {
            return;
        }
        if self.gated && !self.within_bounds {
            return;
        }
        let Some(id) = self.current_stroke else {
            return;
        };

        self.points.append(x, -y, id);
        if let Some(trail) = self.trails.last_mut() {
            trail.push((x, y));
        }
    }

    /// Stroke ends: the commit window opens (or reopens).
    pub fn pointer_up(&mut self, x: f64, y: f64, now: Instant) {
        if !self.is_dragging {
            return;
        }
        self.is_dragging = false;
        self.timer.restart(now);

        self.notifier
            .emit(&RecognitionEvent::InteractionEnd { x, y });
    }

    pub fn area_enter(&mut self) {
        self.within_bounds = true;
    }

    /// Leaving the capture area mid-drag discards the active display trail
    /// and stops further capture until re-entry; samples already recorded
    /// (this stroke's included) are kept.
    pub fn area_exit(&mut self) {
        self.within_bounds = false;
        if self.is_dragging {
            if let Some(trail) = self.trails.last_mut() {
                trail.clear();
            }
        }
    }

    /// Polls the commit window; at the deadline the accumulated gesture is
    /// classified exactly once and the verdict returned.
    pub fn on_tick(&mut self, now: Instant) -> Option<Verdict> {
        if self.timer.fire_due(now) {
            Some(self.commit())
        } else {
            None
        }
    }

    fn commit(&mut self) -> Verdict {
        self.commit_seq += 1;
        let snapshot = self.points.snapshot();

        let (verdict, raw) = match self.classifier.classify(&snapshot, &self.training) {
            Ok(result) => {
                let verdict = decide(&result, self.minimum_confidence, self.expected.as_deref());
                (verdict, Some(result))
            }
            Err(err) => {
                tracing::warn!(%err, commit_seq = self.commit_seq, "classification failed");
                (Verdict::Unmatched { score: 0.0 }, None)
            }
        };

        match &verdict {
            Verdict::Matched { label, score } => {
                self.notifier.emit(&RecognitionEvent::Matched {
                    label: label.clone(),
                    score: *score,
                });
            }
            Verdict::Unmatched { .. } => {
                self.notifier.emit(&RecognitionEvent::Unmatched);
            }
        }

        self.record_outcome(&verdict, raw.as_ref());
        tracing::debug!(commit_seq = self.commit_seq, ?verdict, "gesture committed");
        self.last_verdict = Some(verdict.clone());
        verdict
    }

    fn record_outcome(&self, verdict: &Verdict, raw: Option<&ClassificationResult>) {
        let (label, score, matched) = match (verdict, raw) {
            (Verdict::Matched { label, score }, _) => (label.clone(), *score, true),
            (Verdict::Unmatched { score }, Some(raw)) => (raw.label.clone(), *score, false),
            (Verdict::Unmatched { score }, None) => (String::new(), *score, false),
        };

        let stat = OutcomeStat {
            commit_seq: self.commit_seq,
            label,
            score,
            matched,
            expected: self.expected.clone(),
            timestamp: Local::now(),
        };

        if let Some(ref db) = self.outcome_db {
            let _ = db.record_outcome(&stat);
        }
        let _ = self.append_log(&stat);
    }

    fn append_log(&self, stat: &OutcomeStat) -> io::Result<()> {
        let Some(ref log_path) = self.log_path else {
            return Ok(());
        };

        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // If the log file doesn't exist, we need to emit a header
        let needs_header = !log_path.exists();

        let mut log_file = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .open(log_path)?;

        if needs_header {
            writeln!(log_file, "date,commit_seq,label,score,matched,expected")?;
        }

        writeln!(
            log_file,
            "{},{},{},{:.3},{},{}",
            Local::now().format("%c"),
            stat.commit_seq,
            stat.label,
            stat.score,
            stat.matched,
            stat.expected.clone().unwrap_or_default(),
        )?;

        Ok(())
    }

    /// Clears the capture and cancels any pending commit. Callable at any
    /// time; the bounds gate is left alone since it mirrors the physical
    /// pointer position.
    pub fn reset(&mut self) {
        self.points.clear();
        self.trails.clear();
        self.current_stroke = None;
        self.is_dragging = false;
        self.timer.cancel();
        self.last_verdict = None;
    }

    /// Turns the current capture into a training example: added to the
    /// in-memory set (never fails), then written to the store. Empty labels
    /// and empty captures are rejected before either step.
    pub fn save_current_capture(
        &mut self,
        label: &str,
        store: &GestureStore,
    ) -> Result<PathBuf, StoreError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(StoreError::EmptyLabel);
        }
        if self.points.is_empty() {
            return Err(StoreError::EmptyGesture);
        }

        let gesture = Gesture::new(label, self.points.snapshot());
        self.training.add(gesture.clone());
        store.save(&gesture)
    }

    pub fn point_cloud(&self) -> &PointCloud {
        &self.points
    }

    pub fn trails(&self) -> &[Vec<(f64, f64)>] {
        &self.trails
    }

    pub fn has_capture(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn current_stroke(&self) -> Option<u32> {
        self.current_stroke
    }

    pub fn pending_commit(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn commit_seq(&self) -> u64 {
        self.commit_seq
    }

    pub fn commit_delay(&self) -> Duration {
        self.timer.delay()
    }

    pub fn set_commit_delay(&mut self, delay: Duration) {
        self.timer.set_delay(delay);
    }

    pub fn adjust_confidence(&mut self, delta: f64) {
        self.minimum_confidence = (self.minimum_confidence + delta).clamp(0.0, 1.0);
    }
}

impl std::fmt::Debug for Sketch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sketch")
            .field("points", &self.points.len())
            .field("current_stroke", &self.current_stroke)
            .field("is_dragging", &self.is_dragging)
            .field("within_bounds", &self.within_bounds)
            .field("gated", &self.gated)
            .field("pending_commit", &self.timer.is_pending())
            .field("training", &self.training.len())
            .field("commit_seq", &self.commit_seq)
            .finish()
    }
}
