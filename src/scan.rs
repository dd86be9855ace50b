//! Simulated Scan Module
//!
//! Fake RFID/NFC lookup standing in for real hardware integration. A scan
//! sleeps for a fixed delay and resolves by an unweighted random draw.
//!
//! Unlike a bare timer, the pending completion is tied to a [`ScanTask`]
//! handle: dropping or cancelling the handle aborts the sleep, so leaving
//! the screen mid-delay never fires a late completion.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::vehicles::RegistrationForm;

/// Scan lifecycle. Each screen visit starts from `Idle`; no terminal state
/// persists across visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Idle,
    Searching,
    Success,
    Error,
}

/// Result of the random draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOutcome {
    Success,
    Failure,
}

/// Completed scan delivered to the frontend, payload intact.
///
/// `phase` is the terminal state the machine landed in, so the frontend
/// can route to the confirmation or retry screen without re-deriving it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub outcome: ScanOutcome,
    pub phase: ScanPhase,
    pub form: RegistrationForm,
}

/// Scan timing and odds
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    pub delay: Duration,
    pub success_probability: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(3000),
            success_probability: 0.7,
        }
    }
}

/// Draw a scan outcome at the given success probability
pub fn draw_outcome<R: Rng>(rng: &mut R, success_probability: f64) -> ScanOutcome {
    if rng.gen::<f64>() < success_probability {
        ScanOutcome::Success
    } else {
        ScanOutcome::Failure
    }
}

impl ScanPhase {
    /// `Idle → Searching` on user action
    pub fn begin(self) -> ScanPhase {
        match self {
            ScanPhase::Idle => ScanPhase::Searching,
            other => other,
        }
    }

    /// `Searching → {Success, Error}` on completion
    pub fn complete(self, outcome: ScanOutcome) -> ScanPhase {
        match (self, outcome) {
            (ScanPhase::Searching, ScanOutcome::Success) => ScanPhase::Success,
            (ScanPhase::Searching, ScanOutcome::Failure) => ScanPhase::Error,
            (other, _) => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ScanPhase::Success | ScanPhase::Error)
    }
}

/// Handle to a pending simulated scan.
///
/// The completion fires only while the handle is alive; `cancel` or drop
/// aborts it.
pub struct ScanTask {
    handle: tokio::task::JoinHandle<()>,
}

impl ScanTask {
    /// Start a scan. After `config.delay` the outcome is drawn and handed to
    /// `on_complete` together with the original form payload.
    pub fn spawn<F>(config: ScanConfig, form: RegistrationForm, on_complete: F) -> Self
    where
        F: FnOnce(ScanResult) + Send + 'static,
    {
        info!("Scan started for plate: {}", form.plate);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(config.delay).await;

            let outcome = draw_outcome(&mut rand::thread_rng(), config.success_probability);
            let phase = ScanPhase::Searching.complete(outcome);
            debug!("Scan resolved: {:?}", outcome);

            on_complete(ScanResult { outcome, phase, form });
        });

        Self { handle }
    }

    /// Abort the pending completion
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            info!("Scan cancelled before completion");
        }
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScanTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicles::VehicleModel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::mpsc;

    fn form() -> RegistrationForm {
        RegistrationForm {
            plate: "ABC-1234".into(),
            entry_date: "01/02/2024".into(),
            model: VehicleModel::Sport,
        }
    }

    fn fast_config() -> ScanConfig {
        ScanConfig {
            delay: Duration::from_millis(10),
            success_probability: 0.7,
        }
    }

    #[test]
    fn phase_walks_idle_searching_terminal() {
        let phase = ScanPhase::Idle.begin();
        assert_eq!(phase, ScanPhase::Searching);

        assert_eq!(phase.complete(ScanOutcome::Success), ScanPhase::Success);
        assert_eq!(phase.complete(ScanOutcome::Failure), ScanPhase::Error);
        assert!(ScanPhase::Success.is_terminal());
        assert!(!ScanPhase::Searching.is_terminal());
    }

    #[test]
    fn completion_requires_searching() {
        assert_eq!(ScanPhase::Idle.complete(ScanOutcome::Success), ScanPhase::Idle);
        assert_eq!(ScanPhase::Success.begin(), ScanPhase::Success);
    }

    #[test]
    fn outcome_distribution_tracks_probability() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 10_000;
        let successes = (0..draws)
            .filter(|_| draw_outcome(&mut rng, 0.7) == ScanOutcome::Success)
            .count();

        let rate = successes as f64 / draws as f64;
        assert!(rate > 0.67 && rate < 0.73, "rate was {}", rate);
    }

    #[test]
    fn probability_extremes_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(draw_outcome(&mut rng, 1.0), ScanOutcome::Success);
            assert_eq!(draw_outcome(&mut rng, 0.0), ScanOutcome::Failure);
        }
    }

    #[tokio::test]
    async fn completion_carries_the_original_payload() {
        let (tx, rx) = mpsc::channel();
        let task = ScanTask::spawn(fast_config(), form(), move |result| {
            tx.send(result).ok();
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        let result = rx.try_recv().expect("scan should have completed");
        assert_eq!(result.form, form());
        assert!(task.is_finished());
    }

    #[tokio::test]
    async fn delivered_result_reports_the_terminal_phase() {
        let (tx, rx) = mpsc::channel();
        let _task = ScanTask::spawn(fast_config(), form(), move |result| {
            tx.send(result).ok();
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        let result = rx.try_recv().expect("scan should have completed");

        assert!(result.phase.is_terminal());
        match result.outcome {
            ScanOutcome::Success => assert_eq!(result.phase, ScanPhase::Success),
            ScanOutcome::Failure => assert_eq!(result.phase, ScanPhase::Error),
        }
    }

    #[tokio::test]
    async fn cancelled_scan_never_delivers() {
        let (tx, rx) = mpsc::channel();
        let task = ScanTask::spawn(
            ScanConfig { delay: Duration::from_millis(50), ..fast_config() },
            form(),
            move |result| {
                tx.send(result).ok();
            },
        );

        task.cancel();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropping_the_handle_aborts_the_scan() {
        let (tx, rx) = mpsc::channel();
        {
            let _task = ScanTask::spawn(
                ScanConfig { delay: Duration::from_millis(50), ..fast_config() },
                form(),
                move |result| {
                    tx.send(result).ok();
                },
            );
        }

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(rx.try_recv().is_err());
    }
}
