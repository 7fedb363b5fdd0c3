use std::time::Duration;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::pipeline::types::{Gesture, GestureLabel};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// What a single label observation did to the debounce state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// "none" with nothing pending.
    Idle,
    /// "none" dropped a pending candidate.
    Cancelled,
    /// Same as the last sent gesture, nothing to do.
    AlreadyConfirmed,
    /// Same as the pending candidate, its deadline is unchanged.
    Holding,
    /// New candidate, confirmation due at the given instant.
    Armed(Instant),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    gesture: Gesture,
    deadline: Instant,
}

/// Turns a per-frame label stream into at most one confirmation per held gesture.
///
/// A candidate must be observed without a "none" gap until its deadline passes.
/// There is at most one deadline at a time; arming a new candidate replaces it.
/// `last_confirmed` only moves when a confirmation is handed out and is never
/// cleared by a "none" observation.
#[derive(Debug)]
pub struct GestureDebouncer {
    delay: Duration,
    last_confirmed: Option<Gesture>,
    pending: Option<Pending>,
}

impl GestureDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_confirmed: None,
            pending: None,
        }
    }

    pub fn observe(&mut self, label: GestureLabel, now: Instant) -> Observation {
        let Some(gesture) = label else {
            return match self.pending.take() {
                Some(_) => Observation::Cancelled,
                None => Observation::Idle,
            };
        };
        if self.last_confirmed == Some(gesture) {
            return Observation::AlreadyConfirmed;
        }
        match self.pending {
            Some(pending) if pending.gesture == gesture => Observation::Holding,
            _ => {
                let deadline = now + self.delay;
                self.pending = Some(Pending { gesture, deadline });
                Observation::Armed(deadline)
            }
        }
    }

    /// Confirms the pending candidate if its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<Gesture> {
        match self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending = None;
                self.last_confirmed = Some(pending.gesture);
                Some(pending.gesture)
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    pub fn pending(&self) -> Option<Gesture> {
        self.pending.map(|p| p.gesture)
    }

    pub fn last_confirmed(&self) -> Option<Gesture> {
        self.last_confirmed
    }

    /// Owns the debounce state for the life of the task: labels in, confirmations out.
    pub async fn run(
        mut self,
        mut label_rx: Receiver<GestureLabel>,
        confirmed_tx: Sender<Gesture>,
        cancel_token: CancellationToken,
    ) {
        tracing::info!("Gesture debouncer started (hold {}ms)", self.delay.as_millis());
        loop {
            let deadline = self.deadline();
            let timer = async move {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                label = label_rx.recv() => {
                    let Some(label) = label else { break };
                    match self.observe(label, Instant::now()) {
                        Observation::Armed(_) => {
                            tracing::debug!("Gesture candidate {:?} armed", label);
                        }
                        Observation::Cancelled => {
                            tracing::debug!("Gesture candidate cancelled by empty frame");
                        }
                        _ => {}
                    }
                }
                _ = timer => {
                    if let Some(gesture) = self.fire(Instant::now()) {
                        tracing::info!("Gesture confirmed: {}", gesture);
                        if confirmed_tx.send(gesture).await.is_err() {
                            tracing::warn!("Confirmed gesture channel closed, stopping debouncer");
                            break;
                        }
                    }
                }
            }
        }
        tracing::info!("Gesture debouncer stopped");
    }
}

impl Default for GestureDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::error::TryRecvError;

    const D: Duration = DEFAULT_DEBOUNCE;
    const FRAME: Duration = Duration::from_millis(50);

    #[test]
    fn state_machine_confirms_once_after_delay() {
        let start = Instant::now();
        let mut debouncer = GestureDebouncer::new(D);
        assert_eq!(
            debouncer.observe(Some(Gesture::FanOn), start),
            Observation::Armed(start + D)
        );
        assert_eq!(
            debouncer.observe(Some(Gesture::FanOn), start + D / 2),
            Observation::Holding
        );
        assert_eq!(debouncer.fire(start + D / 2), None);
        assert_eq!(debouncer.fire(start + D), Some(Gesture::FanOn));
        assert_eq!(debouncer.last_confirmed(), Some(Gesture::FanOn));
        assert_eq!(
            debouncer.observe(Some(Gesture::FanOn), start + D * 2),
            Observation::AlreadyConfirmed
        );
        assert_eq!(debouncer.fire(start + D * 3), None);
    }

    #[test]
    fn switching_candidate_replaces_deadline() {
        let start = Instant::now();
        let mut debouncer = GestureDebouncer::new(D);
        debouncer.observe(Some(Gesture::FanOn), start);
        let later = start + Duration::from_millis(300);
        assert_eq!(
            debouncer.observe(Some(Gesture::LightOn), later),
            Observation::Armed(later + D)
        );
        assert_eq!(debouncer.pending(), Some(Gesture::LightOn));
        assert_eq!(debouncer.fire(start + D), None);
    }

    #[test]
    fn none_drops_candidate_but_keeps_last_confirmed() {
        let start = Instant::now();
        let mut debouncer = GestureDebouncer::new(D);
        debouncer.observe(Some(Gesture::LightOff), start);
        debouncer.fire(start + D);
        debouncer.observe(Some(Gesture::FanOff), start + D);
        assert_eq!(debouncer.observe(None, start + D), Observation::Cancelled);
        assert_eq!(debouncer.observe(None, start + D), Observation::Idle);
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.last_confirmed(), Some(Gesture::LightOff));
        assert_eq!(
            debouncer.observe(Some(Gesture::LightOff), start + D * 2),
            Observation::AlreadyConfirmed
        );
    }

    fn spawn_debouncer() -> (
        mpsc::Sender<GestureLabel>,
        mpsc::Receiver<Gesture>,
        CancellationToken,
    ) {
        let (label_tx, label_rx) = mpsc::channel(64);
        let (confirmed_tx, confirmed_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        tokio::spawn(GestureDebouncer::new(D).run(label_rx, confirmed_tx, cancel.clone()));
        (label_tx, confirmed_rx, cancel)
    }

    async fn hold(tx: &mpsc::Sender<GestureLabel>, label: GestureLabel, duration: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < duration {
            tx.send(label).await.unwrap();
            tokio::time::sleep(FRAME).await;
            elapsed += FRAME;
        }
    }

    fn drain(rx: &mut mpsc::Receiver<Gesture>) -> Vec<Gesture> {
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(gesture) => out.push(gesture),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return out,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn held_gesture_fires_exactly_once() {
        let (tx, mut rx, cancel) = spawn_debouncer();
        hold(&tx, Some(Gesture::LightOn), D + Duration::from_millis(500)).await;
        assert_eq!(drain(&mut rx), vec![Gesture::LightOn]);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn fast_alternation_never_fires() {
        let (tx, mut rx, cancel) = spawn_debouncer();
        for _ in 0..6 {
            hold(&tx, Some(Gesture::FanOn), D / 2 - FRAME).await;
            hold(&tx, Some(Gesture::LightOn), D / 2 - FRAME).await;
        }
        assert!(drain(&mut rx).is_empty());
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn continued_hold_after_confirmation_stays_quiet() {
        let (tx, mut rx, cancel) = spawn_debouncer();
        hold(&tx, Some(Gesture::FanOff), D * 4).await;
        assert_eq!(drain(&mut rx), vec![Gesture::FanOff]);

        // a none gap does not reset the dedup
        hold(&tx, None, D).await;
        hold(&tx, Some(Gesture::FanOff), D * 2).await;
        assert!(drain(&mut rx).is_empty());

        hold(&tx, Some(Gesture::FanOn), D * 2).await;
        assert_eq!(drain(&mut rx), vec![Gesture::FanOn]);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn none_cancels_and_reobservation_restarts_wait() {
        let (tx, mut rx, cancel) = spawn_debouncer();
        hold(&tx, Some(Gesture::FanOn), Duration::from_millis(600)).await;
        hold(&tx, None, Duration::from_millis(100)).await;

        // 800ms into the restarted wait: the first deadline has passed, nothing fired
        hold(&tx, Some(Gesture::FanOn), Duration::from_millis(800)).await;
        assert!(drain(&mut rx).is_empty());

        hold(&tx, Some(Gesture::FanOn), Duration::from_millis(400)).await;
        assert_eq!(drain(&mut rx), vec![Gesture::FanOn]);
        cancel.cancel();
    }
}
