use crate::motion::approach;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Transitioning,
}

/// Emitted on the tick a crossfade finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionCommit {
    pub from: usize,
    pub to: usize,
}

/// Slide pair and weight handed to the crossfade shader for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderInputs {
    pub from: usize,
    pub to: usize,
    pub progress: f32,
}

/// Discrete slide index plus a continuous crossfade progress.
///
/// `target_progress` is `1.0` exactly while a transition is in flight and
/// `0.0` otherwise. `last_index` only changes when a transition commits, so
/// retargeting mid-flight keeps fading from the last committed slide.
#[derive(Debug, Clone)]
pub struct TransitionState {
    active_index: usize,
    last_index: usize,
    progress: f32,
    target_progress: f32,
    speed: f32,
    commit_threshold: f32,
}

impl TransitionState {
    pub fn new(initial_index: usize, speed: f32, commit_threshold: f32) -> Self {
        Self {
            active_index: initial_index,
            last_index: initial_index,
            progress: 0.0,
            target_progress: 0.0,
            speed,
            commit_threshold,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        if self.target_progress >= 1.0 {
            TransitionPhase::Transitioning
        } else {
            TransitionPhase::Idle
        }
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn target_progress(&self) -> f32 {
        self.target_progress
    }

    /// Start (or retarget) a transition when `requested` differs from the
    /// active slide. Returns whether anything changed.
    pub fn observe_request(&mut self, requested: usize) -> bool {
        if requested == self.active_index {
            return false;
        }
        if self.phase() == TransitionPhase::Transitioning {
            tracing::debug!(
                from = self.last_index,
                stale = self.active_index,
                to = requested,
                progress = self.progress,
                "transition retargeted mid-flight"
            );
        }
        self.active_index = requested;
        self.target_progress = 1.0;
        true
    }

    pub fn tick(&mut self, delta: f32) -> Option<TransitionCommit> {
        self.progress = approach(self.progress, self.target_progress, self.speed, delta);
        if self.phase() == TransitionPhase::Transitioning && self.progress > self.commit_threshold
        {
            let commit = TransitionCommit {
                from: self.last_index,
                to: self.active_index,
            };
            self.last_index = self.active_index;
            self.progress = 0.0;
            self.target_progress = 0.0;
            return Some(commit);
        }
        None
    }

    pub fn shader_inputs(&self) -> ShaderInputs {
        match self.phase() {
            TransitionPhase::Transitioning => ShaderInputs {
                from: self.last_index,
                to: self.active_index,
                progress: self.progress,
            },
            TransitionPhase::Idle => ShaderInputs {
                from: self.active_index,
                to: self.active_index,
                progress: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn machine() -> TransitionState {
        TransitionState::new(0, 2.0, 0.99)
    }

    #[test]
    fn starts_idle_with_static_blend() {
        let sm = machine();
        assert_eq!(sm.phase(), TransitionPhase::Idle);
        assert_eq!(
            sm.shader_inputs(),
            ShaderInputs {
                from: 0,
                to: 0,
                progress: 0.0
            }
        );
    }

    #[test]
    fn same_index_request_is_ignored() {
        let mut sm = machine();
        assert!(!sm.observe_request(0));
        assert_eq!(sm.phase(), TransitionPhase::Idle);
        assert!(sm.tick(DT).is_none());
        assert_eq!(sm.progress(), 0.0);
    }

    #[test]
    fn trigger_feeds_last_and_active_to_shader() {
        let mut sm = machine();
        assert!(sm.observe_request(2));
        sm.tick(DT);
        let inputs = sm.shader_inputs();
        assert_eq!((inputs.from, inputs.to), (0, 2));
        assert!(inputs.progress > 0.0 && inputs.progress < 1.0);
    }

    #[test]
    fn commit_resets_to_idle() {
        let mut sm = machine();
        sm.observe_request(1);
        let mut commit = None;
        for _ in 0..1000 {
            if let Some(c) = sm.tick(DT) {
                commit = Some(c);
                break;
            }
        }
        assert_eq!(commit, Some(TransitionCommit { from: 0, to: 1 }));
        assert_eq!(sm.last_index(), sm.active_index());
        assert_eq!(sm.progress(), 0.0);
        assert_eq!(sm.target_progress(), 0.0);
        assert_eq!(sm.phase(), TransitionPhase::Idle);
    }

    #[test]
    fn retarget_keeps_last_committed_source() {
        let mut sm = machine();
        sm.observe_request(1);
        for _ in 0..30 {
            assert!(sm.tick(DT).is_none());
        }
        let before = sm.progress();
        sm.observe_request(2);
        assert_eq!(sm.progress(), before, "retargeting does not reset progress");
        let inputs = sm.shader_inputs();
        assert_eq!((inputs.from, inputs.to), (0, 2));
    }

    #[test]
    fn huge_delta_commits_without_overshoot() {
        let mut sm = machine();
        sm.observe_request(1);
        let commit = sm.tick(10.0);
        assert_eq!(commit, Some(TransitionCommit { from: 0, to: 1 }));
        assert_eq!(sm.progress(), 0.0);
    }

    #[test]
    fn zero_delta_stalls() {
        let mut sm = machine();
        sm.observe_request(1);
        for _ in 0..10 {
            assert!(sm.tick(0.0).is_none());
        }
        assert_eq!(sm.progress(), 0.0);
        assert_eq!(sm.phase(), TransitionPhase::Transitioning);
    }
}
