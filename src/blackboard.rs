use parking_lot::RwLock;
use std::sync::Arc;

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    Goal,
    Hole,
    Timeout,
}

/// Totals shared by every rollout worker.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub episodes: usize,
    pub goals: usize,
    pub holes: usize,
    pub timeouts: usize,
    pub steps: usize,
    pub faults: Vec<String>,
}

impl State {
    pub fn goal_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.goals as f64 / self.episodes as f64
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn record_episode(bb: &Blackboard, end: EpisodeEnd, steps: usize) {
    let mut g = bb.write();
    g.episodes += 1;
    g.steps += steps;
    match end {
        EpisodeEnd::Goal => g.goals += 1,
        EpisodeEnd::Hole => g.holes += 1,
        EpisodeEnd::Timeout => g.timeouts += 1,
    }
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_record_episode_counts() {
        let bb: Blackboard = Arc::default();
        record_episode(&bb, EpisodeEnd::Goal, 12);
        record_episode(&bb, EpisodeEnd::Timeout, 200);
        record_episode(&bb, EpisodeEnd::Hole, 3);
        let state = snapshot(&bb);
        assert_eq!((state.episodes, state.goals, state.holes, state.timeouts), (3, 1, 1, 1));
        assert_eq!(state.steps, 215);
        assert!((state.goal_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_concurrent_writers() {
        let bb: Blackboard = Arc::default();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bb = Arc::clone(&bb);
                thread::spawn(move || {
                    for _ in 0..100 {
                        record_episode(&bb, EpisodeEnd::Goal, 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(snapshot(&bb).goals, 800);
    }

    #[test]
    fn test_faults_are_deduplicated() {
        let bb: Blackboard = Arc::default();
        raise_fault(&bb, "worker 1 failed");
        raise_fault(&bb, "worker 1 failed");
        assert_eq!(snapshot(&bb).faults.len(), 1);
        assert_eq!(snapshot(&bb).goal_rate(), 0.0);
    }
}
