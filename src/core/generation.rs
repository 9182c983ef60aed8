use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// Gates sharing a counter never hand out the same generation twice.
#[derive(Debug, Clone, Default)]
pub struct GenerationGate {
    counter: Arc<AtomicU64>,
    latest: Arc<AtomicU64>,
}

impl GenerationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(counter: Arc<AtomicU64>) -> Self {
        Self {
            counter,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self) -> CancelToken {
        let generation = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.fetch_max(generation, Ordering::SeqCst);
        CancelToken {
            latest: Some(Arc::clone(&self.latest)),
            generation,
        }
    }

    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        Arc::strong_count(&self.latest) == 1
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    latest: Option<Arc<AtomicU64>>,
    generation: u64,
}

impl CancelToken {
    pub fn detached() -> Self {
        Self {
            latest: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|latest| latest.load(Ordering::SeqCst) != self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_generation_cancels_older_tokens() {
        let gate = GenerationGate::new();
        let first = gate.advance();
        assert!(!first.is_cancelled());
        assert_eq!(first.generation(), 1);

        let second = gate.advance();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(gate.current(), 2);
    }

    #[test]
    fn cloned_gates_share_generations() {
        let gate = GenerationGate::new();
        let token = gate.advance();
        let _ = gate.clone().advance();
        assert!(token.is_cancelled());
    }

    #[test]
    fn shared_counter_keeps_generations_unique_across_gates() {
        let counter = Arc::new(AtomicU64::new(0));
        let a = GenerationGate::with_counter(Arc::clone(&counter));
        let b = GenerationGate::with_counter(Arc::clone(&counter));

        let a1 = a.advance();
        let b1 = b.advance();
        let replacement = GenerationGate::with_counter(Arc::clone(&counter));
        let a2 = replacement.advance();

        assert_eq!((a1.generation(), b1.generation(), a2.generation()), (1, 2, 3));
        assert!(!a1.is_cancelled());
        assert!(!b1.is_cancelled());
        assert_eq!(replacement.current(), 3);
    }

    #[test]
    fn gate_is_idle_only_without_live_tokens() {
        let gate = GenerationGate::new();
        assert!(gate.is_idle());
        let token = gate.advance();
        assert!(!gate.is_idle());
        drop(token);
        assert!(gate.is_idle());
    }

    #[test]
    fn detached_token_is_never_cancelled() {
        let token = CancelToken::detached();
        assert!(!token.is_cancelled());
    }
}
