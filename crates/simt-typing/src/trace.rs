//! Tracing types for resolver observability.
//!
//! These types capture step-by-step traces of call and attribute
//! resolution, so a host can show why an overload was (or was not) picked.
//! All tracing is opt-in via `Resolver::with_tracing()`; a disabled tracer
//! records nothing and formats nothing.

use serde::Serialize;

/// A single step in a resolution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveStep {
    pub step: usize,
    pub action: ResolveAction,
    /// The intrinsic, namespace member, or global being resolved.
    pub subject: String,
    pub detail: String,
}

/// What happened during a resolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveAction {
    /// Rule or attribute map found for the requested identity.
    Lookup,
    /// Nothing registered for the requested identity.
    LookupMiss,
    /// Fixed-table candidate compared against the arguments.
    TryCandidate,
    /// Fixed-table candidate matched.
    CandidateMatched,
    /// Predicate resolver invoked.
    ApplyPredicate,
    /// Closure-factory resolver built and invoked.
    ApplyClosure,
    /// Raw attempt failed; retried with literal wrappers stripped.
    LiteralFallback,
    Resolved,
    Unresolved,
    /// Literal argument outside the intrinsic's domain.
    InvalidLiteral,
    /// Keyword arguments on a call.
    MalformedRequest,
    AttributeHit,
    AttributeMiss,
    GlobalHit,
    GlobalMiss,
}

/// Collects [`ResolveStep`]s when enabled.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tracer {
    steps: Option<Vec<ResolveStep>>,
}

impl Tracer {
    pub(crate) fn enabled() -> Self {
        Self {
            steps: Some(Vec::new()),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.steps.is_some()
    }

    /// Record a step. `detail` is only evaluated when tracing is on.
    pub(crate) fn record(
        &mut self,
        action: ResolveAction,
        subject: &str,
        detail: impl FnOnce() -> String,
    ) {
        if let Some(steps) = &mut self.steps {
            steps.push(ResolveStep {
                step: steps.len(),
                action,
                subject: subject.to_string(),
                detail: detail(),
            });
        }
    }

    pub(crate) fn take(&mut self) -> Vec<ResolveStep> {
        match &mut self.steps {
            Some(steps) => std::mem::take(steps),
            None => Vec::new(),
        }
    }
}

/// Serialize a trace as a JSON array.
pub fn trace_to_json(steps: &[ResolveStep]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_tracer_skips_detail() {
        let mut tracer = Tracer::default();
        tracer.record(ResolveAction::Lookup, "cuda.popc", || {
            panic!("detail must not be formatted when tracing is off")
        });
        assert!(!tracer.is_enabled());
        assert!(tracer.take().is_empty());
    }

    #[test]
    fn enabled_tracer_numbers_steps() {
        let mut tracer = Tracer::enabled();
        tracer.record(ResolveAction::Lookup, "cuda.popc", || "fixed_table".into());
        tracer.record(ResolveAction::Unresolved, "cuda.popc", String::new);
        let steps = tracer.take();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].step, 1);
        assert_eq!(steps[1].action, ResolveAction::Unresolved);
        assert!(tracer.take().is_empty());
    }

    #[test]
    fn actions_serialize_snake_case() {
        let step = ResolveStep {
            step: 0,
            action: ResolveAction::CandidateMatched,
            subject: "cuda.brev".into(),
            detail: "(uint32) -> uint32".into(),
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["action"], "candidate_matched");
        assert_eq!(json["subject"], "cuda.brev");
    }
}
