//! Contract-prover boundary.
//!
//! The checker emits one logical proposition per contract clause; an
//! external prover answers per clause. The prover is always invoked with an
//! explicit deadline, and callers must receive `Unsupported` or `Skipped`
//! rather than blocking when no prover is available. No proving happens
//! in-core.

use std::time::Duration;

use calor_ir::{ContractKind, NodeId};

/// A logical proposition extracted from one contract clause.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Proposition {
    /// The clause's declaration ID, if user-authored.
    pub clause_id: NodeId,
    /// Name of the function the clause is attached to.
    pub function: String,
    pub kind: ContractKind,
    /// Canonical condition text, `result` included for ensures clauses.
    pub condition: String,
}

/// Prover answer for one proposition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ProverVerdict {
    Proven,
    Disproven,
    Unproven,
    /// The proposition uses constructs the prover cannot express.
    Unsupported,
    /// No prover ran (absent, or deadline exhausted before starting).
    Skipped,
}

/// External prover interface.
pub trait ContractProver {
    /// Prove one proposition within `deadline`. Implementations must return
    /// (typically `Unproven` or `Skipped`) rather than block past the
    /// deadline.
    fn prove(&self, proposition: &Proposition, deadline: Duration) -> ProverVerdict;
}

/// The bundled no-op prover: answers `Skipped` immediately.
pub struct NullProver;

impl ContractProver for NullProver {
    fn prove(&self, _proposition: &Proposition, _deadline: Duration) -> ProverVerdict {
        ProverVerdict::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_prover_skips_immediately() {
        let proposition = Proposition {
            clause_id: NodeId::user("q1"),
            function: "div".to_string(),
            kind: ContractKind::Requires,
            condition: "(!= b 0)".to_string(),
        };
        let verdict = NullProver.prove(&proposition, Duration::from_millis(10));
        assert_eq!(verdict, ProverVerdict::Skipped);
    }
}
