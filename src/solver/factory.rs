use crate::domain::{
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
#[cfg(feature = "coin_cbc")]
use crate::solver::CoinCbcSolver;
#[cfg(feature = "highs")]
use crate::solver::HighsSolver;
use std::sync::Arc;

/// Factory for creating solver instances from configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend
    ///
    /// `Auto` prefers HiGHS and falls back to CBC when only that backend is
    /// compiled in.
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            #[cfg(feature = "highs")]
            SolverBackend::Auto | SolverBackend::Highs => Ok(Arc::new(HighsSolver::new())),
            #[cfg(all(feature = "coin_cbc", not(feature = "highs")))]
            SolverBackend::Auto => Ok(Arc::new(CoinCbcSolver::new())),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Ok(Arc::new(CoinCbcSolver::new())),
            #[allow(unreachable_patterns)]
            other => Err(SolverError::SolverNotAvailable(format!(
                "{} backend is not compiled in",
                other
            ))),
        }
    }

    /// Get the default solver
    pub fn default_solver() -> Result<Arc<dyn SolverService>> {
        Self::create_from_backend(SolverBackend::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "highs")]
    #[test]
    fn test_auto_prefers_highs() {
        assert_eq!(SolverFactory::default_solver().unwrap().name(), "HiGHS");
    }

    #[cfg(not(feature = "coin_cbc"))]
    #[test]
    fn test_missing_backend_is_reported() {
        assert!(matches!(
            SolverFactory::create_from_backend(SolverBackend::CoinCbc),
            Err(SolverError::SolverNotAvailable(_))
        ));
    }
}
