use std::sync::Arc;

use tracing::debug;

use crate::evaluate::{evaluate, CorrectionResult};
use crate::observatory::ObservatoryRegistry;
use crate::resolver::{ChainResolver, ClockTextSource, ResolvedChain};
use crate::ClockResult;

/// Observatory name to clock correction, in one call.
///
/// Holds the registry and a resolver whose table cache is shared by every
/// caller. `ClockCorrector` is `Sync` when its source is, so one instance can
/// serve many threads.
///
/// ```
/// use celestial_clock::{
///     ClockCorrector, ClockFormat, ClockLinkSpec, ChainResolver, InMemoryClockSource,
///     ObservatoryRecord, ObservatoryRegistry,
/// };
///
/// let registry = ObservatoryRegistry::from_records([
///     ObservatoryRecord::new("parkes", [-4554231.5, 2816759.1, -3454036.3])?
///         .with_aliases(["pks", "7"])
///         .with_clock_chain(vec![ClockLinkSpec::new("pks2gps.clk", ClockFormat::Tempo2)]),
/// ])?;
/// let source = InMemoryClockSource::new()
///     .with_text("pks2gps.clk", "# UTC(PKS) UTC(GPS)\n50000 1e-6\n50010 2e-6\n");
///
/// let corrector = ClockCorrector::new(registry, ChainResolver::new(source));
/// let result = corrector.evaluate("PKS", 50005.0)?;
/// assert!((result.correction - 1.5e-6).abs() < 1e-18);
/// # Ok::<(), celestial_clock::ClockError>(())
/// ```
#[derive(Debug)]
pub struct ClockCorrector<S> {
    registry: Arc<ObservatoryRegistry>,
    resolver: ChainResolver<S>,
}

impl<S: ClockTextSource> ClockCorrector<S> {
    pub fn new(registry: impl Into<Arc<ObservatoryRegistry>>, resolver: ChainResolver<S>) -> Self {
        Self {
            registry: registry.into(),
            resolver,
        }
    }

    pub fn registry(&self) -> &ObservatoryRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &ChainResolver<S> {
        &self.resolver
    }

    /// Resolves `observatory` by name or alias and binds its chain.
    pub fn resolve_chain(&self, observatory: &str) -> ClockResult<ResolvedChain> {
        let record = self.registry.resolve(observatory)?;
        self.resolver.resolve(record)
    }

    /// Total correction for `observatory` at `mjd`, with per-link detail.
    pub fn evaluate(&self, observatory: &str, mjd: f64) -> ClockResult<CorrectionResult> {
        let chain = self.resolve_chain(observatory)?;
        evaluate(&chain, mjd)
    }

    /// Evaluates many epochs against a single resolution of the chain.
    ///
    /// Failures are reported per epoch; chain resolution failures abort the
    /// whole call.
    pub fn evaluate_many(
        &self,
        observatory: &str,
        epochs: &[f64],
    ) -> ClockResult<Vec<ClockResult<CorrectionResult>>> {
        let chain = self.resolve_chain(observatory)?;
        debug!(
            observatory = chain.observatory(),
            epochs = epochs.len(),
            "evaluating clock chain"
        );
        Ok(epochs.iter().map(|&mjd| evaluate(&chain, mjd)).collect())
    }
}
