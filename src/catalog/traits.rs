//! Stage abstraction for the catalog pipeline.

// ============================================================================
// Pipeline Trait
// ============================================================================

/// Synchronous pipeline stage that transforms Input → Output.
///
/// Stages after the fetch are pure transformations of in-memory records. They never fail:
/// malformed input degrades to empty values, so there is no error type.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a pipeline can be shared across tasks.
///
/// # Examples
///
/// ```ignore
/// struct CountStage;
///
/// impl CatalogStage for CountStage {
///     type Input = Vec<Vaccine>;
///     type Output = usize;
///
///     fn execute(&self, input: Self::Input) -> Self::Output {
///         input.len()
///     }
///
///     fn stage_name(&self) -> &'static str {
///         "count"
///     }
/// }
/// ```
pub trait CatalogStage: Send + Sync {
    /// Input type consumed by this stage
    type Input;

    /// Output type produced by this stage
    type Output;

    /// Executes the stage. Running it twice on the same input yields the same output.
    fn execute(&self, input: Self::Input) -> Self::Output;

    /// Returns a human-readable name for this stage.
    ///
    /// Used for logging and timing statistics.
    fn stage_name(&self) -> &'static str;
}
