/// Aggregated view of screening progress, useful for UI.
///
/// The adaptive search decides question count as it goes, so `catalog_size`
/// is an upper bound rather than a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningProgress {
    pub answered: usize,
    pub catalog_size: usize,
    pub is_complete: bool,
}
