/// Source of the rolls the fault demo compares against its target.
pub trait FaultSource: Send + Sync {
    /// A value in `1..=sides`.
    fn roll(&self, sides: u32) -> u32;
}
