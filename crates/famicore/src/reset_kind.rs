/// Distinguishes a cold power cycle from the console's reset button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetKind {
    /// Full power cycle: RAM cleared, every component back to power-on state.
    PowerOn,
    /// Reset button: work RAM and CPU registers survive.
    Soft,
}
