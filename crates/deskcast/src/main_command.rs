/// Commands sent from the async runtime to the main event-loop thread.
///
/// The main thread owns the tao event loop and the hotkey registration,
/// so process lifecycle events flow through this enum.
#[derive(Debug, Clone, Copy)]
pub enum MainCommand {
    /// Exit the event loop and the process.
    Shutdown,
}
