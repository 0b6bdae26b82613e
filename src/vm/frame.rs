//! Call-frame bookkeeping.

/// One activation: which function is running, where to resume the caller,
/// and where this frame's locals live in the shared arena.
pub struct Frame {
    pub function_index: u32,
    pub return_addr: u32,
    pub base: usize,
    pub size: usize,
}
