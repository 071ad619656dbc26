#![allow(unsafe_code)]

use windows::Win32::System::Threading::GetCurrentThreadStackLimits;

/// `(low, high)` bounds of the calling thread's stack.
pub(crate) fn limits() -> (usize, usize) {
    let mut low = 0usize;
    let mut high = 0usize;
    // SAFETY: both out-pointers refer to locals that outlive the call.
    unsafe { GetCurrentThreadStackLimits(&mut low, &mut high) };
    (low, high)
}
