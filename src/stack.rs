// ── Stack-space probe ─────────────────────────────────────────────────────────
//
// Scratch buffers on the stack are fast and free themselves, but an oversized
// request overflows the thread's stack and kills the process.  Everything
// here checks the remaining stack first and answers `false` / `None` instead.

use crate::platform;

/// Stack kept free below any scratch buffer, for the callee's own frames
/// and the guard page.
pub const GUARD_RESERVE: usize = 64 * 1024;

/// `true` if `request` bytes fit between `stack_pointer` and `low_limit`
/// while leaving `reserve` bytes untouched.  The stack grows downwards.
pub fn fits(request: usize, stack_pointer: usize, low_limit: usize, reserve: usize) -> bool {
    stack_pointer
        .checked_sub(low_limit)
        .and_then(|room| room.checked_sub(reserve))
        .is_some_and(|usable| request <= usable)
}

/// Approximate current stack pointer: the address of a local.
#[inline(always)]
fn stack_pointer() -> usize {
    let marker = 0u8;
    std::ptr::addr_of!(marker) as usize
}

/// `true` if `size` more bytes of stack can be used on this thread.
///
/// Answers `false` when the platform cannot report the stack bounds.
pub fn probe(size: usize) -> bool {
    match platform::stack_limits() {
        Some((low, _high)) => fits(size, stack_pointer(), low, GUARD_RESERVE),
        None => false,
    }
}

/// Run `f` over a zeroed stack buffer of exactly `size` bytes.
///
/// Returns `None`, without calling `f`, if taking `size` bytes would leave
/// less than [`GUARD_RESERVE`] of stack.  The buffer is gone once `f`
/// returns.
pub fn with_scratch<R>(size: usize, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
    if !probe(size) {
        log::debug!("stack: refusing {size}-byte scratch buffer");
        return None;
    }
    Some(alloca::with_alloca_zeroed(size, f))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: usize = 0x1000_0000;
    const SP: usize = LOW + 1024 * 1024;

    #[test]
    fn fits_within_room_minus_reserve() {
        let usable = SP - LOW - GUARD_RESERVE;
        assert!(fits(0, SP, LOW, GUARD_RESERVE));
        assert!(fits(usable, SP, LOW, GUARD_RESERVE));
        assert!(!fits(usable + 1, SP, LOW, GUARD_RESERVE));
    }

    #[test]
    fn no_room_when_reserve_exceeds_stack() {
        assert!(!fits(1, LOW + 100, LOW, GUARD_RESERVE));
    }

    #[test]
    fn pointer_below_limit_never_fits() {
        assert!(!fits(0, LOW - 1, LOW, 0));
    }

    #[test]
    fn huge_requests_are_refused() {
        assert!(!probe(usize::MAX));
        assert!(with_scratch(usize::MAX / 2, |_| ()).is_none());
    }

    #[cfg(windows)]
    #[test]
    fn scratch_is_zeroed_and_sized() {
        let r = with_scratch(256, |buf| {
            assert!(buf.iter().all(|&b| b == 0));
            buf[255] = 7;
            buf.len()
        });
        assert_eq!(r, Some(256));
    }

    #[cfg(windows)]
    #[test]
    fn scratch_beyond_sixteen_kib_is_served() {
        // Test threads get 2 MiB of stack.
        for size in [20 * 1024, 64 * 1024] {
            let r = with_scratch(size, |buf| {
                assert!(buf.iter().all(|&b| b == 0));
                buf.len()
            });
            assert_eq!(r, Some(size));
        }
    }

    #[cfg(windows)]
    #[test]
    fn scratch_is_refused_when_it_would_eat_the_reserve() {
        let (low, _high) = platform::stack_limits().expect("stack limits");
        let room = stack_pointer() - low;
        assert!(with_scratch(room, |_| ()).is_none());
    }

    #[cfg(windows)]
    #[test]
    fn probe_allows_small_requests_on_main_stack() {
        assert!(probe(4096));
    }
}
