//! Ad-hoc event timing.

use std::fmt::Debug;
use std::time::Instant;

/// Logs `event` with its elapsed time and the `Debug` form of its input and
/// output.
///
/// ```rust
/// use std::time::Instant;
/// use netpath_telemetry::event::log_event_io;
///
/// let started_at = Instant::now();
/// let total: u32 = [1, 2, 3].iter().sum();
/// log_event_io("sum", &[1, 2, 3], &total, started_at);
/// ```
pub fn log_event_io<I, O>(event: &str, input: &I, output: &O, started_at: Instant)
where
    I: Debug + ?Sized,
    O: Debug + ?Sized,
{
    let elapsed = started_at.elapsed();
    tracing::info!(
        event,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        input = ?input,
        output = ?output,
        "event io"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Lookup<'a> {
        user_id: &'a str,
    }

    #[test]
    fn test_accepts_unsized_and_structs() {
        log_event_io("lookup", &Lookup { user_id: "42" }, "found", Instant::now());
        log_event_io("batch", &[1_u8, 2, 3][..], &Some(3), Instant::now());
    }
}
