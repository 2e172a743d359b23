use std::thread;
use std::time::Duration;

use embedded_hal_async::delay::DelayNs;

/// Blocking delay for the host loop.
///
/// The bridge runs under `block_on` on a single thread, so sleeping the
/// thread is the whole response window.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    async fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    async fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
