//! Clock on FreeRTOS.
//!
//! `delay_us` must not go through the scheduler: a FreeRTOS tick is
//! coarser than the inter-character pacing.

use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::sys::esp_timer_get_time;

use crate::host::StdClock;
use crate::transport::Clock;

/// esp_timer time, ROM busy-wait delays, condvar parking.
pub struct EspClock {
    parker: StdClock,
}

impl EspClock {
    pub fn new() -> Self {
        Self {
            parker: StdClock::new(),
        }
    }
}

impl Default for EspClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for EspClock {
    fn now_us(&self) -> u64 {
        // SAFETY: esp_timer is started by the IDF before app_main.
        unsafe { esp_timer_get_time() as u64 }
    }

    fn delay_us(&self, us: u32) {
        Ets::delay_us(us);
    }

    fn sleep_ms(&self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }

    fn park(&self, max_us: u64) {
        self.parker.park(max_us);
    }

    fn unpark(&self) {
        self.parker.unpark();
    }
}
