//! Same-day pickup number allocation
//!
//! Numbers are `001`, `002`, … per calendar day and restart every day. The
//! current day's counter lives in a single cell behind an async mutex. On the
//! first allocation of a day (including after a restart) the cell is seeded
//! from the number of orders already paid that day.
//!
//! Allocation is two-phase: [`PickupAllocator::reserve`] locks the cell and
//! exposes the next number, the caller persists its order, and only
//! [`PickupReservation::commit`] advances the counter. Dropping a reservation
//! leaves the counter untouched, so failed payments never leave gaps.

use crate::core::calendar::{Calendar, DayWindow};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::order::OrderStatus;
use crate::core::service::{OrderQuery, OrderStore};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Human-facing, zero-padded pickup number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PickupNumber(u32);

impl PickupNumber {
    pub fn new(sequence: u32) -> Self {
        Self(sequence)
    }

    pub fn sequence(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PickupNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct DayCounter {
    date: NaiveDate,
    issued: u32,
}

/// Per-day pickup number source
pub struct PickupAllocator {
    store: Arc<dyn OrderStore>,
    calendar: Calendar,
    counter: Mutex<Option<DayCounter>>,
}

impl PickupAllocator {
    pub fn new(store: Arc<dyn OrderStore>, calendar: Calendar) -> Self {
        Self {
            store,
            calendar,
            counter: Mutex::new(None),
        }
    }

    /// Orders that count toward the day's sequence
    pub fn issued_query(window: DayWindow) -> OrderQuery {
        OrderQuery::paid_within(window).with_statuses(
            OrderStatus::ALL
                .into_iter()
                .filter(|status| status.has_progressed_past_payment()),
        )
    }

    /// Lock today's counter and expose the next number
    ///
    /// Holding the reservation serializes all payments; keep it only for
    /// the duration of the order write.
    pub async fn reserve(&self) -> ServiceResult<PickupReservation<'_>> {
        let mut guard = self.counter.lock().await;
        let issued_at = self.calendar.now();
        let window = DayWindow::containing(issued_at, self.calendar.offset());

        let issued = match *guard {
            Some(counter) if counter.date == window.date => counter.issued,
            _ => {
                let count = self.store.count(&Self::issued_query(window)).await?;
                let issued = u32::try_from(count).map_err(|_| {
                    ServiceError::Internal(format!("pickup count {} overflows", count))
                })?;
                tracing::debug!(day = %window, issued, "pickup counter seeded");
                *guard = Some(DayCounter {
                    date: window.date,
                    issued,
                });
                issued
            }
        };

        Ok(PickupReservation {
            guard,
            window,
            issued_at,
            number: PickupNumber::new(issued + 1),
        })
    }
}

/// A locked, not yet committed pickup number
pub struct PickupReservation<'a> {
    guard: MutexGuard<'a, Option<DayCounter>>,
    window: DayWindow,
    issued_at: DateTime<Utc>,
    number: PickupNumber,
}

impl PickupReservation<'_> {
    pub fn number(&self) -> PickupNumber {
        self.number
    }

    /// Instant the day was read from the clock; use it as the payment time
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Mark the number as issued and release the lock
    pub fn commit(mut self) -> PickupNumber {
        *self.guard = Some(DayCounter {
            date: self.window.date,
            issued: self.number.sequence(),
        });
        self.number
    }
}
