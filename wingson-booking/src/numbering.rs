use rand::Rng;
use tokio::sync::Mutex;

pub const BOOKING_NUMBER_PREFIX: &str = "WO-";

/// Cosmetic booking reference, `WO-` plus six zero-padded digits. Not unique.
pub fn generate_booking_number() -> String {
    let number: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}{:06}", BOOKING_NUMBER_PREFIX, number)
}

/// Hands out booking ids as "highest known id + 1".
///
/// The highest known id is the larger of the stored maximum and the last id
/// this allocator issued, so two writers in the same process never share an
/// id even when the first has not been saved yet. An empty store starts at 1.
/// Returns `None` once `i32::MAX` has been reached.
#[derive(Default)]
pub struct IdAllocator {
    last_issued: Mutex<Option<i32>>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn next_id<I>(&self, existing: I) -> Option<i32>
    where
        I: IntoIterator<Item = i32>,
    {
        let mut last = self.last_issued.lock().await;
        let highest = existing.into_iter().max().max(*last);
        let next = match highest {
            Some(id) => id.checked_add(1)?,
            None => 1,
        };
        *last = Some(next);
        Some(next)
    }
}
