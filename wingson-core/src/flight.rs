use serde::{Deserialize, Serialize};

/// A scheduled flight. `number` is the business key bookings are matched on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flight {
    pub id: i32,
    pub number: String,
}

impl Flight {
    pub fn new(id: i32, number: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
        }
    }
}
