pub mod people;
pub mod manager;
pub mod numbering;
pub mod locks;

pub use people::{PersonError, PersonService};
pub use manager::{BookingError, BookingService};
pub use numbering::{generate_booking_number, IdAllocator};
pub use locks::FlightLocks;
