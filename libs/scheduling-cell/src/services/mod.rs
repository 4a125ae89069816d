pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod notify;
pub mod slots;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use notify::{LogNotifier, Notifier};
pub use slots::SlotGenerator;
