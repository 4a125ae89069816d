pub mod ids;

pub use ids::{AppointmentId, ProviderId, RequesterId};
