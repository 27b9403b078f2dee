pub mod event;
pub mod user;

pub use event::{parse_event_date, Attendance, AttendeeRole, Event, EventView, NewEvent, Rsvp};
pub use user::User;
