//! Export collaborators: CSV, ICS and Slack reminder text

pub mod ics;
pub mod slack;
pub mod wbs_csv;

pub use ics::{escape_text, outline_events, to_ics, IcsEvent};
pub use slack::{curl_command, reminder_text};
pub use wbs_csv::outline_to_csv;
