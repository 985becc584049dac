pub mod media_kind;
pub mod moderation_status;
pub mod storage;
pub mod ticket_status;

pub use media_kind::MediaKind;
pub use moderation_status::ModerationStatus;
pub use ticket_status::TicketStatus;
