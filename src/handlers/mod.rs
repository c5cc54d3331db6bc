pub mod auth_handlers;
pub mod dorm_handlers;
pub mod proctor_handlers;
pub mod public_handlers;
pub mod security_handlers;
pub mod staff_handlers;
pub mod student_handlers;
