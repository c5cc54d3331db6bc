pub mod codes;
pub mod dorm;
pub mod laundry;
pub mod maintenance;
pub mod penalty;
pub mod room;
pub mod student;
pub mod user;
