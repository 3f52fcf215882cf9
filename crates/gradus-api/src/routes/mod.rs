pub mod chapters;
pub mod comments;
pub mod files;
pub mod health;
pub mod milestones;
pub mod ranking;
pub mod theses;
pub mod users;
