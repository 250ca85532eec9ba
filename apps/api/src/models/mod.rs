pub mod cover_letter;
pub mod experience;
pub mod user;
