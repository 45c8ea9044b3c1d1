pub mod answers;
pub mod fill;
pub mod init;
pub mod list;
pub mod login;
pub mod show;
