pub mod evaluate;
pub mod init;
pub mod verify;
