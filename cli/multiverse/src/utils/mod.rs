use std::io::Stderr;
use std::sync::{LazyLock, Mutex};

pub mod colors;
pub mod errors;
pub mod init;
pub mod message;
pub mod render;

pub static TERMINAL_STDERR: LazyLock<Mutex<Stderr>> =
    LazyLock::new(|| Mutex::new(std::io::stderr()));
