pub mod content;
pub mod email;
