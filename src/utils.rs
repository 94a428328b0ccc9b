pub mod logs;
pub mod password;
pub mod validation;
