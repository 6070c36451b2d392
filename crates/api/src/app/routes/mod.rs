pub mod accounts;
pub mod proxy;
pub mod system;
