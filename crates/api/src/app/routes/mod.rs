pub mod companies;
pub mod system;
pub mod users;
