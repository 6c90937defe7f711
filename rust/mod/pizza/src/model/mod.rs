mod role;
mod user;
mod session;
mod menu;
mod order;
mod franchise;

pub use role::*;
pub use user::*;
pub use session::*;
pub use menu::*;
pub use order::*;
pub use franchise::*;
