pub mod gate;
pub mod identity;

pub use self::gate::*;
pub use self::identity::*;
