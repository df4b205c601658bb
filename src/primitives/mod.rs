mod any;
mod boolean;
mod number;
mod string;

pub use any::ZAny;
pub use boolean::ZBoolean;
pub use number::ZNumber;
pub use string::{Pattern, ZString};
