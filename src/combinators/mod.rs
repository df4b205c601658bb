mod intersection;
mod not;
mod union;

pub use intersection::ZAnd;
pub use not::ZNot;
pub use union::ZOr;
