mod array;

pub use array::ZArray;
