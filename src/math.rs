pub mod number_theory;

pub use number_theory::{is_prime, is_primitive_root, primitive_roots};
