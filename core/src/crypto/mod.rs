pub mod types;
pub mod key;
pub mod rotor;

pub use types::*;
pub use key::KeyMaterial;
pub use rotor::{apply_keystream, key_after, rotate_key_left, RotatingKeyCipher};
