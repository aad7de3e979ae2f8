//! Persisted entities. Associations are plain foreign-key ids resolved
//! through the [`Store`](crate::store::Store).

/// Implements [`Entity`](crate::store::Entity) for a struct with a `pub id: u64`
/// field and no foreign keys.
macro_rules! plain_entity {
    ($ty:ty, $table:literal, $label:literal) => {
        impl $crate::store::Entity for $ty {
            const TABLE: &'static str = $table;
            const LABEL: &'static str = $label;

            fn id(&self) -> u64 {
                self.id
            }
            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
        }
    };
}
pub(crate) use plain_entity;

pub mod kitchen;
pub mod order;
pub mod place;
pub mod restaurant;
pub mod user;

pub use kitchen::Kitchen;
pub use order::{Order, OrderLine, OrderStatus};
pub use place::{Address, City, Province};
pub use restaurant::{Product, Restaurant};
pub use user::User;
