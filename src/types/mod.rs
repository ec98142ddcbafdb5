pub mod error;
pub mod item;
pub mod menu;
pub mod outline;
pub mod utils;

pub use error::{
    CraftError, LineError, LineErrorKind, Result, ResultExt, RuleTableError, RuleTableErrorKind,
};
pub use item::*;
pub use menu::*;
pub use outline::*;
pub use utils::{
    ParseWithDefault, capitalize_first, enum_to_str, humanize_key, log_filter_warn, slugify,
};

// =============================================================================
// Domain Newtypes
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the content store
///
/// Opaque to the core: it is only ever produced by a store and handed back to
/// it. Root placement is modelled as `Option<ItemId>::None`, never as a
/// sentinel id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_roundtrip() {
        let id = ItemId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(ItemId::from(42), id);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }
}
