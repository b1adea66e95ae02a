//! # asset-schema
//!
//! Schema-driven serialization for game assets. Record and enum types
//! register a field table once; every codec walks those tables, so adding
//! a type never means touching a codec and adding a codec never means
//! touching a type.
//!
//! ## Modules
//!
//! - [`util`] - Scalar types, the typed [`Buffer`], [`Content`]/[`Cursor`], errors
//! - [`schema`] - Field tables, enum value tables and the shapes codecs walk
//! - [`codec`] - JSON, INI, debug text and positional binary codecs
//! - [`assets`] - Armature, level, placeholder and PNG decoders
//!
//! ## Example
//!
//! ```
//! use asset_schema::codec::{json, debug_text};
//! use asset_schema::{enum_schema, schema};
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq)]
//! enum Team { #[default] Red, Blue }
//! enum_schema!(Team { Red => "red", Blue => "blue" });
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Player { name: String, team: Team, score: u32 }
//! schema!(Player { name, team, score });
//!
//! let p: Player = json::from_str(r#"{"name": "ana", "team": "blue", "score": 7, "extra": 1}"#)?;
//! assert_eq!(p.team, Team::Blue);
//! assert_eq!(debug_text::to_string(&p)?, r#"{"ana", blue, 7}"#);
//! # Ok::<(), asset_schema::Error>(())
//! ```

pub mod assets;
pub mod codec;
pub mod schema;
pub mod util;

// Re-export commonly used types
pub use schema::{EnumSchema, Field, Schema};
pub use util::{Buffer, Content, Cursor, DecodeOptions, Error, JsonOptions, Result, ScalarType};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assets::{Armature, ArmatureStructurer, Image, ImageStructurer, Level, LevelStructurer};
    pub use crate::assets::{Placeholder, PlaceholderStructurer};
    pub use crate::codec::{Serializer, Structurer};
    pub use crate::schema::{EnumSchema, Field, Schema};
    pub use crate::util::{Buffer, Content, DecodeOptions, Error, Result, ScalarType};
    pub use crate::{enum_schema, schema};
}
