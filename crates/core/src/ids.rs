//! String-backed identifier newtypes.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! id_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Generates a fresh id.
            pub fn new() -> Self {
                Self(Ulid::new().to_string())
            }
            /// Wraps an existing id value.
            pub fn from_str(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            /// Borrows the raw value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(TaskId, "Task identifier.");
id_newtype!(WorkspaceId, "Workspace (tenant) identifier.");
id_newtype!(ProjectId, "Project identifier.");
id_newtype!(MemberId, "Membership record identifier.");
id_newtype!(UserId, "External principal identifier.");
