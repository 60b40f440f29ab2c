use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// What the object store does when a put targets a filename that already exists.
///
/// Defined in core because it is part of configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Last writer wins. Concurrent puts to the same name race and nothing reports it.
    #[default]
    Overwrite,
    /// The first completed put keeps the name; later puts fail with a conflict.
    Reject,
}

impl FromStr for CollisionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "reject" => Ok(CollisionPolicy::Reject),
            _ => Err(anyhow::anyhow!("Invalid collision policy: {}", s)),
        }
    }
}

impl Display for CollisionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Reject => write!(f, "reject"),
        }
    }
}
