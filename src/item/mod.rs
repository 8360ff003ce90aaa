//! Portfolio items and the ordering contract shared by all collections.
//!
//! Projects, skills and social links are independent collections with the same
//! shape as far as ordering is concerned: a store-assigned `id` and an integer
//! `order`. Everything else is domain data the sync engine never looks at.

mod entities;
mod sequenced;

pub use entities::{Project, Skill, SocialLink};
pub use sequenced::{OrderUpdate, Sequenced, ID_FIELD, ORDER_FIELD};

/// Collection discriminator for the CLI and for storage file names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Projects,
    Skills,
    SocialLinks,
}

impl CollectionKind {
    /// All collections, in the order the site renders its sections
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Projects,
        CollectionKind::Skills,
        CollectionKind::SocialLinks,
    ];

    /// The collection name as used by the document store
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Projects => Project::COLLECTION,
            CollectionKind::Skills => Skill::COLLECTION,
            CollectionKind::SocialLinks => SocialLink::COLLECTION,
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "projects" | "project" => Ok(CollectionKind::Projects),
            "skills" | "skill" => Ok(CollectionKind::Skills),
            "sociallinks" | "social-links" | "social_links" | "socials" => {
                Ok(CollectionKind::SocialLinks)
            }
            _ => Err(format!("Unknown collection: {s}")),
        }
    }
}
