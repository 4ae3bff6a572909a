use std::fmt;
use std::path::Path;

use chrono::Utc;
use rand::Rng;

use super::error::StorageError;

/// Top-level partition of the blob store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Assets,
    Profiles,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Profiles => "profiles",
        }
    }
}

/// What a stored file is used for.
///
/// The role is encoded as the prefix of every generated blob name, so a bare
/// name is enough to find the blob again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlobRole {
    MainFile,
    CoverImage,
    ProfileImage,
}

impl BlobRole {
    pub const ALL: &'static [BlobRole] = &[Self::MainFile, Self::CoverImage, Self::ProfileImage];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::MainFile => "mainFile",
            Self::CoverImage => "coverImages",
            Self::ProfileImage => "profile",
        }
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            Self::MainFile | Self::CoverImage => Namespace::Assets,
            Self::ProfileImage => Namespace::Profiles,
        }
    }

    /// Whether blobs of this role may be served without authentication.
    pub fn is_public(&self) -> bool {
        !matches!(self, Self::MainFile)
    }
}

/// A validated, namespaced blob identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobKey {
    role: BlobRole,
    name: String,
}

impl BlobKey {
    /// Generate a fresh collision-resistant key for an uploaded file.
    ///
    /// Format: `{prefix}-{unix millis}-{random 0..1e9}{.ext}` where the
    /// extension is taken (lowercased) from `original_name`.
    pub fn generate(role: BlobRole, original_name: &str) -> Self {
        let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
        let name = format!(
            "{}-{}-{}{}",
            role.prefix(),
            Utc::now().timestamp_millis(),
            suffix,
            extension_of(original_name)
        );
        Self { role, name }
    }

    /// Parse a bare blob name previously produced by [`BlobKey::generate`].
    pub fn parse(name: &str) -> Result<Self, StorageError> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..")
            || name.chars().any(|c| c.is_control())
        {
            return Err(StorageError::UnsafeName(name.to_string()));
        }

        let role = BlobRole::ALL
            .iter()
            .copied()
            .find(|role| {
                name.strip_prefix(role.prefix())
                    .is_some_and(|rest| rest.starts_with('-'))
            })
            .ok_or_else(|| StorageError::UnknownPrefix(name.to_string()))?;

        Ok(Self {
            role,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> BlobRole {
        self.role
    }

    pub fn namespace(&self) -> Namespace {
        self.role.namespace()
    }

    /// Storage path relative to the store root, e.g. `assets/mainFile-...zip`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.namespace().as_str(), self.name)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Dot-prefixed lowercase extension, or empty when the name has none usable.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
