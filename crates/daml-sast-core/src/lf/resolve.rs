// daml-sast-core/src/lf/resolve.rs
// ============================================================================
// Module: Name Resolution
// Description: Interned table lookups and qualified name rendering.
// Purpose: Resolve raw name encodings while enforcing per-version rules.
// Dependencies: crate::lf::proto
// ============================================================================

//! ## Overview
//! Daml-LF 1 packages may carry names inline or interned; Daml-LF 2 packages
//! must intern every name and may reference other packages through an import
//! table. Names in the current package resolve to `Module.Name`; names in
//! other packages resolve to `<package-id>:Module.Name`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::error::HardeningLimit;
use crate::lf::proto;
use crate::lf::proto::ident;
use crate::lf::proto::name;
use crate::lf::proto::package_ref;
use crate::lf::version::LfVersion;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A raw structure is inconsistent with its declared grammar, or too large to
/// lower within the configured limits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The structure violates the Daml-LF grammar.
    #[error("{0}")]
    Malformed(String),
    /// Lowering the structure exceeds a hardening limit.
    #[error("{limit} exceeded: {actual} > {max}")]
    Limit {
        /// Limit that was exceeded.
        limit: HardeningLimit,
        /// Observed value.
        actual: u64,
        /// Configured maximum.
        max: u64,
    },
}

impl ShapeError {
    /// Builds a shape error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Builds the error reported for an absent required field.
    pub fn missing(what: &str) -> Self {
        Self::Malformed(format!("missing {what}"))
    }
}

/// Result alias for name resolution and lowering.
pub type ShapeResult<T> = Result<T, ShapeError>;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves names against one package's interned tables.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    /// Package whose tables are consulted.
    package: &'a proto::Package,
    /// Declared version of the package.
    version: LfVersion,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for a package.
    #[must_use]
    pub const fn new(package: &'a proto::Package, version: LfVersion) -> Self {
        Self {
            package,
            version,
        }
    }

    /// Returns the declared version.
    #[must_use]
    pub const fn version(&self) -> LfVersion {
        self.version
    }

    /// Looks up an interned string.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when the index is out of range.
    pub fn string(&self, index: i32) -> ShapeResult<&'a str> {
        usize::try_from(index)
            .ok()
            .and_then(|slot| self.package.interned_strings.get(slot))
            .map(String::as_str)
            .ok_or_else(|| {
                ShapeError::new(format!("interned string index {index} out of range"))
            })
    }

    /// Looks up an interned dotted name and joins its segments with `.`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when the name or one of its segments is out of range.
    pub fn dotted_name(&self, index: i32) -> ShapeResult<String> {
        let name = usize::try_from(index)
            .ok()
            .and_then(|slot| self.package.interned_dotted_names.get(slot))
            .ok_or_else(|| {
                ShapeError::new(format!("interned dotted name index {index} out of range"))
            })?;
        let segments = name
            .segments_interned_str
            .iter()
            .map(|segment| self.string(*segment))
            .collect::<ShapeResult<Vec<_>>>()?;
        Ok(segments.join("."))
    }

    /// Resolves a required identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when the identifier is absent, out of range, or
    /// inline in a Daml-LF 2 package.
    pub fn ident(&self, value: Option<&proto::Ident>, what: &str) -> ShapeResult<String> {
        match value.and_then(|ident| ident.kind.as_ref()) {
            Some(ident::Kind::Str(text)) => {
                self.check_inline(what)?;
                Ok(text.clone())
            }
            Some(ident::Kind::InternedStr(index)) => self.string(*index).map(str::to_string),
            None => Err(ShapeError::missing(what)),
        }
    }

    /// Resolves an optional identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when a present identifier is malformed.
    pub fn optional_ident(
        &self,
        value: Option<&proto::Ident>,
        what: &str,
    ) -> ShapeResult<Option<String>> {
        match value {
            Some(ident) if ident.kind.is_some() => self.ident(Some(ident), what).map(Some),
            _ => Ok(None),
        }
    }

    /// Resolves a required dotted name.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when the name is absent, out of range, or inline
    /// in a Daml-LF 2 package.
    pub fn name(&self, value: Option<&proto::Name>, what: &str) -> ShapeResult<String> {
        match value.and_then(|name| name.kind.as_ref()) {
            Some(name::Kind::Dname(dotted)) => {
                self.check_inline(what)?;
                Ok(dotted.segments.join("."))
            }
            Some(name::Kind::InternedDname(index)) => self.dotted_name(*index),
            None => Err(ShapeError::missing(what)),
        }
    }

    /// Resolves a package reference; `None` denotes the current package.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when the reference is malformed or uses an
    /// encoding its version does not permit.
    pub fn package_ref(&self, value: Option<&proto::PackageRef>) -> ShapeResult<Option<String>> {
        match value.and_then(|reference| reference.kind.as_ref()) {
            Some(package_ref::Kind::SelfRef(_)) => Ok(None),
            Some(package_ref::Kind::PackageIdStr(id)) => {
                self.check_inline("package id")?;
                Ok(Some(id.clone()))
            }
            Some(package_ref::Kind::PackageIdInternedStr(index)) => {
                self.string(*index).map(|id| Some(id.to_string()))
            }
            Some(package_ref::Kind::ImportId(index)) => {
                if !self.version.is_lf2() {
                    return Err(ShapeError::new(format!(
                        "package import references require Daml-LF 2, package declares {}",
                        self.version
                    )));
                }
                let imports = self
                    .package
                    .imports
                    .as_ref()
                    .map(|imports| imports.imported_packages.as_slice())
                    .unwrap_or_default();
                usize::try_from(*index)
                    .ok()
                    .and_then(|slot| imports.get(slot))
                    .map(|id| Some(id.clone()))
                    .ok_or_else(|| ShapeError::new(format!("package import {index} out of range")))
            }
            None => Err(ShapeError::missing("package reference")),
        }
    }

    /// Resolves a module reference to `(package, module)`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when the reference is malformed.
    pub fn module_ref(
        &self,
        value: Option<&proto::ModuleRef>,
    ) -> ShapeResult<(Option<String>, String)> {
        let module = value.ok_or_else(|| ShapeError::missing("module reference"))?;
        let package = self.package_ref(module.package_ref.as_ref())?;
        let name = self.name(module.module_name.as_ref(), "module name")?;
        Ok((package, name))
    }

    /// Resolves a qualified name to `Module.Name` or `<package-id>:Module.Name`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when any component is malformed.
    pub fn qualified(&self, value: Option<&proto::QualName>, what: &str) -> ShapeResult<String> {
        let qual = value.ok_or_else(|| ShapeError::missing(what))?;
        let (package, module) = self.module_ref(qual.module.as_ref())?;
        let name = self.name(qual.name.as_ref(), what)?;
        Ok(match package {
            Some(package) => format!("{package}:{module}.{name}"),
            None => format!("{module}.{name}"),
        })
    }

    /// Rejects inline names in Daml-LF 2 packages.
    fn check_inline(&self, what: &str) -> ShapeResult<()> {
        if self.version.is_lf2() {
            return Err(ShapeError::new(format!(
                "inline {what} is not permitted in Daml-LF {}",
                self.version
            )));
        }
        Ok(())
    }
}
