use std::path::PathBuf ;
use thiserror::Error ;

use crate::bootstrap::AppendError ;
use crate::module::ModuleId ;
use crate::scope::ScopeKey ;



/// Problems met while building or reconfiguring a graph.
///
/// None of these abort a build. Each one is confined to the module or sub-unit
/// it names: that module (or sub-unit) is left out of the graph, or, for
/// warnings, kept with a degraded scope.
#[derive( Debug, Error )]
pub enum LoadError {

	/// A dependency is enabled but has no scope. The dependent is skipped.
	#[error( "'{scope}' requires missing scope for '{dependency}'" )]
	MissingDependencyScope { scope: ScopeKey, dependency: ModuleId },

	/// A classpath entry is empty or escapes the module root after normalisation.
	#[error( "Corrupted classpath entry of '{module}': `{}`", entry.display() )]
	MalformedClasspathEntry { module: ModuleId, entry: PathBuf },

	/// The implicit dependency had no scope yet, usually because it requires
	/// this module. The module is built without it. Warning only.
	#[error( "'{module}' built without its implicit dependency '{dependency}'" )]
	ImplicitDependencyUnavailable { module: ModuleId, dependency: ModuleId },

	/// A sub-unit registers nothing its scope could expose. Warning only.
	#[error( "Sub-unit '{scope}' doesn't define any extra symbols" )]
	EmptyVisibilitySurface { scope: ScopeKey },

	/// The module lost a mandatory dependency during reconfiguration and was
	/// disabled along with it.
	#[error( "'{module}' disabled because its dependency '{dependency}' was disabled" )]
	CascadingDisable { module: ModuleId, dependency: ModuleId },

	/// A mandatory dependency closes a cycle.
	#[error( "Dependency cycle detected: '{module}' requires '{dependency}'" )]
	DependencyCycle { module: ModuleId, dependency: ModuleId },

	/// A second module with an already known id. The later declaration is ignored.
	#[error( "Duplicate module id '{0}'" )]
	DuplicateModule( ModuleId ),

	/// A requested module is not part of the module set.
	#[error( "Unknown module '{0}'" )]
	UnknownModule( ModuleId ),

	/// The host loader refused the classpath of a legacy single-scope module.
	#[error( "'{module}' could not be added to the host loader: {source}" )]
	LegacyClasspathRejected { module: ModuleId, #[source] source: AppendError },

}

impl LoadError {

	/// The module this diagnostic is about.
	pub fn module( &self ) -> &ModuleId {
		match self {
			Self::MissingDependencyScope { scope, .. }
			| Self::EmptyVisibilitySurface { scope } => scope.module_id(),
			Self::MalformedClasspathEntry { module, .. }
			| Self::ImplicitDependencyUnavailable { module, .. }
			| Self::CascadingDisable { module, .. }
			| Self::DependencyCycle { module, .. }
			| Self::LegacyClasspathRejected { module, .. }
			| Self::DuplicateModule( module )
			| Self::UnknownModule( module ) => module,
		}
	}

	/// Whether the module the diagnostic names still made it into the graph.
	///
	/// A missing dependency scope on a sub-unit only drops that sub-unit.
	pub fn is_warning( &self ) -> bool {
		match self {
			Self::MissingDependencyScope { scope, .. } => scope.is_sub_unit(),
			Self::ImplicitDependencyUnavailable { .. }
			| Self::EmptyVisibilitySurface { .. }
			| Self::DuplicateModule( _ )
			| Self::UnknownModule( _ ) => true,
			Self::MalformedClasspathEntry { .. }
			| Self::CascadingDisable { .. }
			| Self::DependencyCycle { .. }
			| Self::LegacyClasspathRejected { .. } => false,
		}
	}

}
