//! The bootstrap scope.
//!
//! The root of every resolution chain: it stands for the host application's
//! own code and is searched last by every other scope. Modules that opt out of
//! isolation, and the distinguished core module, resolve through it directly.

use std::path::PathBuf ;
use std::sync::Arc ;
use thiserror::Error ;

use crate::module::ModuleId ;
use crate::scope::{ LoadingScope, ScopeKey, ScopeKind, Visibility };
use crate::source::SymbolSource ;



/// Error returned when a host loader refuses a classpath entry.
#[derive( Debug, Error )]
pub enum AppendError {
	/// The loader is an isolated scope; only the bootstrap scope can grow.
	#[error( "Scope {0} does not accept additional classpath entries" )]
	NotExtensible( ScopeKey ),
	/// A host specific refusal.
	#[error( "Classpath entry {}: {}", entry.display(), reason )]
	Rejected { entry: PathBuf, reason: String },
}

/// A host loader that can be told about more classpath entries after start-up.
///
/// Used for modules that still ask to be loaded by the host's own loader rather
/// than by a scope of their own.
pub trait ClassPathAppender: Send + Sync {
	/// Makes `location` visible to the loader. Appending an entry twice is not an error.
	fn append_classpath_entry( &self, location: &std::path::Path ) -> Result<(), AppendError> ;
}

impl ClassPathAppender for LoadingScope {
	fn append_classpath_entry( &self, location: &std::path::Path ) -> Result<(), AppendError> {
		if !self.is_bootstrap() { return Err( AppendError::NotExtensible( self.key().clone() )) }
		if self.append_entry( location.to_path_buf()) {
			tracing::debug!( scope = %self.key(), entry = %location.display(), "Appended classpath entry to bootstrap scope" );
		}
		Ok(())
	}
}

impl<T: ClassPathAppender + ?Sized> ClassPathAppender for Arc<T> {
	fn append_classpath_entry( &self, location: &std::path::Path ) -> Result<(), AppendError> {
		( **self ).append_classpath_entry( location )
	}
}

/// Builds the bootstrap scope for the host application.
///
/// ```
/// use scope_link::{ CoreBootstrapScope, MemorySource };
///
/// let source = MemorySource::new().with_symbol( "/host/lib", "host.Api", b"api".as_slice() );
/// let core = CoreBootstrapScope::new( "core", [ "/host/lib" ], source );
///
/// assert!( core.is_bootstrap() );
/// assert!( core.resolve( "host.Api" ).is_some() );
/// ```
pub struct CoreBootstrapScope ;

impl CoreBootstrapScope {
	/// Creates the bootstrap scope. It has no parents and no restrictions.
	#[allow( clippy::new_ret_no_self )]
	pub fn new(
		core_id: impl Into<ModuleId>,
		classpath: impl IntoIterator<Item = impl Into<PathBuf>>,
		source: impl SymbolSource + 'static,
	) -> Arc<LoadingScope> {
		Self::with_shared_source( core_id, classpath, Arc::new( source ))
	}

	/// Like [`new`]( Self::new ), sharing an already boxed source with module scopes.
	pub fn with_shared_source(
		core_id: impl Into<ModuleId>,
		classpath: impl IntoIterator<Item = impl Into<PathBuf>>,
		source: Arc<dyn SymbolSource>,
	) -> Arc<LoadingScope> {
		Arc::new( LoadingScope::new(
			ScopeKey::module( core_id ),
			ScopeKind::Bootstrap,
			classpath.into_iter().map( Into::<PathBuf>::into ).collect(),
			Vec::with_capacity( 0 ),
			Visibility::Unrestricted,
			None,
			source,
		))
	}
}
